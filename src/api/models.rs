use serde::{Deserialize, Serialize};

// Account V1 response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountDto {
    pub puuid: String,
    #[serde(default)]
    pub game_name: Option<String>,
    #[serde(default)]
    pub tag_line: Option<String>,
}

impl AccountDto {
    /// `gameName#tagLine`, or the bare game name when the tag is missing.
    pub fn riot_id(&self) -> Option<String> {
        match (&self.game_name, &self.tag_line) {
            (Some(game), Some(tag)) if !game.is_empty() && !tag.is_empty() => {
                Some(format!("{}#{}", game, tag))
            }
            (Some(game), _) if !game.is_empty() => Some(game.clone()),
            _ => None,
        }
    }
}

// TFT Summoner V1 response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummonerDto {
    #[serde(default)]
    pub id: Option<String>,
    pub puuid: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub summoner_level: i64,
    #[serde(default)]
    pub profile_icon_id: i64,
}

// TFT League V1 ladder / rank entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeagueEntryDto {
    #[serde(default)]
    pub summoner_id: Option<String>,
    #[serde(default)]
    pub puuid: Option<String>,
    #[serde(default)]
    pub tier: Option<String>,
    #[serde(default)]
    pub rank: Option<String>,
    #[serde(default)]
    pub league_points: i64,
    #[serde(default)]
    pub wins: i64,
    #[serde(default)]
    pub losses: i64,
}

impl LeagueEntryDto {
    pub fn win_rate(&self) -> Option<f64> {
        let games = self.wins + self.losses;
        (games > 0).then(|| self.wins as f64 / games as f64 * 100.0)
    }
}
