// Endpoint path templates and request descriptors.
// Templates are plain strings with `{placeholder}` segments so a new game
// title or API version only needs a different templates file.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ApiError;
use crate::region::Platform;

/// Path templates for every endpoint family the client calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointTemplates {
    pub account_by_puuid: String,
    pub account_by_riot_id: String,
    pub summoner_by_id: String,
    pub summoner_by_puuid: String,
    pub summoner_by_name: String,
    pub league_apex: String,
    pub league_entries: String,
    pub league_by_summoner: String,
    pub match_ids_by_puuid: String,
    pub match_detail: String,
}

impl Default for EndpointTemplates {
    fn default() -> Self {
        EndpointTemplates {
            account_by_puuid: "/riot/account/v1/accounts/by-puuid/{puuid}".into(),
            account_by_riot_id: "/riot/account/v1/accounts/by-riot-id/{gameName}/{tagLine}".into(),
            summoner_by_id: "/tft/summoner/v1/summoners/{summonerId}".into(),
            summoner_by_puuid: "/tft/summoner/v1/summoners/by-puuid/{puuid}".into(),
            summoner_by_name: "/tft/summoner/v1/summoners/by-name/{summonerName}".into(),
            league_apex: "/tft/league/v1/{tier}".into(),
            league_entries: "/tft/league/v1/entries/{tier}/{division}".into(),
            league_by_summoner: "/tft/league/v1/entries/by-summoner/{summonerId}".into(),
            match_ids_by_puuid: "/tft/match/v1/matches/by-puuid/{puuid}/ids".into(),
            match_detail: "/tft/match/v1/matches/{matchId}".into(),
        }
    }
}

/// Data subsystem an endpoint belongs to; decides which host serves it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subsystem {
    Account,
    Summoner,
    League,
    Match,
}

impl Subsystem {
    /// Account and match data span platforms and live on the continental host.
    pub fn is_continental(&self) -> bool {
        matches!(self, Subsystem::Account | Subsystem::Match)
    }
}

/// Ranked tiers, in ladder order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tier {
    Iron,
    Bronze,
    Silver,
    Gold,
    Platinum,
    Emerald,
    Diamond,
    Master,
    Grandmaster,
    Challenger,
}

impl Tier {
    pub const ALL: [Tier; 10] = [
        Tier::Iron,
        Tier::Bronze,
        Tier::Silver,
        Tier::Gold,
        Tier::Platinum,
        Tier::Emerald,
        Tier::Diamond,
        Tier::Master,
        Tier::Grandmaster,
        Tier::Challenger,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Iron => "IRON",
            Tier::Bronze => "BRONZE",
            Tier::Silver => "SILVER",
            Tier::Gold => "GOLD",
            Tier::Platinum => "PLATINUM",
            Tier::Emerald => "EMERALD",
            Tier::Diamond => "DIAMOND",
            Tier::Master => "MASTER",
            Tier::Grandmaster => "GRANDMASTER",
            Tier::Challenger => "CHALLENGER",
        }
    }

    /// The dedicated non-paged listing for this tier, if it has one.
    pub fn apex(&self) -> Option<ApexTier> {
        match self {
            Tier::Master => Some(ApexTier::Master),
            Tier::Grandmaster => Some(ApexTier::Grandmaster),
            Tier::Challenger => Some(ApexTier::Challenger),
            _ => None,
        }
    }
}

impl std::str::FromStr for Tier {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_uppercase();
        Tier::ALL
            .into_iter()
            .find(|t| t.as_str() == upper)
            .ok_or_else(|| ApiError::Configuration(format!("unknown tier '{}'", s)))
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApexTier {
    Master,
    Grandmaster,
    Challenger,
}

impl ApexTier {
    pub fn as_path(&self) -> &'static str {
        match self {
            ApexTier::Master => "master",
            ApexTier::Grandmaster => "grandmaster",
            ApexTier::Challenger => "challenger",
        }
    }

    pub fn tier(&self) -> Tier {
        match self {
            ApexTier::Master => Tier::Master,
            ApexTier::Grandmaster => Tier::Grandmaster,
            ApexTier::Challenger => Tier::Challenger,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Division {
    I,
    II,
    III,
    IV,
}

impl Division {
    pub fn as_str(&self) -> &'static str {
        match self {
            Division::I => "I",
            Division::II => "II",
            Division::III => "III",
            Division::IV => "IV",
        }
    }
}

impl std::str::FromStr for Division {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "I" | "1" => Ok(Division::I),
            "II" | "2" => Ok(Division::II),
            "III" | "3" => Ok(Division::III),
            "IV" | "4" => Ok(Division::IV),
            _ => Err(ApiError::Configuration(format!("unknown division '{}'", s))),
        }
    }
}

impl fmt::Display for Division {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One logical upstream call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    AccountByPuuid { puuid: String },
    AccountByRiotId { game_name: String, tag_line: String },
    SummonerById { summoner_id: String },
    SummonerByPuuid { puuid: String },
    SummonerByName { name: String },
    LeagueApex { tier: ApexTier },
    LeagueEntries { tier: Tier, division: Division, page: u32 },
    LeagueBySummoner { summoner_id: String },
    MatchIds { puuid: String, count: u32 },
    MatchDetail { match_id: String },
}

impl Endpoint {
    pub fn key(&self) -> &'static str {
        match self {
            Endpoint::AccountByPuuid { .. } => "account-by-puuid",
            Endpoint::AccountByRiotId { .. } => "account-by-riot-id",
            Endpoint::SummonerById { .. } => "summoner-by-id",
            Endpoint::SummonerByPuuid { .. } => "summoner-by-puuid",
            Endpoint::SummonerByName { .. } => "summoner-by-name",
            Endpoint::LeagueApex { tier } => match tier {
                ApexTier::Master => "league-master",
                ApexTier::Grandmaster => "league-grandmaster",
                ApexTier::Challenger => "league-challenger",
            },
            Endpoint::LeagueEntries { .. } => "league-entries",
            Endpoint::LeagueBySummoner { .. } => "league-by-summoner",
            Endpoint::MatchIds { .. } => "match-ids",
            Endpoint::MatchDetail { .. } => "match-detail",
        }
    }

    pub fn subsystem(&self) -> Subsystem {
        match self {
            Endpoint::AccountByPuuid { .. } | Endpoint::AccountByRiotId { .. } => {
                Subsystem::Account
            }
            Endpoint::SummonerById { .. }
            | Endpoint::SummonerByPuuid { .. }
            | Endpoint::SummonerByName { .. } => Subsystem::Summoner,
            Endpoint::LeagueApex { .. }
            | Endpoint::LeagueEntries { .. }
            | Endpoint::LeagueBySummoner { .. } => Subsystem::League,
            Endpoint::MatchIds { .. } | Endpoint::MatchDetail { .. } => Subsystem::Match,
        }
    }

    fn template<'a>(&self, templates: &'a EndpointTemplates) -> &'a str {
        match self {
            Endpoint::AccountByPuuid { .. } => &templates.account_by_puuid,
            Endpoint::AccountByRiotId { .. } => &templates.account_by_riot_id,
            Endpoint::SummonerById { .. } => &templates.summoner_by_id,
            Endpoint::SummonerByPuuid { .. } => &templates.summoner_by_puuid,
            Endpoint::SummonerByName { .. } => &templates.summoner_by_name,
            Endpoint::LeagueApex { .. } => &templates.league_apex,
            Endpoint::LeagueEntries { .. } => &templates.league_entries,
            Endpoint::LeagueBySummoner { .. } => &templates.league_by_summoner,
            Endpoint::MatchIds { .. } => &templates.match_ids_by_puuid,
            Endpoint::MatchDetail { .. } => &templates.match_detail,
        }
    }

    fn path_params(&self) -> Vec<(&'static str, String)> {
        match self {
            Endpoint::AccountByPuuid { puuid }
            | Endpoint::SummonerByPuuid { puuid }
            | Endpoint::MatchIds { puuid, .. } => vec![("puuid", puuid.clone())],
            Endpoint::AccountByRiotId {
                game_name,
                tag_line,
            } => vec![
                ("gameName", game_name.clone()),
                ("tagLine", tag_line.clone()),
            ],
            Endpoint::SummonerById { summoner_id } | Endpoint::LeagueBySummoner { summoner_id } => {
                vec![("summonerId", summoner_id.clone())]
            }
            Endpoint::SummonerByName { name } => vec![("summonerName", name.clone())],
            Endpoint::LeagueApex { tier } => vec![("tier", tier.as_path().to_string())],
            Endpoint::LeagueEntries { tier, division, .. } => vec![
                ("tier", tier.as_str().to_string()),
                ("division", division.as_str().to_string()),
            ],
            Endpoint::MatchDetail { match_id } => vec![("matchId", match_id.clone())],
        }
    }

    fn query(&self) -> Vec<(&'static str, String)> {
        match self {
            Endpoint::LeagueEntries { page, .. } => vec![("page", page.to_string())],
            Endpoint::MatchIds { count, .. } => vec![("count", count.to_string())],
            _ => Vec::new(),
        }
    }
}

/// Fully described request: endpoint, region, path and query parameters.
///
/// Built once per call and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDescriptor {
    endpoint: Endpoint,
    platform: Platform,
    path_params: Vec<(&'static str, String)>,
    query: Vec<(&'static str, String)>,
}

impl RequestDescriptor {
    pub fn new(endpoint: Endpoint, platform: Platform) -> Self {
        let path_params = endpoint.path_params();
        let query = endpoint.query();
        RequestDescriptor {
            endpoint,
            platform,
            path_params,
            query,
        }
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn subsystem(&self) -> Subsystem {
        self.endpoint.subsystem()
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn path_params(&self) -> &[(&'static str, String)] {
        &self.path_params
    }

    pub fn query(&self) -> &[(&'static str, String)] {
        &self.query
    }

    /// Hostname serving this request under `domain`.
    pub fn host(&self, domain: &str) -> String {
        if self.subsystem().is_continental() {
            self.platform.route().host(domain)
        } else {
            self.platform.host(domain)
        }
    }

    /// Render the absolute URL.
    ///
    /// With `base_override` set, every request goes to that base instead of the
    /// routed host (the path and query stay the same).
    pub fn url(
        &self,
        templates: &EndpointTemplates,
        domain: &str,
        base_override: Option<&str>,
    ) -> Result<String, ApiError> {
        let path = render_path(self.endpoint.template(templates), &self.path_params)?;

        let mut url = match base_override {
            Some(base) => format!("{}{}", base.trim_end_matches('/'), path),
            None => format!("https://{}{}", self.host(domain), path),
        };

        for (i, (key, value)) in self.query.iter().enumerate() {
            url.push(if i == 0 { '?' } else { '&' });
            url.push_str(key);
            url.push('=');
            url.push_str(&urlencoding::encode(value));
        }

        Ok(url)
    }
}

fn render_path(template: &str, params: &[(&'static str, String)]) -> Result<String, ApiError> {
    if !template.starts_with('/') {
        return Err(ApiError::Configuration(format!(
            "endpoint template '{}' must start with '/'",
            template
        )));
    }

    let mut path = template.to_string();
    for (name, value) in params {
        path = path.replace(&format!("{{{}}}", name), &urlencoding::encode(value));
    }

    if path.contains('{') || path.contains('}') {
        return Err(ApiError::Configuration(format!(
            "endpoint template '{}' has unresolved placeholders",
            template
        )));
    }

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOMAIN: &str = "api.riotgames.com";

    fn url_for(endpoint: Endpoint, platform: Platform) -> String {
        RequestDescriptor::new(endpoint, platform)
            .url(&EndpointTemplates::default(), DOMAIN, None)
            .unwrap()
    }

    #[test]
    fn league_challenger_uses_platform_host() {
        let endpoint = Endpoint::LeagueApex {
            tier: ApexTier::Challenger,
        };
        assert_eq!(endpoint.key(), "league-challenger");
        assert_eq!(
            url_for(endpoint, Platform::KR),
            "https://kr.api.riotgames.com/tft/league/v1/challenger"
        );
    }

    #[test]
    fn match_detail_uses_continental_host() {
        let endpoint = Endpoint::MatchDetail {
            match_id: "NA1_123".into(),
        };
        assert_eq!(endpoint.key(), "match-detail");

        let url = url_for(endpoint, Platform::NA1);
        assert_eq!(url, "https://americas.api.riotgames.com/tft/match/v1/matches/NA1_123");
        assert!(!url.contains("na1.api"));
    }

    #[test]
    fn paged_entries_carry_page_query() {
        let url = url_for(
            Endpoint::LeagueEntries {
                tier: Tier::Gold,
                division: Division::II,
                page: 3,
            },
            Platform::EUW1,
        );
        assert_eq!(
            url,
            "https://euw1.api.riotgames.com/tft/league/v1/entries/GOLD/II?page=3"
        );
    }

    #[test]
    fn riot_id_segments_are_percent_encoded() {
        let url = url_for(
            Endpoint::AccountByRiotId {
                game_name: "Hide on bush".into(),
                tag_line: "KR1".into(),
            },
            Platform::KR,
        );
        assert_eq!(
            url,
            "https://asia.api.riotgames.com/riot/account/v1/accounts/by-riot-id/Hide%20on%20bush/KR1"
        );
    }

    #[test]
    fn base_override_keeps_path_and_query() {
        let descriptor = RequestDescriptor::new(
            Endpoint::MatchIds {
                puuid: "abc".into(),
                count: 5,
            },
            Platform::KR,
        );
        let url = descriptor
            .url(&EndpointTemplates::default(), DOMAIN, Some("http://127.0.0.1:9000/"))
            .unwrap();
        assert_eq!(url, "http://127.0.0.1:9000/tft/match/v1/matches/by-puuid/abc/ids?count=5");
    }

    #[test]
    fn templates_are_configurable() {
        let templates = EndpointTemplates {
            match_detail: "/lol/match/v5/matches/{matchId}".into(),
            ..EndpointTemplates::default()
        };
        let url = RequestDescriptor::new(
            Endpoint::MatchDetail {
                match_id: "EUW1_1".into(),
            },
            Platform::EUW1,
        )
        .url(&templates, DOMAIN, None)
        .unwrap();
        assert_eq!(url, "https://europe.api.riotgames.com/lol/match/v5/matches/EUW1_1");
    }

    #[test]
    fn unresolved_placeholder_is_a_configuration_error() {
        let templates = EndpointTemplates {
            match_detail: "/tft/match/v1/matches/{id}".into(),
            ..EndpointTemplates::default()
        };
        let err = RequestDescriptor::new(
            Endpoint::MatchDetail {
                match_id: "KR_1".into(),
            },
            Platform::KR,
        )
        .url(&templates, DOMAIN, None)
        .unwrap_err();
        assert!(matches!(err, ApiError::Configuration(_)));
    }

    #[test]
    fn tier_and_division_parse_loosely() {
        assert_eq!("challenger".parse::<Tier>().unwrap(), Tier::Challenger);
        assert_eq!(Tier::Challenger.apex(), Some(ApexTier::Challenger));
        assert_eq!(Tier::Gold.apex(), None);
        assert_eq!("2".parse::<Division>().unwrap(), Division::II);
        assert!("V".parse::<Division>().is_err());
    }
}
