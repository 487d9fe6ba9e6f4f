//! Player summaries and per-player digests of TFT match details.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::models::SummonerDto;
use crate::api::transport::{Sleeper, Transport};
use crate::api::{Record, TftApiClient};
use crate::error::ApiResult;
use crate::region::Platform;

const SUMMARY_MATCH_COUNT: u32 = 5;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSummary {
    pub summoner: SummonerDto,
    pub rank: Option<Record>,
    pub recent_match_ids: Vec<String>,
    pub latest_match: Option<Record>,
}

/// Summoner, first rank entry, recent match ids and the latest match detail.
pub fn get_player_summary<T: Transport, S: Sleeper>(
    client: &TftApiClient<T, S>,
    platform: Platform,
    summoner_name: &str,
) -> ApiResult<PlayerSummary> {
    let summoner = client.get_summoner_by_name(platform, summoner_name)?;

    let rank = match &summoner.id {
        Some(id) => client.get_rank_entries(platform, id)?.into_iter().next(),
        None => None,
    };

    let recent_match_ids = client.get_match_ids(platform, &summoner.puuid, SUMMARY_MATCH_COUNT)?;
    let latest_match = match recent_match_ids.first() {
        Some(id) => Some(client.get_match_detail(platform, id)?),
        None => None,
    };

    Ok(PlayerSummary {
        summoner,
        rank,
        recent_match_ids,
        latest_match,
    })
}

/// Split `name#tag`. Both halves must be non-empty.
pub fn parse_riot_id(riot_id: &str) -> Option<(&str, &str)> {
    let (name, tag) = riot_id.rsplit_once('#')?;
    let (name, tag) = (name.trim(), tag.trim());
    (!name.is_empty() && !tag.is_empty()).then_some((name, tag))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TraitDigest {
    pub name: String,
    pub num_units: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitDigest {
    pub character_id: String,
    pub tier: u32,
}

/// One player's board at the end of one match.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchDigest {
    pub match_id: String,
    pub played_at: Option<DateTime<Utc>>,
    pub placement: u32,
    pub level: u32,
    pub total_damage_to_players: u32,
    pub gold_left: u32,
    /// Active traits, most units first.
    pub traits: Vec<TraitDigest>,
    pub units: Vec<UnitDigest>,
    pub augments: Vec<String>,
}

#[derive(Deserialize)]
struct DetailView {
    #[serde(default)]
    metadata: MetadataView,
    info: InfoView,
}

#[derive(Deserialize, Default)]
struct MetadataView {
    #[serde(default)]
    match_id: String,
}

#[derive(Deserialize)]
struct InfoView {
    #[serde(default)]
    game_datetime: Option<i64>,
    #[serde(default)]
    participants: Vec<ParticipantView>,
}

#[derive(Deserialize)]
struct ParticipantView {
    puuid: String,
    #[serde(default)]
    placement: u32,
    #[serde(default)]
    level: u32,
    #[serde(default)]
    total_damage_to_players: u32,
    #[serde(default)]
    gold_left: u32,
    #[serde(default)]
    traits: Vec<TraitView>,
    #[serde(default)]
    units: Vec<UnitView>,
    #[serde(default)]
    augments: Vec<String>,
}

#[derive(Deserialize)]
struct TraitView {
    name: String,
    #[serde(default)]
    num_units: u32,
}

#[derive(Deserialize)]
struct UnitView {
    character_id: String,
    #[serde(default)]
    tier: u32,
}

/// Digest for `puuid`, or `None` if the detail does not contain that player.
pub fn digest(detail: &Record, puuid: &str) -> Option<MatchDigest> {
    let view: DetailView = match serde_json::from_value(Value::Object(detail.clone())) {
        Ok(view) => view,
        Err(e) => {
            tracing::warn!("match detail not readable: {}", e);
            return None;
        }
    };

    let player = view.info.participants.into_iter().find(|p| p.puuid == puuid)?;

    let mut traits: Vec<TraitDigest> = player
        .traits
        .into_iter()
        .filter(|t| t.num_units > 0)
        .map(|t| TraitDigest {
            name: strip_set_prefix(&t.name).to_string(),
            num_units: t.num_units,
        })
        .collect();
    traits.sort_by(|a, b| b.num_units.cmp(&a.num_units));

    Some(MatchDigest {
        match_id: view.metadata.match_id,
        played_at: view
            .info
            .game_datetime
            .and_then(DateTime::<Utc>::from_timestamp_millis),
        placement: player.placement,
        level: player.level,
        total_damage_to_players: player.total_damage_to_players,
        gold_left: player.gold_left,
        traits,
        units: player
            .units
            .into_iter()
            .map(|u| UnitDigest {
                character_id: strip_set_prefix(&u.character_id).to_string(),
                tier: u.tier,
            })
            .collect(),
        augments: player
            .augments
            .iter()
            .map(|a| strip_set_prefix(a).to_string())
            .collect(),
    })
}

/// Digests of the `count` most recent matches of a Riot ID.
pub fn recent_match_digests<T: Transport, S: Sleeper>(
    client: &TftApiClient<T, S>,
    platform: Platform,
    game_name: &str,
    tag_line: &str,
    count: u32,
) -> ApiResult<Vec<MatchDigest>> {
    let account = client.get_account_by_riot_id(platform, game_name, tag_line)?;
    let ids = client.get_match_ids(platform, &account.puuid, count)?;

    let mut digests = Vec::with_capacity(ids.len());
    for id in &ids {
        let detail = client.get_match_detail(platform, id)?;
        match digest(&detail, &account.puuid) {
            Some(d) => digests.push(d),
            None => tracing::warn!(match_id = %id, "player missing from match detail"),
        }
    }
    Ok(digests)
}

/// `TFT15_Ahri` -> `Ahri`, `TFT_Item_X` -> `Item_X`.
pub fn strip_set_prefix(api_name: &str) -> &str {
    let Some(rest) = api_name.strip_prefix("TFT") else {
        return api_name;
    };
    let rest = rest.trim_start_matches(|c: char| c.is_ascii_digit());
    rest.strip_prefix('_').unwrap_or(api_name)
}
