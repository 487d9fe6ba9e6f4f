//! Ranked ladder collection with display-name enrichment.

use serde::Serialize;
use serde_json::Value;

use crate::api::endpoints::{Division, Tier};
use crate::api::models::LeagueEntryDto;
use crate::api::transport::{Sleeper, Transport};
use crate::api::{Record, TftApiClient};
use crate::error::{ApiError, ApiResult};
use crate::region::Platform;

pub const UNKNOWN_NAME: &str = "Unknown";

/// One ladder entry with the names resolved for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LadderRow {
    pub tier: String,
    pub division: String,
    pub summoner_id: Option<String>,
    pub summoner_name: Option<String>,
    pub puuid: Option<String>,
    pub riot_name: String,
    pub league_points: i64,
    pub wins: i64,
    pub losses: i64,
}

impl LadderRow {
    pub fn win_rate(&self) -> Option<f64> {
        let games = self.wins + self.losses;
        (games > 0).then(|| self.wins as f64 / games as f64 * 100.0)
    }
}

/// First page of a tier: the dedicated listing for apex tiers (sorted by
/// league points), the paged division listing otherwise.
pub fn fetch_tier_page<T: Transport, S: Sleeper>(
    client: &TftApiClient<T, S>,
    platform: Platform,
    tier: Tier,
    division: Division,
    page: u32,
) -> ApiResult<Vec<Record>> {
    match tier.apex() {
        Some(apex) => {
            let mut entries = client.get_apex_ladder(platform, apex)?;
            entries.sort_by_key(|e| std::cmp::Reverse(league_points(e)));
            Ok(entries)
        }
        None => client.get_ladder_page(platform, tier, division, page),
    }
}

/// Resolve summoner name, puuid and Riot ID for the first `limit` entries.
///
/// A lookup that fails for one entry leaves its names empty; only failures
/// that would hit every entry (bad credential, cancellation) abort the run.
pub fn enrich<T: Transport, S: Sleeper>(
    client: &TftApiClient<T, S>,
    platform: Platform,
    tier: Tier,
    division: Division,
    entries: &[Record],
    limit: usize,
    mut on_row: impl FnMut(&LadderRow),
) -> ApiResult<Vec<LadderRow>> {
    let division = if tier.apex().is_some() { "" } else { division.as_str() };
    let mut rows = Vec::new();

    for (i, record) in entries.iter().take(limit).enumerate() {
        let entry: LeagueEntryDto = match serde_json::from_value(Value::Object(record.clone())) {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(tier = %tier, index = i, "skipping malformed ladder entry: {}", e);
                continue;
            }
        };

        let mut summoner_name = None;
        let mut puuid = entry.puuid.clone();

        if puuid.is_none() {
            if let Some(sid) = &entry.summoner_id {
                if let Some(summoner) = tolerate(client.get_summoner_by_id(platform, sid))? {
                    summoner_name = summoner.name;
                    puuid = Some(summoner.puuid);
                }
            }
        }

        let riot_name = match &puuid {
            Some(p) => tolerate(client.resolve_riot_name(platform, p))?.flatten(),
            None => None,
        };

        let row = LadderRow {
            tier: tier.to_string(),
            division: division.to_string(),
            summoner_id: entry.summoner_id,
            riot_name: riot_name
                .or_else(|| summoner_name.clone())
                .unwrap_or_else(|| UNKNOWN_NAME.to_string()),
            summoner_name,
            puuid,
            league_points: entry.league_points,
            wins: entry.wins,
            losses: entry.losses,
        };

        tracing::info!(
            "[{} {}] {}/{} -> {}",
            row.tier,
            row.division,
            i + 1,
            limit.min(entries.len()),
            row.riot_name
        );
        on_row(&row);
        rows.push(row);
    }

    Ok(rows)
}

/// Page 1 of division I for every tier, `limit_per_tier` enriched rows each.
pub fn collect_all_tiers<T: Transport, S: Sleeper>(
    client: &TftApiClient<T, S>,
    platform: Platform,
    limit_per_tier: usize,
    mut on_row: impl FnMut(&LadderRow),
) -> ApiResult<Vec<LadderRow>> {
    let mut all = Vec::new();

    for tier in Tier::ALL {
        let entries = fetch_tier_page(client, platform, tier, Division::I, 1)?;
        if entries.is_empty() {
            tracing::info!(tier = %tier, "no ladder entries");
            continue;
        }
        all.extend(enrich(
            client,
            platform,
            tier,
            Division::I,
            &entries,
            limit_per_tier,
            &mut on_row,
        )?);
    }

    Ok(all)
}

fn league_points(record: &Record) -> i64 {
    record
        .get("leaguePoints")
        .and_then(Value::as_i64)
        .unwrap_or_default()
}

fn tolerate<T>(result: ApiResult<T>) -> ApiResult<Option<T>> {
    match result {
        Ok(v) => Ok(Some(v)),
        Err(
            e @ (ApiError::Authentication { .. }
            | ApiError::Cancelled { .. }
            | ApiError::Configuration(_)),
        ) => Err(e),
        Err(e) => {
            tracing::warn!("name lookup failed: {}", e);
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::api::client::testing::*;
    use crate::api::normalize;

    const PUUID_A: &str = "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
    const PUUID_B: &str = "bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb";

    fn entries(value: serde_json::Value) -> Vec<Record> {
        normalize::records(value).unwrap()
    }

    #[test]
    fn apex_page_is_sorted_by_points() {
        let client = client(vec![ok(json!({"entries": [
            {"puuid": PUUID_A, "leaguePoints": 900},
            {"puuid": PUUID_B, "leaguePoints": 1500}
        ]}))]);

        let page = fetch_tier_page(&client, Platform::KR, Tier::Master, Division::III, 4).unwrap();

        assert_eq!(page[0]["leaguePoints"], 1500);
        assert_eq!(
            client.transport().urls(),
            vec!["https://kr.api.riotgames.com/tft/league/v1/master".to_string()]
        );
    }

    #[test]
    fn division_page_keeps_upstream_order() {
        let client = client(vec![ok(json!([
            {"puuid": PUUID_A, "leaguePoints": 10},
            {"puuid": PUUID_B, "leaguePoints": 90}
        ]))]);

        let page = fetch_tier_page(&client, Platform::KR, Tier::Gold, Division::II, 2).unwrap();

        assert_eq!(page[0]["leaguePoints"], 10);
        assert!(client.transport().urls()[0].ends_with("/entries/GOLD/II?page=2"));
    }

    #[test]
    fn enrich_resolves_through_summoner_then_account() {
        let client = client(vec![
            ok(json!({"id": "s1", "puuid": PUUID_A, "name": "상만전"})),
            ok(json!({"puuid": PUUID_A, "gameName": "Sangman", "tagLine": "KR1"})),
        ]);
        let page = entries(json!([
            {"summonerId": "s1", "leaguePoints": 100, "wins": 3, "losses": 1}
        ]));
        let mut seen = 0;

        let rows = enrich(&client, Platform::KR, Tier::Gold, Division::I, &page, 5, |_| {
            seen += 1
        })
        .unwrap();

        assert_eq!(seen, 1);
        assert_eq!(rows[0].summoner_name.as_deref(), Some("상만전"));
        assert_eq!(rows[0].riot_name, "Sangman#KR1");
        assert_eq!(rows[0].division, "I");
        assert_eq!(rows[0].win_rate(), Some(75.0));
    }

    #[test]
    fn enrich_falls_back_to_summoner_name_then_unknown() {
        let client = client(vec![
            ok(json!({"id": "s1", "puuid": PUUID_A, "name": "상만전"})),
            status(404),
            status(404),
        ]);
        let page = entries(json!([{"summonerId": "s1"}, {"summonerId": "s2"}]));

        let rows =
            enrich(&client, Platform::KR, Tier::Gold, Division::I, &page, 5, |_| {}).unwrap();

        assert_eq!(rows[0].riot_name, "상만전");
        assert_eq!(rows[1].riot_name, UNKNOWN_NAME);
        assert_eq!(rows[1].puuid, None);
    }

    #[test]
    fn enrich_honours_limit_and_uses_entry_puuid() {
        let client = client(vec![ok(json!({"puuid": PUUID_A, "gameName": "A", "tagLine": "1"}))]);
        let page = entries(json!([{"puuid": PUUID_A}, {"puuid": PUUID_B}]));

        let rows = enrich(&client, Platform::KR, Tier::Challenger, Division::I, &page, 1, |_| {})
            .unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].riot_name, "A#1");
        assert_eq!(rows[0].division, "");
        assert_eq!(client.transport().calls.borrow().len(), 1);
    }

    #[test]
    fn all_tiers_walks_every_tier_once() {
        let mut script = vec![ok(json!([{"puuid": "short", "leaguePoints": 5}]))];
        script.extend((0..6).map(|_| ok(json!([]))));
        script.extend((0..3).map(|_| ok(json!({"entries": []}))));
        let client = client(script);

        let rows = collect_all_tiers(&client, Platform::KR, 2, |_| {}).unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].tier, "IRON");
        assert_eq!(rows[0].riot_name, UNKNOWN_NAME);
        let urls = client.transport().urls();
        assert_eq!(urls.len(), Tier::ALL.len());
        assert!(urls[0].ends_with("/entries/IRON/I?page=1"));
        assert!(urls[9].ends_with("/tft/league/v1/challenger"));
    }

    #[test]
    fn enrich_aborts_on_authentication_failure() {
        let client = client(vec![status(403)]);
        let page = entries(json!([{"puuid": PUUID_A}]));

        let err = enrich(&client, Platform::KR, Tier::Gold, Division::I, &page, 5, |_| {})
            .unwrap_err();

        assert!(matches!(err, ApiError::Authentication { status: 403, .. }));
    }
}
