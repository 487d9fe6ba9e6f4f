use std::cell::RefCell;
use std::time::Duration;

use httpmock::prelude::*;
use serde_json::json;

use tft_scout::api::endpoints::{ApexTier, Division, Tier};
use tft_scout::api::retry::RetryPolicy;
use tft_scout::api::transport::{Sleeper, UreqTransport};
use tft_scout::api::TftApiClient;
use tft_scout::config::{ApiKey, Config};
use tft_scout::rate_limit::RateGate;
use tft_scout::region::Platform;
use tft_scout::ApiError;

const KEY: &str = "RGAPI-test-key";

#[derive(Default)]
struct NoSleep {
    sleeps: RefCell<Vec<Duration>>,
}

impl Sleeper for NoSleep {
    fn sleep(&self, duration: Duration) {
        self.sleeps.borrow_mut().push(duration);
    }
}

fn client(server: &MockServer, max_attempts: u32) -> TftApiClient<UreqTransport, NoSleep> {
    let config = Config::new(ApiKey::new(KEY).unwrap())
        .with_base_url(server.base_url())
        .with_retry(RetryPolicy {
            max_attempts,
            ..RetryPolicy::default()
        });
    let transport = UreqTransport::new(Duration::from_secs(5), &config.user_agent);
    let gate = RateGate::new(config.rate_limit);
    TftApiClient::with_parts(config, transport, NoSleep::default(), gate)
}

#[test]
fn sends_key_and_unwraps_ladder_envelope() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/tft/league/v1/challenger")
            .header("X-Riot-Token", KEY);
        then.status(200).json_body(json!({
            "tier": "CHALLENGER",
            "entries": [
                {"puuid": "a", "leaguePoints": 1200},
                {"puuid": "b", "leaguePoints": 1500}
            ]
        }));
    });

    let client = client(&server, 5);
    let entries = client
        .get_apex_ladder(Platform::KR, ApexTier::Challenger)
        .unwrap();

    mock.assert();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[1]["leaguePoints"], 1500);
    assert!(client.sleeper().sleeps.borrow().is_empty());
}

#[test]
fn ladder_page_passes_page_query() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/tft/league/v1/entries/GOLD/II")
            .query_param("page", "3");
        then.status(200).json_body(json!([{"puuid": "a"}]));
    });

    let client = client(&server, 5);
    let entries = client
        .get_ladder_page(Platform::KR, Tier::Gold, Division::II, 3)
        .unwrap();

    mock.assert();
    assert_eq!(entries.len(), 1);
}

#[test]
fn unauthorized_fails_without_retry() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/tft/league/v1/challenger");
        then.status(401);
    });

    let client = client(&server, 5);
    let err = client
        .get_apex_ladder(Platform::KR, ApexTier::Challenger)
        .unwrap_err();

    assert!(matches!(err, ApiError::Authentication { status: 401, .. }));
    assert_eq!(mock.hits(), 1);
}

#[test]
fn not_found_is_a_request_error() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/tft/match/v1/matches/KR_404");
        then.status(404).body("{\"status\":{\"status_code\":404}}");
    });

    let client = client(&server, 5);
    let err = client.get_match_detail(Platform::KR, "KR_404").unwrap_err();

    assert!(matches!(err, ApiError::Request { status: 404, .. }));
    assert_eq!(mock.hits(), 1);
}

#[test]
fn unavailable_exhausts_attempt_budget() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/tft/league/v1/master");
        then.status(503);
    });

    let client = client(&server, 3);
    let err = client
        .get_apex_ladder(Platform::KR, ApexTier::Master)
        .unwrap_err();

    match err {
        ApiError::TransientFailure {
            attempts,
            last_status,
            ..
        } => {
            assert_eq!(attempts, 3);
            assert_eq!(last_status, Some(503));
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(mock.hits(), 3);
    assert_eq!(
        *client.sleeper().sleeps.borrow(),
        vec![Duration::from_secs(5), Duration::from_secs(5)]
    );
}

#[test]
fn rate_limited_waits_for_retry_after() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/tft/league/v1/grandmaster");
        then.status(429).header("Retry-After", "2");
    });

    let client = client(&server, 2);
    let err = client
        .get_apex_ladder(Platform::KR, ApexTier::Grandmaster)
        .unwrap_err();

    assert!(matches!(
        err,
        ApiError::TransientFailure {
            last_status: Some(429),
            ..
        }
    ));
    assert_eq!(mock.hits(), 2);
    assert_eq!(*client.sleeper().sleeps.borrow(), vec![Duration::from_secs(2)]);
}

#[test]
fn non_json_body_is_a_shape_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/tft/league/v1/challenger");
        then.status(200).body("<html>maintenance</html>");
    });

    let client = client(&server, 5);
    let err = client
        .get_apex_ladder(Platform::KR, ApexTier::Challenger)
        .unwrap_err();

    assert!(matches!(err, ApiError::UnexpectedResponseShape { .. }));
}
