use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::cancel::CancelToken;
use crate::config::Config;
use crate::error::{ApiError, ApiResult};
use crate::rate_limit::RateGate;
use crate::region::{resolve_region, Platform, RegionHosts};

use super::endpoints::{ApexTier, Division, Endpoint, RequestDescriptor, Tier};
use super::models::{AccountDto, SummonerDto};
use super::normalize::{self, Record};
use super::retry::{Action, RetryState};
use super::transport::{Sleeper, ThreadSleeper, Transport, UreqTransport};

/// Riot Account IDs shorter than this are placeholders, not real puuids.
const MIN_PUUID_LEN: usize = 30;

/// Blocking TFT API client.
///
/// Owns the configuration, the transport and a handle on the shared
/// [`RateGate`]. Every operation performs one logical call with bounded
/// internal retries and returns either decoded data or an [`ApiError`].
pub struct TftApiClient<T = UreqTransport, S = ThreadSleeper> {
    config: Config,
    transport: T,
    sleeper: S,
    gate: RateGate,
    cancel: CancelToken,
}

impl TftApiClient {
    pub fn new(config: Config) -> Self {
        let transport = UreqTransport::new(config.timeout, &config.user_agent);
        let gate = RateGate::new(config.rate_limit);
        Self::with_parts(config, transport, ThreadSleeper, gate)
    }
}

impl<T: Transport, S: Sleeper> TftApiClient<T, S> {
    pub fn with_parts(config: Config, transport: T, sleeper: S, gate: RateGate) -> Self {
        TftApiClient {
            config,
            transport,
            sleeper,
            gate,
            cancel: CancelToken::new(),
        }
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn gate(&self) -> &RateGate {
        &self.gate
    }

    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn sleeper(&self) -> &S {
        &self.sleeper
    }

    pub fn resolve_region(&self, code: &str) -> ApiResult<RegionHosts> {
        resolve_region(code, &self.config.domain)
    }

    pub fn url_for(&self, descriptor: &RequestDescriptor) -> ApiResult<String> {
        descriptor.url(
            &self.config.endpoints,
            &self.config.domain,
            self.config.base_url.as_deref(),
        )
    }

    /// Run one descriptor and return its parsed JSON body.
    pub fn fetch(&self, descriptor: &RequestDescriptor) -> ApiResult<(String, Value)> {
        let url = self.url_for(descriptor)?;
        let body = self.get_json(&url)?;
        Ok((url, body))
    }

    fn get_json(&self, url: &str) -> ApiResult<Value> {
        let headers = [
            ("X-Riot-Token", self.config.api_key.expose()),
            ("Accept-Language", self.config.locale.as_str()),
        ];
        let policy = &self.config.retry;
        let mut state = RetryState::default();

        loop {
            if self.cancel.is_cancelled() {
                return Err(cancelled(url, &state));
            }
            let admitted = self.gate.until_ready_within(self.cancel.remaining());
            if !admitted || self.cancel.is_cancelled() {
                tracing::warn!(attempts = state.attempts, url, "deadline passed in the rate gate");
                return Err(cancelled(url, &state));
            }

            state.attempts += 1;
            tracing::debug!(attempt = state.attempts, url, "GET");

            let (action, reason) = match self.transport.get(url, &headers) {
                Ok(resp) => {
                    state.last_status = Some(resp.status);
                    match policy.classify(resp.status, resp.retry_after.as_deref()) {
                        Action::Success => return parse_body(url, &resp.body),
                        Action::FailFast => return Err(fail_fast(resp.status, url, &state)),
                        action => (action, format!("HTTP {}", resp.status)),
                    }
                }
                Err(e) => {
                    state.last_status = None;
                    (policy.on_network_error(), format!("network error: {}", e))
                }
            };

            let delay = action.delay().unwrap_or_default();
            let deadline_first = self.cancel.remaining().is_some_and(|left| left < delay);
            if deadline_first && state.attempts < policy.max_attempts {
                tracing::warn!(
                    attempts = state.attempts,
                    wait_ms = delay.as_millis() as u64,
                    url,
                    "{}, deadline passes before the next attempt",
                    reason
                );
                return Err(cancelled(url, &state));
            }

            if !state.can_retry(policy, delay) {
                tracing::warn!(
                    attempts = state.attempts,
                    waited_ms = state.waited.as_millis() as u64,
                    url,
                    "giving up: {}",
                    reason
                );
                return Err(ApiError::TransientFailure {
                    url: url.to_string(),
                    attempts: state.attempts,
                    last_status: state.last_status,
                    reason,
                });
            }

            tracing::warn!(
                attempt = state.attempts,
                status = ?state.last_status,
                wait_ms = delay.as_millis() as u64,
                url,
                "{}, retrying",
                reason
            );
            self.sleeper.sleep(delay);
            state.record_wait(delay);
        }
    }

    fn listing(&self, descriptor: RequestDescriptor) -> ApiResult<Vec<Record>> {
        let (url, body) = self.fetch(&descriptor)?;
        normalize::records(body).map_err(|e| shape_error(&url, e))
    }

    fn decode<D: DeserializeOwned>(&self, descriptor: RequestDescriptor) -> ApiResult<D> {
        let (url, body) = self.fetch(&descriptor)?;
        serde_json::from_value(body).map_err(|e| shape_error(&url, e))
    }

    // Account-V1, continental host

    pub fn get_account_by_riot_id(
        &self,
        platform: Platform,
        game_name: &str,
        tag_line: &str,
    ) -> ApiResult<AccountDto> {
        tracing::trace!(
            "[ACCOUNT-V1] get_account_by_riot_id {}#{} in {}",
            game_name,
            tag_line,
            platform
        );
        self.decode(RequestDescriptor::new(
            Endpoint::AccountByRiotId {
                game_name: game_name.to_string(),
                tag_line: tag_line.to_string(),
            },
            platform,
        ))
    }

    pub fn get_account_by_puuid(&self, platform: Platform, puuid: &str) -> ApiResult<AccountDto> {
        tracing::trace!("[ACCOUNT-V1] get_account_by_puuid {} in {}", puuid, platform);
        self.decode(RequestDescriptor::new(
            Endpoint::AccountByPuuid {
                puuid: puuid.to_string(),
            },
            platform,
        ))
    }

    /// Player-facing name for an internal id: `gameName#tagLine` when known.
    ///
    /// Placeholder ids resolve to `None` without touching the network.
    pub fn resolve_riot_name(&self, platform: Platform, puuid: &str) -> ApiResult<Option<String>> {
        if puuid.len() < MIN_PUUID_LEN {
            return Ok(None);
        }
        Ok(self.get_account_by_puuid(platform, puuid)?.riot_id())
    }

    // TFT-SUMMONER-V1, platform host

    pub fn get_summoner_by_id(
        &self,
        platform: Platform,
        summoner_id: &str,
    ) -> ApiResult<SummonerDto> {
        tracing::trace!("[TFT-SUMMONER-V1] get_summoner_by_id {} in {}", summoner_id, platform);
        self.decode(RequestDescriptor::new(
            Endpoint::SummonerById {
                summoner_id: summoner_id.to_string(),
            },
            platform,
        ))
    }

    pub fn get_summoner_by_puuid(&self, platform: Platform, puuid: &str) -> ApiResult<SummonerDto> {
        tracing::trace!("[TFT-SUMMONER-V1] get_summoner_by_puuid {} in {}", puuid, platform);
        self.decode(RequestDescriptor::new(
            Endpoint::SummonerByPuuid {
                puuid: puuid.to_string(),
            },
            platform,
        ))
    }

    pub fn get_summoner_by_name(&self, platform: Platform, name: &str) -> ApiResult<SummonerDto> {
        tracing::trace!("[TFT-SUMMONER-V1] get_summoner_by_name {} in {}", name, platform);
        self.decode(RequestDescriptor::new(
            Endpoint::SummonerByName {
                name: name.to_string(),
            },
            platform,
        ))
    }

    // TFT-LEAGUE-V1, platform host

    pub fn get_apex_ladder(&self, platform: Platform, tier: ApexTier) -> ApiResult<Vec<Record>> {
        tracing::trace!("[TFT-LEAGUE-V1] get_apex_ladder {} in {}", tier.as_path(), platform);
        self.listing(RequestDescriptor::new(Endpoint::LeagueApex { tier }, platform))
    }

    pub fn get_ladder_page(
        &self,
        platform: Platform,
        tier: Tier,
        division: Division,
        page: u32,
    ) -> ApiResult<Vec<Record>> {
        tracing::trace!(
            "[TFT-LEAGUE-V1] get_ladder_page {} {} p{} in {}",
            tier,
            division,
            page,
            platform
        );
        self.listing(RequestDescriptor::new(
            Endpoint::LeagueEntries {
                tier,
                division,
                page: page.max(1),
            },
            platform,
        ))
    }

    pub fn get_rank_entries(
        &self,
        platform: Platform,
        summoner_id: &str,
    ) -> ApiResult<Vec<Record>> {
        tracing::trace!("[TFT-LEAGUE-V1] get_rank_entries {} in {}", summoner_id, platform);
        self.listing(RequestDescriptor::new(
            Endpoint::LeagueBySummoner {
                summoner_id: summoner_id.to_string(),
            },
            platform,
        ))
    }

    // TFT-MATCH-V1, continental host

    pub fn get_match_ids(
        &self,
        platform: Platform,
        puuid: &str,
        count: u32,
    ) -> ApiResult<Vec<String>> {
        tracing::trace!("[TFT-MATCH-V1] get_match_ids {} in {}", puuid, platform);
        let (url, body) = self.fetch(&RequestDescriptor::new(
            Endpoint::MatchIds {
                puuid: puuid.to_string(),
                count,
            },
            platform,
        ))?;
        normalize::string_list(body).map_err(|e| shape_error(&url, e))
    }

    pub fn get_match_detail(&self, platform: Platform, match_id: &str) -> ApiResult<Record> {
        tracing::trace!("[TFT-MATCH-V1] get_match_detail {} in {}", match_id, platform);
        let (url, body) = self.fetch(&RequestDescriptor::new(
            Endpoint::MatchDetail {
                match_id: match_id.to_string(),
            },
            platform,
        ))?;
        normalize::record(body).map_err(|e| shape_error(&url, e))
    }
}

fn parse_body(url: &str, body: &str) -> ApiResult<Value> {
    serde_json::from_str(body).map_err(|e| ApiError::UnexpectedResponseShape {
        url: url.to_string(),
        detail: format!("body is not JSON: {}", e),
    })
}

fn cancelled(url: &str, state: &RetryState) -> ApiError {
    ApiError::Cancelled {
        url: url.to_string(),
        attempts: state.attempts,
    }
}

fn fail_fast(status: u16, url: &str, state: &RetryState) -> ApiError {
    match status {
        401 | 403 => {
            tracing::error!(status, url, "credential rejected");
            ApiError::Authentication {
                status,
                url: url.to_string(),
            }
        }
        _ => ApiError::Request {
            status,
            url: url.to_string(),
            attempts: state.attempts,
        },
    }
}

fn shape_error(url: &str, e: impl std::fmt::Display) -> ApiError {
    ApiError::UnexpectedResponseShape {
        url: url.to_string(),
        detail: e.to_string(),
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::time::Duration;

    use crate::api::transport::{NetworkError, RawResponse, Sleeper, Transport};
    use crate::cancel::CancelToken;
    use crate::config::{ApiKey, Config};
    use crate::rate_limit::RateGate;

    use super::TftApiClient;

    /// Replays canned responses in order and records what was asked.
    #[derive(Default)]
    pub struct ScriptedTransport {
        script: RefCell<VecDeque<Result<RawResponse, NetworkError>>>,
        pub calls: RefCell<Vec<(String, Vec<(String, String)>)>>,
    }

    impl ScriptedTransport {
        pub fn new(script: Vec<Result<RawResponse, NetworkError>>) -> Self {
            ScriptedTransport {
                script: RefCell::new(script.into()),
                calls: RefCell::default(),
            }
        }

        pub fn urls(&self) -> Vec<String> {
            self.calls.borrow().iter().map(|(u, _)| u.clone()).collect()
        }
    }

    impl Transport for ScriptedTransport {
        fn get(&self, url: &str, headers: &[(&str, &str)]) -> Result<RawResponse, NetworkError> {
            self.calls.borrow_mut().push((
                url.to_string(),
                headers
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            ));
            self.script
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| Err(NetworkError("script exhausted".into())))
        }
    }

    /// Records requested sleeps instead of blocking.
    #[derive(Default)]
    pub struct RecordingSleeper {
        pub sleeps: RefCell<Vec<Duration>>,
        pub cancel_on_sleep: Option<CancelToken>,
    }

    impl Sleeper for RecordingSleeper {
        fn sleep(&self, duration: Duration) {
            self.sleeps.borrow_mut().push(duration);
            if let Some(token) = &self.cancel_on_sleep {
                token.cancel();
            }
        }
    }

    pub fn test_config() -> Config {
        Config::new(ApiKey::new("RGAPI-test-key").unwrap())
    }

    pub fn client(
        script: Vec<Result<RawResponse, NetworkError>>,
    ) -> TftApiClient<ScriptedTransport, RecordingSleeper> {
        client_with(test_config(), script)
    }

    pub fn client_with(
        config: Config,
        script: Vec<Result<RawResponse, NetworkError>>,
    ) -> TftApiClient<ScriptedTransport, RecordingSleeper> {
        TftApiClient::with_parts(
            config,
            ScriptedTransport::new(script),
            RecordingSleeper::default(),
            RateGate::default(),
        )
    }

    pub fn ok(body: serde_json::Value) -> Result<RawResponse, NetworkError> {
        Ok(RawResponse::new(200, body.to_string()))
    }

    pub fn status(code: u16) -> Result<RawResponse, NetworkError> {
        Ok(RawResponse::new(code, "{\"status\":{}}"))
    }
}
