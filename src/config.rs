use std::env;
use std::fmt;
use std::fs;
use std::num::NonZeroU32;
use std::time::Duration;

use crate::api::endpoints::EndpointTemplates;
use crate::api::retry::RetryPolicy;
use crate::error::ApiError;
use crate::rate_limit::RateLimitConfig;
use crate::region::Platform;

pub const API_KEY_VAR: &str = "RIOT_API_KEY";
pub const DOMAIN_VAR: &str = "TFT_API_DOMAIN";
pub const DEFAULT_DOMAIN: &str = "api.riotgames.com";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_LOCALE: &str = "ko-KR,ko;q=0.9,en-US;q=0.8,en;q=0.7";

/// Riot API credential. Only a short prefix is ever printed.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Result<Self, ApiError> {
        let key = key.into().trim().to_string();
        if key.is_empty() {
            return Err(ApiError::Configuration("API key is empty".into()));
        }
        Ok(ApiKey(key))
    }

    /// The full secret, for the request header only.
    pub fn expose(&self) -> &str {
        &self.0
    }

    fn redacted(&self) -> String {
        let prefix: String = self.0.chars().take(8).collect();
        format!("{}…", prefix)
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ApiKey({})", self.redacted())
    }
}

impl fmt::Display for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.redacted())
    }
}

/// Read the credential from `var`, failing if it is unset or blank.
pub fn load_api_key(var: &str) -> Result<ApiKey, ApiError> {
    api_key_from(var, |name| env::var(name).ok())
}

fn api_key_from(var: &str, lookup: impl Fn(&str) -> Option<String>) -> Result<ApiKey, ApiError> {
    let raw = lookup(var)
        .ok_or_else(|| ApiError::Configuration(format!("{} must be set", var)))?;
    ApiKey::new(raw).map_err(|_| ApiError::Configuration(format!("{} is empty", var)))
}

/// Provider domain from `TFT_API_DOMAIN`, without requiring a credential.
pub fn load_domain() -> String {
    dotenvy::dotenv().ok();
    domain_from(|name| env::var(name).ok())
}

fn domain_from(lookup: impl Fn(&str) -> Option<String>) -> String {
    lookup(DOMAIN_VAR)
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty())
        .unwrap_or_else(|| DEFAULT_DOMAIN.to_string())
}

#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: ApiKey,
    pub region: Platform,
    pub domain: String,
    /// Send every request here instead of the routed host.
    pub base_url: Option<String>,
    pub timeout: Duration,
    pub user_agent: String,
    pub locale: String,
    pub retry: RetryPolicy,
    pub rate_limit: RateLimitConfig,
    pub endpoints: EndpointTemplates,
}

impl Config {
    pub fn new(api_key: ApiKey) -> Self {
        Config {
            api_key,
            region: Platform::KR,
            domain: DEFAULT_DOMAIN.to_string(),
            base_url: None,
            timeout: DEFAULT_TIMEOUT,
            user_agent: format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
            locale: DEFAULT_LOCALE.to_string(),
            retry: RetryPolicy::default(),
            rate_limit: RateLimitConfig::default(),
            endpoints: EndpointTemplates::default(),
        }
    }

    pub fn with_region(mut self, region: Platform) -> Self {
        self.region = region;
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_rate_limit(mut self, rate_limit: RateLimitConfig) -> Self {
        self.rate_limit = rate_limit;
        self
    }

    pub fn with_endpoints(mut self, endpoints: EndpointTemplates) -> Self {
        self.endpoints = endpoints;
        self
    }

    pub fn from_env() -> Result<Self, ApiError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build from any variable source; `from_env` passes the process env.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ApiError> {
        let api_key = api_key_from(API_KEY_VAR, &lookup)?;
        let mut config = Config::new(api_key);

        if let Some(code) = lookup("TFT_REGION") {
            config.region = code.parse()?;
        }
        config.domain = domain_from(&lookup);
        config.base_url = lookup("TFT_API_BASE_URL").filter(|b| !b.trim().is_empty());

        let secs = |name: &str, default: Duration| {
            lookup(name)
                .and_then(|v| v.trim().parse::<u64>().ok())
                .map(Duration::from_secs)
                .unwrap_or(default)
        };

        config.timeout = secs("TFT_TIMEOUT_SECS", config.timeout);
        config.retry.max_total_wait = secs("TFT_MAX_WAIT_SECS", config.retry.max_total_wait);
        config.retry.rate_limit_fallback =
            secs("TFT_RATE_LIMIT_FALLBACK_SECS", config.retry.rate_limit_fallback);
        config.retry.transient_delay =
            secs("TFT_TRANSIENT_DELAY_SECS", config.retry.transient_delay);
        config.retry.max_attempts = lookup("TFT_MAX_ATTEMPTS")
            .and_then(|v| v.trim().parse::<u32>().ok())
            .filter(|n| *n > 0)
            .unwrap_or(config.retry.max_attempts);

        config.rate_limit.burst = lookup("TFT_BURST")
            .and_then(|v| v.trim().parse().ok())
            .and_then(NonZeroU32::new)
            .unwrap_or(config.rate_limit.burst);
        config.rate_limit.interval = lookup("TFT_REQUEST_INTERVAL_MS")
            .and_then(|v| v.trim().parse::<u64>().ok())
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis)
            .unwrap_or(config.rate_limit.interval);

        if let Some(path) = lookup("TFT_ENDPOINTS_FILE") {
            config.endpoints = load_endpoints(&path)?;
        }

        Ok(config)
    }
}

fn load_endpoints(path: &str) -> Result<EndpointTemplates, ApiError> {
    let content = fs::read_to_string(path).map_err(|e| {
        ApiError::Configuration(format!("cannot read endpoints file {}: {}", path, e))
    })?;
    serde_json::from_str(&content).map_err(|e| {
        ApiError::Configuration(format!("invalid endpoints file {}: {}", path, e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn missing_key_fails_startup() {
        let err = Config::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, ApiError::Configuration(ref m) if m.contains(API_KEY_VAR)));
    }

    #[test]
    fn blank_key_is_rejected() {
        let err = Config::from_lookup(lookup(&[(API_KEY_VAR, "   ")])).unwrap_err();
        assert!(matches!(err, ApiError::Configuration(_)));
    }

    #[test]
    fn defaults_apply_with_only_a_key() {
        let config = Config::from_lookup(lookup(&[(API_KEY_VAR, "RGAPI-test")])).unwrap();

        assert_eq!(config.api_key.expose(), "RGAPI-test");
        assert_eq!(config.region, Platform::KR);
        assert_eq!(config.domain, DEFAULT_DOMAIN);
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.retry, RetryPolicy::default());
        assert!(config.base_url.is_none());
    }

    #[test]
    fn overrides_are_read_and_malformed_numbers_ignored() {
        let config = Config::from_lookup(lookup(&[
            (API_KEY_VAR, "RGAPI-test"),
            ("TFT_REGION", "euw1"),
            ("TFT_MAX_ATTEMPTS", "3"),
            ("TFT_MAX_WAIT_SECS", "not-a-number"),
            ("TFT_BURST", "0"),
            ("TFT_API_BASE_URL", "http://localhost:8080"),
        ]))
        .unwrap();

        assert_eq!(config.region, Platform::EUW1);
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.retry.max_total_wait, Duration::from_secs(60));
        assert_eq!(config.rate_limit.burst.get(), 20);
        assert_eq!(config.base_url.as_deref(), Some("http://localhost:8080"));
    }

    #[test]
    fn unknown_region_fails_startup() {
        let err = Config::from_lookup(lookup(&[(API_KEY_VAR, "k"), ("TFT_REGION", "MARS")]))
            .unwrap_err();
        assert!(matches!(err, ApiError::Configuration(_)));
    }

    #[test]
    fn key_is_redacted_in_debug_and_display() {
        let key = ApiKey::new("RGAPI-0123456789-secret").unwrap();
        let debug = format!("{:?}", key);
        let display = key.to_string();

        assert!(!debug.contains("secret"));
        assert!(!display.contains("secret"));
        assert!(display.starts_with("RGAPI-01"));
    }

    #[test]
    fn load_api_key_reports_the_variable_name() {
        let err = load_api_key("TFT_SCOUT_TEST_UNSET_KEY_VAR").unwrap_err();
        assert!(err.to_string().contains("TFT_SCOUT_TEST_UNSET_KEY_VAR"));
    }

    #[test]
    fn domain_needs_no_credential() {
        assert_eq!(domain_from(lookup(&[])), DEFAULT_DOMAIN);
        assert_eq!(domain_from(lookup(&[(DOMAIN_VAR, "  ")])), DEFAULT_DOMAIN);
        assert_eq!(
            domain_from(lookup(&[(DOMAIN_VAR, " api.example.test ")])),
            "api.example.test"
        );
    }
}
