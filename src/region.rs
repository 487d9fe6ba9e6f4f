use std::fmt;
use std::str::FromStr;

use crate::error::ApiError;

/// Platform routing values (summoner, league endpoints).
///
/// Only the platforms with a known continental route are accepted; any other
/// code is rejected with [`ApiError::Configuration`] instead of being routed to
/// a guessed continent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    KR,
    JP1,
    NA1,
    BR1,
    OC1,
    EUW1,
    EUN1,
    TR1,
    RU,
}

impl Platform {
    pub const ALL: [Platform; 9] = [
        Platform::KR,
        Platform::JP1,
        Platform::NA1,
        Platform::BR1,
        Platform::OC1,
        Platform::EUW1,
        Platform::EUN1,
        Platform::TR1,
        Platform::RU,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::KR => "kr",
            Self::JP1 => "jp1",
            Self::NA1 => "na1",
            Self::BR1 => "br1",
            Self::OC1 => "oc1",
            Self::EUW1 => "euw1",
            Self::EUN1 => "eun1",
            Self::TR1 => "tr1",
            Self::RU => "ru",
        }
    }

    pub fn route(self) -> Route {
        match self {
            Self::KR | Self::JP1 => Route::Asia,
            Self::NA1 | Self::BR1 => Route::Americas,
            Self::OC1 => Route::Sea,
            Self::EUW1 | Self::EUN1 | Self::TR1 | Self::RU => Route::Europe,
        }
    }

    /// `{code}.{domain}`, e.g. `kr.api.riotgames.com`.
    pub fn host(&self, domain: &str) -> String {
        format!("{}.{}", self.as_str(), domain)
    }
}

impl FromStr for Platform {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "KR" => Ok(Self::KR),
            "JP1" => Ok(Self::JP1),
            "NA1" => Ok(Self::NA1),
            "BR1" => Ok(Self::BR1),
            "OC1" => Ok(Self::OC1),
            "EUW1" => Ok(Self::EUW1),
            "EUN1" => Ok(Self::EUN1),
            "TR1" => Ok(Self::TR1),
            "RU" => Ok(Self::RU),
            _ => Err(ApiError::Configuration(format!(
                "unknown platform code '{}'",
                s
            ))),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str().to_uppercase())
    }
}

/// Continental routing values (account, match endpoints).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Asia,
    Americas,
    Europe,
    Sea,
}

impl Route {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asia => "asia",
            Self::Americas => "americas",
            Self::Europe => "europe",
            Self::Sea => "sea",
        }
    }

    pub fn host(&self, domain: &str) -> String {
        format!("{}.{}", self.as_str(), domain)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Hostnames serving one platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionHosts {
    pub platform: String,
    pub continental: String,
}

/// Resolve a platform code into its platform and continental hostnames.
pub fn resolve_region(code: &str, domain: &str) -> Result<RegionHosts, ApiError> {
    let platform: Platform = code.parse()?;
    Ok(RegionHosts {
        platform: platform.host(domain),
        continental: platform.route().host(domain),
    })
}
