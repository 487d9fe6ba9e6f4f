use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Authentication rejected ({status}) for {url}, the API key must be rotated")]
    Authentication { status: u16, url: String },

    #[error("Upstream unavailable for {url} after {attempts} attempt(s): {reason}")]
    TransientFailure {
        url: String,
        attempts: u32,
        last_status: Option<u16>,
        reason: String,
    },

    #[error("Unexpected response shape from {url}: {detail}")]
    UnexpectedResponseShape { url: String, detail: String },

    #[error("Request failed with status {status} for {url}")]
    Request {
        status: u16,
        url: String,
        attempts: u32,
    },

    #[error("Request to {url} cancelled after {attempts} attempt(s)")]
    Cancelled { url: String, attempts: u32 },
}

impl ApiError {
    /// Whether the same call may succeed if retried later without operator action.
    pub fn is_retryable_later(&self) -> bool {
        matches!(self, ApiError::TransientFailure { .. })
    }

    /// HTTP status attached to this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Authentication { status, .. } | ApiError::Request { status, .. } => {
                Some(*status)
            }
            ApiError::TransientFailure { last_status, .. } => *last_status,
            _ => None,
        }
    }

    /// Short user-facing line naming the feature that could not be served.
    pub fn apology(&self, feature: &str) -> String {
        match self {
            ApiError::Authentication { .. } | ApiError::Configuration(_) => format!(
                "죄송합니다. {} 기능을 사용할 수 없습니다 (API 설정을 확인해 주세요).",
                feature
            ),
            ApiError::TransientFailure { .. } | ApiError::Cancelled { .. } => format!(
                "죄송합니다. {} 기능이 일시적으로 응답하지 않습니다. 잠시 후 다시 시도해 주세요.",
                feature
            ),
            ApiError::Request { status: 404, .. } => {
                format!("죄송합니다. {} 결과를 찾을 수 없습니다.", feature)
            }
            _ => format!("죄송합니다. {} 기능을 지금 사용할 수 없습니다.", feature),
        }
    }
}

/// Result alias used across the client.
pub type ApiResult<T> = Result<T, ApiError>;
