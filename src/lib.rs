//! Blocking client for the Riot TFT REST API.
//!
//! The core is [`api::TftApiClient`]: bounded retry with backoff on rate
//! limits and transient upstream failures, platform/continental routing and
//! normalisation of listing responses. The remaining modules are the caller
//! side used by the `tft_scout` binary.

pub mod api;
pub mod cancel;
pub mod config;
pub mod display;
pub mod dump;
pub mod error;
pub mod ladder;
pub mod logging;
pub mod rate_limit;
pub mod region;
pub mod summary;

pub use error::{ApiError, ApiResult};
