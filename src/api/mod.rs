pub mod client;
pub mod endpoints;
pub mod models;
pub mod normalize;
pub mod retry;
pub mod transport;

pub use client::TftApiClient;
pub use normalize::Record;
