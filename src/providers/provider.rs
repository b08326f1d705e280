use async_trait::async_trait;
use thiserror::Error;

use crate::models::models::{HistoricalSeries, PriceQuote, TimeWindow};

/// Failure talking to one upstream price API. Callers decide whether to
/// fall back to another provider; nothing here retries.
#[derive(Debug, Error)]
#[error("{provider}: {reason}")]
pub struct UpstreamError {
    pub provider: &'static str,
    pub reason: UpstreamReason,
}

#[derive(Debug, Error)]
pub enum UpstreamReason {
    #[error("request failed: {0}")]
    Network(String),
    #[error("unexpected HTTP status {0}")]
    Status(u16),
    #[error("malformed response: {0}")]
    Shape(String),
}

impl UpstreamError {
    pub fn network(provider: &'static str, err: reqwest::Error) -> Self {
        UpstreamError {
            provider,
            reason: UpstreamReason::Network(err.to_string()),
        }
    }

    pub fn status(provider: &'static str, status: reqwest::StatusCode) -> Self {
        UpstreamError {
            provider,
            reason: UpstreamReason::Status(status.as_u16()),
        }
    }

    pub fn shape(provider: &'static str, what: impl Into<String>) -> Self {
        UpstreamError {
            provider,
            reason: UpstreamReason::Shape(what.into()),
        }
    }
}

/// One upstream source of BTC/EUR price data.
#[async_trait]
pub trait PriceProvider: Send + Sync {
    fn name(&self) -> &'static str;

    async fn fetch_current_quote(&self) -> Result<PriceQuote, UpstreamError>;

    async fn fetch_series(&self, window: TimeWindow) -> Result<HistoricalSeries, UpstreamError>;
}
