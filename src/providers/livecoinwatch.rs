use async_trait::async_trait;
use chrono::Utc;
use log::info;
use rand::thread_rng;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use crate::models::models::{HistoricalSeries, PriceQuote, TimeWindow};
use crate::providers::provider::{PriceProvider, UpstreamError};
use crate::providers::synthesis;

pub const PROVIDER_NAME: &str = "LiveCoinWatch";

/// Secondary provider. Its free tier has no historical endpoint, so
/// [fetch_series](PriceProvider::fetch_series) reconstructs an approximate
/// series from the percentage deltas of the single-coin endpoint.
pub struct LiveCoinWatch {
    http: Client,
    base_url: String,
    api_key: String,
}

/// Multipliers relative to the current price over fixed look-back windows.
/// The payload also carries quarter/year figures; only these are used.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct DeltaPayload {
    pub day: f64,
    pub week: f64,
    pub month: f64,
}

#[derive(Debug, Deserialize)]
struct CoinSingleResponse {
    rate: Option<f64>,
    delta: Option<DeltaPayload>,
}

impl LiveCoinWatch {
    pub fn new(http: Client, base_url: String, api_key: String) -> Self {
        LiveCoinWatch {
            http,
            base_url,
            api_key,
        }
    }

    async fn fetch_coin_single(&self) -> Result<(f64, DeltaPayload), UpstreamError> {
        let url = format!("{}/coins/single", self.base_url);
        info!("Fetching BTC/EUR data from {}", url);

        let response = self
            .http
            .post(&url)
            .header("x-api-key", &self.api_key)
            .json(&json!({
                "currency": "EUR",
                "code": "BTC",
                "meta": true,
            }))
            .send()
            .await
            .map_err(|e| UpstreamError::network(PROVIDER_NAME, e))?;

        if !response.status().is_success() {
            return Err(UpstreamError::status(PROVIDER_NAME, response.status()));
        }

        let body: CoinSingleResponse = response
            .json()
            .await
            .map_err(|e| UpstreamError::network(PROVIDER_NAME, e))?;

        let rate = body
            .rate
            .ok_or_else(|| UpstreamError::shape(PROVIDER_NAME, "missing 'rate' field"))?;
        let delta = body
            .delta
            .ok_or_else(|| UpstreamError::shape(PROVIDER_NAME, "missing 'delta' object"))?;

        Ok((rate, delta))
    }
}

#[async_trait]
impl PriceProvider for LiveCoinWatch {
    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    async fn fetch_current_quote(&self) -> Result<PriceQuote, UpstreamError> {
        let (rate, delta) = self.fetch_coin_single().await?;

        Ok(PriceQuote {
            eur: rate,
            eur_24h_change: Some(delta.day),
            last_updated_at: Utc::now().timestamp(),
        })
    }

    async fn fetch_series(&self, window: TimeWindow) -> Result<HistoricalSeries, UpstreamError> {
        let (rate, delta) = self.fetch_coin_single().await?;

        let points = synthesis::build_points(
            rate,
            &delta,
            window,
            Utc::now().timestamp_millis(),
            &mut thread_rng(),
        );

        Ok(HistoricalSeries::from_points(points, window))
    }
}
