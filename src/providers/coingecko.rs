use async_trait::async_trait;
use chrono::Utc;
use log::info;
use reqwest::Client;
use serde::Deserialize;

use crate::models::models::{HistoricalSeries, PricePoint, PriceQuote, TimeWindow};
use crate::providers::provider::{PriceProvider, UpstreamError};

pub const PROVIDER_NAME: &str = "CoinGecko";

/// Primary provider. Free endpoints, no credential.
pub struct CoinGecko {
    http: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct SimplePriceResponse {
    bitcoin: Option<SimplePrice>,
}

#[derive(Debug, Deserialize)]
struct SimplePrice {
    eur: f64,
    eur_24h_change: Option<f64>,
    last_updated_at: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct MarketChartResponse {
    /// `[timestamp_ms, price]` pairs, oldest first.
    prices: Vec<(f64, f64)>,
}

impl CoinGecko {
    pub fn new(http: Client, base_url: String) -> Self {
        CoinGecko { http, base_url }
    }
}

#[async_trait]
impl PriceProvider for CoinGecko {
    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    async fn fetch_current_quote(&self) -> Result<PriceQuote, UpstreamError> {
        let url = format!(
            "{}/simple/price?ids=bitcoin&vs_currencies=eur&include_24hr_change=true&include_last_updated_at=true",
            self.base_url
        );
        info!("Fetching BTC/EUR spot price from {}", url);

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| UpstreamError::network(PROVIDER_NAME, e))?;

        if !response.status().is_success() {
            return Err(UpstreamError::status(PROVIDER_NAME, response.status()));
        }

        let body: SimplePriceResponse = response
            .json()
            .await
            .map_err(|e| UpstreamError::network(PROVIDER_NAME, e))?;
        let bitcoin = body
            .bitcoin
            .ok_or_else(|| UpstreamError::shape(PROVIDER_NAME, "missing 'bitcoin' object"))?;

        Ok(PriceQuote {
            eur: bitcoin.eur,
            eur_24h_change: bitcoin.eur_24h_change,
            last_updated_at: bitcoin
                .last_updated_at
                .unwrap_or_else(|| Utc::now().timestamp()),
        })
    }

    async fn fetch_series(&self, window: TimeWindow) -> Result<HistoricalSeries, UpstreamError> {
        let url = format!(
            "{}/coins/bitcoin/market_chart?vs_currency=eur&days={}&interval=daily",
            self.base_url,
            window.days()
        );
        info!("Fetching {} BTC/EUR history from {}", window, url);

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| UpstreamError::network(PROVIDER_NAME, e))?;

        if !response.status().is_success() {
            return Err(UpstreamError::status(PROVIDER_NAME, response.status()));
        }

        let body: MarketChartResponse = response
            .json()
            .await
            .map_err(|e| UpstreamError::network(PROVIDER_NAME, e))?;
        if body.prices.is_empty() {
            return Err(UpstreamError::shape(PROVIDER_NAME, "empty 'prices' array"));
        }

        let points = body
            .prices
            .into_iter()
            .map(|(timestamp, price)| PricePoint {
                timestamp: timestamp as i64,
                price,
            })
            .collect();

        Ok(HistoricalSeries::from_points(points, window))
    }
}
