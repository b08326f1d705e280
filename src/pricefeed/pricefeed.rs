use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use thiserror::Error;
use tracing::warn;

use crate::cache::cache::FreshnessCache;
use crate::cache::model::CachedValue;
use crate::config::model::{CacheConfig, TrackerConfig};
use crate::exchanges::exchanges::{ExchangeRateAggregator, ExchangeRateBoard};
use crate::models::models::{HistoricalSeries, PriceQuote, TimeWindow};
use crate::providers::coingecko::CoinGecko;
use crate::providers::livecoinwatch::LiveCoinWatch;
use crate::providers::provider::PriceProvider;

/// Terminal failure: every provider failed and there was no cached value of
/// any age to fall back on. Routes turn this into a 500.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("no {resource} available: {detail}")]
    Exhausted {
        resource: &'static str,
        detail: String,
    },
}

/// The query boundary the HTTP layer talks to. One cache per resource sits
/// in front of an ordered provider chain (primary first) and the exchange
/// aggregator; every lookup resolves to fresh data, a refreshed value, a
/// stale fallback, or [FeedError].
pub struct PriceService {
    providers: Vec<Arc<dyn PriceProvider>>,
    aggregator: ExchangeRateAggregator,
    price_cache: FreshnessCache<PriceQuote>,
    series_cache: FreshnessCache<HistoricalSeries>,
    rates_cache: FreshnessCache<ExchangeRateBoard>,
}

impl PriceService {
    pub fn new(config: &TrackerConfig, http: Client) -> Self {
        let providers: Vec<Arc<dyn PriceProvider>> = vec![
            Arc::new(CoinGecko::new(
                http.clone(),
                config.providers.coingecko_url.clone(),
            )),
            Arc::new(LiveCoinWatch::new(
                http.clone(),
                config.providers.livecoinwatch_url.clone(),
                config.providers.livecoinwatch_api_key.clone(),
            )),
        ];
        let aggregator = ExchangeRateAggregator::new(http);
        Self::with_parts(providers, aggregator, &config.cache)
    }

    pub fn with_parts(
        providers: Vec<Arc<dyn PriceProvider>>,
        aggregator: ExchangeRateAggregator,
        cache: &CacheConfig,
    ) -> Self {
        PriceService {
            providers,
            aggregator,
            price_cache: FreshnessCache::new(
                "price cache",
                Duration::from_secs(cache.price_ttl_secs),
            ),
            series_cache: FreshnessCache::new(
                "series cache",
                Duration::from_secs(cache.series_ttl_secs),
            ),
            rates_cache: FreshnessCache::new(
                "rates cache",
                Duration::from_secs(cache.rates_ttl_secs),
            ),
        }
    }

    pub async fn current_price(&self) -> Result<CachedValue<PriceQuote>, FeedError> {
        self.price_cache
            .get_with("btc-eur", || self.quote_from_any_provider())
            .await
            .map_err(|detail| FeedError::Exhausted {
                resource: "current price",
                detail,
            })
    }

    pub async fn historical_prices(
        &self,
        window: TimeWindow,
    ) -> Result<CachedValue<HistoricalSeries>, FeedError> {
        self.series_cache
            .get_with(window.as_str(), || self.series_from_any_provider(window))
            .await
            .map_err(|detail| FeedError::Exhausted {
                resource: "historical prices",
                detail,
            })
    }

    pub async fn exchange_rates(&self) -> Result<CachedValue<ExchangeRateBoard>, FeedError> {
        self.rates_cache
            .get_with("all", || async move {
                self.aggregator
                    .fetch_all_rates()
                    .await
                    .map_err(|e| e.to_string())
            })
            .await
            .map_err(|detail| FeedError::Exhausted {
                resource: "exchange rates",
                detail,
            })
    }

    /// Walks the provider chain in order and returns the first quote.
    async fn quote_from_any_provider(&self) -> Result<PriceQuote, String> {
        let mut failures = Vec::new();
        for provider in &self.providers {
            match provider.fetch_current_quote().await {
                Ok(quote) => return Ok(quote),
                Err(e) => {
                    warn!("{} spot quote failed: {}", provider.name(), e);
                    failures.push(e.to_string());
                }
            }
        }
        Err(failures.join("; "))
    }

    async fn series_from_any_provider(
        &self,
        window: TimeWindow,
    ) -> Result<HistoricalSeries, String> {
        let mut failures = Vec::new();
        for provider in &self.providers {
            match provider.fetch_series(window).await {
                Ok(mut series) => {
                    // Splice the live quote onto the newest point so the chart
                    // ends where the ticker currently stands. Best effort: a
                    // series without the splice is still a valid series.
                    if let Ok(current) = self.current_price().await {
                        series.attach_live_price(current.value.eur);
                    }
                    return Ok(series);
                }
                Err(e) => {
                    warn!("{} {} series failed: {}", provider.name(), window, e);
                    failures.push(e.to_string());
                }
            }
        }
        Err(failures.join("; "))
    }
}
