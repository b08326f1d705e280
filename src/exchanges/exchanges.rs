use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use futures::future::join_all;
use log::warn;
use reqwest::Client;
use serde_json::Value;
use thiserror::Error;

use crate::models::models::ExchangeQuote;
use crate::providers::provider::UpstreamError;

/// The set of per-exchange BTC/EUR quotes that survived one refresh round.
pub type ExchangeRateBoard = Vec<ExchangeQuote>;

#[derive(Debug, Error)]
#[error("all {attempted} exchange sources failed")]
pub struct AllSourcesFailed {
    pub attempted: usize,
}

/// One exchange's public ticker endpoint. Fee text and referral URL are
/// curated per exchange; only the price is fetched.
#[async_trait]
pub trait ExchangeSource: Send + Sync {
    fn id(&self) -> &'static str;

    fn url(&self) -> String;

    fn fees(&self) -> &'static str;

    fn referral_url(&self) -> &'static str;

    /// Digs the last price out of this exchange's response shape.
    fn extract_price(&self, body: &Value) -> Result<f64, String>;

    async fn fetch_rate(&self, http: &Client) -> Result<ExchangeQuote, UpstreamError> {
        let response = http
            .get(self.url())
            .send()
            .await
            .map_err(|e| UpstreamError::network(self.id(), e))?;

        if !response.status().is_success() {
            return Err(UpstreamError::status(self.id(), response.status()));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| UpstreamError::network(self.id(), e))?;
        let price = self
            .extract_price(&body)
            .map_err(|what| UpstreamError::shape(self.id(), what))?;

        Ok(ExchangeQuote {
            exchange_name: self.id().to_string(),
            price,
            fees: self.fees().to_string(),
            last_updated: Utc::now().timestamp(),
            exchange_url: self.referral_url().to_string(),
        })
    }
}

fn price_from(value: &Value, context: &'static str) -> Result<f64, String> {
    value
        .as_str()
        .and_then(|s| s.parse().ok())
        .or_else(|| value.as_f64())
        .ok_or_else(|| format!("no price at {}", context))
}

pub struct Bybit;

#[async_trait]
impl ExchangeSource for Bybit {
    fn id(&self) -> &'static str {
        "Bybit"
    }

    fn url(&self) -> String {
        "https://api.bybit.com/v5/market/tickers?category=spot&symbol=BTCEUR".to_string()
    }

    fn fees(&self) -> &'static str {
        "0.1%"
    }

    fn referral_url(&self) -> &'static str {
        "https://partner.bybit.com/b/120149"
    }

    fn extract_price(&self, body: &Value) -> Result<f64, String> {
        price_from(&body["result"]["list"][0]["lastPrice"], "result.list[0].lastPrice")
    }
}

pub struct Kraken;

#[async_trait]
impl ExchangeSource for Kraken {
    fn id(&self) -> &'static str {
        "Kraken"
    }

    fn url(&self) -> String {
        "https://api.kraken.com/0/public/Ticker?pair=XXBTZEUR".to_string()
    }

    fn fees(&self) -> &'static str {
        "0.16%"
    }

    fn referral_url(&self) -> &'static str {
        "https://www.kraken.com"
    }

    fn extract_price(&self, body: &Value) -> Result<f64, String> {
        // the last-trade price sits in the 'c' array of the pair object
        price_from(&body["result"]["XXBTZEUR"]["c"][0], "result.XXBTZEUR.c[0]")
    }
}

pub struct Coinbase;

#[async_trait]
impl ExchangeSource for Coinbase {
    fn id(&self) -> &'static str {
        "Coinbase"
    }

    fn url(&self) -> String {
        "https://api.exchange.coinbase.com/products/BTC-EUR/ticker".to_string()
    }

    fn fees(&self) -> &'static str {
        "0.4-0.6%"
    }

    fn referral_url(&self) -> &'static str {
        "https://www.coinbase.com"
    }

    fn extract_price(&self, body: &Value) -> Result<f64, String> {
        price_from(&body["price"], "price")
    }
}

pub struct Binance;

#[async_trait]
impl ExchangeSource for Binance {
    fn id(&self) -> &'static str {
        "Binance"
    }

    fn url(&self) -> String {
        "https://api.binance.com/api/v3/ticker/price?symbol=BTCEUR".to_string()
    }

    fn fees(&self) -> &'static str {
        "0.1%"
    }

    fn referral_url(&self) -> &'static str {
        "https://www.binance.com"
    }

    fn extract_price(&self, body: &Value) -> Result<f64, String> {
        price_from(&body["price"], "price")
    }
}

pub struct Bitvavo;

#[async_trait]
impl ExchangeSource for Bitvavo {
    fn id(&self) -> &'static str {
        "Bitvavo"
    }

    fn url(&self) -> String {
        "https://api.bitvavo.com/v2/ticker/price?market=BTC-EUR".to_string()
    }

    fn fees(&self) -> &'static str {
        "0.15-0.25%"
    }

    fn referral_url(&self) -> &'static str {
        "https://www.bitvavo.com"
    }

    fn extract_price(&self, body: &Value) -> Result<f64, String> {
        price_from(&body["price"], "price")
    }
}

pub struct GateIo;

#[async_trait]
impl ExchangeSource for GateIo {
    fn id(&self) -> &'static str {
        "Gate.io"
    }

    fn url(&self) -> String {
        "https://api.gateio.ws/api/v4/spot/tickers?currency_pair=BTC_EUR".to_string()
    }

    fn fees(&self) -> &'static str {
        "0.2%"
    }

    fn referral_url(&self) -> &'static str {
        "https://www.gate.io"
    }

    fn extract_price(&self, body: &Value) -> Result<f64, String> {
        price_from(&body[0]["last"], "[0].last")
    }
}

pub fn default_sources() -> Vec<Arc<dyn ExchangeSource>> {
    vec![
        Arc::new(Bybit),
        Arc::new(Kraken),
        Arc::new(Coinbase),
        Arc::new(Binance),
        Arc::new(Bitvavo),
        Arc::new(GateIo),
    ]
}

/// Queries every configured exchange concurrently and keeps whatever
/// succeeded. Individual failures are logged and dropped; the board only
/// fails as a whole when no source answered.
pub struct ExchangeRateAggregator {
    http: Client,
    sources: Vec<Arc<dyn ExchangeSource>>,
}

impl ExchangeRateAggregator {
    pub fn new(http: Client) -> Self {
        Self::with_sources(http, default_sources())
    }

    pub fn with_sources(http: Client, sources: Vec<Arc<dyn ExchangeSource>>) -> Self {
        ExchangeRateAggregator { http, sources }
    }

    pub async fn fetch_all_rates(&self) -> Result<ExchangeRateBoard, AllSourcesFailed> {
        let attempts = join_all(self.sources.iter().map(|source| {
            let http = &self.http;
            async move { (source.id(), source.fetch_rate(http).await) }
        }))
        .await;

        let mut rates = Vec::new();
        for (id, attempt) in attempts {
            match attempt {
                Ok(quote) => rates.push(quote),
                Err(e) => warn!("Dropping {} from the rate board: {}", id, e),
            }
        }

        if rates.is_empty() {
            return Err(AllSourcesFailed {
                attempted: self.sources.len(),
            });
        }
        Ok(rates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct StubSource {
        id: &'static str,
        price: Option<f64>,
    }

    #[async_trait]
    impl ExchangeSource for StubSource {
        fn id(&self) -> &'static str {
            self.id
        }

        fn url(&self) -> String {
            unreachable!("stub never builds a URL")
        }

        fn fees(&self) -> &'static str {
            "0.1%"
        }

        fn referral_url(&self) -> &'static str {
            "https://example.com"
        }

        fn extract_price(&self, _body: &Value) -> Result<f64, String> {
            unreachable!("stub never parses a body")
        }

        async fn fetch_rate(&self, _http: &Client) -> Result<ExchangeQuote, UpstreamError> {
            match self.price {
                Some(price) => Ok(ExchangeQuote {
                    exchange_name: self.id.to_string(),
                    price,
                    fees: self.fees().to_string(),
                    last_updated: 0,
                    exchange_url: self.referral_url().to_string(),
                }),
                None => Err(UpstreamError::shape(self.id, "stubbed outage")),
            }
        }
    }

    fn stub(id: &'static str, price: Option<f64>) -> Arc<dyn ExchangeSource> {
        Arc::new(StubSource { id, price })
    }

    #[tokio::test]
    async fn test_partial_failure_keeps_surviving_rates() {
        let aggregator = ExchangeRateAggregator::with_sources(
            Client::new(),
            vec![
                stub("A", Some(50000.0)),
                stub("B", None),
                stub("C", Some(50100.0)),
                stub("D", Some(49900.0)),
                stub("E", None),
                stub("F", Some(50050.0)),
            ],
        );

        let rates = aggregator.fetch_all_rates().await.unwrap();

        assert_eq!(rates.len(), 4);
        let names: Vec<&str> = rates.iter().map(|r| r.exchange_name.as_str()).collect();
        assert_eq!(names, vec!["A", "C", "D", "F"]);
    }

    #[tokio::test]
    async fn test_total_failure_reports_all_sources_failed() {
        let sources: Vec<Arc<dyn ExchangeSource>> =
            (0..6).map(|_| stub("down", None)).collect();
        let aggregator = ExchangeRateAggregator::with_sources(Client::new(), sources);

        let err = aggregator.fetch_all_rates().await.unwrap_err();
        assert_eq!(err.attempted, 6);
    }

    #[test]
    fn test_bybit_extraction() {
        let body = json!({
            "retCode": 0,
            "result": {"category": "spot", "list": [{"symbol": "BTCEUR", "lastPrice": "50123.5"}]}
        });
        assert_eq!(Bybit.extract_price(&body).unwrap(), 50123.5);
        assert!(Bybit.extract_price(&json!({"result": {}})).is_err());
    }

    #[test]
    fn test_kraken_extraction() {
        let body = json!({
            "error": [],
            "result": {"XXBTZEUR": {"a": ["50200.0", "1"], "b": ["50100.0", "2"], "c": ["50150.1", "0.01"]}}
        });
        assert_eq!(Kraken.extract_price(&body).unwrap(), 50150.1);
    }

    #[test]
    fn test_single_price_field_extraction() {
        let body = json!({"price": "50111.9", "volume": "12.3"});
        assert_eq!(Coinbase.extract_price(&body).unwrap(), 50111.9);
        assert_eq!(Binance.extract_price(&body).unwrap(), 50111.9);
        assert_eq!(Bitvavo.extract_price(&body).unwrap(), 50111.9);
    }

    #[test]
    fn test_gateio_extraction() {
        let body = json!([{"currency_pair": "BTC_EUR", "last": "50099.0"}]);
        assert_eq!(GateIo.extract_price(&body).unwrap(), 50099.0);
        assert!(GateIo.extract_price(&json!([])).is_err());
    }

    #[test]
    fn test_numeric_price_also_accepted() {
        let body = json!({"price": 50111.9});
        assert_eq!(Binance.extract_price(&body).unwrap(), 50111.9);
    }
}
