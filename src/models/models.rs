use serde::{Deserialize, Serialize};

/// One observation in a historical series. Timestamp is epoch milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub timestamp: i64,
    pub price: f64,
}

/// Current BTC spot price in EUR. Field names match the public JSON surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceQuote {
    pub eur: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eur_24h_change: Option<f64>,
    /// Epoch seconds at which the upstream observed this price.
    pub last_updated_at: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeWindow {
    #[serde(rename = "7d")]
    SevenDays,
    #[serde(rename = "60d")]
    SixtyDays,
}

/// Daily price series over one [TimeWindow], oldest point first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalSeries {
    pub data: Vec<PricePoint>,
    #[serde(rename = "timeFrame")]
    pub time_frame: TimeWindow,
    #[serde(rename = "changePercentage")]
    pub change_percentage: f64,
}

impl HistoricalSeries {
    /// Builds a series from raw points: sorts ascending, collapses duplicate
    /// timestamps and computes the change percentage.
    pub fn from_points(mut points: Vec<PricePoint>, time_frame: TimeWindow) -> Self {
        points.sort_by_key(|p| p.timestamp);
        points.dedup_by_key(|p| p.timestamp);
        let change_percentage = change_percentage(&points);
        HistoricalSeries {
            data: points,
            time_frame,
            change_percentage,
        }
    }

    /// Replaces the newest point's price with the live spot price so the
    /// chart ends where the ticker currently is, then recomputes the change.
    pub fn attach_live_price(&mut self, live_price: f64) {
        if let Some(last) = self.data.last_mut() {
            last.price = live_price;
        }
        self.change_percentage = change_percentage(&self.data);
    }
}

fn change_percentage(points: &[PricePoint]) -> f64 {
    let first = points.first().map(|p| p.price).unwrap_or(0.0);
    let last = points.last().map(|p| p.price).unwrap_or(0.0);
    if first > 0.0 {
        (last - first) / first * 100.0
    } else {
        0.0
    }
}

/// BTC/EUR rate at one exchange. Fee text and referral URL are curated
/// per exchange, not fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeQuote {
    #[serde(rename = "exchangeName")]
    pub exchange_name: String,
    pub price: f64,
    pub fees: String,
    /// Epoch seconds when we observed this rate.
    #[serde(rename = "lastUpdated")]
    pub last_updated: i64,
    #[serde(rename = "exchangeUrl")]
    pub exchange_url: String,
}

#[derive(Debug, Serialize)]
pub struct QuoteResponse {
    #[serde(flatten)]
    pub quote: PriceQuote,
    pub stale: bool,
}

#[derive(Debug, Serialize)]
pub struct SeriesResponse {
    #[serde(flatten)]
    pub series: HistoricalSeries,
    pub stale: bool,
}

#[derive(Debug, Serialize)]
pub struct RatesResponse {
    pub rates: Vec<ExchangeQuote>,
    pub stale: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(timestamp: i64, price: f64) -> PricePoint {
        PricePoint { timestamp, price }
    }

    #[test]
    fn test_from_points_sorts_and_dedupes() {
        let series = HistoricalSeries::from_points(
            vec![point(3000, 32.0), point(1000, 30.0), point(2000, 31.0), point(2000, 31.5)],
            TimeWindow::SevenDays,
        );

        let timestamps: Vec<i64> = series.data.iter().map(|p| p.timestamp).collect();
        assert_eq!(timestamps, vec![1000, 2000, 3000]);
        for pair in series.data.windows(2) {
            assert!(pair[0].timestamp < pair[1].timestamp);
        }
    }

    #[test]
    fn test_change_percentage() {
        let series = HistoricalSeries::from_points(
            vec![point(0, 40000.0), point(1, 50000.0)],
            TimeWindow::SixtyDays,
        );
        assert!((series.change_percentage - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_change_percentage_zero_when_first_price_not_positive() {
        let series = HistoricalSeries::from_points(
            vec![point(0, 0.0), point(1, 50000.0)],
            TimeWindow::SixtyDays,
        );
        assert_eq!(series.change_percentage, 0.0);

        let empty = HistoricalSeries::from_points(vec![], TimeWindow::SevenDays);
        assert_eq!(empty.change_percentage, 0.0);
    }

    #[test]
    fn test_attach_live_price_recomputes_change() {
        let mut series = HistoricalSeries::from_points(
            vec![point(0, 50000.0), point(1, 48000.0)],
            TimeWindow::SevenDays,
        );
        series.attach_live_price(55000.0);

        assert_eq!(series.data.last().unwrap().price, 55000.0);
        assert!((series.change_percentage - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_series_json_round_trip() {
        let series = HistoricalSeries::from_points(
            vec![point(1000, 47619.05), point(2000, 48211.2), point(3000, 50000.0)],
            TimeWindow::SevenDays,
        );

        let json = serde_json::to_string(&series).unwrap();
        assert!(json.contains("\"timeFrame\":\"7d\""));
        let back: HistoricalSeries = serde_json::from_str(&json).unwrap();

        assert_eq!(back, series);
    }

    #[test]
    fn test_quote_omits_missing_change() {
        let quote = PriceQuote {
            eur: 50000.0,
            eur_24h_change: None,
            last_updated_at: 1700000000,
        };
        let json = serde_json::to_string(&quote).unwrap();
        assert!(!json.contains("eur_24h_change"));
    }
}
