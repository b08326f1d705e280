use actix_web::{get, web, HttpResponse, Responder};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};

use crate::api::helpers::json_with_cache_headers;
use crate::models::models::{QuoteResponse, RatesResponse, SeriesResponse, TimeWindow};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct HistoryParams {
    window: Option<String>,
    /// Older clients still send `timeframe`.
    timeframe: Option<String>,
}

impl HistoryParams {
    fn window(&self) -> TimeWindow {
        let raw = self.window.as_deref().or(self.timeframe.as_deref());
        TimeWindow::parse_or_default(raw.unwrap_or(""))
    }
}

#[get("/bitcoin-price")]
pub async fn bitcoin_price(data: web::Data<AppState>) -> impl Responder {
    info!("📊 Spot price requested");

    match data.price_service.current_price().await {
        Ok(lookup) => {
            let body = QuoteResponse {
                quote: lookup.value.clone(),
                stale: lookup.stale,
            };
            json_with_cache_headers(&lookup, &body)
        }
        Err(e) => {
            error!("Failed to serve spot price: {}", e);
            HttpResponse::InternalServerError().json(json!({
                "error": "Failed to fetch Bitcoin price"
            }))
        }
    }
}

#[get("/historical-prices")]
pub async fn historical_prices(
    query: web::Query<HistoryParams>,
    data: web::Data<AppState>,
) -> impl Responder {
    let window = query.window();
    info!("📈 Historical prices requested for {}", window);

    match data.price_service.historical_prices(window).await {
        Ok(lookup) => {
            let body = SeriesResponse {
                series: lookup.value.clone(),
                stale: lookup.stale,
            };
            json_with_cache_headers(&lookup, &body)
        }
        Err(e) => {
            error!("Failed to serve {} history: {}", window, e);
            HttpResponse::InternalServerError().json(json!({
                "error": format!("Failed to fetch historical price data for {}", window)
            }))
        }
    }
}

#[get("/exchange-rates")]
pub async fn exchange_rates(data: web::Data<AppState>) -> impl Responder {
    info!("💱 Exchange rate board requested");

    match data.price_service.exchange_rates().await {
        Ok(lookup) => {
            let body = RatesResponse {
                rates: lookup.value.clone(),
                stale: lookup.stale,
            };
            json_with_cache_headers(&lookup, &body)
        }
        Err(e) => {
            error!("Failed to serve exchange rates: {}", e);
            HttpResponse::InternalServerError().json(json!({
                "error": "Failed to fetch exchange rates"
            }))
        }
    }
}

#[get("/")]
pub async fn root() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "service": "BTC Price API",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "operational"
    }))
}

#[get("/health")]
pub async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "status": "healthy",
        "timestamp": Utc::now().to_rfc3339()
    }))
}
