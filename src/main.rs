mod api;
mod cache;
mod config;
mod exchanges;
mod models;
mod pricefeed;
mod providers;

use std::sync::Arc;
use std::time::Duration;

use actix_cors::Cors;
use actix_web::{http::header, middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use tracing::info;

use crate::config::{config_scope, model::TrackerConfig};
use crate::pricefeed::pricefeed::PriceService;

pub struct AppState {
    pub price_service: Arc<PriceService>,
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "btc_price_api=info,actix_web=info".into()),
        )
        .init();

    info!("🚀 Starting BTC Price API");

    let config = TrackerConfig::from_env()
        .or_else(|_| TrackerConfig::from_file("config.toml".into()))
        .expect("Failed to load configuration");

    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.http.timeout_secs))
        .build()
        .expect("Failed to build HTTP client");

    info!("💱 Initializing price service");
    let price_service = Arc::new(PriceService::new(&config, http));

    let app_state = web::Data::new(AppState { price_service });

    let host = config.server.host.clone();
    let port = config.server.port;
    let allowed_origin = config.server.allowed_origin.clone();

    info!("🌐 Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin(&allowed_origin)
            .allowed_methods(vec!["GET"])
            .allowed_headers(vec![header::CONTENT_TYPE, header::ACCEPT])
            .max_age(3600);

        App::new()
            .app_data(app_state.clone())
            .configure(config_scope::configure)
            .wrap(cors)
            .wrap(Logger::default())
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}
