use std::{env, path::PathBuf};

use anyhow::Result;

use crate::config::model::{
    CacheConfig, HttpConfig, ProviderConfig, ServerConfig, TrackerConfig,
};

fn var_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

impl TrackerConfig {
    pub fn from_file(path: PathBuf) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        Ok(config)
    }

    pub fn from_env() -> Result<Self> {
        Ok(TrackerConfig {
            server: ServerConfig {
                host: var_or("HOST", "0.0.0.0"),
                port: var_or("PORT", "8080").parse()?,
                allowed_origin: var_or("ALLOWED_ORIGIN", "http://localhost:3000"),
            },
            providers: ProviderConfig {
                coingecko_url: var_or("COINGECKO_API_URL", "https://api.coingecko.com/api/v3"),
                livecoinwatch_url: var_or("LIVECOINWATCH_API_URL", "https://api.livecoinwatch.com"),
                livecoinwatch_api_key: var_or("LCW_API_KEY", ""),
            },
            cache: CacheConfig {
                price_ttl_secs: var_or("PRICE_CACHE_TTL_SECS", "30").parse()?,
                series_ttl_secs: var_or("SERIES_CACHE_TTL_SECS", "300").parse()?,
                rates_ttl_secs: var_or("RATES_CACHE_TTL_SECS", "60").parse()?,
            },
            http: HttpConfig {
                timeout_secs: var_or("UPSTREAM_TIMEOUT_SECS", "10").parse()?,
            },
        })
    }
}
