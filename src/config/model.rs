use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TrackerConfig {
    pub server: ServerConfig,
    pub providers: ProviderConfig,
    pub cache: CacheConfig,
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub allowed_origin: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProviderConfig {
    pub coingecko_url: String,
    pub livecoinwatch_url: String,
    /// Credential for the secondary provider. An empty key still sends the
    /// request; the upstream rejection then surfaces like any other failure.
    pub livecoinwatch_api_key: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    pub price_ttl_secs: u64,
    pub series_ttl_secs: u64,
    pub rates_ttl_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HttpConfig {
    /// Per-request timeout for every upstream call.
    pub timeout_secs: u64,
}
