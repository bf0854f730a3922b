use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub app_env: String,
    pub port: u16,
    pub log_level: String,
    pub data_backend: String,
    pub redis_url: String,
    pub redis_key_prefix: String,
    pub session_secret: String,
    pub session_cookie: String,
    pub os_places_base_url: String,
    pub os_places_api_key: String,
    pub address_lookup_timeout_ms: u64,
    pub app_public_url: String,
    pub request_timeout_ms: u64,
    pub rate_limit_per_second: u64,
    pub rate_limit_burst: u32,
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();
        let cfg = config::Config::builder()
            .set_default("app_env", "development")?
            .set_default("port", 5050)?
            .set_default("log_level", "info")?
            .set_default("data_backend", "memory")?
            .set_default("redis_url", "redis://127.0.0.1:6379")?
            .set_default("redis_key_prefix", "lpa:donor")?
            .set_default("session_secret", "dev-secret")?
            .set_default("session_cookie", "lpa_session")?
            .set_default("os_places_base_url", "https://api.os.uk/search/places/v1")?
            .set_default("os_places_api_key", "")?
            .set_default("address_lookup_timeout_ms", 5000)?
            .set_default("app_public_url", "http://localhost:5050")?
            .set_default("request_timeout_ms", 15000)?
            .set_default("rate_limit_per_second", 20)?
            .set_default("rate_limit_burst", 40)?
            .add_source(config::Environment::default().separator("__"))
            .build()?;
        cfg.try_deserialize()
    }

    pub fn is_production(&self) -> bool {
        self.app_env.eq_ignore_ascii_case("production")
    }

    pub fn uses_redis(&self) -> bool {
        self.data_backend.eq_ignore_ascii_case("redis")
    }
}
