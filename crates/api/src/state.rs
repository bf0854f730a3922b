use std::sync::Arc;

use lpa_domain::ports::address::AddressLookup;
use lpa_domain::ports::random::RandomSource;
use lpa_domain::ports::store::LpaStore;
use lpa_domain::store::InMemoryLpaStore;
use lpa_domain::wizard::LpaService;
use lpa_infra::config::AppConfig;
use lpa_infra::places::PlacesClient;
use lpa_infra::random::ThreadRandom;
use lpa_infra::store::RedisLpaStore;

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub service: LpaService,
}

impl AppState {
    pub async fn new(config: AppConfig) -> anyhow::Result<Self> {
        let store: Arc<dyn LpaStore> = if config.uses_redis() {
            let prefix = config.redis_key_prefix.clone();
            Arc::new(RedisLpaStore::connect_with_prefix(&config.redis_url, prefix).await?)
        } else {
            tracing::warn!(data_backend = %config.data_backend, "using in-memory lpa store");
            Arc::new(InMemoryLpaStore::new())
        };
        let lookup = Arc::new(PlacesClient::from_config(&config)?);
        Ok(Self::with_parts(config, store, Arc::new(ThreadRandom), lookup))
    }

    pub fn with_parts(
        config: AppConfig,
        store: Arc<dyn LpaStore>,
        random: Arc<dyn RandomSource>,
        address_lookup: Arc<dyn AddressLookup>,
    ) -> Self {
        Self {
            config,
            service: LpaService::new(store, random, address_lookup),
        }
    }
}
