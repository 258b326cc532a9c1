use std::sync::Arc;
use tokio::sync::RwLock;

use crate::config::Config;
use crate::db::Store;
use crate::services::{AuthService, CatalogService, SeaOrmAuthService, SeaOrmCatalogService};

/// State shared by the HTTP server and the CLI commands.
#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<RwLock<Config>>,

    pub store: Store,

    pub catalog_service: Arc<dyn CatalogService>,

    pub auth_service: Arc<dyn AuthService>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        Ok(Self::with_store(config, store))
    }

    /// Wires the services around an already migrated store.
    #[must_use]
    pub fn with_store(config: Config, store: Store) -> Self {
        let config = Arc::new(RwLock::new(config));

        let catalog_service = Arc::new(SeaOrmCatalogService::new(store.clone(), config.clone()))
            as Arc<dyn CatalogService>;
        let auth_service =
            Arc::new(SeaOrmAuthService::new(store.clone(), config.clone())) as Arc<dyn AuthService>;

        Self {
            config,
            store,
            catalog_service,
            auth_service,
        }
    }
}
