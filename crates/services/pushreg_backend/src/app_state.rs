use pushreg_config::AppConfig;
use pushreg_db::DbClient;
use pushreg_registry::{RetentionSweeper, SqlRegistryService};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::info;

use crate::error::BackendError;

/// State shared by everything the server hosts.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub registry: Arc<SqlRegistryService>,
}

impl AppState {
    /// Connects to the configured database and prepares the schema.
    pub async fn new(config: Arc<AppConfig>) -> Result<Self, BackendError> {
        let db_client = DbClient::new(&config).await?;
        info!("Database connection established");

        let registry = SqlRegistryService::from_db_client(db_client, &config.retention).await?;

        Ok(Self {
            config,
            registry: Arc::new(registry),
        })
    }

    /// Starts the retention sweeper when `use_sweeper` is set.
    pub fn spawn_sweeper(&self) -> Option<JoinHandle<()>> {
        if !self.config.use_sweeper {
            info!("Retention sweeper disabled");
            return None;
        }
        let sweeper = RetentionSweeper::from_config(self.registry.clone(), &self.config.retention);
        Some(sweeper.spawn())
    }
}
