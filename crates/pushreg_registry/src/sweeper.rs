//! Retention sweeper
//!
//! Periodically hard-deletes registrations that have stayed inactive for longer
//! than the retention window. Runs out of band: failures are logged and the loop
//! carries on with the next tick.

use pushreg_config::RetentionConfig;
use pushreg_db::DeviceRegistrationRepository;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::service::TokenRegistryService;

pub struct RetentionSweeper<R> {
    service: Arc<TokenRegistryService<R>>,
    interval: Duration,
}

impl<R> RetentionSweeper<R>
where
    R: DeviceRegistrationRepository + Send + Sync + 'static,
{
    pub fn new(service: Arc<TokenRegistryService<R>>, interval: Duration) -> Self {
        Self { service, interval }
    }

    pub fn from_config(service: Arc<TokenRegistryService<R>>, retention: &RetentionConfig) -> Self {
        // A zero period would make tokio's interval panic.
        let secs = retention.sweep_interval_secs.max(1);
        Self::new(service, Duration::from_secs(secs))
    }

    /// Runs one sweep and returns the number of rows removed, or 0 on failure.
    pub async fn run_once(&self) -> u64 {
        match self.service.cleanup().await {
            Ok(removed) => {
                if removed > 0 {
                    info!(removed, "Cleaned up inactive device registrations");
                }
                removed
            }
            Err(e) => {
                warn!(error = %e, "Device registration cleanup failed");
                0
            }
        }
    }

    /// Spawns the sweep loop. The first sweep happens one interval after start.
    pub fn spawn(self) -> JoinHandle<()> {
        info!(
            interval_secs = self.interval.as_secs(),
            "Starting retention sweeper"
        );
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(self.interval);
            interval.tick().await; // first tick completes immediately
            loop {
                interval.tick().await;
                self.run_once().await;
            }
        })
    }
}
