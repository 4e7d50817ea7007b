//! Startup orchestration.
//!
//! # Responsibilities
//! - Build the collaborators from validated configuration
//! - Initialize subsystems in dependency order
//! - Register the gateway maintenance tasks with the scheduler
//! - Assemble the HTTP server over the finished services
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Subsystems initialize in order, not concurrently
//! - Must run inside the Tokio runtime (tasks are spawned on registration)

use std::sync::Arc;

use crate::config::ServiceConfig;
use crate::gateway::{Gateway, GatewaySettings, IdleReaper, RateWindowReset};
use crate::http::{AppState, Dispatcher, HttpServer};
use crate::resources;
use crate::routing::PatternError;
use crate::scheduler::{Scheduler, SchedulerError};
use crate::store::MemoryStore;

/// Error type for service construction.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("invalid gateway settings: {0}")]
    Gateway(#[from] SchedulerError),
    #[error("invalid route table: {0}")]
    Routes(#[from] PatternError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// The running services, wired together.
pub struct Services {
    pub store: Arc<MemoryStore>,
    pub gateway: Arc<Gateway>,
    pub scheduler: Scheduler,
    pub dispatcher: Arc<Dispatcher>,
}

impl Services {
    /// Construct every subsystem and start the scheduled tasks.
    pub fn build(config: &ServiceConfig) -> Result<Self, StartupError> {
        let store = Arc::new(MemoryStore::from_accounts(&config.accounts));

        let settings = GatewaySettings::from_config(&config.gateway)?;
        let gateway = Arc::new(Gateway::new(settings, store.clone(), store.clone()));

        let scheduler = Scheduler::new();
        scheduler.register(Arc::new(IdleReaper::new(gateway.clone())));
        scheduler.register(Arc::new(RateWindowReset::new(gateway.clone())));

        let routes = resources::route_table(store.clone(), gateway.clone())?;
        tracing::info!(routes = routes.len(), "Route table compiled");
        let dispatcher = Arc::new(Dispatcher::new(routes));

        Ok(Self {
            store,
            gateway,
            scheduler,
            dispatcher,
        })
    }

    /// HTTP server serving these services.
    pub fn http_server(&self, config: &ServiceConfig) -> HttpServer {
        let state = AppState {
            dispatcher: self.dispatcher.clone(),
            gateway: self.gateway.clone(),
            max_body_bytes: config.http.max_body_bytes,
        };
        HttpServer::new(state, config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn builds_from_default_config() {
        let services = Services::build(&ServiceConfig::default()).unwrap();
        assert_eq!(services.scheduler.registered(), 2);
        assert_eq!(services.dispatcher.routes().len(), 4);
        assert_eq!(services.gateway.connection_count(), 0);
    }

    #[tokio::test]
    async fn rejects_bad_intervals() {
        let mut config = ServiceConfig::default();
        config.gateway.rate_window = "1 fortnight".into();
        assert!(matches!(
            Services::build(&config),
            Err(StartupError::Gateway(_))
        ));
    }
}
