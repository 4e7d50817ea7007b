//! Scheduled gateway maintenance.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use super::handler::Gateway;
use crate::scheduler::{Task, TaskError};

/// Closes connections that stopped heartbeating.
pub struct IdleReaper {
    gateway: Arc<Gateway>,
}

impl IdleReaper {
    pub fn new(gateway: Arc<Gateway>) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl Task for IdleReaper {
    fn name(&self) -> &str {
        "kill-dead-websockets"
    }

    fn interval(&self) -> Duration {
        self.gateway.settings().reaper_interval
    }

    async fn run(&self) -> Result<(), TaskError> {
        self.gateway.reap_idle();
        Ok(())
    }
}

/// Starts a fresh message-rate window for every identity.
pub struct RateWindowReset {
    gateway: Arc<Gateway>,
}

impl RateWindowReset {
    pub fn new(gateway: Arc<Gateway>) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl Task for RateWindowReset {
    fn name(&self) -> &str {
        "reset-websocket-message-counts"
    }

    fn interval(&self) -> Duration {
        self.gateway.settings().rate_window
    }

    async fn run(&self) -> Result<(), TaskError> {
        self.gateway.reset_rate_window();
        Ok(())
    }
}
