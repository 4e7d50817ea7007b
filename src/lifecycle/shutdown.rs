//! Shutdown coordination.
//!
//! One broadcast channel; the HTTP server (and anything else long-lived)
//! subscribes, `main` fires it once a stop signal arrives.

use tokio::sync::broadcast;

use super::signals::shutdown_signal;

pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// Receiver that yields once shutdown is triggered.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Notify every subscriber. Returns how many were listening.
    pub fn trigger(&self) -> usize {
        self.tx.send(()).unwrap_or(0)
    }

    /// Block until SIGINT/SIGTERM, then trigger.
    pub async fn trigger_on_signal(&self) {
        shutdown_signal().await;
        let notified = self.trigger();
        tracing::info!(subscribers = notified, "Shutdown triggered");
    }

    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn trigger_reaches_every_subscriber() {
        let shutdown = Shutdown::new();
        let mut a = shutdown.subscribe();
        let mut b = shutdown.subscribe();
        assert_eq!(shutdown.receiver_count(), 2);

        assert_eq!(shutdown.trigger(), 2);
        assert!(a.recv().await.is_ok());
        assert!(b.recv().await.is_ok());
    }

    #[test]
    fn trigger_without_subscribers_is_harmless() {
        assert_eq!(Shutdown::new().trigger(), 0);
    }
}
