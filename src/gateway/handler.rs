//! Gateway connection registry and frame handling.
//!
//! # Responsibilities
//! - Register accepted connections and drop them on close
//! - Run the IDENTIFY → HEARTBEAT protocol for each inbound frame
//! - Count messages per identity and enforce the per-window limit
//! - Close idle connections and reset rate windows when the scheduler asks
//!
//! # Design Decisions
//! - Collaborators are injected at construction, never looked up globally
//! - Connection set and counters live in DashMaps; sweeps snapshot matching
//!   connections before closing them so no shard lock is held across a close
//! - Collaborator failures close only the triggering connection

use dashmap::DashMap;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;

use super::connection::{Connection, ConnectionId, ProtocolState};
use super::protocol::{CloseReason, InboundFrame, Operation, OutboundMessage};
use crate::config::GatewayConfig;
use crate::observability::metrics;
use crate::scheduler::{parse_interval, SchedulerError};
use crate::store::violations::now_millis;
use crate::store::{IdentityStore, RateViolation, ViolationKind, ViolationLog};

/// Resolved gateway timings and limits.
#[derive(Debug, Clone)]
pub struct GatewaySettings {
    pub heartbeat_interval: Duration,
    pub heartbeat_grace: Duration,
    pub reaper_interval: Duration,
    pub rate_window: Duration,
    pub max_messages_per_window: u32,
    pub send_timeout: Duration,
    pub outbound_buffer: usize,
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            heartbeat_interval: Duration::from_secs(30),
            heartbeat_grace: Duration::from_secs(35),
            reaper_interval: Duration::from_secs(30),
            rate_window: Duration::from_secs(60),
            max_messages_per_window: 120,
            send_timeout: Duration::from_secs(5),
            outbound_buffer: 32,
        }
    }
}

impl GatewaySettings {
    pub fn from_config(config: &GatewayConfig) -> Result<Self, SchedulerError> {
        Ok(Self {
            heartbeat_interval: Duration::from_millis(config.heartbeat_interval_ms),
            heartbeat_grace: Duration::from_secs(config.heartbeat_grace_secs),
            reaper_interval: parse_interval(&config.reaper_interval)?,
            rate_window: parse_interval(&config.rate_window)?,
            max_messages_per_window: config.max_messages_per_window,
            send_timeout: Duration::from_millis(config.send_timeout_ms),
            outbound_buffer: config.outbound_buffer.max(1),
        })
    }
}

/// The realtime gateway shared by every socket task.
pub struct Gateway {
    settings: GatewaySettings,
    identities: Arc<dyn IdentityStore>,
    violations: Arc<dyn ViolationLog>,
    connections: DashMap<ConnectionId, Arc<Connection>>,
    message_counts: DashMap<String, u32>,
}

impl Gateway {
    pub fn new(
        settings: GatewaySettings,
        identities: Arc<dyn IdentityStore>,
        violations: Arc<dyn ViolationLog>,
    ) -> Self {
        Self {
            settings,
            identities,
            violations,
            connections: DashMap::new(),
            message_counts: DashMap::new(),
        }
    }

    pub fn settings(&self) -> &GatewaySettings {
        &self.settings
    }

    /// Register a new connection. The receiver yields its serialized outbound frames.
    pub fn accept(&self) -> (Arc<Connection>, mpsc::Receiver<String>) {
        let (tx, rx) = mpsc::channel(self.settings.outbound_buffer);
        let conn = Arc::new(Connection::new(tx));
        self.connections.insert(conn.id(), conn.clone());
        metrics::set_active_connections(self.connections.len());
        (conn, rx)
    }

    /// Handle one inbound text frame. No-op on a closed connection.
    pub async fn handle_frame(&self, conn: &Arc<Connection>, text: &str) {
        if conn.is_closed() {
            return;
        }

        let frame = match InboundFrame::parse(text) {
            Ok(frame) => frame,
            Err(e) => {
                tracing::debug!(connection_id = %conn.id(), error = %e, "Malformed gateway frame");
                self.close(conn, CloseReason::ProtocolError);
                return;
            }
        };

        let op = frame.op();
        if op == Operation::Identify {
            self.identify(conn, frame.data).await;
            return;
        }

        let Some(identity_id) = conn.identity_id() else {
            self.close(conn, CloseReason::NotIdentified);
            return;
        };

        if self.exceeds_rate(&identity_id) {
            self.close(conn, CloseReason::RateLimited);
            self.record_violation(&identity_id).await;
            return;
        }

        match op {
            Operation::Heartbeat => {
                conn.touch_heartbeat(Instant::now());
                self.send(conn, &OutboundMessage::heartbeat_ack()).await;
            }
            _ => {
                tracing::debug!(
                    connection_id = %conn.id(),
                    operation = %frame.operation,
                    "Unknown gateway operation"
                );
                self.close(conn, CloseReason::UnknownOperation);
            }
        }
    }

    async fn identify(&self, conn: &Arc<Connection>, data: Option<Value>) {
        if conn.state() == ProtocolState::Identified {
            self.close(conn, CloseReason::AlreadyIdentified);
            return;
        }

        let token = match data {
            Some(Value::String(token)) if !token.is_empty() => token,
            _ => {
                self.close(conn, CloseReason::InvalidCredential);
                return;
            }
        };

        // Published first so a revoke landing during the lookup closes us.
        if !conn.claim_token(&token) {
            return;
        }

        let identity = match self.identities.lookup_identity_by_token(&token).await {
            Ok(Some(identity)) => identity,
            Ok(None) => {
                self.close(conn, CloseReason::InvalidCredential);
                return;
            }
            Err(e) => {
                tracing::warn!(connection_id = %conn.id(), error = %e, "Identity lookup failed");
                self.close(conn, CloseReason::ServiceUnavailable);
                return;
            }
        };

        // A revoke or the reaper may have closed us during the lookup.
        if !conn.bind_identity(identity.clone(), token) {
            return;
        }

        tracing::info!(connection_id = %conn.id(), identity_id = %identity.id, "Connection identified");
        let hello = OutboundMessage::hello(&identity, self.settings.heartbeat_interval.as_millis() as u64);
        self.send(conn, &hello).await;
    }

    /// Count a message for `identity_id`; true once the window's limit is passed.
    fn exceeds_rate(&self, identity_id: &str) -> bool {
        let mut count = self.message_counts.entry(identity_id.to_string()).or_insert(0);
        *count += 1;
        *count > self.settings.max_messages_per_window
    }

    async fn record_violation(&self, identity_id: &str) {
        tracing::warn!(identity_id, "Gateway message rate exceeded");
        metrics::record_rate_violation();

        let violation = RateViolation::new(ViolationKind::TooManyMessages, now_millis());
        if let Err(e) = self.violations.append_violation(identity_id, violation).await {
            tracing::warn!(identity_id, error = %e, "Failed to record rate violation");
        }
    }

    /// Serialize and queue a message, closing the connection if it cannot be delivered.
    pub async fn send(&self, conn: &Arc<Connection>, message: &OutboundMessage) {
        let payload = match message.encode() {
            Ok(payload) => payload,
            Err(e) => {
                tracing::error!(connection_id = %conn.id(), error = %e, "Failed to encode gateway message");
                self.close(conn, CloseReason::SendFailure);
                return;
            }
        };

        if let Err(e) = conn.enqueue(payload, self.settings.send_timeout).await {
            tracing::debug!(connection_id = %conn.id(), error = %e, "Gateway send failed");
            self.close(conn, CloseReason::SendFailure);
        }
    }

    /// Close a connection and drop it from the live set. Idempotent.
    pub fn close(&self, conn: &Connection, reason: CloseReason) {
        let closed_now = conn.close(reason);
        self.connections.remove(&conn.id());

        if closed_now {
            tracing::info!(
                connection_id = %conn.id(),
                reason = reason.as_str(),
                code = reason.code(),
                "Connection closed"
            );
            metrics::record_connection_closed(reason.as_str());
            metrics::set_active_connections(self.connections.len());
        }
    }

    /// Close every connection whose last heartbeat is older than the grace period.
    pub fn reap_idle(&self) -> usize {
        self.reap_idle_at(Instant::now())
    }

    pub fn reap_idle_at(&self, now: Instant) -> usize {
        let grace = self.settings.heartbeat_grace;
        let stale: Vec<Arc<Connection>> = self
            .connections
            .iter()
            .filter(|entry| now.saturating_duration_since(entry.last_heartbeat()) > grace)
            .map(|entry| entry.value().clone())
            .collect();

        for conn in &stale {
            self.close(conn, CloseReason::HeartbeatTimeout);
        }
        if !stale.is_empty() {
            tracing::debug!(reaped = stale.len(), "Idle connections reaped");
        }
        stale.len()
    }

    /// Start a new rate window for every identity.
    pub fn reset_rate_window(&self) {
        self.message_counts.clear();
    }

    /// Messages counted for `identity_id` in the current window.
    pub fn message_count(&self, identity_id: &str) -> u32 {
        self.message_counts.get(identity_id).map(|c| *c).unwrap_or(0)
    }

    /// Send `message` to every identified connection of the given identities.
    pub async fn broadcast(&self, identity_ids: &[String], message: &OutboundMessage) -> usize {
        let wanted: HashSet<&str> = identity_ids.iter().map(String::as_str).collect();
        let targets: Vec<Arc<Connection>> = self
            .connections
            .iter()
            .filter(|entry| {
                entry
                    .identity_id()
                    .is_some_and(|id| wanted.contains(id.as_str()))
            })
            .map(|entry| entry.value().clone())
            .collect();

        for conn in &targets {
            self.send(conn, message).await;
        }
        targets.len()
    }

    /// Close every connection that identified, or is identifying, with `token`.
    pub fn close_token_sessions(&self, token: &str) -> usize {
        let targets: Vec<Arc<Connection>> = self
            .connections
            .iter()
            .filter(|entry| entry.token().as_deref() == Some(token))
            .map(|entry| entry.value().clone())
            .collect();

        for conn in &targets {
            self.close(conn, CloseReason::TokenRevoked);
        }
        targets.len()
    }

    /// Close every connection bound to `identity_id`.
    pub fn close_identity_sessions(&self, identity_id: &str) -> usize {
        let targets: Vec<Arc<Connection>> = self
            .connections
            .iter()
            .filter(|entry| entry.identity_id().as_deref() == Some(identity_id))
            .map(|entry| entry.value().clone())
            .collect();

        for conn in &targets {
            self.close(conn, CloseReason::TokenRevoked);
        }
        targets.len()
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AccountConfig;
    use crate::store::{AccessToken, Identity, IdentityPatch, MemoryStore, NewAccount, StoreError};
    use async_trait::async_trait;
    use tokio::sync::Notify;

    fn store() -> Arc<MemoryStore> {
        Arc::new(MemoryStore::from_accounts(&[
            AccountConfig {
                id: "1".into(),
                username: "alice".into(),
                email: None,
                password: String::new(),
                tokens: vec!["tok-alice".into(), "tok-alice-2".into()],
                verification_tokens: Vec::new(),
                verified: true,
                bot: false,
            },
            AccountConfig {
                id: "2".into(),
                username: "bob".into(),
                email: None,
                password: String::new(),
                tokens: vec!["tok-bob".into()],
                verification_tokens: Vec::new(),
                verified: true,
                bot: false,
            },
        ]))
    }

    fn gateway(store: Arc<MemoryStore>) -> Gateway {
        Gateway::new(GatewaySettings::default(), store.clone(), store)
    }

    async fn identified(gw: &Gateway, token: &str) -> (Arc<Connection>, mpsc::Receiver<String>) {
        let (conn, mut rx) = gw.accept();
        gw.handle_frame(&conn, &format!(r#"{{"operation":"IDENTIFY","data":"{token}"}}"#)).await;
        let hello: Value = serde_json::from_str(&rx.recv().await.unwrap()).unwrap();
        assert_eq!(hello["operation"], "HELLO");
        (conn, rx)
    }

    const HEARTBEAT: &str = r#"{"operation":"HEARTBEAT"}"#;

    #[tokio::test]
    async fn identify_sends_hello_with_identity_and_interval() {
        let gw = gateway(store());
        let (conn, mut rx) = gw.accept();

        gw.handle_frame(&conn, r#"{"operation":"IDENTIFY","data":"tok-alice"}"#).await;

        let hello: Value = serde_json::from_str(&rx.recv().await.unwrap()).unwrap();
        assert_eq!(hello["operation"], "HELLO");
        assert_eq!(hello["data"]["identity"]["id"], "1");
        assert_eq!(hello["data"]["heartbeatInterval"], 30_000);
        assert_eq!(conn.state(), ProtocolState::Identified);
    }

    #[tokio::test]
    async fn heartbeat_is_acknowledged() {
        let gw = gateway(store());
        let (conn, mut rx) = identified(&gw, "tok-alice").await;
        let before = conn.last_heartbeat();

        gw.handle_frame(&conn, HEARTBEAT).await;

        assert_eq!(rx.recv().await.unwrap(), r#"{"operation":"HEARTBEAT_ACK"}"#);
        assert!(conn.last_heartbeat() >= before);
        assert_eq!(gw.message_count("1"), 1);
    }

    #[tokio::test]
    async fn malformed_frame_is_protocol_error() {
        let gw = gateway(store());
        let (conn, _rx) = gw.accept();

        gw.handle_frame(&conn, "{nope").await;

        assert_eq!(conn.close_reason(), Some(CloseReason::ProtocolError));
        assert_eq!(gw.connection_count(), 0);
    }

    #[tokio::test]
    async fn operations_before_identify_close_without_side_effects() {
        let gw = gateway(store());
        let (conn, mut rx) = gw.accept();

        gw.handle_frame(&conn, HEARTBEAT).await;

        assert_eq!(conn.close_reason(), Some(CloseReason::NotIdentified));
        assert!(rx.try_recv().is_err());
        assert!(gw.message_counts.is_empty());
    }

    #[tokio::test]
    async fn second_identify_is_rejected() {
        let gw = gateway(store());
        let (conn, _rx) = identified(&gw, "tok-alice").await;

        gw.handle_frame(&conn, r#"{"operation":"IDENTIFY","data":"tok-bob"}"#).await;

        assert_eq!(conn.close_reason(), Some(CloseReason::AlreadyIdentified));
        assert_eq!(conn.identity_id().as_deref(), Some("1"));
    }

    #[tokio::test]
    async fn unknown_token_is_invalid_credential() {
        let gw = gateway(store());
        let (conn, _rx) = gw.accept();

        gw.handle_frame(&conn, r#"{"operation":"IDENTIFY","data":"forged"}"#).await;
        assert_eq!(conn.close_reason(), Some(CloseReason::InvalidCredential));

        let (conn, _rx) = gw.accept();
        gw.handle_frame(&conn, r#"{"operation":"IDENTIFY"}"#).await;
        assert_eq!(conn.close_reason(), Some(CloseReason::InvalidCredential));
    }

    #[tokio::test]
    async fn unknown_operation_after_identify() {
        let gw = gateway(store());
        let (conn, _rx) = identified(&gw, "tok-alice").await;

        gw.handle_frame(&conn, r#"{"operation":"DANCE"}"#).await;

        assert_eq!(conn.close_reason(), Some(CloseReason::UnknownOperation));
    }

    #[tokio::test]
    async fn frames_after_close_are_ignored() {
        let gw = gateway(store());
        let (conn, mut rx) = identified(&gw, "tok-alice").await;
        gw.close(&conn, CloseReason::PeerClosed);

        gw.handle_frame(&conn, HEARTBEAT).await;

        assert!(rx.try_recv().is_err());
        assert_eq!(gw.message_count("1"), 0);
        assert_eq!(conn.close_reason(), Some(CloseReason::PeerClosed));
    }

    #[tokio::test]
    async fn rate_limit_trips_on_message_121_and_resets() {
        let store = store();
        let gw = gateway(store.clone());
        let (conn, mut rx) = identified(&gw, "tok-alice").await;

        for _ in 0..120 {
            gw.handle_frame(&conn, HEARTBEAT).await;
            assert!(rx.recv().await.is_some());
        }
        assert!(!conn.is_closed());

        gw.handle_frame(&conn, HEARTBEAT).await;

        assert_eq!(conn.close_reason(), Some(CloseReason::RateLimited));
        assert!(rx.try_recv().is_err());
        let log = store.violations("1").await.unwrap();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].kind, ViolationKind::TooManyMessages);

        gw.reset_rate_window();

        let (again, mut rx) = identified(&gw, "tok-alice").await;
        gw.handle_frame(&again, HEARTBEAT).await;
        assert!(rx.recv().await.is_some());
        assert!(!again.is_closed());
    }

    #[tokio::test]
    async fn rate_limit_is_shared_across_an_identity_connections() {
        let gw = Gateway::new(
            GatewaySettings {
                max_messages_per_window: 2,
                ..GatewaySettings::default()
            },
            store(),
            store(),
        );
        let (first, mut first_rx) = identified(&gw, "tok-alice").await;
        let (second, _second_rx) = identified(&gw, "tok-alice-2").await;
        let (bob, mut bob_rx) = identified(&gw, "tok-bob").await;

        gw.handle_frame(&first, HEARTBEAT).await;
        gw.handle_frame(&first, HEARTBEAT).await;
        assert!(first_rx.recv().await.is_some());
        gw.handle_frame(&second, HEARTBEAT).await;

        assert_eq!(second.close_reason(), Some(CloseReason::RateLimited));
        gw.handle_frame(&bob, HEARTBEAT).await;
        assert!(bob_rx.recv().await.is_some());
        assert!(!bob.is_closed());
    }

    #[tokio::test(start_paused = true)]
    async fn reaper_closes_only_stale_connections() {
        let gw = gateway(store());
        let (old, _old_rx) = gw.accept();
        tokio::time::advance(Duration::from_secs(2)).await;
        let (fresh, _fresh_rx) = gw.accept();

        // old: 36s since last heartbeat, fresh: 34s
        let reaped = gw.reap_idle_at(fresh.last_heartbeat() + Duration::from_secs(34));

        assert_eq!(reaped, 1);
        assert_eq!(old.close_reason(), Some(CloseReason::HeartbeatTimeout));
        assert!(!fresh.is_closed());
        assert_eq!(gw.connection_count(), 1);
    }

    #[tokio::test]
    async fn revoked_token_closes_its_sessions_only() {
        let gw = gateway(store());
        let (alice, _a) = identified(&gw, "tok-alice").await;
        let (alice_other, _b) = identified(&gw, "tok-alice-2").await;

        assert_eq!(gw.close_token_sessions("tok-alice"), 1);

        assert_eq!(alice.close_reason(), Some(CloseReason::TokenRevoked));
        assert!(!alice_other.is_closed());
    }

    #[tokio::test]
    async fn deleted_identity_loses_every_session() {
        let gw = gateway(store());
        let (alice, _a) = identified(&gw, "tok-alice").await;
        let (alice_other, _b) = identified(&gw, "tok-alice-2").await;
        let (bob, _c) = identified(&gw, "tok-bob").await;

        assert_eq!(gw.close_identity_sessions("1"), 2);

        assert_eq!(alice.close_reason(), Some(CloseReason::TokenRevoked));
        assert_eq!(alice_other.close_reason(), Some(CloseReason::TokenRevoked));
        assert!(!bob.is_closed());
    }

    /// Holds every token lookup until released.
    struct GatedStore {
        inner: Arc<MemoryStore>,
        entered: Notify,
        release: Notify,
    }

    #[async_trait]
    impl IdentityStore for GatedStore {
        async fn lookup_identity_by_token(&self, token: &str) -> Result<Option<Identity>, StoreError> {
            let identity = self.inner.lookup_identity_by_token(token).await;
            self.entered.notify_one();
            self.release.notified().await;
            identity
        }
        async fn lookup_token_by_credentials(&self, e: &str, p: &str) -> Result<Option<AccessToken>, StoreError> {
            self.inner.lookup_token_by_credentials(e, p).await
        }
        async fn find_identity(&self, id: &str) -> Result<Option<Identity>, StoreError> {
            self.inner.find_identity(id).await
        }
        async fn list_identities(&self) -> Result<Vec<Identity>, StoreError> {
            self.inner.list_identities().await
        }
        async fn create_identity(&self, account: NewAccount) -> Result<Identity, StoreError> {
            self.inner.create_identity(account).await
        }
        async fn update_identity(&self, id: &str, patch: IdentityPatch) -> Result<Option<Identity>, StoreError> {
            self.inner.update_identity(id, patch).await
        }
        async fn delete_identity(&self, id: &str) -> Result<Option<Identity>, StoreError> {
            self.inner.delete_identity(id).await
        }
        async fn revoke_token(&self, token: &str) -> Result<Option<AccessToken>, StoreError> {
            self.inner.revoke_token(token).await
        }
        async fn consume_verification(&self, id: &str, token: &str) -> Result<Option<Identity>, StoreError> {
            self.inner.consume_verification(id, token).await
        }
    }

    #[tokio::test]
    async fn revoke_during_identify_lookup_wins() {
        let inner = store();
        let gated = Arc::new(GatedStore {
            inner: inner.clone(),
            entered: Notify::new(),
            release: Notify::new(),
        });
        let gw = Arc::new(Gateway::new(GatewaySettings::default(), gated.clone(), inner.clone()));
        let (conn, mut rx) = gw.accept();

        let identify = {
            let gw = gw.clone();
            let conn = conn.clone();
            tokio::spawn(async move {
                gw.handle_frame(&conn, r#"{"operation":"IDENTIFY","data":"tok-alice"}"#)
                    .await
            })
        };

        // The lookup already resolved the identity; revoke before it returns.
        gated.entered.notified().await;
        assert!(inner.revoke_token("tok-alice").await.unwrap().is_some());
        assert_eq!(gw.close_token_sessions("tok-alice"), 1);
        gated.release.notify_one();
        identify.await.unwrap();

        assert_eq!(conn.close_reason(), Some(CloseReason::TokenRevoked));
        assert_ne!(conn.state(), ProtocolState::Identified);
        assert!(rx.try_recv().is_err());
        assert_eq!(gw.connection_count(), 0);
    }

    #[tokio::test]
    async fn broadcast_reaches_identified_targets() {
        let gw = gateway(store());
        let (_alice, mut alice_rx) = identified(&gw, "tok-alice").await;
        let (_bob, mut bob_rx) = identified(&gw, "tok-bob").await;
        let (_anon, mut anon_rx) = gw.accept();

        let sent = gw
            .broadcast(&["1".to_string()], &OutboundMessage::new("NOTICE", None))
            .await;

        assert_eq!(sent, 1);
        assert_eq!(alice_rx.recv().await.unwrap(), r#"{"operation":"NOTICE"}"#);
        assert!(bob_rx.try_recv().is_err());
        assert!(anon_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn full_outbound_queue_closes_with_send_failure() {
        let gw = Gateway::new(
            GatewaySettings {
                outbound_buffer: 1,
                send_timeout: Duration::from_millis(20),
                ..GatewaySettings::default()
            },
            store(),
            store(),
        );
        let (conn, _rx) = gw.accept();
        gw.handle_frame(&conn, r#"{"operation":"IDENTIFY","data":"tok-alice"}"#).await;

        // HELLO fills the queue; nobody drains it.
        gw.handle_frame(&conn, HEARTBEAT).await;

        assert_eq!(conn.close_reason(), Some(CloseReason::SendFailure));
    }

    struct Unavailable;

    #[async_trait]
    impl IdentityStore for Unavailable {
        async fn lookup_identity_by_token(&self, _: &str) -> Result<Option<Identity>, StoreError> {
            Err(StoreError::Unavailable("down".into()))
        }
        async fn lookup_token_by_credentials(&self, _: &str, _: &str) -> Result<Option<AccessToken>, StoreError> {
            Err(StoreError::Unavailable("down".into()))
        }
        async fn find_identity(&self, _: &str) -> Result<Option<Identity>, StoreError> {
            Err(StoreError::Unavailable("down".into()))
        }
        async fn list_identities(&self) -> Result<Vec<Identity>, StoreError> {
            Err(StoreError::Unavailable("down".into()))
        }
        async fn create_identity(&self, _: NewAccount) -> Result<Identity, StoreError> {
            Err(StoreError::Unavailable("down".into()))
        }
        async fn update_identity(&self, _: &str, _: IdentityPatch) -> Result<Option<Identity>, StoreError> {
            Err(StoreError::Unavailable("down".into()))
        }
        async fn delete_identity(&self, _: &str) -> Result<Option<Identity>, StoreError> {
            Err(StoreError::Unavailable("down".into()))
        }
        async fn revoke_token(&self, _: &str) -> Result<Option<AccessToken>, StoreError> {
            Err(StoreError::Unavailable("down".into()))
        }
        async fn consume_verification(&self, _: &str, _: &str) -> Result<Option<Identity>, StoreError> {
            Err(StoreError::Unavailable("down".into()))
        }
    }

    #[tokio::test]
    async fn store_failure_closes_only_that_connection() {
        let gw = Gateway::new(GatewaySettings::default(), Arc::new(Unavailable), store());
        let (failing, _f) = gw.accept();
        let (bystander, _b) = gw.accept();

        gw.handle_frame(&failing, r#"{"operation":"IDENTIFY","data":"tok-alice"}"#).await;

        assert_eq!(failing.close_reason(), Some(CloseReason::ServiceUnavailable));
        assert!(!bystander.is_closed());
        assert_eq!(gw.connection_count(), 1);
    }
}
