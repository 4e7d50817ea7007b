//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the service.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the account service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServiceConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// HTTP dispatch limits.
    pub http: HttpConfig,

    /// Websocket gateway protocol settings.
    pub gateway: GatewayConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Accounts seeded into the in-memory store.
    pub accounts: Vec<AccountConfig>,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// HTTP request handling limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_timeout_secs: u64,

    /// Maximum accepted request body size in bytes.
    pub max_body_bytes: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: 30,
            max_body_bytes: 8 * 1024 * 1024, // 8MB
        }
    }
}

/// Gateway protocol configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// HTTP path the websocket upgrade is served on.
    pub path: String,

    /// Heartbeat interval announced to clients in HELLO, in milliseconds.
    pub heartbeat_interval_ms: u64,

    /// Age of the last heartbeat after which the reaper closes a connection.
    pub heartbeat_grace_secs: u64,

    /// How often the idle reaper runs (e.g. "30s").
    pub reaper_interval: String,

    /// Length of the message-rate window (e.g. "1m").
    pub rate_window: String,

    /// Messages an identity may send per rate window.
    pub max_messages_per_window: u32,

    /// How long a send may wait for outbound capacity, in milliseconds.
    pub send_timeout_ms: u64,

    /// Per-connection outbound queue depth.
    pub outbound_buffer: usize,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            path: "/gateway".to_string(),
            heartbeat_interval_ms: 30_000,
            heartbeat_grace_secs: 35,
            reaper_interval: "30s".to_string(),
            rate_window: "1m".to_string(),
            max_messages_per_window: 120,
            send_timeout_ms: 5_000,
            outbound_buffer: 32,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Install the Prometheus exporter.
    pub metrics_enabled: bool,

    /// Address the Prometheus scrape endpoint listens on.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// A seed account for the in-memory store.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AccountConfig {
    /// Unique account identifier.
    pub id: String,

    pub username: String,

    #[serde(default)]
    pub email: Option<String>,

    #[serde(default)]
    pub password: String,

    /// Access tokens issued to this account at startup.
    #[serde(default)]
    pub tokens: Vec<String>,

    /// Outstanding email verification tokens.
    #[serde(default)]
    pub verification_tokens: Vec<String>,

    #[serde(default)]
    pub verified: bool,

    #[serde(default)]
    pub bot: bool,
}
