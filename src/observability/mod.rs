//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! http/server.rs   → request received / finished   → logs + api_* metrics
//! gateway/*        → accepted / identified / closed → logs + gateway_* metrics
//! scheduler        → first-run offset, failed runs  → logs + scheduler_* metrics
//!
//! logging.rs  → stdout (pretty or JSON)
//! metrics.rs  → Prometheus scrape endpoint (when enabled)
//! ```
//!
//! # Design Decisions
//! - `RUST_LOG` overrides the built-in filter
//! - Request IDs ride on tower-http trace spans, not on every event
//! - Metric labels never carry identities or raw paths

pub mod logging;
pub mod metrics;
