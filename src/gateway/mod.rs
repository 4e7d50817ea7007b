//! Realtime websocket gateway.
//!
//! # Data Flow
//! ```text
//! socket accept (socket.rs)
//!     → Gateway::accept registers a Connection (connection.rs)
//!     → each inbound frame → Gateway::handle_frame (handler.rs)
//!         parse → IDENTIFY? → identified? → rate check → HEARTBEAT / close
//!     → replies queued on the connection, written by the socket writer
//!
//! Scheduler (tasks.rs):
//!     every 30s → IdleReaper     → close connections silent for > 35s
//!     every 60s → RateWindowReset → zero every identity's message count
//! ```
//!
//! # States
//! ```text
//! Unidentified ──IDENTIFY ok──▶ Identified
//!      │                            │
//!      └──────── any close ─────────┴──▶ Closed (terminal)
//! ```
//!
//! # Design Decisions
//! - Rate window is scheduler-aligned, not sliding: a burst straddling a
//!   reset can admit up to twice the limit
//! - Every close goes through `Gateway::close` so logging, metrics and
//!   removal from the live set happen exactly once

pub mod connection;
pub mod handler;
pub mod protocol;
pub mod socket;
pub mod tasks;

pub use connection::{Connection, ConnectionId, ProtocolState};
pub use handler::{Gateway, GatewaySettings};
pub use protocol::{CloseReason, OutboundMessage};
pub use tasks::{IdleReaper, RateWindowReset};
