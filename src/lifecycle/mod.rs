//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Validated config → store → gateway → scheduler tasks → route table
//!     → dispatcher → HttpServer
//!
//! Shutdown (shutdown.rs):
//!     Signal received → broadcast → server stops accepting → drain → exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Ordered startup: collaborators first, then the gateway, then routes
//! - Listeners are bound by the caller, so tests can use ephemeral ports

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
pub use signals::shutdown_signal;
pub use startup::{Services, StartupError};
