//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route Compilation (at startup):
//!     static table of (template, resource)
//!     → matcher.rs (template → anchored regex + parameter names)
//!     → router.rs (ordered, immutable RouteTable)
//!
//! Incoming Request (method, path):
//!     → router.rs (first matching template, captured params)
//!     → action.rs (method + captured arity → Action)
//!     → Return: ResolvedRoute + Action, or NoMatch
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - Deterministic: same input always matches same route
//! - First match wins (registration order)
//! - Action selection is an explicit decision table, not ad hoc checks

pub mod action;
pub mod matcher;
pub mod router;

pub use action::{resolve_action, Action, Arity};
pub use matcher::{PathMatcher, PatternError};
pub use router::{ResolvedRoute, RouteTable, RouteTemplate};
