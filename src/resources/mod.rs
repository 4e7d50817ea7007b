//! HTTP resources bound into the static route table.
//!
//! # Data Flow
//! ```text
//! Dispatcher (template + action)
//!     → index.rs         "/"
//!     → users.rs         "/users/{id}"
//!     → verification.rs  "/users/{userID}/verify/{token}"
//!     → access_tokens.rs "/access_tokens/{token}"
//! ```
//!
//! # Design Decisions
//! - Resources receive their collaborators at construction
//! - Registration order is the match order; parameters never span a `/`,
//!   so `/users/{id}` cannot swallow the verification template

pub mod access_tokens;
pub mod index;
pub mod users;
pub mod verification;

use std::sync::Arc;

use crate::gateway::Gateway;
use crate::http::ResourceRef;
use crate::routing::{PatternError, RouteTable};
use crate::store::IdentityStore;

pub use access_tokens::AccessTokens;
pub use index::Index;
pub use users::Users;
pub use verification::Verification;

/// Build the service's route table.
pub fn route_table(
    store: Arc<dyn IdentityStore>,
    gateway: Arc<Gateway>,
) -> Result<RouteTable<ResourceRef>, PatternError> {
    RouteTable::new()
        .route("/", Arc::new(Index) as ResourceRef)?
        .route(
            "/users/{id}",
            Arc::new(Users::new(store.clone(), gateway.clone())) as ResourceRef,
        )?
        .route(
            "/users/{userID}/verify/{token}",
            Arc::new(Verification::new(store.clone())) as ResourceRef,
        )?
        .route(
            "/access_tokens/{token}",
            Arc::new(AccessTokens::new(store, gateway)) as ResourceRef,
        )
}
