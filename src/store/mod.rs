//! Storage and cache collaborators.
//!
//! # Data Flow
//! ```text
//! HTTP resources ──┐
//!                  ├─→ IdentityStore (token ⇄ identity lookups)
//! Gateway ─────────┤
//!                  └─→ ViolationLog  (per-identity rate violations, 7-day window)
//! ```
//!
//! # Design Decisions
//! - The dispatch core only sees these traits; the concrete backend is chosen
//!   at the composition root and injected as `Arc<dyn ...>`
//! - Every call may fail transiently; callers map `StoreError` to a closed
//!   connection or a 500 for that single request
//! - `MemoryStore` is the bundled backend, seeded from config

pub mod memory;
pub mod types;
pub mod violations;

use async_trait::async_trait;

pub use memory::MemoryStore;
pub use types::{AccessToken, Identity, IdentityPatch, NewAccount, RateViolation, ViolationKind};

/// Failure reported by a storage or cache backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backend could not be reached or refused the operation.
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),
    /// A stored value could not be decoded.
    #[error("corrupt stored value for {key}: {reason}")]
    Corrupt { key: String, reason: String },
    /// The write collides with an existing record.
    #[error("{0}")]
    Conflict(String),
}

/// Identity and access-token persistence.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Resolve the identity an access token belongs to.
    async fn lookup_identity_by_token(&self, token: &str) -> Result<Option<Identity>, StoreError>;

    /// Issue an access token for a matching email/password pair.
    async fn lookup_token_by_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<AccessToken>, StoreError>;

    /// Fetch a single identity by id.
    async fn find_identity(&self, id: &str) -> Result<Option<Identity>, StoreError>;

    /// All known identities.
    async fn list_identities(&self) -> Result<Vec<Identity>, StoreError>;

    /// Register a new account under a fresh id.
    async fn create_identity(&self, account: NewAccount) -> Result<Identity, StoreError>;

    /// Apply a partial update. `None` when the identity does not exist.
    async fn update_identity(
        &self,
        id: &str,
        patch: IdentityPatch,
    ) -> Result<Option<Identity>, StoreError>;

    /// Remove an identity along with its tokens and pending verifications.
    async fn delete_identity(&self, id: &str) -> Result<Option<Identity>, StoreError>;

    /// Delete an access token. Returns the removed token, if it existed.
    async fn revoke_token(&self, token: &str) -> Result<Option<AccessToken>, StoreError>;

    /// Consume a one-shot verification token and mark the identity verified.
    async fn consume_verification(
        &self,
        identity_id: &str,
        token: &str,
    ) -> Result<Option<Identity>, StoreError>;
}

/// Per-identity log of rate-limit violations kept by the cache.
#[async_trait]
pub trait ViolationLog: Send + Sync {
    /// Append a violation, dropping entries older than the retention window.
    async fn append_violation(
        &self,
        identity_id: &str,
        violation: RateViolation,
    ) -> Result<(), StoreError>;

    /// Current violations for an identity, oldest first.
    async fn violations(&self, identity_id: &str) -> Result<Vec<RateViolation>, StoreError>;
}
