//! Records exchanged with the storage collaborators.

use serde::{Deserialize, Serialize};

/// A resolved account identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default)]
    pub verified: bool,
    #[serde(default)]
    pub bot: bool,
}

/// An issued access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken {
    pub identity_id: String,
    /// Token scheme, `bearer` for user logins.
    #[serde(rename = "type")]
    pub kind: String,
    pub token: String,
    /// Creation time in milliseconds since the Unix epoch.
    pub created_at: u64,
}

/// Kind of rate-limit violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ViolationKind {
    TooManyMessages,
}

/// An immutable violation record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateViolation {
    pub kind: ViolationKind,
    /// Milliseconds since the Unix epoch.
    pub timestamp: u64,
}

impl RateViolation {
    pub fn new(kind: ViolationKind, timestamp: u64) -> Self {
        Self { kind, timestamp }
    }
}

/// Fields for registering a new account.
#[derive(Debug, Clone, Deserialize)]
pub struct NewAccount {
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    pub password: String,
    #[serde(default)]
    pub bot: bool,
}

/// Partial update of an account. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IdentityPatch {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}
