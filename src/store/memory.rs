//! In-process storage backend.
//!
//! # Responsibilities
//! - Hold accounts, access tokens and verification tokens seeded from config
//! - Keep the per-identity violation log with retention pruning
//!
//! # Design Decisions
//! - DashMap shards give lock-free reads across connections
//! - Violation append is read-modify-write on one entry; concurrent appends
//!   for the same identity are serialized by the shard lock

use async_trait::async_trait;
use dashmap::{DashMap, DashSet};

use super::types::{AccessToken, Identity, IdentityPatch, NewAccount, RateViolation};
use super::violations::{now_millis, prune_violations};
use super::{IdentityStore, StoreError, ViolationLog};
use crate::config::AccountConfig;

const EMAIL_IN_USE: &str = "E-Mail address is already in use";

struct AccountRecord {
    identity: Identity,
    password: String,
}

/// Memory-backed implementation of both collaborator traits.
#[derive(Default)]
pub struct MemoryStore {
    accounts: DashMap<String, AccountRecord>,
    tokens: DashMap<String, AccessToken>,
    verifications: DashSet<(String, String)>,
    violations: DashMap<String, Vec<RateViolation>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store holding the configured seed accounts.
    pub fn from_accounts(accounts: &[AccountConfig]) -> Self {
        let store = Self::new();
        for account in accounts {
            store.insert_account(account);
        }
        tracing::info!(accounts = store.accounts.len(), tokens = store.tokens.len(), "Memory store seeded");
        store
    }

    /// Add one account together with its pre-issued tokens.
    pub fn insert_account(&self, account: &AccountConfig) {
        let identity = Identity {
            id: account.id.clone(),
            username: account.username.clone(),
            email: account.email.clone(),
            verified: account.verified,
            bot: account.bot,
        };

        for token in &account.tokens {
            self.tokens.insert(
                token.clone(),
                AccessToken {
                    identity_id: account.id.clone(),
                    kind: if account.bot { "bot" } else { "bearer" }.to_string(),
                    token: token.clone(),
                    created_at: now_millis(),
                },
            );
        }

        for token in &account.verification_tokens {
            self.verifications.insert((account.id.clone(), token.clone()));
        }

        self.accounts.insert(
            account.id.clone(),
            AccountRecord {
                identity,
                password: account.password.clone(),
            },
        );
    }

    fn identity(&self, id: &str) -> Option<Identity> {
        self.accounts.get(id).map(|r| r.identity.clone())
    }

    fn email_taken(&self, email: &str, except: Option<&str>) -> bool {
        self.accounts.iter().any(|r| {
            r.identity.email.as_deref() == Some(email) && Some(r.key().as_str()) != except
        })
    }
}

/// A 32-character hex access token.
pub fn generate_token() -> String {
    hex::encode(rand::random::<[u8; 16]>())
}

fn generate_id() -> String {
    hex::encode(rand::random::<[u8; 8]>())
}

#[async_trait]
impl IdentityStore for MemoryStore {
    async fn lookup_identity_by_token(&self, token: &str) -> Result<Option<Identity>, StoreError> {
        let identity_id = match self.tokens.get(token) {
            Some(entry) => entry.identity_id.clone(),
            None => return Ok(None),
        };
        Ok(self.identity(&identity_id))
    }

    async fn lookup_token_by_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<AccessToken>, StoreError> {
        let identity_id = self
            .accounts
            .iter()
            .find(|r| r.identity.email.as_deref() == Some(email) && r.password == password)
            .map(|r| r.identity.id.clone());

        let Some(identity_id) = identity_id else {
            return Ok(None);
        };

        let token = AccessToken {
            identity_id,
            kind: "bearer".to_string(),
            token: generate_token(),
            created_at: now_millis(),
        };
        self.tokens.insert(token.token.clone(), token.clone());
        Ok(Some(token))
    }

    async fn find_identity(&self, id: &str) -> Result<Option<Identity>, StoreError> {
        Ok(self.identity(id))
    }

    async fn list_identities(&self) -> Result<Vec<Identity>, StoreError> {
        let mut all: Vec<Identity> = self.accounts.iter().map(|r| r.identity.clone()).collect();
        all.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(all)
    }

    async fn create_identity(&self, account: NewAccount) -> Result<Identity, StoreError> {
        if let Some(email) = &account.email {
            if self.email_taken(email, None) {
                return Err(StoreError::Conflict(EMAIL_IN_USE.to_string()));
            }
        }

        let mut id = generate_id();
        while self.accounts.contains_key(&id) {
            id = generate_id();
        }

        let identity = Identity {
            id: id.clone(),
            username: account.username,
            email: account.email,
            verified: false,
            bot: account.bot,
        };
        self.accounts.insert(
            id,
            AccountRecord {
                identity: identity.clone(),
                password: account.password,
            },
        );
        Ok(identity)
    }

    async fn update_identity(
        &self,
        id: &str,
        patch: IdentityPatch,
    ) -> Result<Option<Identity>, StoreError> {
        if !self.accounts.contains_key(id) {
            return Ok(None);
        }
        // Checked before taking the entry lock; iterating under it would deadlock.
        if let Some(email) = &patch.email {
            if self.email_taken(email, Some(id)) {
                return Err(StoreError::Conflict(EMAIL_IN_USE.to_string()));
            }
        }

        let Some(mut record) = self.accounts.get_mut(id) else {
            return Ok(None);
        };
        if let Some(username) = patch.username {
            record.identity.username = username;
        }
        if let Some(email) = patch.email {
            record.identity.email = Some(email);
        }
        if let Some(password) = patch.password {
            record.password = password;
        }
        Ok(Some(record.identity.clone()))
    }

    async fn delete_identity(&self, id: &str) -> Result<Option<Identity>, StoreError> {
        let Some((_, record)) = self.accounts.remove(id) else {
            return Ok(None);
        };
        self.tokens.retain(|_, t| t.identity_id != id);
        self.verifications.retain(|(owner, _)| owner != id);
        self.violations.remove(id);
        Ok(Some(record.identity))
    }

    async fn revoke_token(&self, token: &str) -> Result<Option<AccessToken>, StoreError> {
        Ok(self.tokens.remove(token).map(|(_, t)| t))
    }

    async fn consume_verification(
        &self,
        identity_id: &str,
        token: &str,
    ) -> Result<Option<Identity>, StoreError> {
        let key = (identity_id.to_string(), token.to_string());
        if self.verifications.remove(&key).is_none() {
            return Ok(None);
        }

        let mut record = match self.accounts.get_mut(identity_id) {
            Some(r) => r,
            None => {
                return Err(StoreError::Corrupt {
                    key: format!("verification:{identity_id}"),
                    reason: "token references a missing identity".to_string(),
                })
            }
        };
        record.identity.verified = true;
        Ok(Some(record.identity.clone()))
    }
}

#[async_trait]
impl ViolationLog for MemoryStore {
    async fn append_violation(
        &self,
        identity_id: &str,
        violation: RateViolation,
    ) -> Result<(), StoreError> {
        let mut log = self.violations.entry(identity_id.to_string()).or_default();
        prune_violations(&mut log, now_millis());
        log.push(violation);
        Ok(())
    }

    async fn violations(&self, identity_id: &str) -> Result<Vec<RateViolation>, StoreError> {
        Ok(self
            .violations
            .get(identity_id)
            .map(|r| r.value().clone())
            .unwrap_or_default())
    }
}
