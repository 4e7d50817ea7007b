//! User accounts at `/users/{id}`.
//!
//! Reads hide email addresses. Writes answer with the full record, since
//! the caller just supplied it.

use async_trait::async_trait;
use axum::http::StatusCode;
use std::sync::Arc;

use crate::gateway::Gateway;
use crate::http::{ApiError, ApiRequest, ApiResponse, ApiResult, Resource};
use crate::store::{Identity, IdentityPatch, IdentityStore, NewAccount};

pub struct Users {
    store: Arc<dyn IdentityStore>,
    gateway: Arc<Gateway>,
}

impl Users {
    pub fn new(store: Arc<dyn IdentityStore>, gateway: Arc<Gateway>) -> Self {
        Self { store, gateway }
    }
}

fn invalid_user() -> ApiError {
    ApiError::NotFound("Invalid User".to_string())
}

/// Public view of an identity.
pub(crate) fn public(mut identity: Identity) -> Identity {
    identity.email = None;
    identity
}

#[async_trait]
impl Resource for Users {
    fn name(&self) -> &'static str {
        "users"
    }

    async fn list(&self, _req: ApiRequest) -> ApiResult {
        let users: Vec<Identity> = self
            .store
            .list_identities()
            .await?
            .into_iter()
            .map(public)
            .collect();
        ApiResponse::json(&users)
    }

    async fn read(&self, req: ApiRequest) -> ApiResult {
        let id = req.require_param("id")?;
        match self.store.find_identity(id).await? {
            Some(identity) => ApiResponse::json(&public(identity)),
            None => Err(invalid_user()),
        }
    }

    async fn create(&self, req: ApiRequest) -> ApiResult {
        let account: NewAccount = req.json()?;
        if account.username.trim().is_empty() || account.password.is_empty() {
            return Err(ApiError::BadRequest("Username and password are required".to_string()));
        }

        let identity = self.store.create_identity(account).await?;
        tracing::info!(identity_id = %identity.id, "User created");
        Ok(ApiResponse::json(&identity)?.with_status(StatusCode::CREATED))
    }

    async fn update(&self, req: ApiRequest) -> ApiResult {
        let id = req.require_param("id")?;
        let patch: IdentityPatch = req.json()?;
        match self.store.update_identity(id, patch).await? {
            Some(identity) => ApiResponse::json(&identity),
            None => Err(invalid_user()),
        }
    }

    async fn delete(&self, req: ApiRequest) -> ApiResult {
        let id = req.require_param("id")?;
        let Some(identity) = self.store.delete_identity(id).await? else {
            return Err(invalid_user());
        };

        let closed = self.gateway.close_identity_sessions(&identity.id);
        tracing::info!(identity_id = %identity.id, closed_sessions = closed, "User deleted");
        ApiResponse::json(&identity)
    }
}
