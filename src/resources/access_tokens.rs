//! Access tokens at `/access_tokens/{token}`.
//!
//! # Responsibilities
//! - read: identity the token belongs to
//! - create: exchange email + password for a fresh bearer token
//! - delete: revoke the token and drop gateway sessions identified with it

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use super::users::public;
use crate::gateway::Gateway;
use crate::http::{ApiError, ApiRequest, ApiResponse, ApiResult, Resource};
use crate::store::IdentityStore;

#[derive(Debug, Deserialize)]
struct Credentials {
    email: String,
    password: String,
}

pub struct AccessTokens {
    store: Arc<dyn IdentityStore>,
    gateway: Arc<Gateway>,
}

impl AccessTokens {
    pub fn new(store: Arc<dyn IdentityStore>, gateway: Arc<Gateway>) -> Self {
        Self { store, gateway }
    }
}

#[async_trait]
impl Resource for AccessTokens {
    fn name(&self) -> &'static str {
        "access_tokens"
    }

    async fn read(&self, req: ApiRequest) -> ApiResult {
        let token = req.require_param("token")?;
        match self.store.lookup_identity_by_token(token).await? {
            Some(identity) => ApiResponse::json(&public(identity)),
            None => Err(ApiError::not_found()),
        }
    }

    async fn create(&self, req: ApiRequest) -> ApiResult {
        let credentials: Credentials = req.json()?;
        let token = self
            .store
            .lookup_token_by_credentials(&credentials.email, &credentials.password)
            .await?
            .ok_or_else(|| ApiError::BadRequest("Invalid E-Mail address or password".to_string()))?;

        tracing::info!(
            identity_id = %token.identity_id,
            remote_addr = ?req.remote_addr,
            "Access token issued"
        );
        ApiResponse::json(&token)
    }

    async fn delete(&self, req: ApiRequest) -> ApiResult {
        let token = req.require_param("token")?;
        let Some(revoked) = self.store.revoke_token(token).await? else {
            return Err(ApiError::not_found());
        };

        let closed = self.gateway.close_token_sessions(token);
        tracing::info!(
            identity_id = %revoked.identity_id,
            closed_sessions = closed,
            "Access token revoked"
        );
        ApiResponse::json(&json!({
            "token": revoked.token,
            "closed_sessions": closed,
        }))
    }
}
