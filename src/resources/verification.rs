//! Email verification at `/users/{userID}/verify/{token}`.

use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;

use super::users::public;
use crate::http::{ApiError, ApiRequest, ApiResponse, ApiResult, Resource};
use crate::store::IdentityStore;

pub struct Verification {
    store: Arc<dyn IdentityStore>,
}

impl Verification {
    pub fn new(store: Arc<dyn IdentityStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Resource for Verification {
    fn name(&self) -> &'static str {
        "verification"
    }

    /// Consume the token; it cannot be used twice.
    async fn read(&self, req: ApiRequest) -> ApiResult {
        let user_id = req.require_param("userID")?;
        let token = req.require_param("token")?;

        let Some(identity) = self.store.consume_verification(user_id, token).await? else {
            return Err(ApiError::BadRequest(
                "You provided an invalid verification token".to_string(),
            ));
        };

        tracing::info!(identity_id = %identity.id, "Account verified");
        ApiResponse::json(&json!({
            "token": token,
            "user": public(identity),
        }))
    }
}
