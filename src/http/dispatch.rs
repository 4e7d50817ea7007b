//! Resource dispatch.
//!
//! # Responsibilities
//! - Define the `Resource` contract (one async method per action)
//! - Resolve (method, path) to a resource action
//! - Invoke the action with captured parameters attached to the request
//!
//! # Design Decisions
//! - Path miss is always 404, even for methods no resource supports
//! - Method/arity miss on a matched path is 405
//! - Preflight succeeds on every matched path unless a resource overrides it

use async_trait::async_trait;
use axum::http::Method;
use std::sync::Arc;

use super::request::ApiRequest;
use super::response::{ApiError, ApiResponse, ApiResult};
use crate::routing::{resolve_action, Action, Arity, RouteTable};

/// A routed resource. Actions a resource does not support keep the
/// default body and answer 405.
#[async_trait]
pub trait Resource: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &'static str;

    async fn list(&self, _req: ApiRequest) -> ApiResult {
        Err(ApiError::MethodNotAllowed)
    }

    async fn read(&self, _req: ApiRequest) -> ApiResult {
        Err(ApiError::MethodNotAllowed)
    }

    async fn create(&self, _req: ApiRequest) -> ApiResult {
        Err(ApiError::MethodNotAllowed)
    }

    async fn update(&self, _req: ApiRequest) -> ApiResult {
        Err(ApiError::MethodNotAllowed)
    }

    async fn delete(&self, _req: ApiRequest) -> ApiResult {
        Err(ApiError::MethodNotAllowed)
    }

    async fn preflight(&self, _req: ApiRequest) -> ApiResult {
        Ok(ApiResponse::empty())
    }
}

/// Shared handle to a resource, as stored in the route table.
pub type ResourceRef = Arc<dyn Resource>;

/// Outcome of resolving a request against the route table.
pub enum Resolution {
    NotFound,
    MethodNotAllowed,
    Invoke {
        resource: ResourceRef,
        action: Action,
        params: std::collections::HashMap<String, String>,
    },
}

/// Routes requests to resource actions.
pub struct Dispatcher {
    routes: RouteTable<ResourceRef>,
}

impl Dispatcher {
    pub fn new(routes: RouteTable<ResourceRef>) -> Self {
        Self { routes }
    }

    pub fn routes(&self) -> &RouteTable<ResourceRef> {
        &self.routes
    }

    /// Pick the resource and action for `method` on `path`.
    pub fn resolve(&self, method: &Method, path: &str) -> Resolution {
        let Some(resolved) = self.routes.match_path(path) else {
            return Resolution::NotFound;
        };

        let arity = Arity::of(resolved.captured(), resolved.route.param_count());
        match resolve_action(method, arity) {
            Action::Reject => Resolution::MethodNotAllowed,
            action => Resolution::Invoke {
                resource: resolved.route.handler().clone(),
                action,
                params: resolved.params,
            },
        }
    }

    /// Resolve and run the request.
    pub async fn dispatch(&self, mut req: ApiRequest) -> ApiResult {
        match self.resolve(&req.method, &req.path) {
            Resolution::NotFound => {
                tracing::debug!(method = %req.method, path = %req.path, "No route matched");
                Err(ApiError::not_found())
            }
            Resolution::MethodNotAllowed => {
                tracing::debug!(method = %req.method, path = %req.path, "Method not allowed");
                Err(ApiError::MethodNotAllowed)
            }
            Resolution::Invoke {
                resource,
                action,
                params,
            } => {
                tracing::debug!(
                    resource = resource.name(),
                    action = %action,
                    path = %req.path,
                    "Dispatching"
                );
                req.params = params;
                match action {
                    Action::List => resource.list(req).await,
                    Action::Read => resource.read(req).await,
                    Action::Create => resource.create(req).await,
                    Action::Update => resource.update(req).await,
                    Action::Delete => resource.delete(req).await,
                    Action::Preflight => resource.preflight(req).await,
                    Action::Reject => Err(ApiError::MethodNotAllowed),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Echo;

    #[async_trait]
    impl Resource for Echo {
        fn name(&self) -> &'static str {
            "echo"
        }

        async fn list(&self, _req: ApiRequest) -> ApiResult {
            Ok(ApiResponse::text("list"))
        }

        async fn read(&self, req: ApiRequest) -> ApiResult {
            Ok(ApiResponse::text(format!("read {}", req.require_param("id")?)))
        }
    }

    fn dispatcher() -> Dispatcher {
        let routes = RouteTable::new()
            .route("/things/{id}", Arc::new(Echo) as ResourceRef)
            .unwrap();
        Dispatcher::new(routes)
    }

    fn body(result: ApiResult) -> String {
        String::from_utf8(result.unwrap().body.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn dispatches_by_arity() {
        let d = dispatcher();
        assert_eq!(body(d.dispatch(ApiRequest::new(Method::GET, "/things")).await), "list");
        assert_eq!(
            body(d.dispatch(ApiRequest::new(Method::GET, "/things/7")).await),
            "read 7"
        );
    }

    #[tokio::test]
    async fn unknown_path_is_not_found_for_any_method() {
        let d = dispatcher();
        for method in [Method::GET, Method::PUT, Method::OPTIONS] {
            let err = d.dispatch(ApiRequest::new(method, "/nope")).await.unwrap_err();
            assert!(matches!(err, ApiError::NotFound(_)));
        }
    }

    #[tokio::test]
    async fn unsupported_method_is_not_allowed() {
        let d = dispatcher();
        let err = d
            .dispatch(ApiRequest::new(Method::PUT, "/things/7"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::MethodNotAllowed));

        // Resolved to Create, but Echo keeps the default body.
        let err = d
            .dispatch(ApiRequest::new(Method::POST, "/things"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::MethodNotAllowed));
    }

    #[tokio::test]
    async fn preflight_succeeds_by_default() {
        let d = dispatcher();
        let response = d
            .dispatch(ApiRequest::new(Method::OPTIONS, "/things/7"))
            .await
            .unwrap();
        assert!(response.body.is_empty());
    }
}
