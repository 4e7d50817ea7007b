//! Dispatched request context.
//!
//! # Responsibilities
//! - Carry method, path parameters, query, headers and body to an action
//! - Decode the JSON body on demand
//!
//! # Design Decisions
//! - Body buffered once by the dispatcher; actions that ignore it pay nothing
//! - Query parsed with `url::form_urlencoded`, last value wins

use axum::body::Bytes;
use axum::http::{HeaderMap, Method};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::net::SocketAddr;

use super::response::ApiError;

/// Everything an action needs from the inbound request.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    /// Captured path parameters, percent-decoded.
    pub params: HashMap<String, String>,
    pub query: HashMap<String, String>,
    pub headers: HeaderMap,
    pub body: Bytes,
    pub remote_addr: Option<SocketAddr>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            params: HashMap::new(),
            query: HashMap::new(),
            headers: HeaderMap::new(),
            body: Bytes::new(),
            remote_addr: None,
        }
    }

    /// Parse a raw query string into the request's query map.
    pub fn with_query(mut self, raw: Option<&str>) -> Self {
        if let Some(raw) = raw {
            self.query = url::form_urlencoded::parse(raw.as_bytes())
                .into_owned()
                .collect();
        }
        self
    }

    pub fn with_body(mut self, body: Bytes) -> Self {
        self.body = body;
        self
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    /// A path parameter the action cannot run without.
    pub fn require_param(&self, name: &str) -> Result<&str, ApiError> {
        self.param(name)
            .ok_or_else(|| ApiError::BadRequest(format!("Missing path parameter '{name}'")))
    }

    /// Decode the body as JSON; an empty or malformed body is a 400.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        if self.body.is_empty() {
            return Err(ApiError::BadRequest("Missing request body".to_string()));
        }
        serde_json::from_slice(&self.body)
            .map_err(|e| ApiError::BadRequest(format!("Invalid JSON body: {e}")))
    }
}
