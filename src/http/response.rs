//! Responses and error mapping.
//!
//! # Responsibilities
//! - Build text / JSON / empty responses for actions
//! - Map `ApiError` kinds to HTTP status codes
//! - Attach CORS headers to every dispatched response
//!
//! # Design Decisions
//! - Errors are plain-text bodies carrying the message
//! - Server errors are logged with their cause; clients only see
//!   "Internal Server Error"

use axum::body::{Body, Bytes};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::store::StoreError;

pub const ALLOW_ORIGIN: &str = "*";
pub const ALLOW_HEADERS: &str = "Content-Type, Authorization";

/// Result type returned by resource actions.
pub type ApiResult = Result<ApiResponse, ApiError>;

/// A successful action result.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub content_type: &'static str,
    pub body: Bytes,
}

impl ApiResponse {
    pub fn text(body: impl Into<String>) -> Self {
        Self {
            status: StatusCode::OK,
            content_type: "text/plain",
            body: Bytes::from(body.into()),
        }
    }

    pub fn json<T: Serialize>(value: &T) -> ApiResult {
        let body = serde_json::to_vec(value).map_err(|e| ApiError::Internal(e.to_string()))?;
        Ok(Self {
            status: StatusCode::OK,
            content_type: "application/json",
            body: Bytes::from(body),
        })
    }

    pub fn empty() -> Self {
        Self {
            status: StatusCode::OK,
            content_type: "text/plain",
            body: Bytes::new(),
        }
    }

    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }
}

/// Failure of a dispatched request.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    NotFound(String),
    #[error("Method Not Allowed")]
    MethodNotAllowed,
    #[error("Payload Too Large")]
    PayloadTooLarge,
    #[error("storage failure: {0}")]
    Store(StoreError),
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            // Conflicts are the caller's fault.
            StoreError::Conflict(message) => ApiError::BadRequest(message),
            other => ApiError::Store(other),
        }
    }
}

impl ApiError {
    pub fn not_found() -> Self {
        ApiError::NotFound("Not Found".to_string())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Store(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

fn with_cors(mut response: Response) -> Response {
    let headers = response.headers_mut();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static(ALLOW_ORIGIN),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(ALLOW_HEADERS),
    );
    response
}

impl IntoResponse for ApiResponse {
    fn into_response(self) -> Response {
        let response = (
            self.status,
            [(header::CONTENT_TYPE, self.content_type)],
            Body::from(self.body),
        )
            .into_response();
        with_cors(response)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
            "Internal Server Error".to_string()
        } else {
            self.to_string()
        };

        with_cors((status, [(header::CONTENT_TYPE, "text/plain")], message).into_response())
    }
}
