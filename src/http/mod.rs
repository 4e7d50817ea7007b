//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, gateway upgrade)
//!     → request.rs (path params, query, body)
//!     → dispatch.rs (route table → action → Resource)
//!     → response.rs (status mapping, CORS headers)
//!     → Send to client
//! ```

pub mod dispatch;
pub mod request;
pub mod response;
pub mod server;

pub use dispatch::{Dispatcher, Resolution, Resource, ResourceRef};
pub use request::ApiRequest;
pub use response::{ApiError, ApiResponse, ApiResult};
pub use server::{AppState, HttpServer};
