//! Slice API service library.
//!
//! Account-service dispatch core: a path router with verb + arity action
//! resolution, a realtime websocket gateway, and a wall-clock-aligned task
//! scheduler.
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌───────────────────────────────────────────────┐
//!                      │                  SLICE API                    │
//!                      │                                               │
//!   HTTP request       │  ┌─────────┐    ┌──────────┐   ┌───────────┐  │
//!   ───────────────────┼─▶│  http   │───▶│ routing  │──▶│ resources │  │
//!                      │  │ server  │    │ + action │   └─────┬─────┘  │
//!                      │  └────┬────┘    └──────────┘         │        │
//!                      │       │ upgrade                       ▼        │
//!   Websocket          │  ┌────▼────┐                    ┌─────────┐   │
//!   ◀──────────────────┼─▶│ gateway │◀──────────────────▶│  store  │   │
//!                      │  └────▲────┘                    └─────────┘   │
//!                      │       │ reap / reset                          │
//!                      │  ┌────┴──────┐                                │
//!                      │  │ scheduler │                                │
//!                      │  └───────────┘                                │
//!                      │                                               │
//!                      │  Cross-cutting: config, observability,        │
//!                      │  lifecycle (startup / shutdown)               │
//!                      └───────────────────────────────────────────────┘
//! ```

// Core subsystems
pub mod config;
pub mod gateway;
pub mod http;
pub mod resources;
pub mod routing;
pub mod scheduler;
pub mod store;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;

pub use config::schema::ServiceConfig;
pub use http::HttpServer;
pub use lifecycle::{Services, Shutdown};
