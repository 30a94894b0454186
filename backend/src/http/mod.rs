//! HTTP server module for the coverage API.
//!
//! Exposes the coverage service layer as a REST API behind a static API-key
//! check.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  HTTP Layer (axum handlers)                              │
//! │  - API_TOKEN middleware                                  │
//! │  - JSON serialization, error bodies, OpenAPI             │
//! │  - CORS, compression, tracing                            │
//! └───────────────────┬──────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼──────────────────────────────────────┐
//! │  Service Layer (db::services)                            │
//! │  - Validation, lookup patterns, confirmation             │
//! └───────────────────┬──────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼──────────────────────────────────────┐
//! │  Repository Layer (db/)                                  │
//! │  - LocalRepository / PostgresRepository                  │
//! └──────────────────────────────────────────────────────────┘
//! ```

pub mod auth;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod openapi;
pub mod router;
pub mod state;

pub use auth::{AuthenticatedUser, TokenAuth};
pub use error::{ApiError, AppError};
pub use router::create_router;
pub use state::AppState;
