//! Application state for the HTTP server.

use std::sync::Arc;

use super::auth::TokenAuth;
use crate::config::{ServiceConfig, API_USERNAME};
use crate::db::repository::CoverageRepository;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Repository instance for database operations
    pub repository: Arc<dyn CoverageRepository>,
    /// Token verifier used by the auth middleware
    pub auth: Arc<TokenAuth>,
}

impl AppState {
    /// Create a new application state with the given repository and token.
    pub fn new(repository: Arc<dyn CoverageRepository>, api_token: &str) -> Self {
        Self {
            repository,
            auth: Arc::new(TokenAuth::new(api_token, API_USERNAME)),
        }
    }

    pub fn from_config(repository: Arc<dyn CoverageRepository>, config: &ServiceConfig) -> Self {
        Self::new(repository, &config.api_token)
    }
}
