//! Static API-key authentication.
//!
//! Every protected route expects the configured token in the `API_TOKEN`
//! header, either bare or prefixed with the `ApiKey` scheme. A request that
//! passes gets an [`AuthenticatedUser`] in its extensions.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use super::error::AppError;
use super::state::AppState;

/// Header carrying the credential.
pub const API_TOKEN_HEADER: &str = "API_TOKEN";

/// Optional scheme prefix accepted in front of the token.
pub const AUTH_SCHEME: &str = "ApiKey";

/// Identity attached to an authenticated request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub username: String,
}

/// Verifies presented tokens against the single configured token.
#[derive(Clone)]
pub struct TokenAuth {
    expected: [u8; 32],
    username: String,
}

impl TokenAuth {
    pub fn new(token: &str, username: impl Into<String>) -> Self {
        Self {
            expected: digest(token),
            username: username.into(),
        }
    }

    /// Check a raw header value. Returns the bound user on a match.
    pub fn verify(&self, header_value: &str) -> Option<AuthenticatedUser> {
        let presented = digest(strip_scheme(header_value));
        if bool::from(presented[..].ct_eq(&self.expected[..])) {
            Some(AuthenticatedUser {
                username: self.username.clone(),
            })
        } else {
            None
        }
    }
}

impl std::fmt::Debug for TokenAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenAuth")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

// Hash both sides so the comparison length is fixed.
fn digest(token: &str) -> [u8; 32] {
    Sha256::digest(token.as_bytes()).into()
}

fn strip_scheme(value: &str) -> &str {
    let value = value.trim();
    match value.split_once(' ') {
        Some((scheme, rest)) if scheme.eq_ignore_ascii_case(AUTH_SCHEME) => rest.trim_start(),
        _ => value,
    }
}

/// Middleware rejecting requests without a valid `API_TOKEN` header.
pub async fn require_api_key(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let header = request
        .headers()
        .get(API_TOKEN_HEADER)
        .and_then(|v| v.to_str().ok());

    let Some(header) = header else {
        tracing::warn!(path = %request.uri().path(), "Request without API token");
        return Err(AppError::Unauthorized("Missing API token".to_string()));
    };

    match state.auth.verify(header) {
        Some(user) => {
            tracing::debug!(user = %user.username, "Authenticated request");
            request.extensions_mut().insert(user);
            Ok(next.run(request).await)
        }
        None => {
            tracing::warn!(path = %request.uri().path(), "Rejected invalid API token");
            Err(AppError::Unauthorized("Invalid API token".to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_and_prefixed_tokens_verify() {
        let auth = TokenAuth::new("s3cret", "appuser");
        assert_eq!(auth.verify("s3cret").unwrap().username, "appuser");
        assert!(auth.verify("ApiKey s3cret").is_some());
        assert!(auth.verify("apikey   s3cret").is_some());
    }

    #[test]
    fn test_wrong_tokens_rejected() {
        let auth = TokenAuth::new("s3cret", "appuser");
        assert!(auth.verify("").is_none());
        assert!(auth.verify("s3cre").is_none());
        assert!(auth.verify("s3cret2").is_none());
        assert!(auth.verify("Bearer s3cret").is_none());
    }

    #[test]
    fn test_debug_hides_digest() {
        let auth = TokenAuth::new("s3cret", "appuser");
        let rendered = format!("{:?}", auth);
        assert!(rendered.contains("appuser"));
        assert!(!rendered.contains("expected"));
    }
}
