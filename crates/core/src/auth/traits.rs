use async_trait::async_trait;
use thiserror::Error;

use super::types::{AuthRequest, Identity};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Authentication required")]
    NotAuthenticated,

    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

/// Decides whether a request may use the API.
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Resolve the request's credentials to an identity.
    async fn authenticate(&self, request: &AuthRequest) -> Result<Identity, AuthError>;

    /// The method's config name ("none", "api_key").
    fn method_name(&self) -> &'static str;
}
