//! Shared-key authentication.

use async_trait::async_trait;

use super::{AuthError, AuthRequest, Authenticator, Identity};

/// Validates requests against the key configured in `[auth] api_key`.
///
/// The presented key is read from `Authorization: Bearer <key>` or, when no
/// bearer credential is present, from `X-API-Key`. Anyone holding the key
/// acts as the single "operator" identity; there are no per-user accounts.
pub struct ApiKeyAuthenticator {
    key: String,
}

impl ApiKeyAuthenticator {
    pub fn new(key: String) -> Self {
        Self { key }
    }
}

/// Pull the presented key out of the request headers (names lowercased).
fn presented_key(request: &AuthRequest) -> Option<&str> {
    if let Some(value) = request.headers.get("authorization") {
        if let Some((scheme, key)) = value.split_once(' ') {
            if scheme.eq_ignore_ascii_case("bearer") {
                return Some(key.trim());
            }
        }
    }
    request.headers.get("x-api-key").map(String::as_str)
}

/// Comparison that walks the full key regardless of where the first
/// mismatch sits, so response timing leaks nothing about the key.
fn keys_match(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[async_trait]
impl Authenticator for ApiKeyAuthenticator {
    async fn authenticate(&self, request: &AuthRequest) -> Result<Identity, AuthError> {
        let presented = presented_key(request).ok_or(AuthError::NotAuthenticated)?;

        if keys_match(presented.as_bytes(), self.key.as_bytes()) {
            Ok(Identity {
                user_id: "operator".to_string(),
                method: "api_key".to_string(),
            })
        } else {
            Err(AuthError::InvalidCredentials("Invalid API key".to_string()))
        }
    }

    fn method_name(&self) -> &'static str {
        "api_key"
    }
}
