//! Request authentication.
//!
//! The server guards its API with the single method named in `[auth]`:
//! open access behind a trusted boundary ([`NoneAuthenticator`]) or a
//! shared key checked on every request ([`ApiKeyAuthenticator`]). The
//! [`Authenticator`] trait is the seam the HTTP middleware talks to.

mod api_key;
mod none;
mod traits;
mod types;

pub use api_key::*;
pub use none::*;
pub use traits::*;
pub use types::*;

use crate::config::{AuthConfig, AuthMethod};

/// Build the authenticator selected in the `[auth]` config section.
pub fn create_authenticator(config: &AuthConfig) -> Result<Box<dyn Authenticator>, AuthError> {
    match config.method {
        AuthMethod::None => Ok(Box::new(NoneAuthenticator)),
        AuthMethod::ApiKey => match config.api_key.as_deref() {
            Some(key) if !key.is_empty() => {
                Ok(Box::new(ApiKeyAuthenticator::new(key.to_string())))
            }
            _ => Err(AuthError::ConfigurationError(
                "auth.api_key must be set when auth.method is api_key".to_string(),
            )),
        },
    }
}
