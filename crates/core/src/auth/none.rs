use async_trait::async_trait;

use super::{AuthError, AuthRequest, Authenticator, Identity};

/// Pass-through authenticator for deployments behind a trusted network
/// boundary. Every request resolves to the anonymous identity. Only active
/// when the config spells out `method = "none"`.
#[derive(Debug, Default)]
pub struct NoneAuthenticator;

#[async_trait]
impl Authenticator for NoneAuthenticator {
    async fn authenticate(&self, _request: &AuthRequest) -> Result<Identity, AuthError> {
        Ok(Identity::anonymous())
    }

    fn method_name(&self) -> &'static str {
        "none"
    }
}
