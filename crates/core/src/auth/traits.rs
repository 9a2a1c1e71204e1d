use thiserror::Error;

use super::rejection::Rejection;
use super::types::AuthRequest;
use crate::identity::Identity;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Authentication required")]
    NotAuthenticated,

    #[error("Insufficient roles")]
    Forbidden,

    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

impl AuthError {
    /// The client-facing rejection, if this error is one.
    pub fn rejection(&self) -> Option<Rejection> {
        match self {
            AuthError::NotAuthenticated => Some(Rejection::Unauthenticated),
            AuthError::Forbidden => Some(Rejection::Forbidden),
            AuthError::ConfigurationError(_) => None,
        }
    }
}

/// Turns a request into the identity published for it.
///
/// Implementations are synchronous: they only read headers and never block.
pub trait Authenticator: Send + Sync {
    /// Authenticate a request and return the identity
    fn authenticate(&self, request: &AuthRequest) -> Result<Identity, AuthError>;

    /// Name of this authentication method
    fn method_name(&self) -> &'static str;
}
