//! Identity-status gate run before every request.

use tracing::{debug, info};

use super::{AuthError, AuthRequest, Authenticator};
use crate::config::AccessConfig;
use crate::identity::{Identity, IdentityFactory};

/// Status value the proxy sets once it has validated the caller's token.
pub const CONFIRMED: &str = "Confirmed";

/// Status assumed when the proxy sent no status header at all.
pub const DEFAULT_IDENTITY_STATUS: &str = "Invalid";

/// Identity status as reported by the proxy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityStatus {
    Confirmed,
    NotConfirmed(String),
}

impl IdentityStatus {
    /// Exact, case-sensitive comparison against [`CONFIRMED`].
    pub fn parse(value: Option<&str>) -> Self {
        match value.unwrap_or(DEFAULT_IDENTITY_STATUS) {
            CONFIRMED => Self::Confirmed,
            other => Self::NotConfirmed(other.to_string()),
        }
    }
}

/// Authenticator driven by the proxy's identity-status header.
///
/// - `Confirmed` → authenticated identity built from the trusted headers
/// - anything else, anonymous access allowed → the anonymous identity
/// - anything else, anonymous access disabled → [`AuthError::NotAuthenticated`]
#[derive(Debug, Clone)]
pub struct AuthenticationGate {
    factory: IdentityFactory,
    status_header: String,
    allow_anonymous_access: bool,
}

impl AuthenticationGate {
    pub fn new(
        factory: IdentityFactory,
        status_header: impl Into<String>,
        allow_anonymous_access: bool,
    ) -> Self {
        Self {
            factory,
            status_header: status_header.into(),
            allow_anonymous_access,
        }
    }

    pub fn from_config(config: &AccessConfig) -> Self {
        Self::new(
            IdentityFactory::from_config(config),
            &config.identity_status_header,
            config.allow_anonymous_access,
        )
    }

    pub fn allows_anonymous_access(&self) -> bool {
        self.allow_anonymous_access
    }

    pub fn factory(&self) -> &IdentityFactory {
        &self.factory
    }

    /// User id the proxy sent, for log lines about rejected requests.
    fn attempted_user_id<'a>(&self, request: &'a AuthRequest) -> &'a str {
        request
            .headers
            .iter()
            .rev()
            .find(|(name, _)| self.factory.transform_header(name).as_deref() == Some("user_id"))
            .map(|(_, value)| value.as_str())
            .unwrap_or("None")
    }
}

impl Authenticator for AuthenticationGate {
    fn authenticate(&self, request: &AuthRequest) -> Result<Identity, AuthError> {
        let status = match IdentityStatus::parse(request.header(&self.status_header)) {
            IdentityStatus::Confirmed => return Ok(self.factory.from_request(request)),
            IdentityStatus::NotConfirmed(status) => status,
        };

        let user_id = self.attempted_user_id(request);
        info!(
            user_id,
            identity_status = %status,
            "Couldn't authenticate user"
        );

        if !self.allow_anonymous_access {
            debug!(user_id, "Anonymous access disabled, rejecting");
            return Err(AuthError::NotAuthenticated);
        }

        debug!("Setting anonymous identity");
        Ok(self.factory.anonymous())
    }

    fn method_name(&self) -> &'static str {
        "identity_status"
    }
}
