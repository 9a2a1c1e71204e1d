use super::{Identity, IdentityAttributes};
use crate::auth::AuthRequest;
use crate::config::AccessConfig;

/// Builds identities from the headers injected by the authenticating proxy.
#[derive(Debug, Clone)]
pub struct IdentityFactory {
    trusted_prefix: String,
    roles_header: String,
}

impl IdentityFactory {
    pub fn new(trusted_prefix: impl Into<String>, roles_header: impl Into<String>) -> Self {
        Self {
            trusted_prefix: trusted_prefix.into(),
            roles_header: roles_header.into(),
        }
    }

    pub fn from_config(config: &AccessConfig) -> Self {
        Self::new(&config.trusted_header_prefix, &config.roles_header)
    }

    pub fn trusted_prefix(&self) -> &str {
        &self.trusted_prefix
    }

    /// Build an authenticated identity from `request`.
    ///
    /// Every header starting with the trusted prefix (case-sensitive) becomes an attribute.
    /// Roles come from the roles header split on `,`: an absent header gives no roles, a
    /// present but empty header gives a single empty role.
    pub fn from_request(&self, request: &AuthRequest) -> Identity {
        let mut attributes = IdentityAttributes::new();
        for (name, value) in &request.headers {
            if let Some(attribute) = self.transform_header(name) {
                attributes.insert(attribute, value.as_str());
            }
        }

        let roles = request
            .header(&self.roles_header)
            .map(|value| value.split(',').map(str::to_string).collect())
            .unwrap_or_default();

        Identity::authenticated(attributes, roles)
    }

    /// The canonical anonymous identity.
    pub fn anonymous(&self) -> Identity {
        Identity::anonymous()
    }

    /// Attribute name for a header, or `None` if the header is not trusted.
    ///
    /// Only the leading prefix is removed: `X-Foo-X-Bar` becomes `foo_x_bar`.
    pub fn transform_header(&self, name: &str) -> Option<String> {
        let rest = name.strip_prefix(self.trusted_prefix.as_str())?;
        if rest.is_empty() {
            return None;
        }
        Some(rest.replace('-', "_").to_lowercase())
    }
}

impl Default for IdentityFactory {
    fn default() -> Self {
        Self::new("X-", "X-Roles")
    }
}
