use serde::{Deserialize, Serialize};
use std::net::IpAddr;

use crate::roles::RoleMapping;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub access: AccessConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Configured roles allowed to read the configuration endpoint.
    #[serde(default = "default_config_roles")]
    pub config_roles: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            config_roles: default_config_roles(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::from([0, 0, 0, 0])
}

fn default_port() -> u16 {
    8080
}

fn default_config_roles() -> Vec<String> {
    vec!["admin".to_string()]
}

/// Access-control configuration: role mapping and the headers the proxy sets.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AccessConfig {
    /// Upstream role → configured role pairs.
    #[serde(default)]
    pub roles: RoleMapping,
    /// Publish an anonymous identity instead of rejecting unconfirmed requests.
    #[serde(default)]
    pub allow_anonymous_access: bool,
    #[serde(default = "default_trusted_header_prefix")]
    pub trusted_header_prefix: String,
    #[serde(default = "default_identity_status_header")]
    pub identity_status_header: String,
    #[serde(default = "default_roles_header")]
    pub roles_header: String,
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            roles: RoleMapping::default(),
            allow_anonymous_access: false,
            trusted_header_prefix: default_trusted_header_prefix(),
            identity_status_header: default_identity_status_header(),
            roles_header: default_roles_header(),
        }
    }
}

fn default_trusted_header_prefix() -> String {
    "X-".to_string()
}

fn default_identity_status_header() -> String {
    "X-Identity-Status".to_string()
}

fn default_roles_header() -> String {
    "X-Roles".to_string()
}

/// Config view returned by the API
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub access: SanitizedAccessConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedAccessConfig {
    /// Flattened `upstream:configured` form.
    pub roles: String,
    pub allow_anonymous_access: bool,
    pub trusted_header_prefix: String,
    pub identity_status_header: String,
    pub roles_header: String,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            access: SanitizedAccessConfig {
                roles: config.access.roles.to_string(),
                allow_anonymous_access: config.access.allow_anonymous_access,
                trusted_header_prefix: config.access.trusted_header_prefix.clone(),
                identity_status_header: config.access.identity_status_header.clone(),
                roles_header: config.access.roles_header.clone(),
            },
            server: config.server.clone(),
        }
    }
}
