use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Access section exists (enforced by serde)
/// - Server port is not 0
/// - Header prefix and header names are usable HTTP header names
/// - Config endpoint role list names at least one role
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    let access = &config.access;
    for (key, value) in [
        ("access.trusted_header_prefix", &access.trusted_header_prefix),
        ("access.identity_status_header", &access.identity_status_header),
        ("access.roles_header", &access.roles_header),
    ] {
        if !is_header_name(value) {
            return Err(ConfigError::ValidationError(format!(
                "{} is not a valid HTTP header name: '{}'",
                key, value
            )));
        }
    }

    if config.server.config_roles.is_empty() {
        return Err(ConfigError::ValidationError(
            "server.config_roles must name at least one role".to_string(),
        ));
    }
    if config.server.config_roles.iter().any(|r| r.trim().is_empty()) {
        return Err(ConfigError::ValidationError(
            "server.config_roles cannot contain empty roles".to_string(),
        ));
    }

    Ok(())
}

/// RFC 9110 token: one or more tchars.
fn is_header_name(name: &str) -> bool {
    !name.is_empty()
        && name.bytes().all(|b| {
            b.is_ascii_alphanumeric()
                || matches!(
                    b,
                    b'!' | b'#'
                        | b'$'
                        | b'%'
                        | b'&'
                        | b'\''
                        | b'*'
                        | b'+'
                        | b'-'
                        | b'.'
                        | b'^'
                        | b'_'
                        | b'`'
                        | b'|'
                        | b'~'
                )
        })
}
