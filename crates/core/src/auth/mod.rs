mod gate;
mod policy;
mod rejection;
mod traits;
mod types;

pub use gate::*;
pub use policy::*;
pub use rejection::*;
pub use traits::*;
pub use types::*;

use crate::config::AccessConfig;

/// Factory function to create authenticator from config
pub fn create_authenticator(config: &AccessConfig) -> Result<Box<dyn Authenticator>, AuthError> {
    if config.trusted_header_prefix.is_empty() {
        return Err(AuthError::ConfigurationError(
            "trusted_header_prefix must not be empty".to_string(),
        ));
    }
    if config.identity_status_header.is_empty() {
        return Err(AuthError::ConfigurationError(
            "identity_status_header must not be empty".to_string(),
        ));
    }

    Ok(Box::new(AuthenticationGate::from_config(config)))
}
