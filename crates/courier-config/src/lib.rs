//! Courier configuration system.
//!
//! TOML-based configuration with serde defaults on every section, so a
//! partial config file works out of the box. Validation runs after load.

pub mod schema;
pub mod toml_loader;
pub mod validation;

pub use schema::CourierConfig;
pub use toml_loader::{default_config_path, load_from_path};

use courier_common::ConfigError;

/// Load config from the platform default path, creating a commented
/// default file if none exists.
pub fn load_config() -> Result<CourierConfig, ConfigError> {
    let config = toml_loader::load_default()?;
    validation::validate(&config)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_passes_validation() {
        let config = CourierConfig::default();
        assert!(validation::validate(&config).is_ok());
    }
}
