//! TOML config file loading and creation.

use crate::schema::CourierConfig;
use courier_common::ConfigError;
use std::path::Path;
use tracing::info;

/// Load config from a specific TOML file path.
///
/// Missing fields are filled with serde defaults; validation is the
/// caller's responsibility.
pub fn load_from_path(path: &Path) -> Result<CourierConfig, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::ParseError(format!("failed to read {}: {e}", path.display())))?;

    let config: CourierConfig = toml::from_str(&content)
        .map_err(|e| ConfigError::ParseError(format!("failed to parse TOML: {e}")))?;

    info!("loaded config from {}", path.display());
    Ok(config)
}

/// Load config from the platform-specific default path.
///
/// If the file does not exist, creates a commented default config file
/// and returns defaults.
pub fn load_default() -> Result<CourierConfig, ConfigError> {
    let path = default_config_path()?;

    if !path.exists() {
        info!("no config found at {}, creating default", path.display());
        create_default_config(&path)?;
        return Ok(CourierConfig::default());
    }

    load_from_path(&path)
}

/// Get the platform-specific default config file path.
///
/// On Linux: `~/.config/courier/config.toml`.
pub fn default_config_path() -> Result<std::path::PathBuf, ConfigError> {
    let config_dir = dirs::config_dir()
        .ok_or_else(|| ConfigError::ParseError("could not determine config directory".into()))?;
    Ok(config_dir.join("courier").join("config.toml"))
}

/// Create a default TOML config file with documentation comments.
pub fn create_default_config(path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            ConfigError::ParseError(format!(
                "failed to create config directory {}: {e}",
                parent.display()
            ))
        })?;
    }

    std::fs::write(path, default_config_toml()).map_err(|e| {
        ConfigError::ParseError(format!(
            "failed to write default config to {}: {e}",
            path.display()
        ))
    })?;

    info!("created default config at {}", path.display());
    Ok(())
}

/// Generate the default TOML config content with comments.
fn default_config_toml() -> String {
    r##"# Courier Configuration
# Only override what you want to change -- missing fields use defaults.

[api]
base_url = "http://localhost:8080"
# token = "your-bearer-token"
# request_timeout_secs = 10

[realtime]
url = "ws://localhost:8081/ws"
# reconnect_delay_secs = 1
# max_reconnect_delay_secs = 30

[geolocation]
# high_accuracy = true
# timeout_ms = 10000
# maximum_age_ms = 0

[presence]
# publish_interval_secs = 5
# ride_publish_interval_secs = 2
# debounce_ms = 500
# recovery_timeout_secs = 15

[logging]
# filter = "courier=info"
"##
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_from_nonexistent_returns_file_not_found() {
        let result = load_from_path(Path::new("/tmp/nonexistent_courier_config.toml"));
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn load_valid_partial_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[presence]
publish_interval_secs = 3

[realtime]
url = "wss://rt.example.com/ws"
"#,
        )
        .unwrap();

        let config = load_from_path(&path).unwrap();
        assert_eq!(config.presence.publish_interval_secs, 3);
        assert_eq!(config.realtime.url, "wss://rt.example.com/ws");
        // Untouched sections keep their defaults.
        assert_eq!(config.presence.debounce_ms, 500);
    }

    #[test]
    fn load_invalid_toml_returns_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "this is not toml [[[").unwrap();

        let result = load_from_path(&path);
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn default_file_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        create_default_config(&path).unwrap();

        let config = load_from_path(&path).unwrap();
        assert_eq!(config.presence.publish_interval_secs, 5);
        assert_eq!(config.api.base_url, "http://localhost:8080");
    }
}
