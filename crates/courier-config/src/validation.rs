//! Configuration validation.

use crate::schema::CourierConfig;
use courier_common::ConfigError;

/// Run all validations on a config, collecting all errors.
pub fn validate(config: &CourierConfig) -> Result<(), ConfigError> {
    let mut errors: Vec<String> = Vec::new();

    if config.api.base_url.is_empty() {
        errors.push("api.base_url must not be empty".into());
    }
    if config.realtime.url.is_empty() {
        errors.push("realtime.url must not be empty".into());
    }
    if config.api.request_timeout_secs == 0 {
        errors.push("api.request_timeout_secs must be positive".into());
    }
    if config.realtime.reconnect_delay_secs == 0 {
        errors.push("realtime.reconnect_delay_secs must be positive".into());
    }
    if config.realtime.max_reconnect_delay_secs < config.realtime.reconnect_delay_secs {
        errors.push("realtime.max_reconnect_delay_secs must be >= reconnect_delay_secs".into());
    }
    if config.geolocation.timeout_ms == 0 {
        errors.push("geolocation.timeout_ms must be positive".into());
    }
    if config.presence.publish_interval_secs == 0 {
        errors.push("presence.publish_interval_secs must be positive".into());
    }
    if config.presence.ride_publish_interval_secs == 0 {
        errors.push("presence.ride_publish_interval_secs must be positive".into());
    }
    if config.presence.recovery_timeout_secs == 0 {
        errors.push("presence.recovery_timeout_secs must be positive".into());
    }
    // The debounce window must close well before the recovery timer fires,
    // otherwise a retry could never be accepted.
    if config.presence.debounce_ms >= config.presence.recovery_timeout_secs * 1000 {
        errors.push("presence.debounce_ms must be shorter than recovery_timeout_secs".into());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(errors.join("; ")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(validate(&CourierConfig::default()).is_ok());
    }

    #[test]
    fn empty_base_url_rejected() {
        let mut config = CourierConfig::default();
        config.api.base_url = String::new();
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("api.base_url"));
    }

    #[test]
    fn zero_intervals_rejected() {
        let mut config = CourierConfig::default();
        config.presence.publish_interval_secs = 0;
        config.geolocation.timeout_ms = 0;
        let err = validate(&config).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("publish_interval_secs"));
        assert!(msg.contains("geolocation.timeout_ms"));
    }

    #[test]
    fn debounce_longer_than_recovery_rejected() {
        let mut config = CourierConfig::default();
        config.presence.debounce_ms = 20_000;
        config.presence.recovery_timeout_secs = 15;
        assert!(validate(&config).is_err());
    }
}
