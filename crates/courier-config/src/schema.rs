//! Configuration schema types for Courier.
//!
//! All structs use `serde(default)` so partial configs work correctly.

use serde::{Deserialize, Serialize};

// =============================================================================
// API Config
// =============================================================================

/// REST API endpoint configuration.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the dispatch API (e.g., "https://api.example.com").
    pub base_url: String,
    /// Bearer token for authenticated requests.
    pub token: String,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".into(),
            token: String::new(),
            request_timeout_secs: 10,
        }
    }
}

impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("base_url", &self.base_url)
            .field("token", &"[REDACTED]")
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

// =============================================================================
// Realtime Config
// =============================================================================

/// Persistent-connection (WebSocket) configuration.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RealtimeConfig {
    /// WebSocket URL of the tracking gateway (e.g., "wss://rt.example.com/ws").
    pub url: String,
    /// Reconnect base delay in seconds.
    pub reconnect_delay_secs: u64,
    /// Maximum reconnect delay in seconds.
    pub max_reconnect_delay_secs: u64,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            url: "ws://localhost:8081/ws".into(),
            reconnect_delay_secs: 1,
            max_reconnect_delay_secs: 30,
        }
    }
}

impl std::fmt::Debug for RealtimeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealtimeConfig")
            .field("url", &self.url)
            .field("reconnect_delay_secs", &self.reconnect_delay_secs)
            .field("max_reconnect_delay_secs", &self.max_reconnect_delay_secs)
            .finish()
    }
}

// =============================================================================
// Geolocation Config
// =============================================================================

/// Device geolocation request configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeolocationConfig {
    /// Request high-accuracy fixes (GPS rather than cell/wifi).
    pub high_accuracy: bool,
    /// Timeout for a single fix, in milliseconds.
    pub timeout_ms: u64,
    /// Accept cached fixes up to this age, in milliseconds.
    pub maximum_age_ms: u64,
}

impl Default for GeolocationConfig {
    fn default() -> Self {
        Self {
            high_accuracy: true,
            timeout_ms: 10_000,
            maximum_age_ms: 0,
        }
    }
}

// =============================================================================
// Presence Config
// =============================================================================

/// Presence session timing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PresenceConfig {
    /// Interval between periodic location publishes while online, in seconds.
    pub publish_interval_secs: u64,
    /// Tighter publish interval while a ride is in progress, in seconds.
    pub ride_publish_interval_secs: u64,
    /// Toggle debounce window in milliseconds.
    pub debounce_ms: u64,
    /// Recovery timeout for a hung activation/deactivation, in seconds.
    pub recovery_timeout_secs: u64,
}

impl Default for PresenceConfig {
    fn default() -> Self {
        Self {
            publish_interval_secs: 5,
            ride_publish_interval_secs: 2,
            debounce_ms: 500,
            recovery_timeout_secs: 15,
        }
    }
}

// =============================================================================
// Logging Config
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default tracing filter directive.
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "courier=info".into(),
        }
    }
}

// =============================================================================
// Root Config
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CourierConfig {
    pub api: ApiConfig,
    pub realtime: RealtimeConfig,
    pub geolocation: GeolocationConfig,
    pub presence: PresenceConfig,
    pub logging: LoggingConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_timings() {
        let config = CourierConfig::default();
        assert_eq!(config.presence.publish_interval_secs, 5);
        assert_eq!(config.presence.debounce_ms, 500);
        assert_eq!(config.presence.recovery_timeout_secs, 15);
        assert!(config.presence.ride_publish_interval_secs < config.presence.publish_interval_secs);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config: CourierConfig = toml::from_str(
            r#"
[api]
base_url = "https://dispatch.example.com"
"#,
        )
        .unwrap();
        assert_eq!(config.api.base_url, "https://dispatch.example.com");
        assert_eq!(config.api.request_timeout_secs, 10);
        assert_eq!(config.presence.publish_interval_secs, 5);
    }

    #[test]
    fn token_is_redacted_in_debug_output() {
        let mut config = CourierConfig::default();
        config.api.token = "secret-token".into();
        let debug = format!("{config:?}");
        assert!(!debug.contains("secret-token"));
        assert!(debug.contains("[REDACTED]"));
    }
}
