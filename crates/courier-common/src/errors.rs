use std::path::PathBuf;

/// Platform family hint attached to permission errors. Used only to pick
/// user-facing remediation text, never for control flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformHint {
    Ios,
    Other,
}

/// Closed taxonomy for geolocation failures. Platform codes 1/2/3 map to
/// `PermissionDenied`/`PositionUnavailable`/`Timeout`; everything else is
/// `Unknown`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LocationError {
    #[error("location permission denied")]
    PermissionDenied { hint: PlatformHint },

    #[error("position unavailable")]
    PositionUnavailable,

    #[error("location request timed out")]
    Timeout,

    #[error("geolocation is not supported on this device")]
    Unsupported,

    #[error("location error: {0}")]
    Unknown(String),
}

impl LocationError {
    /// User-facing remediation text.
    pub fn guidance(&self) -> &'static str {
        match self {
            Self::PermissionDenied {
                hint: PlatformHint::Ios,
            } => {
                "Location access is blocked. Open Settings > Privacy & Security > \
                 Location Services and allow access for your browser, then reload."
            }
            Self::PermissionDenied { .. } => {
                "Location access is blocked. Allow location access for this app \
                 in your device settings and try again."
            }
            Self::PositionUnavailable => {
                "Your position could not be determined. Move to an area with \
                 better signal and try again."
            }
            Self::Timeout => "Locating you took too long. Try again.",
            Self::Unsupported => "This device does not support location services.",
            Self::Unknown(_) => "Something went wrong while locating you. Try again.",
        }
    }
}

/// Failures at the REST boundary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    #[error("request rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("network unavailable: {0}")]
    Network(String),

    #[error("malformed response: {0}")]
    Decode(String),
}

/// Failures surfaced by the presence session to the UI.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PresenceError {
    #[error("could not go online: {0}")]
    ActivationRejected(String),

    #[error("could not go offline: {0}")]
    DeactivationRejected(String),

    #[error("network unavailable: {0}")]
    NetworkUnavailable(String),

    #[error("could not confirm status with the server: {0}")]
    ReconciliationFailed(String),

    #[error(transparent)]
    Location(#[from] LocationError),
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("config parse error: {0}")]
    ParseError(String),

    #[error("config validation error: {0}")]
    ValidationError(String),
}

#[derive(Debug, thiserror::Error)]
pub enum CourierError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Presence(#[from] PresenceError),

    #[error(transparent)]
    Location(#[from] LocationError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_error_display() {
        let err = LocationError::PermissionDenied {
            hint: PlatformHint::Other,
        };
        assert_eq!(err.to_string(), "location permission denied");

        let err = LocationError::Timeout;
        assert_eq!(err.to_string(), "location request timed out");

        let err = LocationError::Unknown("code 99".into());
        assert_eq!(err.to_string(), "location error: code 99");
    }

    #[test]
    fn permission_guidance_is_platform_specific() {
        let ios = LocationError::PermissionDenied {
            hint: PlatformHint::Ios,
        };
        let other = LocationError::PermissionDenied {
            hint: PlatformHint::Other,
        };
        assert!(ios.guidance().contains("Settings > Privacy"));
        assert!(!other.guidance().contains("Settings > Privacy"));
    }

    #[test]
    fn api_error_display() {
        let err = ApiError::Rejected {
            status: 403,
            message: "driver pending approval".into(),
        };
        assert_eq!(
            err.to_string(),
            "request rejected (403): driver pending approval"
        );

        let err = ApiError::Network("connection refused".into());
        assert_eq!(err.to_string(), "network unavailable: connection refused");
    }

    #[test]
    fn presence_error_from_location() {
        let err: PresenceError = LocationError::PositionUnavailable.into();
        assert!(matches!(err, PresenceError::Location(_)));
        assert_eq!(err.to_string(), "position unavailable");
    }

    #[test]
    fn courier_error_from_config() {
        let config_err = ConfigError::ParseError("bad toml".into());
        let err: CourierError = config_err.into();
        assert!(matches!(err, CourierError::Config(_)));
        assert!(err.to_string().contains("bad toml"));
    }

    #[test]
    fn courier_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "stdin closed");
        let err: CourierError = io_err.into();
        assert!(matches!(err, CourierError::Io(_)));
        assert!(err.to_string().contains("stdin closed"));
    }
}
