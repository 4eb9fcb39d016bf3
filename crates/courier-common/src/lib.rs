pub mod errors;
pub mod time;
pub mod types;

pub use errors::{ApiError, ConfigError, CourierError, LocationError, PlatformHint, PresenceError};
pub use time::epoch_millis;
pub use types::{DriverId, DriverStatus, LocationSample, PresenceState, RideStatus};

pub type Result<T> = std::result::Result<T, CourierError>;
