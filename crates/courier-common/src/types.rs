use serde::{Deserialize, Serialize};
use std::fmt;

/// A single resolved location fix. Immutable once produced; a newer
/// sample supersedes it, nothing mutates it in place.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocationSample {
    pub lat: f64,
    pub lng: f64,
    /// Epoch milliseconds at which the fix was resolved.
    pub timestamp_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DriverId(pub String);

impl fmt::Display for DriverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for DriverId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// The driver `status` field as reported by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DriverStatus {
    Available,
    Busy,
    OnTheWay,
    Offline,
    Pending,
}

impl DriverStatus {
    /// Whether this status counts as "visible to dispatch".
    pub fn is_online(self) -> bool {
        matches!(self, Self::Available | Self::Busy | Self::OnTheWay)
    }
}

/// Status of the externally-owned active ride. The presence core only
/// observes it to route samples; it never drives ride transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RideStatus {
    Scheduled,
    Assigned,
    InProgress,
    Completed,
    Cancelled,
}

impl RideStatus {
    pub fn is_in_progress(self) -> bool {
        matches!(self, Self::InProgress)
    }
}

/// Presence session states. `Activating`, `Deactivating`, and
/// `StuckRecovering` are transitional; toggles are refused while in them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PresenceState {
    Offline,
    Activating,
    Online,
    Deactivating,
    StuckRecovering,
}

impl PresenceState {
    /// A settled state accepts toggles and unsolicited server truth.
    pub fn is_settled(self) -> bool {
        matches!(self, Self::Offline | Self::Online)
    }

    pub fn is_online(self) -> bool {
        matches!(self, Self::Online)
    }
}

impl fmt::Display for PresenceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Offline => "offline",
            Self::Activating => "activating",
            Self::Online => "online",
            Self::Deactivating => "deactivating",
            Self::StuckRecovering => "stuck_recovering",
        };
        write!(f, "{s}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn driver_status_online_mapping() {
        assert!(DriverStatus::Available.is_online());
        assert!(DriverStatus::Busy.is_online());
        assert!(DriverStatus::OnTheWay.is_online());
        assert!(!DriverStatus::Offline.is_online());
        assert!(!DriverStatus::Pending.is_online());
    }

    #[test]
    fn driver_status_snake_case_wire_format() {
        let status: DriverStatus = serde_json::from_str("\"on_the_way\"").unwrap();
        assert_eq!(status, DriverStatus::OnTheWay);
        assert_eq!(
            serde_json::to_string(&DriverStatus::Available).unwrap(),
            "\"available\""
        );
    }

    #[test]
    fn presence_state_settled() {
        assert!(PresenceState::Offline.is_settled());
        assert!(PresenceState::Online.is_settled());
        assert!(!PresenceState::Activating.is_settled());
        assert!(!PresenceState::Deactivating.is_settled());
        assert!(!PresenceState::StuckRecovering.is_settled());
    }

    #[test]
    fn sample_serializes_without_absent_accuracy() {
        let sample = LocationSample {
            lat: 10.0,
            lng: 20.0,
            timestamp_ms: 1000,
            accuracy: None,
        };
        let json = serde_json::to_string(&sample).unwrap();
        assert!(!json.contains("accuracy"));

        let sample = LocationSample {
            accuracy: Some(4.5),
            ..sample
        };
        let json = serde_json::to_string(&sample).unwrap();
        assert!(json.contains("\"accuracy\":4.5"));
    }
}
