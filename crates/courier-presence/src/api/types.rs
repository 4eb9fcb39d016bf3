//! Wire types for the dispatch REST API.

use courier_common::DriverStatus;
use serde::{Deserialize, Serialize};

/// Driver profile as returned by the profile endpoints. Only the fields
/// the presence core reads are modeled; the server sends more.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverProfile {
    pub id: String,
    pub status: DriverStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl DriverProfile {
    pub fn is_online(&self) -> bool {
        self.status.is_online()
    }
}

/// Body of `POST /tracking/location`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationUpdate {
    pub latitude: f64,
    pub longitude: f64,
    pub driver_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_parses_server_payload() {
        let profile: DriverProfile = serde_json::from_str(
            r#"{"id":"drv-1","status":"on_the_way","name":"Sam","vehicle":"van"}"#,
        )
        .unwrap();
        assert_eq!(profile.id, "drv-1");
        assert!(profile.is_online());
    }

    #[test]
    fn location_update_uses_camel_case() {
        let update = LocationUpdate {
            latitude: 10.0,
            longitude: 20.0,
            driver_id: "drv-1".into(),
        };
        let json = serde_json::to_string(&update).unwrap();
        assert!(json.contains("\"driverId\":\"drv-1\""));
        assert!(json.contains("\"latitude\":10.0"));
    }
}
