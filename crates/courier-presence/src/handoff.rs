//! Active-ride sample routing.
//!
//! When a ride moves into an in-progress travel status, location samples
//! keep flowing from the same watch — only the consuming view and the
//! publish cadence change. The watch handle stays owned by the session;
//! this type only decides where samples go and how often they publish.

use courier_common::RideStatus;
use tracing::info;

/// Which view consumes location samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SampleRoute {
    #[default]
    Dashboard,
    Ride,
}

/// Observes the externally-owned active ride and derives the sample route.
#[derive(Debug, Default)]
pub struct ActiveRideHandoff {
    ride: Option<RideStatus>,
}

impl ActiveRideHandoff {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a ride status change. Returns `true` if the sample route
    /// changed as a result.
    pub fn observe(&mut self, status: RideStatus) -> bool {
        let before = self.route();
        self.ride = Some(status);
        let after = self.route();
        if before != after {
            info!(?status, from = ?before, to = ?after, "sample route switched");
        }
        before != after
    }

    /// Current sample consumer.
    pub fn route(&self) -> SampleRoute {
        match self.ride {
            Some(status) if status.is_in_progress() => SampleRoute::Ride,
            _ => SampleRoute::Dashboard,
        }
    }

    pub fn ride_active(&self) -> bool {
        self.route() == SampleRoute::Ride
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn route_follows_ride_status() {
        let mut handoff = ActiveRideHandoff::new();
        assert_eq!(handoff.route(), SampleRoute::Dashboard);

        assert!(!handoff.observe(RideStatus::Assigned));
        assert_eq!(handoff.route(), SampleRoute::Dashboard);

        assert!(handoff.observe(RideStatus::InProgress));
        assert_eq!(handoff.route(), SampleRoute::Ride);

        assert!(handoff.observe(RideStatus::Completed));
        assert_eq!(handoff.route(), SampleRoute::Dashboard);
    }

    #[test]
    fn repeated_in_progress_reports_no_change() {
        let mut handoff = ActiveRideHandoff::new();
        assert!(handoff.observe(RideStatus::InProgress));
        assert!(!handoff.observe(RideStatus::InProgress));
    }
}
