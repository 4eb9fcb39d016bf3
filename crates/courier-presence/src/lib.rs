//! Driver presence and location-synchronization core.
//!
//! Owns the presence toggle state machine (`session`), the dual-channel
//! location publisher (`channel`), the REST boundary (`api`), the
//! persistent tracking connection (`realtime`), and the active-ride
//! sample routing (`handoff`).

pub mod api;
pub mod channel;
pub mod handoff;
pub mod realtime;
pub mod session;

pub use api::{DispatchApi, DriverProfile, HttpDispatchApi, LocationUpdate};
pub use channel::{LocationFeed, PresenceChannel};
pub use handoff::{ActiveRideHandoff, SampleRoute};
pub use realtime::{RealtimeClient, RealtimeConfig, RealtimeEvent};
pub use session::{
    PresenceHandle, PresenceSession, SessionConfig, SessionEvent, SessionSnapshot,
};
