//! Device geolocation wrapper.
//!
//! `LocationSampler` sits between the presence session and the platform
//! geolocation capability (`GeoBackend`). It produces a lazy, restartable
//! stream of fixes with errors surfaced as a side channel rather than as
//! stream termination: the platform may emit one bad fix and recover on
//! the next, and treating every error as fatal would flap the UI.

pub mod backend;
pub mod sampler;
pub mod types;

pub use backend::{BackendFault, GeoBackend, WatchUpdate};
pub use sampler::{LocationSampler, WatchEvent, WatchHandle};
pub use types::SampleConfig;
