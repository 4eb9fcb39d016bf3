//! REST boundary to the dispatch API.

mod client;
mod types;

pub use client::{DispatchApi, HttpDispatchApi};
pub use types::{DriverProfile, LocationUpdate};
