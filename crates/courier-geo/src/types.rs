//! Request configuration for geolocation fixes.

/// Options passed to the platform capability for each fix or watch.
#[derive(Debug, Clone, Copy)]
pub struct SampleConfig {
    /// Request high-accuracy fixes (GPS rather than cell/wifi).
    pub high_accuracy: bool,
    /// Timeout for a single fix, in milliseconds.
    pub timeout_ms: u64,
    /// Accept cached fixes up to this age, in milliseconds.
    pub maximum_age_ms: u64,
}

impl Default for SampleConfig {
    fn default() -> Self {
        Self {
            high_accuracy: true,
            timeout_ms: 10_000,
            maximum_age_ms: 0,
        }
    }
}
