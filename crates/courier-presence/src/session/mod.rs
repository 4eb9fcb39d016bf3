//! The presence session state machine.
//!
//! One session per active client. A background task owns every piece of
//! mutable state and consumes a single command channel, so toggle
//! requests, network results, timer fires, and watch updates are strictly
//! serialized — at most one transition is ever in flight. Each transition
//! attempt carries a generation token; results from a superseded attempt
//! no-op instead of mutating state that no longer applies.

mod handle;
mod task;
mod types;

pub use handle::PresenceHandle;
pub use task::PresenceSession;
pub use types::{SessionConfig, SessionEvent, SessionSnapshot};
