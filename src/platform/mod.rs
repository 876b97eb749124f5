//! Runtime capabilities injected into the engine
//!
//! The range index needs an ordered map and the index cache needs a
//! monotonic millisecond clock. Both are supplied by the embedder instead of
//! being resolved globally, so tests can drive time by hand.

pub mod clock;
pub mod ordered_map;

pub use clock::{Clock, ManualClock, MonotonicClock};
pub use ordered_map::OrderedMap;
