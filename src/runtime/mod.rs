//! Runtime helpers for the collection engine
//!
//! Small dual-target layer over timers, clocks, and task spawning so the
//! engine logic is identical in the browser and in native unit tests. In the
//! browser everything maps to event-loop primitives; natively, timers are
//! backed by a helper thread and abandoned work is simply dropped.

mod sleep;
mod spawn;
mod time;

pub use sleep::sleep;
pub use spawn::spawn_abandoned;
pub use time::{now_ms, wallclock_ms};
