//! Monotonic tick clock
//!
//! A free-running counter advanced by the periodic timer interrupt and
//! read from ordinary code without masking interrupts. Readers use a
//! generation counter (seqlock) to detect and retry reads that raced a
//! tick, so no caller ever observes a half-written timestamp.

mod instant;
mod tick;

pub use instant::{Instant, NANOS_PER_SEC};
pub use tick::TickClock;
