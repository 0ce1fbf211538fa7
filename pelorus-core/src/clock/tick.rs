//! Interrupt-written wall clock with a seqlock read path

use core::sync::atomic::{fence, AtomicU32, Ordering};

use super::instant::Instant;

/// Free-running clock advanced by the periodic timer interrupt.
///
/// Designed to live in a `static`: the tick interrupt is the only writer
/// (via [`tick_advance`](TickClock::tick_advance)), everything else reads
/// through [`now`](TickClock::now). Reads never block and never mask
/// interrupts; a reader that races the tick simply retries, bounded in
/// practice by the tick frequency.
///
/// The generation counter is incremented before and after every time
/// write, so it is odd exactly while a write is in flight. A reader
/// accepts a snapshot only when the generation was even and unchanged
/// around it.
pub struct TickClock {
    generation: AtomicU32,
    secs: AtomicU32,
    nanos: AtomicU32,
    tick_ns: u32,
}

impl TickClock {
    /// Create a clock at the epoch that advances by `tick_ns` nanoseconds
    /// per tick.
    pub const fn new(tick_ns: u32) -> Self {
        Self {
            generation: AtomicU32::new(0),
            secs: AtomicU32::new(0),
            nanos: AtomicU32::new(0),
            tick_ns,
        }
    }

    /// Nanoseconds added per tick.
    pub const fn tick_period_ns(&self) -> u32 {
        self.tick_ns
    }

    /// Advance the clock by one tick period.
    ///
    /// Must be called only from the timer interrupt; there is exactly one
    /// writer. The seconds counter wraps at the `u32` boundary, which is
    /// a defined outcome (see [`Instant::delta`]).
    pub fn tick_advance(&self) {
        let next = Instant {
            secs: self.secs.load(Ordering::Relaxed),
            nanos: self.nanos.load(Ordering::Relaxed),
        }
        .wrapping_add_nanos(self.tick_ns);

        // Odd generation marks the write window.
        self.generation.fetch_add(1, Ordering::Acquire);
        self.secs.store(next.secs, Ordering::Relaxed);
        self.nanos.store(next.nanos, Ordering::Relaxed);
        self.generation.fetch_add(1, Ordering::Release);
    }

    /// Read the current time.
    ///
    /// Retries while a tick write is observed in progress, so the
    /// returned value is always one the writer actually produced.
    pub fn now(&self) -> Instant {
        loop {
            let before = self.generation.load(Ordering::Acquire);
            let snapshot = Instant {
                secs: self.secs.load(Ordering::Relaxed),
                nanos: self.nanos.load(Ordering::Relaxed),
            };
            fence(Ordering::Acquire);
            let after = self.generation.load(Ordering::Relaxed);
            if before == after && before & 1 == 0 {
                return snapshot;
            }
        }
    }

    /// Read the current time with sub-tick resolution.
    ///
    /// Adds the time elapsed inside the current tick, derived from the
    /// timer's countdown register. A counter reporting 0 Hz degrades to
    /// plain [`now`](TickClock::now) resolution.
    pub fn now_with(&self, counter: &impl pelorus_hal::TickCounter) -> Instant {
        let base = self.now();
        let hz = counter.hz();
        if hz == 0 {
            return base;
        }
        let elapsed = counter.reload().saturating_sub(counter.current());
        let sub_ns = (elapsed as u64 * super::NANOS_PER_SEC as u64 / hz as u64) as u32;
        base.wrapping_add_nanos(sub_ns)
    }
}
