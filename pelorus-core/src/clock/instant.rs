//! Timestamp value type and wraparound-safe arithmetic

/// Nanoseconds per second; the `nanos` field stays below this.
pub const NANOS_PER_SEC: u32 = 1_000_000_000;

/// A point on (or a span of) the tick clock's timeline.
///
/// The seconds counter wraps at the `u32` boundary by design; wrapping is
/// an ordinary, defined outcome, not an error. Durations reuse this type:
/// [`Instant::delta`] produces one, and it reads as seconds + nanoseconds
/// of elapsed time rather than as an absolute stamp.
///
/// The derived ordering (seconds first, then nanoseconds) is only
/// meaningful between stamps less than one wrap apart; comparing stamps
/// separated by more than a full wrap of the seconds counter is out of
/// contract.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Instant {
    /// Whole seconds since the clock was started. Wraps.
    pub secs: u32,
    /// Additional nanoseconds, always in `[0, 999_999_999]`.
    pub nanos: u32,
}

impl Instant {
    /// The clock epoch.
    pub const ZERO: Instant = Instant { secs: 0, nanos: 0 };

    /// Build a stamp. `nanos` must already be normalized (`< 1e9`).
    pub const fn new(secs: u32, nanos: u32) -> Self {
        Instant { secs, nanos }
    }

    /// Add a raw nanosecond count, carrying overflow into the seconds
    /// field and letting the seconds wrap.
    pub const fn wrapping_add_nanos(self, nanos: u32) -> Instant {
        let total = self.nanos as u64 + nanos as u64;
        Instant {
            secs: self.secs.wrapping_add((total / NANOS_PER_SEC as u64) as u32),
            nanos: (total % NANOS_PER_SEC as u64) as u32,
        }
    }

    /// Add a duration, wrapping at the seconds boundary.
    pub const fn wrapping_add(self, other: Instant) -> Instant {
        Instant {
            secs: self.secs.wrapping_add(other.secs),
            nanos: self.nanos,
        }
        .wrapping_add_nanos(other.nanos)
    }

    /// Elapsed time from `earlier` to `self`.
    ///
    /// A numerically smaller `self.secs` is taken to mean the seconds
    /// counter wrapped exactly once in between. When the nanosecond
    /// subtraction borrows out of zero seconds, the seconds result wraps
    /// to `u32::MAX`, mirroring the wrap on the way up.
    pub const fn delta(self, earlier: Instant) -> Instant {
        let mut secs = self.secs.wrapping_sub(earlier.secs);
        let nanos = if self.nanos >= earlier.nanos {
            self.nanos - earlier.nanos
        } else {
            secs = secs.wrapping_sub(1);
            NANOS_PER_SEC - earlier.nanos + self.nanos
        };
        Instant { secs, nanos }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn delta_within_the_same_second() {
        let a = Instant::new(10, 500);
        let b = Instant::new(10, 200);
        assert_eq!(a.delta(b), Instant::new(0, 300));
    }

    #[test]
    fn delta_borrows_from_seconds() {
        let a = Instant::new(11, 100);
        let b = Instant::new(10, 900_000_000);
        assert_eq!(a.delta(b), Instant::new(0, 100_000_100));
    }

    #[test]
    fn delta_across_the_seconds_wrap() {
        let a = Instant::new(2, 0);
        let b = Instant::new(u32::MAX - 1, 0);
        assert_eq!(a.delta(b), Instant::new(4, 0));
    }

    #[test]
    fn delta_borrow_out_of_zero_seconds_wraps() {
        let a = Instant::new(0, 100);
        let b = Instant::new(0, 200);
        assert_eq!(a.delta(b), Instant::new(u32::MAX, 999_999_900));
    }

    #[test]
    fn ordering_is_seconds_then_nanos() {
        assert!(Instant::new(1, 0) > Instant::new(0, 999_999_999));
        assert!(Instant::new(1, 1) > Instant::new(1, 0));
        assert_eq!(Instant::new(3, 5), Instant::new(3, 5));
    }

    #[test]
    fn add_nanos_carries_and_wraps() {
        let t = Instant::new(u32::MAX, 999_999_999);
        assert_eq!(t.wrapping_add_nanos(1), Instant::new(0, 0));
        assert_eq!(
            Instant::ZERO.wrapping_add_nanos(2_500_000_000),
            Instant::new(2, 500_000_000)
        );
    }

    proptest! {
        /// Recombining an earlier stamp with a delta reproduces the later
        /// stamp, for any pair at most one wrap apart; the delta's nanos
        /// are always normalized.
        #[test]
        fn delta_recombines(
            e_secs in any::<u32>(),
            e_nanos in 0u32..NANOS_PER_SEC,
            d_secs in any::<u32>(),
            d_nanos in 0u32..NANOS_PER_SEC,
        ) {
            let earlier = Instant::new(e_secs, e_nanos);
            let span = Instant::new(d_secs, d_nanos);
            let later = earlier.wrapping_add(span);

            let measured = later.delta(earlier);
            prop_assert!(measured.nanos < NANOS_PER_SEC);
            prop_assert_eq!(measured, span);
            prop_assert_eq!(earlier.wrapping_add(measured), later);
        }
    }
}
