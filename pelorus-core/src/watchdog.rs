//! Silent-channel watchdog
//!
//! The receive engine's idle timeout frames messages, but it only runs
//! while bytes are arriving; a channel whose sensor is unplugged (or
//! whose hardware wedged) just never completes. This watchdog tracks
//! completions per channel and flags the channel as stuck after a
//! multi-second silence, at which point the owner aborts and re-arms the
//! transfer. Any partial data is discarded by that recovery.

use crate::clock::Instant;

/// Per-channel stuck-transfer detector.
///
/// Call [`record_activity`](ActivityWatchdog::record_activity) whenever
/// the channel completes a transfer, and [`expired`](ActivityWatchdog::expired)
/// once per loop iteration.
#[derive(Debug, Clone)]
pub struct ActivityWatchdog {
    stuck_after: Instant,
    last_activity: Instant,
}

impl ActivityWatchdog {
    /// Create a watchdog that trips after `stuck_after` of silence.
    pub const fn new(stuck_after: Instant) -> Self {
        Self {
            stuck_after,
            last_activity: Instant::ZERO,
        }
    }

    /// Note that the channel produced a completion.
    pub fn record_activity(&mut self, now: Instant) {
        self.last_activity = now;
    }

    /// True when the channel has been silent long enough to be presumed
    /// stuck. Tripping re-baselines the timer, so the recovery fires
    /// once per silence window rather than every following poll.
    pub fn expired(&mut self, now: Instant) -> bool {
        if now.delta(self.last_activity) >= self.stuck_after {
            self.last_activity = now;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIMIT: Instant = Instant::new(5, 0);

    #[test]
    fn quiet_channel_expires_once_per_window() {
        let mut wd = ActivityWatchdog::new(LIMIT);
        assert!(!wd.expired(Instant::new(4, 999_999_999)));
        assert!(wd.expired(Instant::new(5, 0)));
        // Expiry re-baselined the timer, so a fresh window starts.
        assert!(!wd.expired(Instant::new(9, 999_999_999)));
        assert!(wd.expired(Instant::new(10, 0)));
    }

    #[test]
    fn activity_defers_expiry() {
        let mut wd = ActivityWatchdog::new(LIMIT);
        wd.record_activity(Instant::new(3, 0));
        assert!(!wd.expired(Instant::new(7, 999_999_999)));
        assert!(wd.expired(Instant::new(8, 0)));
    }

    #[test]
    fn survives_the_seconds_wrap() {
        let mut wd = ActivityWatchdog::new(LIMIT);
        wd.record_activity(Instant::new(u32::MAX, 0));
        assert!(!wd.expired(Instant::new(2, 0)));
        assert!(wd.expired(Instant::new(5, 0)));
    }
}
