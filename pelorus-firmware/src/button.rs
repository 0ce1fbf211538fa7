//! Polled pushbutton debouncer

use pelorus_core::clock::Instant;
use pelorus_hal::InputPin;

/// How long a level must hold before an edge is reported.
const SETTLE: Instant = Instant::new(0, 20_000_000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonEvent {
    Pressed,
    Released,
}

pub struct Debouncer<P> {
    pin: P,
    stable: bool,
    candidate: bool,
    candidate_since: Instant,
}

impl<P: InputPin> Debouncer<P> {
    pub fn new(pin: P, now: Instant) -> Self {
        let level = pin.is_high();
        Self {
            pin,
            stable: level,
            candidate: level,
            candidate_since: now,
        }
    }

    /// Sample the pin; emits an edge once the level has been steady for
    /// the settle window.
    pub fn poll(&mut self, now: Instant) -> Option<ButtonEvent> {
        let raw = self.pin.is_high();
        if raw != self.candidate {
            self.candidate = raw;
            self.candidate_since = now;
            return None;
        }
        if raw != self.stable && now.delta(self.candidate_since) >= SETTLE {
            self.stable = raw;
            return Some(if raw {
                ButtonEvent::Pressed
            } else {
                ButtonEvent::Released
            });
        }
        None
    }
}
