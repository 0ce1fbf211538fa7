//! Board-agnostic core logic for the Pelorus sensor hub
//!
//! This crate contains the timing and reception machinery that does not
//! depend on specific hardware implementations:
//!
//! - Monotonic tick clock with an interrupt-safe seqlock read path
//! - Idle-timeout-framed asynchronous receive engine
//! - Silent-channel watchdog
//!
//! Everything here is polled from a single cooperative main loop; the
//! only state shared with interrupt context is the clock, and that is
//! handled lock-free inside [`clock::TickClock`].

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod clock;
pub mod rx;
pub mod watchdog;
