//! Pelorus Hardware Abstraction Layer
//!
//! This crate defines hardware abstraction traits that can be implemented
//! by chip-specific HALs (STM32F0 today, others later). This keeps the
//! receive engine, clock, and parsers board-agnostic and testable on the
//! host.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Application (pelorus-firmware)         │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  pelorus-hal (this crate - traits)      │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  pelorus-hal-stm32f0                    │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Traits
//!
//! - [`uart::ByteRx`], [`uart::ByteTx`] - register-level serial access
//! - [`time::TickCounter`] - sub-tick countdown register access
//! - [`gpio::OutputPin`], [`gpio::InputPin`] - digital I/O

#![no_std]
#![deny(unsafe_code)]

pub mod gpio;
pub mod time;
pub mod uart;

// Re-export key traits at crate root for convenience
pub use gpio::{InputPin, OutputPin};
pub use time::TickCounter;
pub use uart::{ByteRx, ByteTx, LineError};
