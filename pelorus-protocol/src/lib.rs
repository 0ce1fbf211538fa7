//! Wire-format layer for the Pelorus sensor hub
//!
//! Everything between "a completed chunk of raw bytes" and "a record the
//! application can use" lives here:
//!
//! - [`sentence`] reassembles `\r\n`-terminated ASCII lines out of
//!   arbitrarily chunked input
//! - [`gpgll`] classifies and decodes the one NMEA sentence type this
//!   firmware consumes
//! - [`pm`] parses the particulate-matter sensor's binary frames one
//!   byte at a time
//!
//! All buffers are fixed-capacity and every parser degrades to "no
//! record this time" on malformed input; nothing here panics or
//! allocates.

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod gpgll;
pub mod pm;
pub mod sentence;

pub use gpgll::GpgllFix;
pub use pm::{FeedStatus, PmFrameParser, PmRecord};
pub use sentence::{Sentence, SentenceAssembler, MAX_SENTENCE_LEN};
