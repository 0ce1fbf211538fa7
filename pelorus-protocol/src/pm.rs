//! Particulate-matter sensor frame parser
//!
//! PMS-family sensors push fixed-size binary frames continuously:
//!
//! ```text
//! ┌──────┬──────┬───────────┬──────────────┬─────────────┐
//! │ 0x42 │ 0x4D │ LENGTH BE │ 13 x u16 BE  │ CHECKSUM BE │
//! └──────┴──────┴───────────┴──────────────┴─────────────┘
//! ```
//!
//! LENGTH counts the data words plus the checksum word (28 bytes). The
//! checksum is the modular sum of every preceding byte, magic included.
//! The parser is fed one byte at a time and restarts its hunt for the
//! magic pair whenever anything about a frame looks wrong, so a stream
//! joined mid-frame converges on the next frame boundary.

use heapless::Vec;

/// First magic byte.
pub const MAGIC_1: u8 = 0x42;
/// Second magic byte.
pub const MAGIC_2: u8 = 0x4D;

/// Data words per frame: six concentrations, six particle counts, one
/// reserved word.
const DATA_WORDS: usize = 13;
const PAYLOAD_LEN: usize = DATA_WORDS * 2;
/// Wire value of the LENGTH field: payload plus the checksum word.
const FRAME_LENGTH: u16 = (PAYLOAD_LEN + 2) as u16;

/// Outcome of feeding one byte to [`PmFrameParser::feed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FeedStatus {
    /// Mid-frame; feed more bytes.
    Pending,
    /// A frame completed and validated; collect it with
    /// [`PmFrameParser::take_record`].
    Ready,
    /// The byte did not fit a frame; the parser restarted its magic
    /// hunt.
    Resync,
}

/// Particle concentrations from one sensor frame, in µg/m³.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PmRecord {
    /// PM1.0, factory calibration.
    pub pm1_0_std: u16,
    /// PM2.5, factory calibration.
    pub pm2_5_std: u16,
    /// PM10, factory calibration.
    pub pm10_std: u16,
    /// PM1.0 under atmospheric conditions.
    pub pm1_0_atm: u16,
    /// PM2.5 under atmospheric conditions.
    pub pm2_5_atm: u16,
    /// PM10 under atmospheric conditions.
    pub pm10_atm: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseState {
    Magic1,
    Magic2,
    LengthHigh,
    LengthLow,
    Payload,
    ChecksumHigh,
    ChecksumLow,
}

/// Byte-at-a-time state machine for the sensor's binary frames.
#[derive(Debug, Clone)]
pub struct PmFrameParser {
    state: ParseState,
    payload: Vec<u8, PAYLOAD_LEN>,
    sum: u16,
    length_high: u8,
    checksum_high: u8,
    record: Option<PmRecord>,
}

impl PmFrameParser {
    pub const fn new() -> Self {
        Self {
            state: ParseState::Magic1,
            payload: Vec::new(),
            sum: 0,
            length_high: 0,
            checksum_high: 0,
            record: None,
        }
    }

    /// Feed one received byte.
    pub fn feed(&mut self, byte: u8) -> FeedStatus {
        match self.state {
            ParseState::Magic1 => {
                if byte == MAGIC_1 {
                    self.sum = u16::from(byte);
                    self.state = ParseState::Magic2;
                    FeedStatus::Pending
                } else {
                    FeedStatus::Resync
                }
            }
            ParseState::Magic2 => {
                if byte == MAGIC_2 {
                    self.sum = self.sum.wrapping_add(u16::from(byte));
                    self.state = ParseState::LengthHigh;
                    FeedStatus::Pending
                } else if byte == MAGIC_1 {
                    // Could be the real first magic byte; keep waiting
                    // for its pair. The running sum already covers it.
                    FeedStatus::Resync
                } else {
                    self.state = ParseState::Magic1;
                    FeedStatus::Resync
                }
            }
            ParseState::LengthHigh => {
                self.sum = self.sum.wrapping_add(u16::from(byte));
                self.length_high = byte;
                self.state = ParseState::LengthLow;
                FeedStatus::Pending
            }
            ParseState::LengthLow => {
                self.sum = self.sum.wrapping_add(u16::from(byte));
                if u16::from_be_bytes([self.length_high, byte]) != FRAME_LENGTH {
                    self.restart();
                    return FeedStatus::Resync;
                }
                self.payload.clear();
                self.state = ParseState::Payload;
                FeedStatus::Pending
            }
            ParseState::Payload => {
                self.sum = self.sum.wrapping_add(u16::from(byte));
                // Cannot fail, capacity matches the payload length.
                let _ = self.payload.push(byte);
                if self.payload.len() == PAYLOAD_LEN {
                    self.state = ParseState::ChecksumHigh;
                }
                FeedStatus::Pending
            }
            ParseState::ChecksumHigh => {
                self.checksum_high = byte;
                self.state = ParseState::ChecksumLow;
                FeedStatus::Pending
            }
            ParseState::ChecksumLow => {
                let received = u16::from_be_bytes([self.checksum_high, byte]);
                let valid = received == self.sum;
                if valid {
                    self.record = Some(decode(&self.payload));
                }
                self.restart();
                if valid {
                    FeedStatus::Ready
                } else {
                    FeedStatus::Resync
                }
            }
        }
    }

    /// The most recently completed frame, surrendered to the caller.
    pub fn take_record(&mut self) -> Option<PmRecord> {
        self.record.take()
    }

    fn restart(&mut self) {
        self.state = ParseState::Magic1;
        self.payload.clear();
        self.sum = 0;
    }
}

impl Default for PmFrameParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Words 6..13 (particle counts and the reserved word) are not consumed.
fn decode(payload: &[u8]) -> PmRecord {
    let word = |i: usize| u16::from_be_bytes([payload[2 * i], payload[2 * i + 1]]);
    PmRecord {
        pm1_0_std: word(0),
        pm2_5_std: word(1),
        pm10_std: word(2),
        pm1_0_atm: word(3),
        pm2_5_atm: word(4),
        pm10_atm: word(5),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::vec::Vec as StdVec;

    const WORDS: [u16; DATA_WORDS] = [12, 34, 56, 11, 33, 55, 1000, 500, 250, 100, 50, 25, 0];

    fn frame(words: [u16; DATA_WORDS]) -> StdVec<u8> {
        let mut f = StdVec::from([MAGIC_1, MAGIC_2]);
        f.extend_from_slice(&FRAME_LENGTH.to_be_bytes());
        for w in words {
            f.extend_from_slice(&w.to_be_bytes());
        }
        let sum = f.iter().fold(0u16, |acc, &b| acc.wrapping_add(u16::from(b)));
        f.extend_from_slice(&sum.to_be_bytes());
        f
    }

    fn feed_all(parser: &mut PmFrameParser, bytes: &[u8]) -> StdVec<FeedStatus> {
        bytes.iter().map(|&b| parser.feed(b)).collect()
    }

    #[test]
    fn decodes_a_clean_frame() {
        let mut parser = PmFrameParser::new();
        let statuses = feed_all(&mut parser, &frame(WORDS));

        assert!(statuses[..statuses.len() - 1]
            .iter()
            .all(|&s| s == FeedStatus::Pending));
        assert_eq!(*statuses.last().unwrap(), FeedStatus::Ready);

        let record = parser.take_record().unwrap();
        assert_eq!(record.pm1_0_std, 12);
        assert_eq!(record.pm2_5_std, 34);
        assert_eq!(record.pm10_std, 56);
        assert_eq!(record.pm1_0_atm, 11);
        assert_eq!(record.pm2_5_atm, 33);
        assert_eq!(record.pm10_atm, 55);

        // The record is handed out once.
        assert_eq!(parser.take_record(), None);
    }

    #[test]
    fn garbage_between_frames_resyncs() {
        let mut parser = PmFrameParser::new();
        assert_eq!(parser.feed(0x00), FeedStatus::Resync);
        assert_eq!(parser.feed(0xFF), FeedStatus::Resync);

        feed_all(&mut parser, &frame(WORDS));
        assert!(parser.take_record().is_some());
    }

    #[test]
    fn corrupt_checksum_is_rejected_then_recovers() {
        let mut parser = PmFrameParser::new();
        let mut bad = frame(WORDS);
        let last = bad.len() - 1;
        bad[last] ^= 0x01;

        let statuses = feed_all(&mut parser, &bad);
        assert_eq!(*statuses.last().unwrap(), FeedStatus::Resync);
        assert_eq!(parser.take_record(), None);

        feed_all(&mut parser, &frame(WORDS));
        assert!(parser.take_record().is_some());
    }

    #[test]
    fn implausible_length_restarts_the_hunt() {
        let mut parser = PmFrameParser::new();
        let statuses = feed_all(&mut parser, &[MAGIC_1, MAGIC_2, 0x12, 0x34]);
        assert_eq!(*statuses.last().unwrap(), FeedStatus::Resync);

        feed_all(&mut parser, &frame(WORDS));
        assert!(parser.take_record().is_some());
    }

    #[test]
    fn repeated_first_magic_still_locks_on() {
        let mut parser = PmFrameParser::new();
        // A stray 0x42 immediately before a real frame: the parser keeps
        // treating the latest 0x42 as the candidate start.
        assert_eq!(parser.feed(MAGIC_1), FeedStatus::Pending);
        let statuses = feed_all(&mut parser, &frame(WORDS));
        assert_eq!(statuses[0], FeedStatus::Resync);
        assert_eq!(*statuses.last().unwrap(), FeedStatus::Ready);
        assert!(parser.take_record().is_some());
    }
}
