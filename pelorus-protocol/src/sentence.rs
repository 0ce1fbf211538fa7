//! Reassembly of `\r\n`-terminated lines from chunked input
//!
//! The receive engine hands over chunks whose boundaries are set by
//! silence on the wire, not by record structure: a chunk may hold half a
//! sentence, several sentences, or a tail plus the head of the next one.
//! The assembler accumulates chunks and lets the caller pull complete
//! lines off the front as soon as their delimiter has arrived.

use heapless::Vec;

/// Longest extractable line; anything longer is dropped as malformed.
pub const MAX_SENTENCE_LEN: usize = 128;

/// One extracted line, delimiter stripped.
pub type Sentence = Vec<u8, MAX_SENTENCE_LEN>;

const DELIMITER: &[u8] = b"\r\n";

/// Append would have overrun the assembly buffer; it has been reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Overflow;

/// Accumulates chunks and yields delimiter-terminated records.
///
/// `N` is the assembly capacity in bytes. After every
/// [`append`](SentenceAssembler::append), drain with
/// `while let Some(s) = assembler.extract_next()` so records surface as
/// soon as their delimiter arrives, independent of chunk boundaries.
pub struct SentenceAssembler<const N: usize> {
    buf: Vec<u8, N>,
}

impl<const N: usize> SentenceAssembler<N> {
    pub const fn new() -> Self {
        Self { buf: Vec::new() }
    }

    /// Bytes currently buffered (complete and partial records).
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Add one completed chunk to the assembly.
    ///
    /// A chunk that does not fit means the stream lost its framing or a
    /// line never terminated; a corrupt partial record is worthless, so
    /// the whole assembly is dropped to resynchronize and the error
    /// reported.
    pub fn append(&mut self, chunk: &[u8]) -> Result<(), Overflow> {
        if self.buf.len() + chunk.len() < N {
            // Cannot fail, headroom was just checked.
            let _ = self.buf.extend_from_slice(chunk);
            Ok(())
        } else {
            self.buf.clear();
            Err(Overflow)
        }
    }

    /// Pull the first complete record off the front of the assembly.
    ///
    /// Returns `None` when no delimiter is buffered yet; the assembler
    /// cannot know whether more bytes are coming, so it waits for the
    /// next append. A zero-length record (back-to-back delimiters) is a
    /// legal extraction. A record longer than [`MAX_SENTENCE_LEN`] is
    /// discarded in place and scanning continues with whatever follows.
    pub fn extract_next(&mut self) -> Option<Sentence> {
        loop {
            let end = self
                .buf
                .windows(DELIMITER.len())
                .position(|w| w == DELIMITER)?;
            if end > MAX_SENTENCE_LEN {
                self.consume(end + DELIMITER.len());
                continue;
            }
            let mut sentence = Sentence::new();
            // Cannot fail, end is within the sentence capacity.
            let _ = sentence.extend_from_slice(&self.buf[..end]);
            self.consume(end + DELIMITER.len());
            return Some(sentence);
        }
    }

    /// Remove `n` bytes from the front, shifting the remainder down.
    fn consume(&mut self, n: usize) {
        let remaining = self.buf.len() - n;
        self.buf.copy_within(n.., 0);
        self.buf.truncate(remaining);
    }
}

impl<const N: usize> Default for SentenceAssembler<N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::vec::Vec as StdVec;

    fn drain<const N: usize>(asm: &mut SentenceAssembler<N>) -> StdVec<StdVec<u8>> {
        let mut out = StdVec::new();
        while let Some(s) = asm.extract_next() {
            out.push(s.to_vec());
        }
        out
    }

    #[test]
    fn extracts_records_in_arrival_order() {
        let mut asm: SentenceAssembler<256> = SentenceAssembler::new();
        asm.append(b"$GPGLL,one\r\n$GPGLL,two\r\npartial").unwrap();
        assert_eq!(drain(&mut asm), [b"$GPGLL,one".to_vec(), b"$GPGLL,two".to_vec()]);
        assert_eq!(asm.len(), b"partial".len());

        asm.append(b"\r\n").unwrap();
        assert_eq!(drain(&mut asm), [b"partial".to_vec()]);
        assert!(asm.is_empty());
    }

    #[test]
    fn delimiter_split_across_appends() {
        let mut asm: SentenceAssembler<64> = SentenceAssembler::new();
        asm.append(b"abc\r").unwrap();
        assert_eq!(asm.extract_next(), None);
        asm.append(b"\n").unwrap();
        assert_eq!(asm.extract_next().unwrap(), b"abc");
    }

    #[test]
    fn empty_record_is_a_legal_extraction() {
        let mut asm: SentenceAssembler<64> = SentenceAssembler::new();
        asm.append(b"\r\nX\r\n").unwrap();
        assert_eq!(asm.extract_next().unwrap(), b"");
        assert_eq!(asm.extract_next().unwrap(), b"X");
        assert_eq!(asm.extract_next(), None);
    }

    #[test]
    fn overflow_resets_to_empty() {
        let mut asm: SentenceAssembler<16> = SentenceAssembler::new();
        asm.append(b"0123456789").unwrap();
        // 10 + 6 leaves no headroom, the whole assembly is dropped.
        assert_eq!(asm.append(b"abcdef"), Err(Overflow));
        assert!(asm.is_empty());

        // And the assembler keeps working afterwards.
        asm.append(b"ok\r\n").unwrap();
        assert_eq!(asm.extract_next().unwrap(), b"ok");
    }

    #[test]
    fn single_chunk_larger_than_capacity_is_dropped() {
        let mut asm: SentenceAssembler<16> = SentenceAssembler::new();
        assert_eq!(asm.append(&[b'x'; 20]), Err(Overflow));
        assert!(asm.is_empty());
    }

    #[test]
    fn oversized_record_is_discarded_not_extracted() {
        let mut asm: SentenceAssembler<512> = SentenceAssembler::new();
        let mut stream = StdVec::new();
        stream.extend_from_slice(&[b'a'; MAX_SENTENCE_LEN + 1]);
        stream.extend_from_slice(b"\r\nok\r\n");
        asm.append(&stream).unwrap();
        assert_eq!(drain(&mut asm), [b"ok".to_vec()]);
    }

    #[test]
    fn record_at_the_length_ceiling_still_extracts() {
        let mut asm: SentenceAssembler<512> = SentenceAssembler::new();
        let mut stream = StdVec::new();
        stream.extend_from_slice(&[b'a'; MAX_SENTENCE_LEN]);
        stream.extend_from_slice(b"\r\n");
        asm.append(&stream).unwrap();
        assert_eq!(asm.extract_next().unwrap().len(), MAX_SENTENCE_LEN);
    }

    proptest! {
        /// Feeding a byte stream whole or split at arbitrary points
        /// yields the identical sequence of extracted records.
        #[test]
        fn chunking_never_changes_extraction(
            records in proptest::collection::vec("[ -~]{0,40}", 0..8),
            cuts in proptest::collection::vec(any::<prop::sample::Index>(), 0..8),
        ) {
            let mut stream = StdVec::new();
            for r in &records {
                stream.extend_from_slice(r.as_bytes());
                stream.extend_from_slice(b"\r\n");
            }

            let mut whole: SentenceAssembler<1024> = SentenceAssembler::new();
            whole.append(&stream).unwrap();
            let single = drain(&mut whole);

            let mut split: SentenceAssembler<1024> = SentenceAssembler::new();
            let mut chunked = StdVec::new();
            let mut bounds: StdVec<usize> =
                cuts.iter().map(|c| c.index(stream.len() + 1)).collect();
            bounds.push(0);
            bounds.push(stream.len());
            bounds.sort_unstable();
            for pair in bounds.windows(2) {
                split.append(&stream[pair[0]..pair[1]]).unwrap();
                chunked.extend(drain(&mut split));
            }

            let expected: StdVec<StdVec<u8>> =
                records.iter().map(|r| r.as_bytes().to_vec()).collect();
            prop_assert_eq!(&single, &chunked);
            prop_assert_eq!(single, expected);
        }
    }
}
