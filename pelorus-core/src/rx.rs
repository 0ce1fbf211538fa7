//! Idle-timeout-framed asynchronous receive engine
//!
//! The UART hardware offers nothing but a one-byte data register and a
//! data-ready flag. This engine turns that into a "receive into this
//! buffer, tell me when you're done" contract, where *done* means either
//! the buffer filled or the line went silent for a few character times.
//! Silence is the only framing signal available: the sensors on the
//! other end pause between messages, and there is no length prefix.
//!
//! Byte arrival is observed by polling from the main loop, not by a
//! receive interrupt; the loop must come around faster than one
//! character time or the one-byte hardware register will overrun.

use pelorus_hal::uart::ByteRx;

use crate::clock::{Instant, NANOS_PER_SEC};

/// Longest transfer the engine will accept, so lengths always fit `u16`.
pub const MAX_TRANSFER_LEN: usize = 65_528;

/// Idle timeout for a channel running at `baud` bits per second.
///
/// Three character times of silence end a message. One character on the
/// wire is 11 bit times (1 start + 8 data + 2 stop). `baud` must be
/// non-zero.
pub const fn idle_timeout(baud: u32) -> Instant {
    let ns = 3 * 11 * NANOS_PER_SEC as u64 / baud as u64;
    Instant::new(
        (ns / NANOS_PER_SEC as u64) as u32,
        (ns % NANOS_PER_SEC as u64) as u32,
    )
}

/// Completion signal for one receive transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Completion {
    /// No transfer has finished.
    None,
    /// A transfer finished with `len` bytes in the leased buffer.
    Data { len: u16 },
}

/// Why an [`RxEngine::arm`] call was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ArmError {
    /// The supplied buffer has zero length.
    EmptyBuffer,
    /// The supplied buffer exceeds [`MAX_TRANSFER_LEN`].
    BufferTooLarge,
    /// A transfer is already outstanding; it is never silently replaced.
    Busy,
    /// A finished transfer's buffer has not been taken back yet.
    CompletionPending,
}

struct Transfer<'b> {
    buf: &'b mut [u8],
    idx: u16,
    /// When the most recent byte landed; the idle timer baseline.
    last_byte: Instant,
}

/// Per-channel receive engine.
///
/// Owns the UART register view and, while a transfer is outstanding, the
/// caller's buffer. The lease is returned by
/// [`take_completion`](RxEngine::take_completion); until then the caller
/// cannot touch the buffer, which is exactly the contract the borrow
/// checker enforces for free.
pub struct RxEngine<'b, R> {
    uart: R,
    idle_timeout: Instant,
    active: Option<Transfer<'b>>,
    finished: Option<(&'b mut [u8], u16)>,
}

impl<'b, R: ByteRx> RxEngine<'b, R> {
    /// Wrap a UART register view with the given idle timeout
    /// (see [`idle_timeout`]).
    pub fn new(uart: R, idle_timeout: Instant) -> Self {
        Self {
            uart,
            idle_timeout,
            active: None,
            finished: None,
        }
    }

    /// Lease `buf` to the engine and start receiving into it.
    ///
    /// `now` becomes the idle-timer baseline and should come from the
    /// high-resolution clock read at the top of the loop iteration. On
    /// rejection the lease is handed straight back alongside the reason,
    /// so the caller never loses access to its own buffer.
    pub fn arm(
        &mut self,
        buf: &'b mut [u8],
        now: Instant,
    ) -> Result<(), (ArmError, &'b mut [u8])> {
        if buf.is_empty() {
            return Err((ArmError::EmptyBuffer, buf));
        }
        if buf.len() > MAX_TRANSFER_LEN {
            return Err((ArmError::BufferTooLarge, buf));
        }
        if self.active.is_some() {
            return Err((ArmError::Busy, buf));
        }
        if self.finished.is_some() {
            return Err((ArmError::CompletionPending, buf));
        }
        self.active = Some(Transfer {
            buf,
            idx: 0,
            last_byte: now,
        });
        Ok(())
    }

    /// Advance the engine; call once per loop iteration.
    pub fn poll(&mut self, now: Instant) {
        // Drain the one-byte hardware register even with no transfer
        // armed, so a stale byte cannot sit there and force an overrun.
        let incoming = self.uart.poll_byte();

        let transfer = match self.active.as_mut() {
            Some(t) => t,
            None => return,
        };

        if let Some(Ok(byte)) = incoming {
            transfer.buf[usize::from(transfer.idx)] = byte;
            transfer.idx += 1;
            transfer.last_byte = now;
        }
        // A byte with line errors is dropped and leaves the idle timer
        // untouched.

        if usize::from(transfer.idx) == transfer.buf.len() {
            self.finish();
        } else if transfer.idx > 0 && now.delta(transfer.last_byte) >= self.idle_timeout {
            self.finish();
        }
    }

    /// Force completion with whatever has been received so far.
    ///
    /// Recovery entry point for a wedged channel; a no-op when idle.
    pub fn abort(&mut self) {
        self.finish();
    }

    /// True while a transfer is outstanding.
    pub fn is_busy(&self) -> bool {
        self.active.is_some()
    }

    /// Peek at the completion signal without consuming it.
    pub fn completion(&self) -> Completion {
        match self.finished {
            Some((_, len)) => Completion::Data { len },
            None => Completion::None,
        }
    }

    /// Take back the leased buffer and the received length, clearing the
    /// completion so the engine can be re-armed.
    pub fn take_completion(&mut self) -> Option<(&'b mut [u8], u16)> {
        self.finished.take()
    }

    fn finish(&mut self) {
        if let Some(t) = self.active.take() {
            self.finished = Some((t.buf, t.idx));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pelorus_hal::uart::LineError;
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::rc::Rc;
    use std::vec;

    const TIMEOUT: Instant = idle_timeout(38_400);

    /// Scripted one-byte register: each `poll_byte` pops the next entry.
    #[derive(Clone, Default)]
    struct FakeUart(Rc<RefCell<VecDeque<Result<u8, LineError>>>>);

    impl FakeUart {
        fn push(&self, item: Result<u8, LineError>) {
            self.0.borrow_mut().push_back(item);
        }
    }

    impl ByteRx for FakeUart {
        fn poll_byte(&mut self) -> Option<Result<u8, LineError>> {
            self.0.borrow_mut().pop_front()
        }
    }

    fn at_us(us: u64) -> Instant {
        let ns = us * 1_000;
        Instant::new((ns / 1_000_000_000) as u32, (ns % 1_000_000_000) as u32)
    }

    #[test]
    fn timeout_constants_are_three_character_times() {
        assert_eq!(idle_timeout(38_400), Instant::new(0, 859_375));
        assert_eq!(idle_timeout(9_600), Instant::new(0, 3_437_500));
    }

    #[test]
    fn gaps_below_the_timeout_accumulate_one_completion() {
        let uart = FakeUart::default();
        let mut engine = RxEngine::new(uart.clone(), TIMEOUT);
        let mut buf = [0u8; 16];
        engine.arm(&mut buf, at_us(0)).unwrap();

        uart.push(Ok(b'A'));
        engine.poll(at_us(100));
        uart.push(Ok(b'B'));
        engine.poll(at_us(700)); // 600 us gap, below 859.375 us
        assert!(engine.is_busy());
        assert_eq!(engine.completion(), Completion::None);

        // Silence past the timeout ends the message.
        engine.poll(at_us(1_600));
        assert!(!engine.is_busy());
        assert_eq!(engine.completion(), Completion::Data { len: 2 });

        let (returned, len) = engine.take_completion().unwrap();
        assert_eq!(&returned[..usize::from(len)], b"AB");
        assert_eq!(engine.completion(), Completion::None);
    }

    #[test]
    fn a_full_buffer_completes_without_waiting_for_silence() {
        let uart = FakeUart::default();
        let mut engine = RxEngine::new(uart.clone(), TIMEOUT);
        let mut buf = [0u8; 3];
        engine.arm(&mut buf, at_us(0)).unwrap();

        for (i, b) in [b'x', b'y', b'z'].into_iter().enumerate() {
            uart.push(Ok(b));
            engine.poll(at_us(100 * (i as u64 + 1)));
        }
        assert_eq!(engine.completion(), Completion::Data { len: 3 });
        let (returned, len) = engine.take_completion().unwrap();
        assert_eq!(&returned[..usize::from(len)], b"xyz");
    }

    #[test]
    fn bytes_with_line_errors_are_dropped() {
        let uart = FakeUart::default();
        let mut engine = RxEngine::new(uart.clone(), TIMEOUT);
        let mut buf = [0u8; 16];
        engine.arm(&mut buf, at_us(0)).unwrap();

        uart.push(Ok(b'A'));
        engine.poll(at_us(100));
        // A corrupt character must not reset the idle baseline either:
        // the timeout still measures from the last *good* byte.
        uart.push(Err(LineError::Framing));
        engine.poll(at_us(900));
        engine.poll(at_us(1_000));
        assert_eq!(engine.completion(), Completion::Data { len: 1 });
    }

    #[test]
    fn no_bytes_means_no_timeout() {
        let uart = FakeUart::default();
        let mut engine = RxEngine::new(uart, TIMEOUT);
        let mut buf = [0u8; 16];
        engine.arm(&mut buf, at_us(0)).unwrap();

        engine.poll(at_us(10_000_000));
        assert!(engine.is_busy());
        assert_eq!(engine.completion(), Completion::None);
    }

    #[test]
    fn arm_validates_the_lease() {
        let uart = FakeUart::default();
        let mut engine = RxEngine::new(uart.clone(), TIMEOUT);

        let mut empty: [u8; 0] = [];
        let (err, _) = engine.arm(&mut empty, at_us(0)).unwrap_err();
        assert_eq!(err, ArmError::EmptyBuffer);

        let mut oversized = vec![0u8; MAX_TRANSFER_LEN + 1];
        let (err, _) = engine.arm(&mut oversized, at_us(0)).unwrap_err();
        assert_eq!(err, ArmError::BufferTooLarge);

        let mut first = [0u8; 4];
        let mut second = [0u8; 4];
        engine.arm(&mut first, at_us(0)).unwrap();

        // A rejected arm hands the lease back through the error, so the
        // caller can retry with the same buffer once the engine frees up.
        let (err, lease) = engine.arm(&mut second, at_us(0)).unwrap_err();
        assert_eq!(err, ArmError::Busy);

        engine.abort();
        let (err, lease) = engine.arm(lease, at_us(0)).unwrap_err();
        assert_eq!(err, ArmError::CompletionPending);

        engine.take_completion().unwrap();
        assert!(engine.arm(lease, at_us(0)).is_ok());
    }

    #[test]
    fn abort_is_a_noop_when_idle_and_completes_when_busy() {
        let uart = FakeUart::default();
        let mut engine = RxEngine::new(uart.clone(), TIMEOUT);
        engine.abort();
        assert_eq!(engine.completion(), Completion::None);

        let mut buf = [0u8; 8];
        engine.arm(&mut buf, at_us(0)).unwrap();
        uart.push(Ok(b'q'));
        engine.poll(at_us(50));
        engine.abort();
        assert_eq!(engine.completion(), Completion::Data { len: 1 });
    }

    #[test]
    fn idle_engine_still_drains_the_register() {
        let uart = FakeUart::default();
        let mut engine = RxEngine::new(uart.clone(), TIMEOUT);
        uart.push(Ok(b'!'));
        engine.poll(at_us(0));
        assert!(uart.0.borrow().is_empty());
        assert_eq!(engine.completion(), Completion::None);
    }
}
