//! UART serial communication abstractions
//!
//! The traits here are deliberately register-level rather than
//! buffer-level: the receive engine frames messages by *silence*, so it
//! has to observe the arrival time of every individual byte. A
//! buffer-at-a-time read API would hide exactly the information it needs.

/// Line error indication delivered together with a received byte.
///
/// Hardware reports these per character; the status register must be read
/// before (or together with) the data register, which is why [`ByteRx`]
/// couples the two into a single call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LineError {
    /// Parity mismatch
    Parity,
    /// Stop bit not found where expected
    Framing,
    /// A byte arrived before the previous one was read out
    Overrun,
    /// Noise detected during sampling
    Noise,
}

/// Non-blocking receiver side of a UART.
///
/// One-byte-deep hardware view: either nothing has arrived since the last
/// call, or exactly one byte (possibly with line errors) is handed out.
pub trait ByteRx {
    /// Check the receive data register.
    ///
    /// Returns `None` when no byte is pending. When a byte is pending,
    /// the implementation must read and clear the hardware error/status
    /// flags along with the data, returning `Err` if any error bit was
    /// set for this character. Either way the byte is consumed from the
    /// hardware, so the register cannot overrun with stale data.
    fn poll_byte(&mut self) -> Option<Result<u8, LineError>>;
}

/// Non-blocking transmitter side of a UART.
pub trait ByteTx {
    /// True when the transmit data register can accept another byte.
    fn ready(&self) -> bool;

    /// Write one byte into the transmit data register.
    ///
    /// Must only be called when [`ready`](ByteTx::ready) returned true;
    /// otherwise the byte may be lost or corrupt an in-flight character.
    fn write_byte(&mut self, byte: u8);
}

/// UART configuration
#[derive(Debug, Clone, Copy)]
pub struct UartConfig {
    /// Baud rate in bits per second
    pub baudrate: u32,
    /// Number of stop bits
    pub stop_bits: StopBits,
}

impl Default for UartConfig {
    fn default() -> Self {
        Self {
            baudrate: 115_200,
            stop_bits: StopBits::One,
        }
    }
}

/// Number of stop bits per frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopBits {
    One,
    Two,
}
