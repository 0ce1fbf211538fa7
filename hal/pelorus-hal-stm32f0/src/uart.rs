//! Polled USART register access
//!
//! The receive path reads the status register together with the data
//! register, so each character's error flags are consumed with the byte
//! they belong to and never poison the next one. Data-ready is a flag
//! the main loop samples; the peripheral's receive interrupt stays off.

use core::ops::Deref;

use pelorus_hal::uart::{ByteRx, ByteTx, LineError, StopBits, UartConfig};

use crate::pac;

/// One USART in polled (no interrupt, no DMA) operation.
///
/// Generic over the peripheral instance; USART1..USART4 share a
/// register block on this family.
pub struct PolledUart<U> {
    usart: U,
}

impl<U> PolledUart<U>
where
    U: Deref<Target = pac::usart1::RegisterBlock>,
{
    /// Configure and enable the peripheral. `pclk_hz` is the bus clock
    /// feeding this USART.
    pub fn new(usart: U, pclk_hz: u32, config: UartConfig) -> Self {
        // 16x oversampling: BRR is the plain clock/baud quotient.
        let brr = pclk_hz / config.baudrate;
        usart.brr.write(|w| unsafe { w.bits(brr) });

        let stop = match config.stop_bits {
            StopBits::One => 0b00,
            StopBits::Two => 0b10,
        };
        usart.cr2.write(|w| unsafe { w.stop().bits(stop) });

        usart
            .cr1
            .write(|w| w.ue().set_bit().re().set_bit().te().set_bit());

        Self { usart }
    }
}

impl<U> ByteRx for PolledUart<U>
where
    U: Deref<Target = pac::usart1::RegisterBlock>,
{
    fn poll_byte(&mut self) -> Option<Result<u8, LineError>> {
        let isr = self.usart.isr.read();

        let error = if isr.ore().bit_is_set() {
            Some(LineError::Overrun)
        } else if isr.fe().bit_is_set() {
            Some(LineError::Framing)
        } else if isr.pe().bit_is_set() {
            Some(LineError::Parity)
        } else if isr.nf().bit_is_set() {
            Some(LineError::Noise)
        } else {
            None
        };

        if let Some(error) = error {
            // Clear the sticky flags and flush the data register so the
            // corrupt character is consumed rather than re-reported.
            self.usart.icr.write(|w| {
                w.orecf()
                    .set_bit()
                    .fecf()
                    .set_bit()
                    .pecf()
                    .set_bit()
                    .ncf()
                    .set_bit()
            });
            let _ = self.usart.rdr.read();
            return Some(Err(error));
        }

        if isr.rxne().bit_is_set() {
            Some(Ok(self.usart.rdr.read().rdr().bits() as u8))
        } else {
            None
        }
    }
}

impl<U> ByteTx for PolledUart<U>
where
    U: Deref<Target = pac::usart1::RegisterBlock>,
{
    fn ready(&self) -> bool {
        self.usart.isr.read().txe().bit_is_set()
    }

    fn write_byte(&mut self, byte: u8) {
        self.usart
            .tdr
            .write(|w| unsafe { w.tdr().bits(u16::from(byte)) });
    }
}
