//! LED and pushbutton pins

use pelorus_hal::{InputPin, OutputPin};

use crate::pac;

/// User LED on PC7, push-pull output.
///
/// Set/reset goes through BSRR so updates are atomic with respect to
/// anything else touching the port.
pub struct Led {
    port: pac::GPIOC,
}

impl Led {
    /// The pin must already be configured as an output (see
    /// [`crate::init`]).
    pub fn new(port: pac::GPIOC) -> Self {
        Self { port }
    }
}

impl OutputPin for Led {
    fn set_high(&mut self) {
        self.port.bsrr.write(|w| w.bs7().set_bit());
    }

    fn set_low(&mut self) {
        self.port.bsrr.write(|w| w.br7().set_bit());
    }

    fn toggle(&mut self) {
        if self.port.odr.read().odr7().bit_is_set() {
            self.set_low();
        } else {
            self.set_high();
        }
    }
}

/// User pushbutton on PA0, wired so that pressed reads high.
pub struct Button {
    port: pac::GPIOA,
}

impl Button {
    pub fn new(port: pac::GPIOA) -> Self {
        Self { port }
    }
}

impl InputPin for Button {
    fn is_high(&self) -> bool {
        self.port.idr.read().idr0().bit_is_set()
    }
}
