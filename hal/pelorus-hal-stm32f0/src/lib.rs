//! STM32F0 implementation of the Pelorus hardware abstraction traits
//!
//! Register-level, fully polled drivers over the `stm32f0` peripheral
//! access crate: no DMA, no receive interrupts. The only interrupt this
//! bring-up leaves enabled is the SysTick tick that drives the clock;
//! everything else is sampled from the main loop.
//!
//! Pin assignment (STM32F072 Discovery wiring):
//!
//! | Function | Peripheral | Pins          |
//! |----------|-----------|----------------|
//! | console  | USART1    | PA9 / PA10     |
//! | GPS      | USART2    | PA2 / PA3      |
//! | PM       | USART3    | PB10 / PB11    |
//! | LED      | GPIO      | PC7            |
//! | button   | GPIO      | PA0            |

#![no_std]

pub use stm32f0::stm32f0x2 as pac;

pub mod gpio;
pub mod time;
pub mod uart;

use pelorus_hal::uart::{StopBits, UartConfig};

use gpio::{Button, Led};
use uart::PolledUart;

/// Core and bus clock; the default HSI configuration is kept, so every
/// peripheral below runs from 8 MHz.
pub const SYSCLK_HZ: u32 = 8_000_000;

/// Serial lines and pins handed out by [`init`].
pub struct Board {
    /// Operator console, 115 200 Bd.
    pub console: PolledUart<pac::USART1>,
    /// GPS receiver, 38 400 Bd.
    pub gps: PolledUart<pac::USART2>,
    /// Particulate-matter sensor, 9 600 Bd.
    pub pm: PolledUart<pac::USART3>,
    /// User LED.
    pub led: Led,
    /// User pushbutton.
    pub button: Button,
}

/// Bring up bus clocks, pin multiplexing, and the serial peripherals.
pub fn init(dp: pac::Peripherals) -> Board {
    let rcc = dp.RCC;
    rcc.ahbenr
        .modify(|_, w| w.iopaen().set_bit().iopben().set_bit().iopcen().set_bit());
    rcc.apb2enr.modify(|_, w| w.usart1en().set_bit());
    rcc.apb1enr
        .modify(|_, w| w.usart2en().set_bit().usart3en().set_bit());

    // PA0 button input, PA2/PA3 USART2, PA9/PA10 USART1 (all AF1).
    let gpioa = dp.GPIOA;
    gpioa.moder.modify(|_, w| {
        w.moder0()
            .input()
            .moder2()
            .alternate()
            .moder3()
            .alternate()
            .moder9()
            .alternate()
            .moder10()
            .alternate()
    });
    gpioa.afrl.modify(|_, w| w.afrl2().af1().afrl3().af1());
    gpioa.afrh.modify(|_, w| w.afrh9().af1().afrh10().af1());

    // PB10/PB11 USART3 (AF4).
    let gpiob = dp.GPIOB;
    gpiob
        .moder
        .modify(|_, w| w.moder10().alternate().moder11().alternate());
    gpiob.afrh.modify(|_, w| w.afrh10().af4().afrh11().af4());

    // PC7 LED output.
    let gpioc = dp.GPIOC;
    gpioc.moder.modify(|_, w| w.moder7().output());

    let console = PolledUart::new(
        dp.USART1,
        SYSCLK_HZ,
        UartConfig {
            baudrate: 115_200,
            stop_bits: StopBits::One,
        },
    );
    let gps = PolledUart::new(
        dp.USART2,
        SYSCLK_HZ,
        UartConfig {
            baudrate: 38_400,
            stop_bits: StopBits::One,
        },
    );
    let pm = PolledUart::new(
        dp.USART3,
        SYSCLK_HZ,
        UartConfig {
            baudrate: 9_600,
            stop_bits: StopBits::One,
        },
    );

    Board {
        console,
        gps,
        pm,
        led: Led::new(gpioc),
        button: Button::new(gpioa),
    }
}
