//! Pelorus - GPS / particulate-matter sensor hub firmware
//!
//! Named after the pelorus, the ship's sighting instrument used to take
//! bearings relative to the vessel's heading - this firmware's job is
//! the same: turn a noisy stream of observations into a usable position
//! fix.
//!
//! Everything runs from one cooperative loop. The only interrupt is the
//! 5 ms SysTick that advances the clock; serial data is picked up by
//! polling the receive registers, which is why the loop body must stay
//! short (one character at 115 200 Bd is ~87 us).

#![no_std]
#![no_main]

use core::fmt::Write;

use cortex_m_rt::{entry, exception};
use defmt::info;
use heapless::String;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use pelorus_core::clock::{Instant, TickClock};
use pelorus_hal::OutputPin;
use pelorus_hal_stm32f0::time::{start_systick, SysTickCounter};
use pelorus_hal_stm32f0::{self as board, pac};
use pelorus_protocol::pm::PmRecord;

mod button;
mod console;
mod gps;
mod pm;

use button::{ButtonEvent, Debouncer};
use console::{Console, LINE_LEN};
use gps::GpsService;
use pm::PmService;

/// Clock tick rate: 200 Hz, a 5 ms period.
const TICK_HZ: u32 = 200;
/// Floor between combined report lines on the console.
const DISPLAY_INTERVAL: Instant = Instant::new(0, 200_000_000);
/// LED heartbeat half-period.
const HEARTBEAT: Instant = Instant::new(0, 500_000_000);

static CLOCK: TickClock = TickClock::new(1_000_000_000 / TICK_HZ);

// Receive buffers leased to the engines for the lifetime of the device.
static GPS_RX_BUF: StaticCell<[u8; gps::RX_BUF_LEN]> = StaticCell::new();
static PM_RX_BUF: StaticCell<[u8; pm::RX_BUF_LEN]> = StaticCell::new();

#[exception]
fn SysTick() {
    CLOCK.tick_advance();
}

#[entry]
fn main() -> ! {
    info!("pelorus starting");

    let mut cp = cortex_m::Peripherals::take().unwrap();
    let dp = pac::Peripherals::take().unwrap();
    let b = board::init(dp);
    start_systick(&mut cp.SYST, board::SYSCLK_HZ, TICK_HZ);
    let counter = SysTickCounter::new(board::SYSCLK_HZ);

    let now = CLOCK.now_with(&counter);
    let mut gps = GpsService::new(b.gps, GPS_RX_BUF.init([0; gps::RX_BUF_LEN]), now);
    let mut pm = PmService::new(b.pm, PM_RX_BUF.init([0; pm::RX_BUF_LEN]), now);
    let mut console = Console::new(b.console);
    let mut button = Debouncer::new(b.button, now);
    let mut led = b.led;

    let mut pending_report: Option<String<{ gps::REPORT_LEN }>> = None;
    let mut last_display = now;
    let mut last_blink = now;

    info!("pelorus ready");

    loop {
        let now = CLOCK.now_with(&counter);

        gps.poll(now);
        pm.poll(now);

        if let Some(report) = gps.take_report() {
            // A newer fix supersedes one still waiting on the
            // transmitter.
            pending_report = Some(report);
        }

        if button.poll(now) == Some(ButtonEvent::Pressed) {
            console.request_banner();
        }

        if now.delta(last_display) >= DISPLAY_INTERVAL {
            if let Some(report) = pending_report.as_ref() {
                let line = compose_line(report.as_str(), pm.latest());
                if console.enqueue(line.as_str()) {
                    pending_report = None;
                    last_display = now;
                }
            }
        }

        console.poll();

        if now.delta(last_blink) >= HEARTBEAT {
            led.toggle();
            last_blink = now;
        }
    }
}

/// One combined console line: the GPS report plus whatever the PM
/// sensor has produced so far.
fn compose_line(report: &str, pm: Option<PmRecord>) -> String<LINE_LEN> {
    let mut line = String::new();
    let result = match pm {
        Some(rec) => write!(
            line,
            "{} | PM1.0: {} ug/m3, PM2.5: {} ug/m3, PM10: {} ug/m3\r\n",
            report, rec.pm1_0_atm, rec.pm2_5_atm, rec.pm10_atm
        ),
        None => write!(line, "{} | PM: waiting for data...\r\n", report),
    };
    if result.is_err() {
        defmt::warn!("console: combined line truncated");
    }
    line
}
