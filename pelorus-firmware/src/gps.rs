//! GPS channel service
//!
//! Owns the receive engine, the sentence assembler, and the latest
//! decoded position report for the GPS line. Completed chunks are
//! appended and drained immediately, so a fix surfaces the moment its
//! sentence delimiter arrives regardless of how the bytes were chunked.

use defmt::warn;
use heapless::String;

use pelorus_core::clock::Instant;
use pelorus_core::rx::{idle_timeout, RxEngine};
use pelorus_core::watchdog::ActivityWatchdog;
use pelorus_hal_stm32f0::pac;
use pelorus_hal_stm32f0::uart::PolledUart;
use pelorus_protocol::gpgll::GpgllFix;
use pelorus_protocol::sentence::SentenceAssembler;

pub const BAUD: u32 = 38_400;
pub const RX_BUF_LEN: usize = 64;
pub const REPORT_LEN: usize = 192;

const ASSEMBLY_LEN: usize = 256;
/// Silence after which the channel is presumed wedged and recycled.
const STUCK_AFTER: Instant = Instant::new(5, 0);

pub type GpsUart = PolledUart<pac::USART2>;

pub struct GpsService {
    engine: RxEngine<'static, GpsUart>,
    assembler: SentenceAssembler<ASSEMBLY_LEN>,
    watchdog: ActivityWatchdog,
    report: Option<String<REPORT_LEN>>,
}

impl GpsService {
    pub fn new(uart: GpsUart, buf: &'static mut [u8], now: Instant) -> Self {
        let mut engine = RxEngine::new(uart, idle_timeout(BAUD));
        if let Err((err, _)) = engine.arm(buf, now) {
            warn!("gps: initial arm rejected: {}", err);
        }
        Self {
            engine,
            assembler: SentenceAssembler::new(),
            watchdog: ActivityWatchdog::new(STUCK_AFTER),
            report: None,
        }
    }

    /// Advance the channel; call once per loop iteration.
    pub fn poll(&mut self, now: Instant) {
        self.engine.poll(now);

        if let Some((buf, len)) = self.engine.take_completion() {
            self.watchdog.record_activity(now);
            self.ingest(&buf[..usize::from(len)]);
            self.rearm(buf, now);
        } else if self.watchdog.expired(now) && self.engine.is_busy() {
            // Hardware wedged or the receiver unplugged mid-message;
            // partial data is discarded by the recycle.
            warn!("gps: channel silent too long, recycling receive");
            self.engine.abort();
            if let Some((buf, _)) = self.engine.take_completion() {
                self.rearm(buf, now);
            }
        }
    }

    /// Latest decoded position report, surrendered to the caller.
    pub fn take_report(&mut self) -> Option<String<REPORT_LEN>> {
        self.report.take()
    }

    fn ingest(&mut self, chunk: &[u8]) {
        if self.assembler.append(chunk).is_err() {
            warn!("gps: assembly overflow, resynchronizing");
        }
        while let Some(sentence) = self.assembler.extract_next() {
            let Some(fix) = GpgllFix::parse(&sentence) else {
                continue;
            };
            let mut line = String::new();
            match fix.render(&mut line) {
                Ok(()) => {
                    defmt::debug!("gps: {=str}", line.as_str());
                    self.report = Some(line);
                }
                Err(_) => warn!("gps: report did not fit, dropping record"),
            }
        }
    }

    fn rearm(&mut self, buf: &'static mut [u8], now: Instant) {
        if let Err((err, _)) = self.engine.arm(buf, now) {
            warn!("gps: re-arm rejected: {}", err);
        }
    }
}
