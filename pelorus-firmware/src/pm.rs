//! Particulate-matter channel service
//!
//! Same shape as the GPS service, but the completed chunks feed a
//! binary frame parser byte by byte instead of a line assembler. Chunk
//! boundaries carry no meaning for the PM stream; the parser finds the
//! frame boundaries itself.

use defmt::warn;

use pelorus_core::clock::Instant;
use pelorus_core::rx::{idle_timeout, RxEngine};
use pelorus_core::watchdog::ActivityWatchdog;
use pelorus_hal_stm32f0::pac;
use pelorus_hal_stm32f0::uart::PolledUart;
use pelorus_protocol::pm::{FeedStatus, PmFrameParser, PmRecord};

pub const BAUD: u32 = 9_600;
pub const RX_BUF_LEN: usize = 64;

/// Silence after which the channel is presumed wedged and recycled.
const STUCK_AFTER: Instant = Instant::new(5, 0);

pub type PmUart = PolledUart<pac::USART3>;

pub struct PmService {
    engine: RxEngine<'static, PmUart>,
    parser: PmFrameParser,
    watchdog: ActivityWatchdog,
    latest: Option<PmRecord>,
}

impl PmService {
    pub fn new(uart: PmUart, buf: &'static mut [u8], now: Instant) -> Self {
        let mut engine = RxEngine::new(uart, idle_timeout(BAUD));
        if let Err((err, _)) = engine.arm(buf, now) {
            warn!("pm: initial arm rejected: {}", err);
        }
        Self {
            engine,
            parser: PmFrameParser::new(),
            watchdog: ActivityWatchdog::new(STUCK_AFTER),
            latest: None,
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
            warn!("pm: channel silent too long, recycling receive");
            self.engine.abort();
            if let Some((buf, _)) = self.engine.take_completion() {
                self.rearm(buf, now);
            }
        }
    }

    /// Most recent concentrations, if a frame has been decoded yet.
    pub fn latest(&self) -> Option<PmRecord> {
        self.latest
    }

    fn ingest(&mut self, chunk: &[u8]) {
        for &byte in chunk {
            match self.parser.feed(byte) {
                FeedStatus::Ready => {
                    if let Some(record) = self.parser.take_record() {
                        defmt::debug!("pm: pm2.5 {} ug/m3", record.pm2_5_atm);
                        self.latest = Some(record);
                    }
                }
                FeedStatus::Resync => {}
                FeedStatus::Pending => {}
            }
        }
    }

    fn rearm(&mut self, buf: &'static mut [u8], now: Instant) {
        if let Err((err, _)) = self.engine.arm(buf, now) {
            warn!("pm: re-arm rejected: {}", err);
        }
    }
}
