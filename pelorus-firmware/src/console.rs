//! Polled serial console
//!
//! One transmission is in flight at a time. A caller whose line is
//! refused keeps the line and tries again next loop iteration; nothing
//! here blocks on the transmitter. The banner outranks report lines and
//! is re-sent whenever requested.

use heapless::Vec;

use pelorus_hal::uart::ByteTx;

/// Longest single line the console accepts.
pub const LINE_LEN: usize = 256;

const QUEUE_LEN: usize = 512;

const BANNER: &str = concat!(
    "\x1b[0m\x1b[2J\x1b[1;1H",
    "+------------------------------------------------------------+\r\n",
    "| Pelorus sensor hub                                         |\r\n",
    "| GPS position fix + particulate-matter readings             |\r\n",
    "| Press the user button to redraw this banner                |\r\n",
    "+------------------------------------------------------------+\r\n",
    "\r\n",
);

pub struct Console<T> {
    tx: T,
    queue: Vec<u8, QUEUE_LEN>,
    cursor: usize,
    banner_pending: bool,
}

impl<T: ByteTx> Console<T> {
    pub fn new(tx: T) -> Self {
        Self {
            tx,
            queue: Vec::new(),
            cursor: 0,
            // First thing a freshly booted hub prints.
            banner_pending: true,
        }
    }

    /// Ask for the banner to be redrawn once the line frees up.
    pub fn request_banner(&mut self) {
        self.banner_pending = true;
    }

    /// Queue a line for transmission.
    ///
    /// Returns false while an earlier transmission is still draining or
    /// a banner is due; the caller keeps its line and retries later.
    pub fn enqueue(&mut self, line: &str) -> bool {
        if !self.idle() || self.banner_pending {
            return false;
        }
        self.load(line.as_bytes())
    }

    /// Push queued bytes out as the transmit register frees up.
    pub fn poll(&mut self) {
        if self.idle() && self.banner_pending {
            self.banner_pending = false;
            self.load(BANNER.as_bytes());
        }
        while self.cursor < self.queue.len() && self.tx.ready() {
            self.tx.write_byte(self.queue[self.cursor]);
            self.cursor += 1;
        }
    }

    fn idle(&self) -> bool {
        self.cursor == self.queue.len()
    }

    fn load(&mut self, bytes: &[u8]) -> bool {
        self.queue.clear();
        self.cursor = 0;
        self.queue.extend_from_slice(bytes).is_ok()
    }
}
