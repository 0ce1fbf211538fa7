//! SysTick as tick source and sub-tick counter

use cortex_m::peripheral::syst::SystClkSource;
use cortex_m::peripheral::SYST;

use pelorus_hal::TickCounter;

/// Start the SysTick exception firing at `tick_hz`, counting core
/// clock cycles.
pub fn start_systick(syst: &mut SYST, sysclk_hz: u32, tick_hz: u32) {
    syst.set_clock_source(SystClkSource::Core);
    // N counts per tick means a reload of N - 1.
    syst.set_reload(sysclk_hz / tick_hz - 1);
    syst.clear_current();
    syst.enable_interrupt();
    syst.enable_counter();
}

/// Sub-tick view of the SysTick countdown register.
///
/// VAL and LOAD are read as snapshots; reading does not disturb the
/// running counter, so this can be shared with the tick exception
/// without coordination.
pub struct SysTickCounter {
    hz: u32,
}

impl SysTickCounter {
    /// `hz` is the frequency SysTick counts at (the core clock here).
    pub const fn new(hz: u32) -> Self {
        Self { hz }
    }
}

impl TickCounter for SysTickCounter {
    fn reload(&self) -> u32 {
        SYST::get_reload()
    }

    fn current(&self) -> u32 {
        SYST::get_current()
    }

    fn hz(&self) -> u32 {
        self.hz
    }
}
