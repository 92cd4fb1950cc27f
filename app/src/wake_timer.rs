use core::sync::atomic::{AtomicBool, Ordering};

use crate::hal::pac;
use crate::hal::pac::interrupt;
use crate::hal::rcc::Rcc;

use piano::hw::LowPowerWait;

static WOKE: AtomicBool = AtomicBool::new(false);

/// Periodic wake-up from sleep on TIM2.
///
/// The timer only runs while [`LowPowerWait::wait`] is blocked, and each wait
/// lasts a full period even if another interrupt wakes the core early.
pub struct WakeTimer {
    tim: pac::TIM2,
}

impl WakeTimer {
    pub fn new(tim: pac::TIM2, rcc: &mut Rcc, period_ms: u32) -> Self {
        let rccregs = unsafe { pac::Peripherals::steal().RCC };
        rccregs.apb1enr.modify(|_, w| w.tim2en().set_bit());

        // If pclk is prescaled from hclk, the frequency fed into the timers is doubled
        let clk_freq = if rcc.clocks.hclk().0 == rcc.clocks.pclk().0 {
            rcc.clocks.pclk().0
        } else {
            rcc.clocks.pclk().0 * 2
        };

        // TIM2 is 32 bits wide, so no prescaler is needed for a ~128ms period
        let arr = clk_freq / 1000 * period_ms;
        tim.arr.write(|w| w.arr().bits(arr));
        tim.cr1.modify(|_, w| w.arpe().set_bit());
        tim.egr.write(|w| w.ug().set_bit());
        tim.sr.write(|w| unsafe { w.bits(0) });

        Self { tim }
    }
}

impl LowPowerWait for WakeTimer {
    fn wait(&mut self) {
        WOKE.store(false, Ordering::Relaxed);
        self.tim.cnt.write(|w| unsafe { w.bits(0) });
        self.tim.dier.write(|w| w.uie().set_bit());
        self.tim.cr1.modify(|_, w| w.cen().set_bit());

        while !WOKE.load(Ordering::Relaxed) {
            cortex_m::asm::wfi();
        }

        self.tim.cr1.modify(|_, w| w.cen().clear_bit());
        self.tim.dier.write(|w| w.uie().clear_bit());
    }
}

#[interrupt]
fn TIM2() {
    // Clear IRQ flags
    unsafe {
        let tim2 = pac::Peripherals::steal().TIM2;
        tim2.sr.write(|w| w.bits(0));
    }
    WOKE.store(true, Ordering::Relaxed);
}
