use crate::hal::pac;
use crate::hal::rcc::Rcc;

use piano::hw::ToneOutput;

/// Timer tick for the tone table's period and duty values
const TICK_HZ: u32 = 62_500;

/// Piezo beeper on TIM3 CH1 (PB4), driven as PWM.
///
/// Period and duty are written straight into ARR and CCR1, with the timer
/// prescaled to a 16 µs tick so the tone table gives the right pitches.
pub struct Beeper {
    tim3: pac::TIM3,
}

impl Beeper {
    pub fn new(tim3: pac::TIM3, rcc: &mut Rcc) -> Self {
        let rccregs = unsafe { pac::Peripherals::steal().RCC };
        rccregs.apb1enr.modify(|_, w| w.tim3en().set_bit());
        rccregs.apb1rstr.modify(|_, w| w.tim3rst().set_bit());
        rccregs.apb1rstr.modify(|_, w| w.tim3rst().clear_bit());

        // If pclk is prescaled from hclk, the frequency fed into the timers is doubled
        let tclk = if rcc.clocks.hclk().0 == rcc.clocks.pclk().0 {
            rcc.clocks.pclk().0
        } else {
            rcc.clocks.pclk().0 * 2
        };
        let psc = (tclk / TICK_HZ - 1) as u16;
        tim3.psc.write(|w| w.psc().bits(psc));

        tim3.ccmr1_output().modify(|_, w| {
            w.oc1m().pwm_mode1()
            .oc1pe().enabled()
        });
        tim3.cr1.modify(|_, w| w.arpe().set_bit());

        let mut obj = Self { tim3 };
        obj.disable();
        obj
    }
}

impl ToneOutput for Beeper {
    fn configure(&mut self, period: u8, duty: u8) {
        self.tim3.arr.write(|w| w.arr().bits(period as u16));
        self.tim3.ccr1.write(|w| w.ccr().bits(duty as u16));
    }

    fn enable(&mut self) {
        if self.tim3.cr1.read().cen().bit_is_set() {
            // Already sounding; new ARR/CCR1 take effect at the next update
            return;
        }
        // Latch the preloaded ARR/CCR1 before starting
        self.tim3.egr.write(|w| w.ug().set_bit());
        self.tim3.ccer.modify(|_, w| w.cc1e().set_bit());
        self.tim3.cr1.modify(|_, w| w.cen().set_bit());
    }

    fn disable(&mut self) {
        self.tim3.cr1.modify(|_, w| w.cen().clear_bit());
        self.tim3.ccer.modify(|_, w| w.cc1e().clear_bit());
    }
}
