use crate::hal;
use crate::hal::pac;
use crate::hal::rcc::Rcc;
use crate::hal::tsc::Tsc;

use piano::hw::OscillatorCounter;
use piano::CHANNELS;

#[derive(Clone, Copy, Debug)]
struct TscPad {
    group: u8,
    sample: u8,
    channel: u8,
}

// Each pad is alone in its group so one acquisition reads one pad
static PADS: [TscPad; CHANNELS] = [
    TscPad { group: 1, sample: 2, channel: 1 }, // PA0, sample cap PA1
    TscPad { group: 2, sample: 3, channel: 1 }, // PA4, sample cap PA6
    TscPad { group: 3, sample: 4, channel: 2 }, // PB0, sample cap PB2
    TscPad { group: 6, sample: 2, channel: 1 }, // PB11, sample cap PB12
];

/// Touch pads read through the TSC peripheral.
///
/// The TSC counts charge transfers into the sample capacitor rather than
/// oscillator cycles, but it moves the same way: a finger adds capacitance and
/// the count drops.
pub struct TscCounter {
    tsc: Tsc,
    max_count: u16,
    selected: usize,
}

impl TscCounter {
    pub fn new(tsc: pac::TSC, rcc: &mut Rcc) -> Self {
        let config = hal::tsc::Config {
            clock_prescale: None,
            max_count: Some(hal::tsc::MaxCount::U8191),
            charge_transfer_high: None,
            charge_transfer_low: None,
        };
        Self {
            tsc: Tsc::tsc(tsc, rcc, Some(config)),
            max_count: 8191,
            selected: 0,
        }
    }
}

impl OscillatorCounter for TscCounter {
    fn start(&mut self, channel: usize) {
        // The HAL only configures channels through typed pins, so write the IO
        // registers ourselves.
        let regs = unsafe { pac::Peripherals::steal().TSC };
        let pad = &PADS[channel];

        regs.iogcsr.write(|w| unsafe { w.bits(1 << (pad.group - 1)) });
        regs.ioscr.write(|w| unsafe { w.bits(1 << ((pad.group - 1) * 4 + pad.sample - 1)) });
        regs.ioccr.write(|w| unsafe { w.bits(1 << ((pad.group - 1) * 4 + pad.channel - 1)) });

        self.selected = channel;
    }

    fn count(&mut self) -> u16 {
        let regs = unsafe { pac::Peripherals::steal().TSC };
        let pad = &PADS[self.selected];

        self.tsc.acquire().ok();

        // A group that hit max count before the sample cap charged doesn't get
        // its status bit. Report it as one past max, the least touched reading.
        let group_status = regs.iogcsr.read().bits() >> 16;
        if group_status & (1 << (pad.group - 1)) == 0 {
            self.max_count + 1
        } else {
            self.tsc.read_unchecked(pad.group)
        }
    }

    fn set_enabled(&mut self, enabled: bool) {
        let rcc = unsafe { pac::Peripherals::steal().RCC };
        if enabled {
            rcc.ahbenr.modify(|_, w| w.tscen().set_bit());
        } else {
            rcc.ahbenr.modify(|_, w| w.tscen().clear_bit());
        }
    }
}
