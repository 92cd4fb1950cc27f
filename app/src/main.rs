#![no_main]
#![no_std]

use cortex_m;
use cortex_m_rt::entry;
use panic_halt as _;

use stm32f0xx_hal as hal;

use piano::mode::{Controller, Event, Mode};

use crate::hal::pac;
use crate::hal::prelude::*;

#[macro_use]
mod serial;
mod beeper;
mod counter;
mod wake_timer;

/// How often the core wakes from sleep in off mode to check the button
const WAKE_PERIOD_MS: u32 = 128;

fn mode_name(mode: Mode) -> &'static str {
    match mode {
        Mode::Off => "off",
        Mode::Piano => "piano",
        Mode::Metronome => "metronome",
    }
}

#[entry]
fn main() -> ! {
    let dp = pac::Peripherals::take().unwrap();
    let cp = cortex_m::Peripherals::take().unwrap();
    let mut nvic = cp.NVIC;

    let mut flash = dp.FLASH;
    let mut rcc = dp.RCC.configure().sysclk(48.mhz()).freeze(&mut flash);
    let gpioa = dp.GPIOA.split(&mut rcc);
    let gpiob = dp.GPIOB.split(&mut rcc);

    // A library requiring a critical section to set a gpio AF register is bad and I just won't.
    let fake_cs = unsafe { cortex_m::interrupt::CriticalSection::new() };

    // Touch pads, left to right, and the sample cap for each group
    let _pad0 = gpioa.pa0.into_alternate_af3(&fake_cs);
    let _pad1 = gpioa.pa4.into_alternate_af3(&fake_cs);
    let _pad2 = gpiob.pb0.into_alternate_af3(&fake_cs);
    let _pad3 = gpiob.pb11.into_alternate_af3(&fake_cs);
    let _g1_cap = gpioa.pa1.into_alternate_af3(&fake_cs);
    let _g2_cap = gpioa.pa6.into_alternate_af3(&fake_cs);
    let _g3_cap = gpiob.pb2.into_alternate_af3(&fake_cs);
    let _g6_cap = gpiob.pb12.into_alternate_af3(&fake_cs);

    // Piezo on TIM3 CH1
    let _beeper_pin = gpiob.pb4.into_alternate_af1(&fake_cs);

    // Mode button to ground
    let button = gpioa.pa8.into_pull_up_input(&fake_cs);

    let tx_pin = gpiob.pb6.into_alternate_af0(&fake_cs);
    let rx_pin = gpiob.pb7.into_alternate_af0(&fake_cs);
    let uart = hal::serial::Serial::usart1(dp.USART1, (tx_pin, rx_pin), 115200.bps(), &mut rcc);
    serial::uart1::init(uart, 4);

    let counter = counter::TscCounter::new(dp.TSC, &mut rcc);
    let beeper = beeper::Beeper::new(dp.TIM3, &mut rcc);
    let wake = wake_timer::WakeTimer::new(dp.TIM2, &mut rcc, WAKE_PERIOD_MS);
    let delay = hal::delay::Delay::new(cp.SYST, &rcc);

    unsafe {
        nvic.set_priority(pac::Interrupt::TIM2, 3);
        cortex_m::peripheral::NVIC::unmask(pac::Interrupt::TIM2);
    }

    let mut piano = Controller::new(counter, beeper, button, delay, wake, None).unwrap();

    log!("touch piano, calibrating");
    piano.calibrate();
    let avg = piano.sensors.average;
    log!("baseline: {} {} {} {}", avg[0], avg[1], avg[2], avg[3]);

    loop {
        for event in piano.step().iter() {
            match event {
                Event::ModeChanged(mode) => log!("mode: {}", mode_name(*mode)),
                Event::NoteChanged(note) => log!("note: {}", note.index()),
                Event::Beat(beat) => log!("beat: {}/{}", beat.index + 1, piano.metronome.beats),
                Event::Control(_) => {
                    let m = &piano.metronome;
                    log!("bpm: {} beats: {} running: {}", m.bpm, m.beats, m.running);
                }
            }
        }
    }
}
