//! Refreshes two displays by toggling GPIOs from the CPU.
//!
//! Works with any pins, at the price of keeping a core busy. Each call to
//! `display_loop` shows one digit, so it has to run at least 200 times a
//! second for a flicker free picture.
//!
//! Following pins are used:
//! - RCK   => GPIO26
//! - SCK   => GPIO27
//! - DIO 0 => GPIO16
//! - DIO 1 => GPIO17
#![no_std]
#![no_main]

use esp_backtrace as _;
use esp_hal::clock::CpuClock;
use esp_hal::delay::Delay;
use esp_hal::gpio::Level;
use esp_hal::gpio::Output;
use esp_hal::gpio::OutputConfig;
use esp_hal::main;
use esp_sevenseg::bitbang::BitBangDisplay;
use esp_sevenseg::bitbang::DIGIT_HOLD_US;
use log::info;

#[main]
fn main() -> ! {
    esp_println::logger::init_logger(log::LevelFilter::Info);
    info!("Main starting!");
    let peripherals = esp_hal::init(esp_hal::Config::default().with_cpu_clock(CpuClock::max()));

    let latch = Output::new(peripherals.GPIO26, Level::Low, OutputConfig::default());
    let clock = Output::new(peripherals.GPIO27, Level::Low, OutputConfig::default());
    let data = [
        Some(Output::new(peripherals.GPIO16, Level::High, OutputConfig::default())),
        Some(Output::new(peripherals.GPIO17, Level::High, OutputConfig::default())),
    ];

    let mut display = BitBangDisplay::new(latch, clock, data);
    display.set_display_content(0, "bit.bAng");
    display.set_display_content(1, "12345678");

    let delay = Delay::new();
    loop {
        // esp-hal outputs are infallible
        let Ok(()) = display.display_loop();
        delay.delay_micros(DIGIT_HOLD_US);
    }
}
