//! Shows static text on two displays and a counter on a third, refreshed by
//! the I2S peripheral of an `esp32` without any CPU involvement.
//!
//! Following pins are used:
//! - RCK   => GPIO26
//! - SCK   => GPIO27
//! - DIO 0 => GPIO16
//! - DIO 1 => GPIO17
//! - DIO 2 => GPIO18
//!
//! The displays are 5V parts but work fine from 3.3V logic levels.
#![no_std]
#![no_main]

use core::fmt::Write;

use esp_backtrace as _;
use esp_hal::clock::CpuClock;
use esp_hal::delay::Delay;
use esp_hal::dma::DmaDescriptor;
use esp_hal::gpio::AnyPin;
use esp_hal::gpio::Pin;
use esp_hal::main;
use esp_sevenseg::i2s_parallel::I2sParallelOutput;
use esp_sevenseg::i2s_parallel::I2sPort;
use esp_sevenseg::DmaFrameBuffer;
use esp_sevenseg::I2sDisplayDriver;
use esp_sevenseg::LinePins;
use heapless::String;
use log::info;

// When you are okay with using a nightly compiler it's better to use https://docs.rs/static_cell/2.1.0/static_cell/macro.make_static.html
macro_rules! mk_static {
    ($t:ty,$val:expr) => {{
        static STATIC_CELL: static_cell::StaticCell<$t> = static_cell::StaticCell::new();
        #[deny(unused_attributes)]
        let x = STATIC_CELL.uninit().write(($val));
        x
    }};
}

#[main]
fn main() -> ! {
    esp_println::logger::init_logger(log::LevelFilter::Debug);
    info!("Main starting!");
    let peripherals = esp_hal::init(esp_hal::Config::default().with_cpu_clock(CpuClock::max()));

    let mut lines: LinePins<AnyPin> = Default::default();
    lines[0] = Some(peripherals.GPIO16.degrade());
    lines[1] = Some(peripherals.GPIO17.degrade());
    lines[2] = Some(peripherals.GPIO18.degrade());

    let descriptor = mk_static!(DmaDescriptor, DmaDescriptor::EMPTY);
    let fb = mk_static!(DmaFrameBuffer, DmaFrameBuffer::new());
    info!("FB size: {}", DmaFrameBuffer::dma_buffer_size_bytes());

    let output = I2sParallelOutput::new(
        I2sPort::I2s0(peripherals.I2S0),
        peripherals.GPIO26.degrade(),
        peripherals.GPIO27.degrade(),
        lines,
        descriptor,
    )
    .expect("failed to create output!");

    let mut display = I2sDisplayDriver::new(output, fb);
    display.display_text(0, "HELLO");
    display.display_text(1, "3.1415926");
    display.configure().expect("failed to configure display!");
    display.start();
    info!("display running");

    let delay = Delay::new();
    let mut count: u32 = 0;
    let mut text: String<16> = String::new();
    loop {
        text.clear();
        write!(text, "{count:8}").expect("counter does not fit");
        display.display_text(2, &text);
        count = count.wrapping_add(1) % 100_000_000;
        delay.delay_millis(100);
    }
}
