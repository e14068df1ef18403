//! Drives up to 22 displays from text received on UART0.
//!
//! Send lines of the form `<n>=<text>`, e.g. `0=12.34` or `:=HELLO` for
//! display 10. A line is shown as soon as its `\n` or `\r` arrives.
//!
//! Following pins are used:
//! - RCK       => GPIO26
//! - SCK       => GPIO27
//! - DIO 0..=3 => GPIO16, GPIO17, GPIO18, GPIO19
#![no_std]
#![no_main]

use esp_backtrace as _;
use esp_hal::clock::CpuClock;
use esp_hal::dma::DmaDescriptor;
use esp_hal::gpio::AnyPin;
use esp_hal::gpio::Pin;
use esp_hal::main;
use esp_hal::uart::Config;
use esp_hal::uart::Uart;
use esp_sevenseg::command::LineAssembler;
use esp_sevenseg::i2s_parallel::I2sParallelOutput;
use esp_sevenseg::i2s_parallel::I2sPort;
use esp_sevenseg::DmaFrameBuffer;
use esp_sevenseg::I2sDisplayDriver;
use esp_sevenseg::LinePins;
use esp_sevenseg::MAX_LINES;
use log::info;
use log::warn;

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
    esp_println::logger::init_logger(log::LevelFilter::Info);
    info!("Main starting!");
    let peripherals = esp_hal::init(esp_hal::Config::default().with_cpu_clock(CpuClock::max()));

    let mut lines: LinePins<AnyPin> = Default::default();
    lines[0] = Some(peripherals.GPIO16.degrade());
    lines[1] = Some(peripherals.GPIO17.degrade());
    lines[2] = Some(peripherals.GPIO18.degrade());
    lines[3] = Some(peripherals.GPIO19.degrade());

    let descriptor = mk_static!(DmaDescriptor, DmaDescriptor::EMPTY);
    let fb = mk_static!(DmaFrameBuffer, DmaFrameBuffer::new());

    let output = I2sParallelOutput::new(
        I2sPort::I2s0(peripherals.I2S0),
        peripherals.GPIO26.degrade(),
        peripherals.GPIO27.degrade(),
        lines,
        descriptor,
    )
    .expect("failed to create output!");

    let mut display = I2sDisplayDriver::new(output, fb);
    display.configure().expect("failed to configure display!");
    display.start();

    let mut uart = Uart::new(peripherals.UART0, Config::default())
        .expect("failed to create uart!")
        .with_rx(peripherals.GPIO3)
        .with_tx(peripherals.GPIO1);

    let mut assembler = LineAssembler::<32>::new(MAX_LINES);
    let mut buf = [0u8; 16];
    info!("waiting for commands");
    loop {
        let count = match uart.read(&mut buf) {
            Ok(count) => count,
            Err(err) => {
                warn!("uart read failed: {err:?}");
                continue;
            }
        };
        for &byte in &buf[..count] {
            if let Some(command) = assembler.push(byte) {
                info!("{}={}", command.line, command.text);
                display.display_text(command.line, &command.text);
            }
        }
    }
}
