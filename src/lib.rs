//! Driver for cheap multiplexed 8-digit 7-segment LED displays.
//!
//! ## How the displays work
//!
//! Each display module carries two 74HC595 shift registers: one holds the
//! segments of the digit being shown, the other selects which of the eight
//! common anodes is powered. Only one digit is lit at a time, so the
//! controller has to keep cycling through all eight digits fast enough for
//! the eye to see a steady picture.
//!
//! ### Signal names
//! - **DIO** – serial data, one line per display
//! - **SCK** – shift clock, shared by all displays; every rising edge shifts
//!   DIO in
//! - **RCK** – output latch, shared by all displays; a rising edge copies the
//!   shifted bits to the outputs
//!
//! Per digit the controller shifts 8 segment bits and then 8 digit select
//! bits (both MSB first) and pulses RCK once. The modules can not be daisy
//! chained, which is why every display needs its own data line.
//!
//! ## Refresh strategies
//!
//! 1. **DMA** ([`I2sDisplayDriver`]) – the whole multiplexing sequence for up
//!    to [`MAX_LINES`] displays is encoded into a [`DmaFrameBuffer`] that the
//!    ESP32 I2S peripheral replays forever from a looping DMA descriptor. No
//!    CPU time is spent once started.
//! 2. **Bit-bang** ([`bitbang::BitBangDisplay`]) – any `embedded-hal` output
//!    pins, one digit per call.
//!
//! Both share the [`glyph`] encoder and the [`LineBuffer`].
//!
//! ## Available Feature Flags
//!
//! ### `esp32` Feature
//! Enables the [`i2s_parallel`] backend for the original ESP32 (the I2S LCD
//! mode with 24 parallel outputs is specific to that chip) and the demos.
//!
//! ### `log` / `defmt` Features
//! Route the driver's diagnostics (ignored out of range arguments, state
//! changes) to `log` or `defmt`. Without either they compile to nothing.
#![no_std]
#![warn(missing_docs)]

#[macro_use]
mod fmt;

pub mod bitbang;
pub mod command;
pub mod driver;
pub mod framebuffer;
pub mod glyph;
#[cfg(feature = "esp32")]
pub mod i2s_parallel;
pub mod line_buffer;
pub mod output;

#[cfg(test)]
mod testing;

pub use driver::I2sDisplayDriver;
pub use driver::State;
pub use framebuffer::DmaFrameBuffer;
pub use line_buffer::LineBuffer;
pub use output::ParallelOutput;

/// Digits per display.
pub const NDIGITS: usize = 8;
/// Bits in a segment byte (7 segments plus decimal point).
pub const SEGMENTS_PER_DIGIT: usize = 8;
/// Displays the DMA driver can refresh: 24 parallel outputs minus latch and
/// clock.
pub const MAX_LINES: usize = 22;
/// Idle frames per digit cycle, one leading and one carrying the latch pulse.
pub const GUARD_FRAMES: usize = 2;
/// Samples per digit cycle.
pub const FRAMES_PER_DIGIT: usize = GUARD_FRAMES + 2 * SEGMENTS_PER_DIGIT + 2 * NDIGITS;
/// Samples in a [`DmaFrameBuffer`].
pub const SAMPLE_COUNT: usize = NDIGITS * FRAMES_PER_DIGIT;

/// One-hot common-anode select byte for each digit position.
pub const DIGIT_SELECTOR: [u8; NDIGITS] = [
    0b0001_0000,
    0b0010_0000,
    0b0100_0000,
    0b1000_0000,
    0b0000_0001,
    0b0000_0010,
    0b0000_0100,
    0b0000_1000,
];

// bit `7 - i` of `byte`, i.e. the i-th bit when shifting out MSB first
pub(crate) const fn shifted_bit(byte: u8, i: usize) -> bool {
    byte & (0x80 >> i) != 0
}

/// Physical output pin of each display line, `None` if unconnected.
pub type LinePins<P> = [Option<P>; MAX_LINES];

/// ESP32 GPIOs without an output driver.
pub const INPUT_ONLY_PINS: core::ops::RangeInclusive<u8> = 34..=39;

/// Checks a GPIO assignment given as one entry per parallel output, `None`
/// for unrouted outputs.
///
/// # Errors
/// [`DisplayError::InputOnlyPin`] for a GPIO in [`INPUT_ONLY_PINS`],
/// [`DisplayError::DuplicatePin`] for a GPIO that appears more than once.
pub fn check_pins(pins: &[Option<u8>]) -> Result<(), DisplayError> {
    for (i, &gpio) in pins.iter().enumerate() {
        let Some(gpio) = gpio else {
            continue;
        };
        if INPUT_ONLY_PINS.contains(&gpio) {
            return Err(DisplayError::InputOnlyPin(gpio));
        }
        if pins[..i].contains(&Some(gpio)) {
            return Err(DisplayError::DuplicatePin(gpio));
        }
    }
    Ok(())
}

/// Errors reported while setting up the DMA output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayError {
    /// The GPIO can not drive an output.
    InputOnlyPin(u8),
    /// The GPIO was assigned to more than one signal.
    DuplicatePin(u8),
    /// The sample buffer is not in memory the DMA engine can read.
    BufferNotDmaCapable,
}

impl core::fmt::Display for DisplayError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::InputOnlyPin(pin) => write!(f, "GPIO{pin} is input only"),
            Self::DuplicatePin(pin) => write!(f, "GPIO{pin} is assigned more than once"),
            Self::BufferNotDmaCapable => write!(f, "sample buffer is not DMA capable"),
        }
    }
}

impl core::error::Error for DisplayError {}
