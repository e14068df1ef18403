//! Cyclic sample buffer for DMA driven 74HC595 displays.
//!
//! The I2S peripheral replays the buffer forever, one [`Sample`] per tick of
//! its sample clock. Each sample drives all parallel outputs at once: the
//! shared latch and shift clock plus one data bit per display line.
//!
//! # Memory Layout
//! The buffer holds one *digit cycle* of [`FRAMES_PER_DIGIT`] samples for each
//! of the [`NDIGITS`] digit positions. Within digit cycle `d`:
//!
//! | frame    | latch | clock         | line data                                  |
//! |----------|-------|---------------|--------------------------------------------|
//! | 0        | low   | low           | high (idle)                                |
//! | 1..=16   | low   | high on odd   | pairs: bit `7 - i` of the line's digit `d` |
//! | 17..=32  | low   | high on odd   | pairs: bit `7 - i` of `DIGIT_SELECTOR[d]`  |
//! | 33       | high  | low           | high (idle)                                |
//!
//! Every data bit is held for two samples and the clock rises on the first
//! one, so each digit cycle shifts 16 bits into the register pair (segments
//! first, then the digit select byte) and ends with a single latch pulse.
//!
//! The digit select pairs and the clock/latch train are the same for every
//! line and are only written by [`DmaFrameBuffer::format`]. Text updates
//! rewrite just the segment pairs of one line with
//! [`DmaFrameBuffer::write_line`].

use bitfield::bitfield;

use crate::line_buffer::LineBuffer;
use crate::shifted_bit;
use crate::DIGIT_SELECTOR;
use crate::FRAMES_PER_DIGIT;
use crate::MAX_LINES;
use crate::NDIGITS;
use crate::SAMPLE_COUNT;
use crate::SEGMENTS_PER_DIGIT;

/// Sample bit driving parallel output 0.
pub const LATCH_BIT: usize = 8;
/// Sample bit driving parallel output 1.
pub const CLOCK_BIT: usize = 9;
/// Sample bit of line 0; line `n` drives parallel output `n + 2`.
pub const LINE_SHIFT: usize = 10;

/// First frame of the segment bit pairs within a digit cycle.
pub const SEGMENT_START: usize = 1;
/// First frame of the digit select bit pairs within a digit cycle.
pub const SELECT_START: usize = SEGMENT_START + 2 * SEGMENTS_PER_DIGIT;
/// Last frame of a digit cycle, carries the latch pulse.
pub const LATCH_FRAME: usize = FRAMES_PER_DIGIT - 1;

const ALL_LINES: u32 = (1 << MAX_LINES) - 1;

const _: () = assert!(LINE_SHIFT + MAX_LINES == u32::BITS as usize);
const _: () = assert!(SELECT_START + 2 * NDIGITS == LATCH_FRAME);

bitfield! {
    /// 32-bit word driving the parallel outputs for one sample period.
    ///
    /// The bit layout is as follows:
    /// - Bits 31-10: data for display lines 21..0
    /// - Bit 9: shift clock (SCK)
    /// - Bit 8: output latch (RCK)
    /// - Bits 7-0: not routed, always 0
    #[derive(Clone, Copy, Default, PartialEq, Eq)]
    #[repr(transparent)]
    pub struct Sample(u32);
    impl Debug;
    /// One data bit per display line, line 0 in bit 10.
    pub lines, set_lines: 31, 10;
    /// Shift clock (SCK) level.
    pub clock, set_clock: 9;
    /// Output latch (RCK) level.
    pub latch, set_latch: 8;
}

#[cfg(feature = "defmt")]
impl defmt::Format for Sample {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "Sample({=u32:#x})", self.0)
    }
}

impl Sample {
    /// Clock and latch low, every data line high (segments off).
    pub const IDLE: Self = Self(ALL_LINES << LINE_SHIFT);

    /// The raw word as the peripheral reads it.
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Data bit of `line`. Out of range lines read as low.
    pub fn line(&self, line: usize) -> bool {
        line < MAX_LINES && self.lines() & (1 << line) != 0
    }

    /// Sets the data bit of `line`. Out of range lines are ignored.
    pub fn set_line(&mut self, line: usize, value: bool) {
        if line >= MAX_LINES {
            return;
        }
        let lines = if value {
            self.lines() | (1 << line)
        } else {
            self.lines() & !(1 << line)
        };
        self.set_lines(lines);
    }

    fn set_all_lines(&mut self, value: bool) {
        self.set_lines(if value { ALL_LINES } else { 0 });
    }
}

/// DMA-compatible sample buffer for up to [`MAX_LINES`] displays.
///
/// The buffer must stay at a fixed address while the peripheral replays it,
/// so the driver only ever borrows it.
#[derive(Clone, Copy)]
#[repr(C)]
#[repr(align(4))]
pub struct DmaFrameBuffer {
    samples: [Sample; SAMPLE_COUNT],
}

impl Default for DmaFrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl DmaFrameBuffer {
    /// Creates a zeroed buffer. Call [`Self::format`] (or let the driver
    /// configure it) before handing it to the peripheral.
    pub const fn new() -> Self {
        Self {
            samples: [Sample(0); SAMPLE_COUNT],
        }
    }

    /// Size of the DMA buffer in bytes. It has to fit into a single DMA
    /// descriptor.
    pub const fn dma_buffer_size_bytes() -> usize {
        core::mem::size_of::<[Sample; SAMPLE_COUNT]>()
    }

    /// Writes the idle pattern: clock train, latch pulses, digit select bits
    /// and blank segments for every line.
    pub fn format(&mut self) {
        for (cycle, selector) in self
            .samples
            .chunks_exact_mut(FRAMES_PER_DIGIT)
            .zip(DIGIT_SELECTOR)
        {
            for (i, sample) in cycle.iter_mut().enumerate() {
                *sample = Sample::IDLE;
                // rising edge on the first sample of every bit pair
                sample.set_clock(i % 2 == 1 && i < LATCH_FRAME);
            }
            cycle[LATCH_FRAME].set_latch(true);

            for i in 0..NDIGITS {
                let value = shifted_bit(selector, i);
                let frame = SELECT_START + 2 * i;
                for sample in &mut cycle[frame..frame + 2] {
                    sample.set_all_lines(value);
                }
            }
        }
    }

    /// Rewrites the segment bits of `line` in every digit cycle. Other lines
    /// and the control bits are left untouched. Out of range lines are
    /// ignored.
    pub fn write_line(&mut self, line: usize, buffer: &LineBuffer) {
        if line >= MAX_LINES {
            return;
        }
        for (cycle, segments) in self
            .samples
            .chunks_exact_mut(FRAMES_PER_DIGIT)
            .zip(buffer.digits())
        {
            for i in 0..SEGMENTS_PER_DIGIT {
                let value = shifted_bit(segments.bits(), i);
                let frame = SEGMENT_START + 2 * i;
                for sample in &mut cycle[frame..frame + 2] {
                    sample.set_line(line, value);
                }
            }
        }
    }

    /// Formats the buffer and writes every line. Extra lines beyond
    /// [`MAX_LINES`] are ignored.
    pub fn rebuild(&mut self, lines: &[LineBuffer]) {
        self.format();
        for (line, buffer) in lines.iter().enumerate().take(MAX_LINES) {
            self.write_line(line, buffer);
        }
    }

    /// Every sample, in replay order.
    pub fn samples(&self) -> &[Sample; SAMPLE_COUNT] {
        &self.samples
    }

    /// The samples of digit cycle `digit`.
    pub fn digit_cycle(&self, digit: usize) -> Option<&[Sample]> {
        self.samples.chunks_exact(FRAMES_PER_DIGIT).nth(digit)
    }

    /// Start address of the sample data for the DMA descriptor.
    pub fn as_ptr(&self) -> *const u8 {
        self.samples.as_ptr().cast()
    }
}

#[cfg(feature = "log")]
impl core::fmt::Debug for DmaFrameBuffer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DmaFrameBuffer")
            .field("size", &core::mem::size_of_val(&self.samples))
            .field("digit_cycles", &NDIGITS)
            .field("frames_per_digit", &FRAMES_PER_DIGIT)
            .finish()
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for DmaFrameBuffer {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "DmaFrameBuffer<{}, {}>", NDIGITS, MAX_LINES);
        defmt::write!(f, " size: {}", core::mem::size_of_val(&self.samples));
        defmt::write!(f, " frames_per_digit: {}", FRAMES_PER_DIGIT);
    }
}
