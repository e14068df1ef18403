//! Host-side model of the display hardware used by the unit tests.

extern crate std;

use std::vec::Vec;

use crate::framebuffer::DmaFrameBuffer;
use crate::framebuffer::Sample;

/// A segment register daisy-chained into a digit register, as found on the
/// display modules, listening to a single data line.
#[derive(Default)]
pub struct RegisterPair {
    shift: u16,
    clock: bool,
    latch: bool,
}

impl RegisterPair {
    /// Returns the latched `(segments, selector)` on a rising latch edge.
    pub fn step(&mut self, sample: &Sample, line: usize) -> Option<(u8, u8)> {
        if sample.clock() && !self.clock {
            self.shift = (self.shift << 1) | u16::from(sample.line(line));
        }
        self.clock = sample.clock();
        let latched = (sample.latch() && !self.latch)
            .then(|| ((self.shift >> 8) as u8, self.shift as u8));
        self.latch = sample.latch();
        latched
    }
}

/// Plays the whole buffer once and returns what `line` latched per digit.
pub fn replay(fb: &DmaFrameBuffer, line: usize) -> Vec<(u8, u8)> {
    let mut pair = RegisterPair::default();
    fb.samples()
        .iter()
        .filter_map(|sample| pair.step(sample, line))
        .collect()
}

/// The segment bytes `line` latched, in digit order.
pub fn replay_segments(fb: &DmaFrameBuffer, line: usize) -> Vec<u8> {
    replay(fb, line).into_iter().map(|(segments, _)| segments).collect()
}
