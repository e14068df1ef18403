//! CPU driven refresh over plain GPIOs.
//!
//! Every call to [`BitBangDisplay::display_loop`] shifts out one digit for all
//! displays and latches it. It has to be called at least 200 times per second
//! to avoid flicker, [`BitBangDisplay::refresh`] does a full pass with a fixed
//! hold time per digit.

use embedded_hal::digital::OutputPin;
use embedded_hal::digital::PinState;
use embedded_hal_async::delay::DelayNs;

use crate::line_buffer::LineBuffer;
use crate::shifted_bit;
use crate::DIGIT_SELECTOR;
use crate::NDIGITS;
use crate::SEGMENTS_PER_DIGIT;

/// How long [`BitBangDisplay::refresh`] keeps each digit lit.
pub const DIGIT_HOLD_US: u32 = 1_000;

/// `LINES` displays sharing latch and clock, each on its own data pin.
pub struct BitBangDisplay<P: OutputPin, const LINES: usize> {
    latch: P,
    clock: P,
    data: [Option<P>; LINES],
    lines: [LineBuffer; LINES],
    digit: usize,
}

impl<P: OutputPin, const LINES: usize> BitBangDisplay<P, LINES> {
    /// `data[n]` is the DIO pin of display `n`; `None` leaves that line
    /// unconnected.
    pub fn new(latch: P, clock: P, data: [Option<P>; LINES]) -> Self {
        Self {
            latch,
            clock,
            data,
            lines: [LineBuffer::new(); LINES],
            digit: 0,
        }
    }

    /// Sets the content of display `line`. Single dots are merged into the
    /// previous digit.
    pub fn set_display_content(&mut self, line: usize, text: &str) {
        match self.lines.get_mut(line) {
            Some(buffer) => buffer.set_text(text),
            None => warn!("set_display_content ignored: line {} out of range", line),
        }
    }

    /// Sets a single digit of display `line`, shown from the next
    /// [`display_loop`](Self::display_loop) on.
    pub fn set(&mut self, line: usize, digit: usize, c: char) {
        let updated = self
            .lines
            .get_mut(line)
            .is_some_and(|buffer| buffer.set_char(digit, c));
        if !updated {
            warn!("set ignored: line {} digit {} out of range", line, digit);
        }
    }

    /// Blanks every display.
    pub fn clear(&mut self) {
        for buffer in &mut self.lines {
            buffer.clear();
        }
    }

    /// Current content of `line`.
    pub fn line(&self, line: usize) -> Option<&LineBuffer> {
        self.lines.get(line)
    }

    /// The digit the next [`display_loop`](Self::display_loop) shows.
    pub fn current_digit(&self) -> usize {
        self.digit
    }

    /// Shifts out and latches the current digit on all displays, then
    /// advances to the next one.
    ///
    /// # Errors
    /// Returns the first pin error; the digit is not advanced.
    pub fn display_loop(&mut self) -> Result<(), P::Error> {
        let digit = self.digit;
        self.latch.set_low()?;
        // segments of every display first
        for i in 0..SEGMENTS_PER_DIGIT {
            for (pin, buffer) in self.data.iter_mut().zip(&self.lines) {
                if let Some(pin) = pin {
                    let segments = buffer.digits()[digit].bits();
                    pin.set_state(PinState::from(shifted_bit(segments, i)))?;
                }
            }
            self.pulse_clock()?;
        }
        // then the common anode
        for i in 0..NDIGITS {
            let state = PinState::from(shifted_bit(DIGIT_SELECTOR[digit], i));
            for pin in self.data.iter_mut().flatten() {
                pin.set_state(state)?;
            }
            self.pulse_clock()?;
        }
        self.latch.set_high()?;
        self.digit = (digit + 1) % NDIGITS;
        Ok(())
    }

    /// Shows every digit once, holding each for [`DIGIT_HOLD_US`].
    ///
    /// # Errors
    /// Returns the first pin error.
    pub async fn refresh<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), P::Error> {
        for _ in 0..NDIGITS {
            self.display_loop()?;
            delay.delay_us(DIGIT_HOLD_US).await;
        }
        Ok(())
    }

    fn pulse_clock(&mut self) -> Result<(), P::Error> {
        self.clock.set_high()?;
        self.clock.set_low()
    }
}
