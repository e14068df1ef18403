//! DMA refreshed display driver.
//!
//! [`I2sDisplayDriver`] keeps one [`LineBuffer`] per display, mirrors every
//! change into the borrowed [`DmaFrameBuffer`] and drives the lifecycle of the
//! [`ParallelOutput`] that replays it.
//!
//! # Example
//! ```
//! use esp_sevenseg::framebuffer::DmaFrameBuffer;
//! use esp_sevenseg::DisplayError;
//! use esp_sevenseg::I2sDisplayDriver;
//! use esp_sevenseg::ParallelOutput;
//! use esp_sevenseg::State;
//!
//! struct Nowhere;
//!
//! impl ParallelOutput for Nowhere {
//!     fn configure(&mut self, _: &DmaFrameBuffer) -> Result<(), DisplayError> {
//!         Ok(())
//!     }
//!     fn start(&mut self) {}
//!     fn stop(&mut self) {}
//! }
//!
//! let mut fb = DmaFrameBuffer::new();
//! let mut display = I2sDisplayDriver::new(Nowhere, &mut fb);
//! display.configure()?;
//! display.start();
//! display.display_text(0, "Hello");
//! display.display_text(1, "12.34");
//! assert_eq!(display.state(), State::Running);
//! # Ok::<(), DisplayError>(())
//! ```
//!
//! # Concurrency
//! Once started, the peripheral reads the buffer while the driver writes to
//! it. Every update rewrites all digit cycles of one line before returning, so
//! the display may show a mix of old and new content for at most one refresh
//! cycle.

use crate::framebuffer::DmaFrameBuffer;
use crate::glyph::encode;
use crate::line_buffer::LineBuffer;
use crate::output::ParallelOutput;
use crate::DisplayError;
use crate::MAX_LINES;

/// Lifecycle of the output peripheral.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum State {
    /// Constructed, [`I2sDisplayDriver::configure`] not called yet.
    Unconfigured,
    /// Peripheral set up and pointing at the buffer, not transmitting.
    Configured,
    /// Replaying the buffer.
    Running,
    /// Halted after running. The buffer still holds the last content.
    Stopped,
}

/// Driver for up to [`MAX_LINES`] 8-digit displays refreshed by DMA.
pub struct I2sDisplayDriver<'d, O: ParallelOutput> {
    output: O,
    buffer: &'d mut DmaFrameBuffer,
    lines: [LineBuffer; MAX_LINES],
    state: State,
}

impl<'d, O: ParallelOutput> I2sDisplayDriver<'d, O> {
    /// Creates an unconfigured driver with every line blank.
    ///
    /// `buffer` is borrowed for the lifetime of the driver so that it stays
    /// put while the peripheral reads from it.
    pub fn new(output: O, buffer: &'d mut DmaFrameBuffer) -> Self {
        Self {
            output,
            buffer,
            lines: [LineBuffer::new(); MAX_LINES],
            state: State::Unconfigured,
        }
    }

    /// Builds the sample buffer from the current line contents and sets up
    /// the peripheral. A running output is stopped first.
    ///
    /// # Errors
    /// Returns the peripheral's error; the driver is then unconfigured.
    pub fn configure(&mut self) -> Result<(), DisplayError> {
        if self.state == State::Running {
            self.output.stop();
        }
        self.state = State::Unconfigured;
        self.buffer.rebuild(&self.lines);
        self.output.configure(&*self.buffer)?;
        self.state = State::Configured;
        debug!(
            "display configured: {} bytes of samples",
            DmaFrameBuffer::dma_buffer_size_bytes()
        );
        Ok(())
    }

    /// Starts continuous refresh. Calling it while running re-arms the
    /// peripheral without touching the buffer.
    pub fn start(&mut self) {
        if self.state == State::Unconfigured {
            warn!("display start ignored: not configured");
            return;
        }
        self.output.start();
        self.state = State::Running;
        debug!("display started");
    }

    /// Halts refresh. The buffer keeps its content so a later
    /// [`start`](Self::start) shows the same text again.
    pub fn stop(&mut self) {
        if self.state == State::Unconfigured {
            return;
        }
        self.output.stop();
        if self.state == State::Running {
            self.state = State::Stopped;
        }
        debug!("display stopped");
    }

    /// Shows `text` on display `line`, see
    /// [`encode_text`](crate::glyph::encode_text) for the rules. Takes effect
    /// immediately.
    pub fn display_text(&mut self, line: usize, text: &str) {
        let Some(buffer) = self.lines.get_mut(line) else {
            warn!("display_text ignored: line {} out of range", line);
            return;
        };
        buffer.set_text(text);
        self.buffer.write_line(line, buffer);
        trace!("line {} updated", line);
    }

    /// Sets a single digit. Nothing changes on the display until
    /// [`flush`](Self::flush) is called.
    pub fn set(&mut self, line: usize, digit: usize, c: char) {
        let Some(buffer) = self.lines.get_mut(line) else {
            warn!("set ignored: line {} out of range", line);
            return;
        };
        if !buffer.set(digit, encode(c)) {
            warn!("set ignored: digit {} out of range", digit);
        }
    }

    /// Writes every line into the sample buffer.
    pub fn flush(&mut self) {
        for (line, buffer) in self.lines.iter().enumerate() {
            self.buffer.write_line(line, buffer);
        }
    }

    /// Blanks every line.
    pub fn clear(&mut self) {
        for buffer in &mut self.lines {
            buffer.clear();
        }
        self.flush();
    }

    /// Current lifecycle state.
    pub fn state(&self) -> State {
        self.state
    }

    /// Current content of `line`, including unflushed [`set`](Self::set)s.
    pub fn line(&self, line: usize) -> Option<&LineBuffer> {
        self.lines.get(line)
    }

    /// The sample buffer the output replays.
    pub fn samples(&self) -> &DmaFrameBuffer {
        &*self.buffer
    }

    /// The output backend.
    pub fn output(&self) -> &O {
        &self.output
    }
}

impl<O: ParallelOutput> Drop for I2sDisplayDriver<'_, O> {
    fn drop(&mut self) {
        // the buffer borrow ends here, the peripheral must not read it anymore
        if self.state != State::Unconfigured {
            self.output.stop();
        }
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use std::vec;
    use std::vec::Vec;

    use super::*;
    use crate::glyph::encode_text;
    use crate::glyph::Segments;
    use crate::testing::replay;
    use crate::testing::replay_segments;
    use crate::NDIGITS;

    #[derive(Clone, Copy, PartialEq, Eq, Debug)]
    enum Event {
        Configure(*const u8),
        Start,
        Stop,
    }

    #[derive(Default)]
    struct RecordingOutput {
        events: Vec<Event>,
        fail: Option<DisplayError>,
    }

    impl ParallelOutput for RecordingOutput {
        fn configure(&mut self, samples: &DmaFrameBuffer) -> Result<(), DisplayError> {
            if let Some(error) = self.fail {
                return Err(error);
            }
            self.events.push(Event::Configure(samples.as_ptr()));
            Ok(())
        }

        fn start(&mut self) {
            self.events.push(Event::Start);
        }

        fn stop(&mut self) {
            self.events.push(Event::Stop);
        }
    }

    fn segments_of(text: &str) -> Vec<u8> {
        encode_text::<NDIGITS>(text).iter().map(|s| s.bits()).collect()
    }

    fn blank() -> Vec<u8> {
        vec![Segments::BLANK.bits(); NDIGITS]
    }

    #[test]
    fn test_new_is_unconfigured_and_blank() {
        let mut fb = DmaFrameBuffer::new();
        let display = I2sDisplayDriver::new(RecordingOutput::default(), &mut fb);
        assert_eq!(display.state(), State::Unconfigured);
        assert!((0..MAX_LINES).all(|line| display.line(line).unwrap().is_blank()));
        assert!(display.line(MAX_LINES).is_none());
    }

    #[test]
    fn test_start_before_configure_is_ignored() {
        let mut output = RecordingOutput::default();
        let mut fb = DmaFrameBuffer::new();
        let mut display = I2sDisplayDriver::new(&mut output, &mut fb);
        display.start();
        display.stop();
        assert_eq!(display.state(), State::Unconfigured);
        drop(display);
        assert!(output.events.is_empty());
    }

    #[test]
    fn test_configure_points_output_at_buffer() {
        let mut output = RecordingOutput::default();
        let mut fb = DmaFrameBuffer::new();
        let ptr = fb.as_ptr();
        let mut display = I2sDisplayDriver::new(&mut output, &mut fb);
        display.configure().unwrap();
        assert_eq!(display.state(), State::Configured);
        assert_eq!(replay(display.samples(), 0).len(), NDIGITS);
        assert_eq!(display.output().events, [Event::Configure(ptr)]);
    }

    #[test]
    fn test_configure_keeps_text_written_before() {
        let mut fb = DmaFrameBuffer::new();
        let mut display = I2sDisplayDriver::new(RecordingOutput::default(), &mut fb);
        display.display_text(4, "early");
        display.configure().unwrap();
        assert_eq!(replay_segments(display.samples(), 4), segments_of("early"));
    }

    #[test]
    fn test_configure_failure_leaves_driver_unconfigured() {
        let output = RecordingOutput {
            fail: Some(DisplayError::BufferNotDmaCapable),
            ..Default::default()
        };
        let mut fb = DmaFrameBuffer::new();
        let mut display = I2sDisplayDriver::new(output, &mut fb);
        assert_eq!(display.configure(), Err(DisplayError::BufferNotDmaCapable));
        assert_eq!(display.state(), State::Unconfigured);
        display.start();
        assert_eq!(display.state(), State::Unconfigured);
        assert!(display.output().events.is_empty());
    }

    #[test]
    fn test_lifecycle() {
        let mut fb = DmaFrameBuffer::new();
        let mut display = I2sDisplayDriver::new(RecordingOutput::default(), &mut fb);
        display.configure().unwrap();

        display.stop();
        assert_eq!(display.state(), State::Configured);

        display.start();
        assert_eq!(display.state(), State::Running);
        display.stop();
        assert_eq!(display.state(), State::Stopped);
        display.start();
        assert_eq!(display.state(), State::Running);

        let events = &display.output().events;
        assert_eq!(
            events[1..],
            [Event::Stop, Event::Start, Event::Stop, Event::Start]
        );
    }

    #[test]
    fn test_start_twice_keeps_buffer() {
        let mut fb = DmaFrameBuffer::new();
        let mut display = I2sDisplayDriver::new(RecordingOutput::default(), &mut fb);
        display.configure().unwrap();
        display.display_text(0, "Hello");
        display.start();
        let before = *display.samples().samples();
        display.start();
        assert_eq!(display.state(), State::Running);
        assert_eq!(&before, display.samples().samples());
    }

    #[test]
    fn test_stop_preserves_content() {
        let mut fb = DmaFrameBuffer::new();
        let mut display = I2sDisplayDriver::new(RecordingOutput::default(), &mut fb);
        display.configure().unwrap();
        display.start();
        display.display_text(2, "World");
        display.stop();
        display.start();
        assert_eq!(replay_segments(display.samples(), 2), segments_of("World"));
    }

    #[test]
    fn test_reconfigure_while_running_stops_first() {
        let mut fb = DmaFrameBuffer::new();
        let mut display = I2sDisplayDriver::new(RecordingOutput::default(), &mut fb);
        display.configure().unwrap();
        display.start();
        display.configure().unwrap();
        assert_eq!(display.state(), State::Configured);
        let events = &display.output().events;
        assert_eq!(events[1..3], [Event::Start, Event::Stop]);
        assert!(matches!(events[3], Event::Configure(_)));
    }

    #[test]
    fn test_display_text_updates_only_its_line() {
        let mut fb = DmaFrameBuffer::new();
        let mut display = I2sDisplayDriver::new(RecordingOutput::default(), &mut fb);
        display.configure().unwrap();
        display.display_text(0, "Hello");
        display.display_text(1, "World");

        display.display_text(0, "");

        assert_eq!(replay_segments(display.samples(), 0), blank());
        assert_eq!(replay_segments(display.samples(), 1), segments_of("World"));
        assert!(display.line(0).unwrap().is_blank());
    }

    #[test]
    fn test_display_text_is_repeatable() {
        let mut fb = DmaFrameBuffer::new();
        let mut display = I2sDisplayDriver::new(RecordingOutput::default(), &mut fb);
        display.configure().unwrap();
        display.display_text(7, "8.8.8.8.");
        let first = *display.samples().samples();
        display.display_text(7, "8.8.8.8.");
        assert_eq!(&first, display.samples().samples());
    }

    #[test]
    fn test_out_of_range_line_is_noop() {
        let mut fb = DmaFrameBuffer::new();
        let mut display = I2sDisplayDriver::new(RecordingOutput::default(), &mut fb);
        display.configure().unwrap();
        let before = *display.samples().samples();
        let lines_before = display.lines;

        for line in [MAX_LINES, MAX_LINES + 1, 255, usize::MAX / 2, usize::MAX] {
            display.display_text(line, "88888888");
            display.set(line, 0, '8');
            display.set(line, usize::MAX, '8');
        }
        display.set(0, NDIGITS, '8');
        display.flush();

        assert_eq!(&before, display.samples().samples());
        assert_eq!(lines_before, display.lines);
    }

    #[test]
    fn test_set_defers_until_flush() {
        let mut fb = DmaFrameBuffer::new();
        let mut display = I2sDisplayDriver::new(RecordingOutput::default(), &mut fb);
        display.configure().unwrap();
        display.display_text(0, "00000000");
        display.display_text(1, "11111111");

        display.set(0, 3, '7');
        assert_eq!(replay_segments(display.samples(), 0), segments_of("00000000"));
        assert_eq!(display.line(0).unwrap().get(3), Some(encode('7')));

        display.flush();
        assert_eq!(replay_segments(display.samples(), 0), segments_of("00070000"));
        assert_eq!(replay_segments(display.samples(), 1), segments_of("11111111"));
    }

    #[test]
    fn test_clear_blanks_every_line() {
        let mut fb = DmaFrameBuffer::new();
        let mut display = I2sDisplayDriver::new(RecordingOutput::default(), &mut fb);
        display.configure().unwrap();
        for line in 0..MAX_LINES {
            display.display_text(line, "88888888");
        }
        display.clear();
        for line in 0..MAX_LINES {
            assert_eq!(replay_segments(display.samples(), line), blank());
        }
    }

    #[test]
    fn test_drop_stops_running_output() {
        let mut output = RecordingOutput::default();
        let mut fb = DmaFrameBuffer::new();
        let mut display = I2sDisplayDriver::new(&mut output, &mut fb);
        display.configure().unwrap();
        display.start();
        drop(display);
        assert_eq!(output.events.last(), Some(&Event::Stop));
    }
}
