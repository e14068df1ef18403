//! Line oriented text commands of the form `<n>=<text>`.
//!
//! `n` is a single digit selecting the display line, everything after the `=`
//! is handed to [`display_text`](crate::I2sDisplayDriver::display_text).
//! Lines are terminated by `\n` or `\r`; anything that does not parse is
//! dropped.
//!
//! ```
//! use esp_sevenseg::command::LineAssembler;
//!
//! let mut assembler = LineAssembler::<16>::new(8);
//! let mut command = None;
//! for byte in b"3=12.34\r\n" {
//!     command = command.or(assembler.push(*byte));
//! }
//! let command = command.unwrap();
//! assert_eq!(command.line, 3);
//! assert_eq!(command.text.as_str(), "12.34");
//! ```

use heapless::String;
use heapless::Vec;

/// A parsed `<n>=<text>` line.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Command<const N: usize> {
    /// Display line, below the assembler's limit.
    pub line: usize,
    /// Everything after the `=`, not yet encoded.
    pub text: String<N>,
}

/// Collects bytes until a line terminator and parses the line.
///
/// Holds at most `N` bytes per line, the rest of an overlong line is dropped.
pub struct LineAssembler<const N: usize> {
    buffer: Vec<u8, N>,
    max_lines: usize,
}

impl<const N: usize> LineAssembler<N> {
    /// Commands for lines `>= max_lines` are rejected.
    pub const fn new(max_lines: usize) -> Self {
        Self {
            buffer: Vec::new(),
            max_lines,
        }
    }

    /// Feeds one byte, returning a command when it completes a valid line.
    pub fn push(&mut self, byte: u8) -> Option<Command<N>> {
        match byte {
            b'\n' | b'\r' => {
                let command = self.parse();
                self.buffer.clear();
                command
            }
            _ => {
                if self.buffer.push(byte).is_err() {
                    trace!("command line full, dropping byte {}", byte);
                }
                None
            }
        }
    }

    /// Bytes buffered since the last terminator.
    pub fn pending(&self) -> &[u8] {
        &self.buffer
    }

    fn parse(&self) -> Option<Command<N>> {
        let (&first, rest) = self.buffer.split_first()?;
        let text = match rest {
            [b'=', text @ ..] if !text.is_empty() => text,
            _ => {
                if !self.buffer.is_empty() {
                    warn!("ignoring malformed command ({} bytes)", self.buffer.len());
                }
                return None;
            }
        };
        let line = usize::from(first.wrapping_sub(b'0'));
        if line >= self.max_lines {
            warn!("ignoring command for line {}", line);
            return None;
        }
        let text = core::str::from_utf8(text).ok()?;
        let mut owned = String::new();
        owned.push_str(text).ok()?;
        Some(Command { line, text: owned })
    }
}
