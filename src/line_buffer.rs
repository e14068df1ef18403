//! Per display segment storage.

use crate::glyph::encode;
use crate::glyph::encode_text;
use crate::glyph::Segments;
use crate::NDIGITS;

/// The segment bytes of one display line, one per digit position.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LineBuffer {
    digits: [Segments; NDIGITS],
}

impl Default for LineBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl LineBuffer {
    /// A blank line.
    pub const fn new() -> Self {
        Self {
            digits: [Segments::BLANK; NDIGITS],
        }
    }

    /// Replaces the whole line with `text`, see [`encode_text`].
    pub fn set_text(&mut self, text: &str) {
        self.digits = encode_text(text);
    }

    /// Sets one digit position. Returns `false` (and changes nothing) if
    /// `digit` is out of range.
    pub fn set(&mut self, digit: usize, segments: Segments) -> bool {
        match self.digits.get_mut(digit) {
            Some(slot) => {
                *slot = segments;
                true
            }
            None => false,
        }
    }

    /// [`Self::set`] with the glyph of `c`, see [`encode`].
    pub fn set_char(&mut self, digit: usize, c: char) -> bool {
        self.set(digit, encode(c))
    }

    /// The segments at `digit`, `None` if out of range.
    pub fn get(&self, digit: usize) -> Option<Segments> {
        self.digits.get(digit).copied()
    }

    /// Blanks every digit.
    pub fn clear(&mut self) {
        self.digits = [Segments::BLANK; NDIGITS];
    }

    /// All digit positions, leftmost first.
    pub fn digits(&self) -> &[Segments; NDIGITS] {
        &self.digits
    }

    /// Whether no segment of the line is lit.
    pub fn is_blank(&self) -> bool {
        self.digits.iter().all(|digit| digit.is_blank())
    }
}
