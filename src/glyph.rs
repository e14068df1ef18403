//! ASCII to 7-segment glyph encoding.
//!
//! Segment bytes are stored active-low, the way the shift registers want them:
//! a set bit switches the segment OFF. Bit 7 is the decimal point, bits 6..0
//! are segments g, f, e, d, c, b, a.
//!
//! ```
//! use esp_sevenseg::glyph::encode;
//! use esp_sevenseg::glyph::encode_text;
//! use esp_sevenseg::glyph::Segments;
//!
//! assert_eq!(encode('1').lit(), 0x06);
//! assert_eq!(encode('~'), Segments::BLANK);
//!
//! let digits = encode_text::<8>("3.14");
//! assert!(digits[0].has_decimal_point());
//! assert_eq!(digits[3], Segments::BLANK);
//! ```

/// Segment byte for one digit position (active-low).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(transparent)]
pub struct Segments(u8);

impl Segments {
    /// All segments and the decimal point off.
    pub const BLANK: Self = Self(0xff);

    const DECIMAL_POINT: u8 = 0x80;

    /// Wraps a raw active-low segment byte.
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    /// Builds segments from an active-high mask (set bit = segment lit).
    pub const fn from_lit(lit: u8) -> Self {
        Self(!lit)
    }

    /// The raw active-low byte as it is shifted out.
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// The active-high view of this glyph.
    pub const fn lit(self) -> u8 {
        !self.0
    }

    /// The same glyph with the decimal point lit.
    pub const fn with_decimal_point(self) -> Self {
        Self(self.0 & !Self::DECIMAL_POINT)
    }

    /// Whether the decimal point is lit.
    pub const fn has_decimal_point(self) -> bool {
        self.0 & Self::DECIMAL_POINT == 0
    }

    /// Whether every segment, decimal point included, is off.
    pub const fn is_blank(self) -> bool {
        self.0 == Self::BLANK.0
    }
}

impl Default for Segments {
    fn default() -> Self {
        Self::BLANK
    }
}

impl core::fmt::Debug for Segments {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "Segments({:#04x})", self.0)
    }
}

const FIRST: char = ' ';
const LAST: char = 'z';

// Active-high glyphs from ' ' (0x20) to 'z' (0x7a), based upon
// https://en.wikichip.org/wiki/seven-segment_display/representing_letters
#[rustfmt::skip]
const GLYPHS: [u8; 91] = [
    // sp    !     "     #     $     %     &     '     (     )     *     +     ,     -     .     /
    0x00, 0x00, 0x06, 0x00, 0x00, 0x00, 0x00, 0x02, 0x39, 0x0f, 0x63, 0x00, 0x04, 0x40, 0x00, 0x00,
    // 0     1     2     3     4     5     6     7     8     9     :     ;     <     =     >     ?
    0x3f, 0x06, 0x5b, 0x4f, 0x66, 0x6d, 0x7d, 0x07, 0x7f, 0x6f, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    // @     A     B     C     D     E     F     G     H     I     J     K     L     M     N     O
    0x00, 0x77, 0x7c, 0x39, 0x5e, 0x79, 0x71, 0x3d, 0x76, 0x30, 0x1e, 0x75, 0x38, 0x55, 0x54, 0x5c,
    // P     Q     R     S     T     U     V     W     X     Y     Z     [     \     ]     ^     _
    0x73, 0x67, 0x50, 0x6d, 0x78, 0x3e, 0x1c, 0x1d, 0x64, 0x6e, 0x5b, 0x39, 0x00, 0x0f, 0x23, 0x08,
    // `     a     b     c     d     e     f     g     h     i     j     k     l     m     n     o
    0x00, 0x77, 0x7c, 0x39, 0x5e, 0x79, 0x71, 0x3d, 0x76, 0x30, 0x1e, 0x75, 0x38, 0x55, 0x54, 0x5c,
    // p     q     r     s     t     u     v     w     x     y     z
    0x73, 0x67, 0x50, 0x6d, 0x78, 0x3e, 0x1c, 0x1d, 0x64, 0x6e, 0x5b,
];

/// Encodes a single character. Anything outside `'!'..='z'` or without a
/// glyph comes back as [`Segments::BLANK`].
pub fn encode(c: char) -> Segments {
    if c <= FIRST || c > LAST {
        return Segments::BLANK;
    }
    Segments::from_lit(GLYPHS[c as usize - FIRST as usize])
}

/// Encodes `text` into exactly `N` digit positions.
///
/// A `.` following an emitted digit lights that digit's decimal point instead
/// of taking a position of its own. Characters outside `' '..='z'` are
/// skipped, short input is padded with blanks and long input is cut off.
pub fn encode_text<const N: usize>(text: &str) -> [Segments; N] {
    let mut digits = [Segments::BLANK; N];
    let mut written = 0;
    for c in text.chars() {
        if c == '.' && written > 0 {
            digits[written - 1] = digits[written - 1].with_decimal_point();
        } else if written == N {
            break;
        } else if (FIRST..=LAST).contains(&c) {
            digits[written] = encode(c);
            written += 1;
        }
    }
    digits
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;

    #[test]
    fn test_encode_digits() {
        let expected = [0x3f, 0x06, 0x5b, 0x4f, 0x66, 0x6d, 0x7d, 0x07, 0x7f, 0x6f];
        for (c, lit) in ('0'..='9').zip(expected) {
            assert_eq!(encode(c).lit(), lit, "digit {c}");
            assert_eq!(encode(c).bits(), !lit);
        }
    }

    #[test]
    fn test_encode_is_stable_over_printable_range() {
        for c in ' '..='z' {
            let first = encode(c);
            assert_eq!(first, encode(c));
            assert!(!first.has_decimal_point(), "{c} must not light the dp");
        }
    }

    #[test]
    fn test_encode_out_of_range_is_blank() {
        for c in ['\0', '\n', '\t', ' ', '{', '|', '~', '\u{7f}', 'ä', '€'] {
            assert_eq!(encode(c), Segments::BLANK, "{c:?}");
        }
    }

    #[test]
    fn test_encode_unmapped_punctuation_is_blank() {
        for c in ['!', '#', ':', '?', '@', '\\', '`', '.'] {
            assert!(encode(c).is_blank(), "{c:?}");
        }
    }

    #[test]
    fn test_upper_and_lower_case_share_glyphs() {
        for (upper, lower) in ('A'..='Z').zip('a'..='z') {
            assert_eq!(encode(upper), encode(lower));
        }
    }

    #[test]
    fn test_decimal_point_merges_into_previous_digit() {
        let digits = encode_text::<8>("A.B");
        assert_eq!(digits[0], encode('A').with_decimal_point());
        assert!(digits[0].has_decimal_point());
        assert_eq!(digits[1], encode('B'));
        for digit in &digits[2..] {
            assert_eq!(*digit, Segments::BLANK);
        }
    }

    #[test]
    fn test_leading_dot_takes_a_position() {
        let digits = encode_text::<4>(".5");
        assert_eq!(digits[0], Segments::BLANK);
        assert_eq!(digits[1], encode('5'));
    }

    #[test]
    fn test_long_text_is_truncated() {
        let digits = encode_text::<8>("12345678901");
        let expected: [Segments; 8] = core::array::from_fn(|i| encode((b'1' + i as u8) as char));
        assert_eq!(digits, expected);
    }

    #[test]
    fn test_dot_after_last_position_still_applies() {
        let digits = encode_text::<8>("12345678.9");
        assert!(digits[7].has_decimal_point());
        assert_eq!(digits[7], encode('8').with_decimal_point());
    }

    #[test]
    fn test_empty_text_is_blank() {
        assert_eq!(encode_text::<8>(""), [Segments::BLANK; 8]);
    }

    #[test]
    fn test_characters_outside_range_are_skipped() {
        let digits = encode_text::<4>("1\n2~3");
        assert_eq!(digits, [encode('1'), encode('2'), encode('3'), Segments::BLANK]);
    }

    #[test]
    fn test_debug_format() {
        assert_eq!(std::format!("{:?}", Segments::BLANK), "Segments(0xff)");
    }
}
