//! Numeric-literal classification.
//!
//! A stateless analysis of a numeric token's raw text: detects the radix,
//! integer-vs-floating kind, and suffixes, and records at most one error.
//! The classifier never reports diagnostics itself — the caller owns
//! diagnosing the recorded error (exactly once) and the binary-literal
//! extension warning.
//!
//! Grammar [C99 6.4.4.1, 6.4.4.2]:
//!
//! ```text
//! integer-constant:
//!     decimal-constant integer-suffix{opt}
//!     octal-constant integer-suffix{opt}
//!     hexadecimal-constant integer-suffix{opt}
//!
//! integer-suffix: u/U and l/L/ll/LL in either order, each at most once
//!
//! floating-constant:
//!     fractional-constant exponent-part{opt} floating-suffix{opt}
//!     digit-sequence exponent-part floating-suffix{opt}
//!     hexadecimal floating constants require a binary exponent (p/P)
//! ```
//!
//! `0b...` binary literals are a GCC extension; they classify with
//! radix 2 and set [`NumericLiteral::binary_extension`] so the caller can
//! warn.

use thiserror::Error;

/// What went wrong while classifying a numeric literal.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Error)]
pub enum NumericError {
    #[error("invalid digit in decimal constant")]
    InvalidDecimalDigit,
    #[error("invalid digit in octal constant")]
    InvalidOctalDigit,
    #[error("invalid digit in binary constant")]
    InvalidBinaryDigit,
    #[error("exponent has no digits")]
    ExponentHasNoDigits,
    #[error("hexadecimal floating constant requires an exponent")]
    HexFloatRequiresExponent,
    #[error("invalid suffix on floating constant")]
    InvalidFloatingSuffix,
    #[error("invalid suffix on integer constant")]
    InvalidIntegerSuffix,
}

/// Classification of one numeric literal's raw text.
pub struct NumericLiteral<'a> {
    text: &'a str,

    /// Set if the literal is malformed; holds the specific failure.
    pub error: Option<NumericError>,
    /// `0b`/`0B` prefix seen (GCC extension; caller warns).
    pub binary_extension: bool,

    /// `u`/`U` suffix.
    pub is_unsigned: bool,
    /// Single `l`/`L` suffix. Not set for `ll`.
    pub is_long: bool,
    /// `ll`/`LL` suffix (adjacent, same case).
    pub is_long_long: bool,
    /// `f`/`F` suffix.
    pub is_float: bool,

    radix: u32,
    saw_period: bool,
    saw_exponent: bool,
    digits_begin: usize,
    suffix_begin: usize,
}

impl<'a> NumericLiteral<'a> {
    /// Classify `text`, the exact spelling of one numeric-constant token.
    pub fn parse(text: &'a str) -> Self {
        let mut lit = NumericLiteral {
            text,
            error: None,
            binary_extension: false,
            is_unsigned: false,
            is_long: false,
            is_long_long: false,
            is_float: false,
            radix: 10,
            saw_period: false,
            saw_exponent: false,
            digits_begin: 0,
            suffix_begin: text.len(),
        };
        lit.classify();
        lit
    }

    /// Byte at `pos`, or `0` past the end (a sentinel no rule matches).
    #[inline]
    fn at(&self, pos: usize) -> u8 {
        self.text.as_bytes().get(pos).copied().unwrap_or(0)
    }

    fn classify(&mut self) {
        let len = self.text.len();
        let mut s = 0usize;

        if self.at(0) == b'0' {
            self.parse_number_starting_with_zero(&mut s);
            if self.error.is_some() {
                return;
            }
        } else {
            // The first digit is non-zero: a decimal constant.
            self.radix = 10;
            s = self.skip_digits(s);
            if s == len {
                // Done: plain decimal integer.
            } else if self.at(s).is_ascii_hexdigit() && !matches!(self.at(s), b'e' | b'E') {
                self.error = Some(NumericError::InvalidDecimalDigit);
                return;
            } else {
                if self.at(s) == b'.' {
                    s += 1;
                    self.saw_period = true;
                    s = self.skip_digits(s);
                }
                if matches!(self.at(s), b'e' | b'E') {
                    if !self.parse_exponent(&mut s) {
                        return;
                    }
                }
            }
        }

        self.suffix_begin = s;
        self.parse_suffix(s);
    }

    /// Handle `0...`: hex, binary (extension), octal, or a would-be-octal
    /// literal that turns out to be a decimal floating constant
    /// (`09.5`, `09e1`).
    fn parse_number_starting_with_zero(&mut self, s: &mut usize) {
        *s += 1; // Consume the '0'.

        // Hex number like 0x1234, or hex float like 0x1.8p3.
        if matches!(self.at(*s), b'x' | b'X')
            && (self.at(*s + 1).is_ascii_hexdigit() || self.at(*s + 1) == b'.')
        {
            *s += 1;
            self.radix = 16;
            self.digits_begin = *s;
            *s = self.skip_hex_digits(*s);
            if self.at(*s) == b'.' {
                *s += 1;
                self.saw_period = true;
                *s = self.skip_hex_digits(*s);
            }
            // A binary exponent can appear with or without a '.'; if
            // dotted, the exponent is required.
            if matches!(self.at(*s), b'p' | b'P') {
                self.parse_exponent(s);
            } else if self.saw_period {
                self.error = Some(NumericError::HexFloatRequiresExponent);
            }
            return;
        }

        // Binary number 0b101010 (GCC extension).
        if matches!(self.at(*s), b'b' | b'B') {
            self.binary_extension = true;
            *s += 1;
            self.radix = 2;
            self.digits_begin = *s;
            *s = self.skip_binary_digits(*s);
            if self.at(*s).is_ascii_hexdigit() {
                self.error = Some(NumericError::InvalidBinaryDigit);
            }
            // Other suffixes are handled by the caller.
            return;
        }

        // For now the radix is 8; if the literal turns out to be floating
        // it becomes 10. Octal floating constants do not exist.
        self.radix = 8;
        self.digits_begin = *s;
        *s = self.skip_octal_digits(*s);
        if *s == self.text.len() {
            return; // Simple octal number like 01234.
        }

        // A non-octal decimal digit may still start a floating constant
        // like 094.123 or 09e1.
        if self.at(*s).is_ascii_digit() {
            let end_decimal = self.skip_digits(*s);
            if matches!(self.at(end_decimal), b'.' | b'e' | b'E') {
                *s = end_decimal;
                self.radix = 10;
            }
        }

        // Any other hex digit here (besides an 'e' exponent marker) means
        // the literal uses the wrong base.
        if self.at(*s).is_ascii_hexdigit() && !matches!(self.at(*s), b'e' | b'E') {
            self.error = Some(NumericError::InvalidOctalDigit);
            return;
        }

        if self.at(*s) == b'.' {
            *s += 1;
            self.radix = 10;
            self.saw_period = true;
            *s = self.skip_digits(*s);
        }
        if matches!(self.at(*s), b'e' | b'E') {
            self.radix = 10;
            self.parse_exponent(s);
        }
    }

    /// Consume `e`/`E`/`p`/`P`, an optional sign, and the exponent
    /// digits. Returns `false` (and records the error) if no digits
    /// follow.
    fn parse_exponent(&mut self, s: &mut usize) -> bool {
        *s += 1;
        self.saw_exponent = true;
        if matches!(self.at(*s), b'+' | b'-') {
            *s += 1;
        }
        let first_non_digit = self.skip_digits(*s);
        if first_non_digit == *s {
            self.error = Some(NumericError::ExponentHasNoDigits);
            return false;
        }
        *s = first_non_digit;
        true
    }

    /// Validate the suffix run starting at `s`. Invalid combinations
    /// (`LF`, `FF`, `ull` on a float, trailing junk) record an error.
    fn parse_suffix(&mut self, mut s: usize) {
        let len = self.text.len();
        let is_fp = self.is_floating_literal();

        while s < len {
            match self.at(s) {
                b'f' | b'F' if is_fp && !self.is_float && !self.is_long => {
                    self.is_float = true;
                    s += 1;
                }
                b'u' | b'U' if !is_fp && !self.is_unsigned => {
                    self.is_unsigned = true;
                    s += 1;
                }
                b'l' | b'L' if !self.is_long && !self.is_long_long && !self.is_float => {
                    // long long needs adjacent same-case Ls, and is
                    // invalid on floating constants.
                    if self.at(s + 1) == self.at(s) {
                        if is_fp {
                            break;
                        }
                        self.is_long_long = true;
                        s += 2;
                    } else {
                        self.is_long = true;
                        s += 1;
                    }
                }
                _ => break,
            }
        }

        if s != len {
            self.error = Some(if is_fp {
                NumericError::InvalidFloatingSuffix
            } else {
                NumericError::InvalidIntegerSuffix
            });
        }
    }

    /// Integer constant: no period, no exponent.
    #[inline]
    pub fn is_integer_literal(&self) -> bool {
        !self.saw_period && !self.saw_exponent
    }

    /// Floating constant: a period or an exponent.
    #[inline]
    pub fn is_floating_literal(&self) -> bool {
        self.saw_period || self.saw_exponent
    }

    #[inline]
    pub fn has_suffix(&self) -> bool {
        self.suffix_begin != self.text.len()
    }

    #[inline]
    pub fn radix(&self) -> u32 {
        self.radix
    }

    /// The digit run (after any radix prefix, before any suffix), for
    /// integer value computation.
    pub fn digits(&self) -> &'a str {
        &self.text[self.digits_begin..self.suffix_begin.max(self.digits_begin)]
    }

    /// The literal text without its suffix, for floating value
    /// computation.
    pub fn value_text(&self) -> &'a str {
        &self.text[..self.suffix_begin]
    }

    fn skip_digits(&self, mut pos: usize) -> usize {
        while self.at(pos).is_ascii_digit() {
            pos += 1;
        }
        pos
    }

    fn skip_hex_digits(&self, mut pos: usize) -> usize {
        while self.at(pos).is_ascii_hexdigit() {
            pos += 1;
        }
        pos
    }

    fn skip_octal_digits(&self, mut pos: usize) -> usize {
        while (b'0'..=b'7').contains(&self.at(pos)) {
            pos += 1;
        }
        pos
    }

    fn skip_binary_digits(&self, mut pos: usize) -> usize {
        while matches!(self.at(pos), b'0' | b'1') {
            pos += 1;
        }
        pos
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ok(text: &str) -> NumericLiteral<'_> {
        let lit = NumericLiteral::parse(text);
        assert_eq!(lit.error, None, "unexpected error for {text:?}");
        lit
    }

    fn bad(text: &str) -> NumericError {
        let lit = NumericLiteral::parse(text);
        match lit.error {
            Some(err) => err,
            None => panic!("expected error for {text:?}"),
        }
    }

    // === Radix detection ===

    #[test]
    fn decimal_integer() {
        let lit = ok("123");
        assert_eq!(lit.radix(), 10);
        assert!(lit.is_integer_literal());
        assert_eq!(lit.digits(), "123");
        assert!(!lit.has_suffix());
    }

    #[test]
    fn hex_integer() {
        let lit = ok("0x1F");
        assert_eq!(lit.radix(), 16);
        assert!(lit.is_integer_literal());
        assert_eq!(lit.digits(), "1F");
    }

    #[test]
    fn octal_integer() {
        let lit = ok("0777");
        assert_eq!(lit.radix(), 8);
        assert_eq!(lit.digits(), "777");
    }

    #[test]
    fn zero_alone_is_octal() {
        let lit = ok("0");
        assert_eq!(lit.radix(), 8);
        assert_eq!(lit.digits(), "");
    }

    #[test]
    fn binary_is_an_extension() {
        let lit = ok("0b1010");
        assert_eq!(lit.radix(), 2);
        assert!(lit.binary_extension);
        assert_eq!(lit.digits(), "1010");
    }

    #[test]
    fn would_be_octal_promotes_to_decimal_float() {
        for text in ["09.5", "09e1", "094.123"] {
            let lit = ok(text);
            assert_eq!(lit.radix(), 10, "{text}");
            assert!(lit.is_floating_literal(), "{text}");
        }
    }

    #[test]
    fn octal_with_period_promotes() {
        let lit = ok("01.5");
        assert_eq!(lit.radix(), 10);
        assert!(lit.saw_period);
    }

    // === Integer vs floating ===

    #[test]
    fn period_or_exponent_means_floating() {
        assert!(ok("1.0").is_floating_literal());
        assert!(ok("1e5").is_floating_literal());
        assert!(ok("1.").is_floating_literal());
        assert!(ok("1e+12").is_floating_literal());
        assert!(ok("3").is_integer_literal());
    }

    #[test]
    fn hex_float_requires_exponent() {
        assert!(ok("0x1.8p3").is_floating_literal());
        assert!(ok("0x1p-2").is_floating_literal());
        assert_eq!(bad("0x1.8"), NumericError::HexFloatRequiresExponent);
    }

    // === Suffixes ===

    #[test]
    fn unsigned_and_long_suffixes() {
        let lit = ok("42u");
        assert!(lit.is_unsigned && !lit.is_long);

        let lit = ok("42ul");
        assert!(lit.is_unsigned && lit.is_long);

        let lit = ok("42lu");
        assert!(lit.is_unsigned && lit.is_long);

        let lit = ok("42LL");
        assert!(lit.is_long_long && !lit.is_long);

        let lit = ok("42ull");
        assert!(lit.is_unsigned && lit.is_long_long);
    }

    #[test]
    fn float_suffixes() {
        let lit = ok("3.14f");
        assert!(lit.is_float);
        let lit = ok("3.14L");
        assert!(lit.is_long && !lit.is_float);
        assert_eq!(lit.value_text(), "3.14");
    }

    #[test]
    fn mismatched_case_ll_is_long_then_error() {
        // 'lL' is not a long-long suffix: the Ls must match case.
        assert_eq!(bad("1lL"), NumericError::InvalidIntegerSuffix);
    }

    #[test]
    fn invalid_suffix_combinations() {
        assert_eq!(bad("1.0LF"), NumericError::InvalidFloatingSuffix);
        assert_eq!(bad("1.0FF"), NumericError::InvalidFloatingSuffix);
        assert_eq!(bad("1.0u"), NumericError::InvalidFloatingSuffix);
        assert_eq!(bad("1f"), NumericError::InvalidIntegerSuffix);
        assert_eq!(bad("1uu"), NumericError::InvalidIntegerSuffix);
        assert_eq!(bad("1.0ll"), NumericError::InvalidFloatingSuffix);
        assert_eq!(bad("123xyz"), NumericError::InvalidIntegerSuffix);
    }

    // === Malformed digits ===

    #[test]
    fn bad_digits_for_radix() {
        assert_eq!(bad("123abc"), NumericError::InvalidDecimalDigit);
        assert_eq!(bad("089"), NumericError::InvalidOctalDigit);
        assert_eq!(bad("0b102"), NumericError::InvalidBinaryDigit);
    }

    #[test]
    fn exponent_needs_digits() {
        assert_eq!(bad("1e"), NumericError::ExponentHasNoDigits);
        assert_eq!(bad("1e+"), NumericError::ExponentHasNoDigits);
        assert_eq!(bad("0x1p"), NumericError::ExponentHasNoDigits);
    }

    // === Properties ===

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            // The classifier must never panic, whatever the lexer hands it.
            #[test]
            fn never_panics_on_number_like_text(
                text in "[0-9][0-9a-zA-Z.+-]{0,12}"
            ) {
                let _ = NumericLiteral::parse(&text);
            }

            // Error-free literals are exactly one of integer or floating.
            #[test]
            fn integer_xor_floating(text in "[0-9][0-9a-fA-FxXuUlL.]{0,8}") {
                let lit = NumericLiteral::parse(&text);
                if lit.error.is_none() {
                    prop_assert!(lit.is_integer_literal() != lit.is_floating_literal());
                }
            }

            // Plain digit runs always classify as decimal integers.
            #[test]
            fn digit_runs_are_decimal(text in "[1-9][0-9]{0,15}") {
                let lit = NumericLiteral::parse(&text);
                prop_assert_eq!(lit.error, None);
                prop_assert_eq!(lit.radix(), 10);
                prop_assert!(lit.is_integer_literal());
                prop_assert_eq!(lit.digits(), text.as_str());
            }
        }
    }
}
