//! Literal analysis: numeric constants, character constants, string
//! literals.

use crate::Sema;
use lucite_ir::{Expr, ExprKind, QualType, SourceLocation};
use lucite_lexer::NumericLiteral;

impl<'d> Sema<'d> {
    /// Re-parse a numeric-constant token's text, classify it, compute
    /// its value, and pick its type. Malformed literals produce one
    /// error and no node.
    ///
    /// Integer literals take the smallest standard type that can
    /// represent the value, trying `int` → `unsigned int` → `long` →
    /// `unsigned long` → `long long` → `unsigned long long`. The
    /// unsigned steps are only open to octal/hex literals or literals
    /// with an explicit `u` suffix — a plain decimal literal never
    /// silently goes unsigned. Explicit `l`/`ll` suffixes skip the
    /// levels below them.
    pub fn act_on_numeric_constant(&mut self, text: &str, loc: SourceLocation) -> Option<Expr> {
        tracing::trace!(text, "act_on_numeric_constant");
        let lit = NumericLiteral::parse(text);
        if let Some(err) = lit.error {
            self.diag().error(loc, err.to_string());
            return None;
        }
        if lit.binary_extension {
            self.diag().warning(loc, "using binary literal");
        }

        if lit.is_floating_literal() {
            let b = &self.context().builtins;
            let ty = if lit.is_float {
                b.float_ty
            } else if !lit.is_long {
                b.double_ty
            } else {
                b.long_double_ty
            };
            let value = float_value(&lit);
            return Some(Expr::new(ExprKind::FloatConst(value), ty, loc));
        }

        let value = match integer_value(lit.digits(), lit.radix()) {
            Some(value) => value,
            None => {
                self.diag().error(
                    loc,
                    "integer constant is too large to be represented in any integer type",
                );
                return None;
            }
        };

        // Octal, hexadecimal, and u-suffixed literals may widen into the
        // unsigned type of each level; decimal literals may not.
        let allow_unsigned = lit.is_unsigned || lit.radix() != 10;

        let b = &self.context().builtins;
        let mut ty = QualType::NULL;

        // Check from smallest to largest, honoring suffix minimums.
        if !lit.is_long && !lit.is_long_long && value <= u64::from(u32::MAX) {
            if !lit.is_unsigned && value <= u64::from(i32::MAX as u32) {
                ty = b.int_ty;
            } else if allow_unsigned {
                ty = b.unsigned_int_ty;
            }
        }
        if ty.is_null() && !lit.is_long_long {
            if !lit.is_unsigned && value <= i64::MAX as u64 {
                ty = b.long_ty;
            } else if allow_unsigned {
                ty = b.unsigned_long_ty;
            }
        }
        if ty.is_null() {
            if !lit.is_unsigned && value <= i64::MAX as u64 {
                ty = b.long_long_ty;
            } else if allow_unsigned {
                ty = b.unsigned_long_long_ty;
            }
        }
        if ty.is_null() {
            // A decimal constant that only an unsigned type could hold.
            self.diag().error(
                loc,
                "integer constant is too large to be represented in any signed integer type",
            );
            return None;
        }

        Some(Expr::new(ExprKind::IntConst(value), ty, loc))
    }

    /// Analyze a character-constant token (spelling includes the
    /// quotes). The constant has type `int`.
    pub fn act_on_char_constant(&mut self, text: &str, loc: SourceLocation) -> Option<Expr> {
        let inner = text.strip_prefix('\'')?.strip_suffix('\'')?;
        let mut bytes = Vec::new();
        self.unescape_into(inner, loc, &mut bytes);
        let first = match bytes.first() {
            Some(&b) => i32::from(b),
            None => {
                self.diag().error(loc, "empty character constant");
                return None;
            }
        };
        if bytes.len() > 1 {
            self.diag().warning(loc, "multi-character character constant");
        }
        let int_ty = self.context().builtins.int_ty;
        Some(Expr::new(ExprKind::CharConst(first), int_ty, loc))
    }

    /// Concatenate adjacent string-literal spellings (each including its
    /// quotes) into one string expression of type `char[len + 1]`.
    pub fn act_on_string_literals(&mut self, pieces: &[&str], loc: SourceLocation) -> Expr {
        let mut bytes = Vec::new();
        for piece in pieces {
            let inner = piece
                .strip_prefix('"')
                .and_then(|p| p.strip_suffix('"'))
                .unwrap_or("");
            self.unescape_into(inner, loc, &mut bytes);
        }
        let size = bytes.len() as u64 + 1; // NUL terminator
        let content = String::from_utf8_lossy(&bytes).into_owned();
        let char_ty = self.context().builtins.char_ty;
        let ty = self
            .context_mut()
            .constant_array_type(char_ty, size, None);
        Expr::new(ExprKind::StringLit(content), ty, loc)
    }

    /// Process escape sequences in literal content.
    fn unescape_into(&self, inner: &str, loc: SourceLocation, out: &mut Vec<u8>) {
        let bytes = inner.as_bytes();
        let mut i = 0;
        while i < bytes.len() {
            let b = bytes[i];
            if b != b'\\' {
                out.push(b);
                i += 1;
                continue;
            }
            i += 1;
            let Some(&esc) = bytes.get(i) else {
                // A trailing backslash cannot reach here from the lexer,
                // which treats it as protecting the closing quote.
                break;
            };
            i += 1;
            match esc {
                b'n' => out.push(b'\n'),
                b't' => out.push(b'\t'),
                b'r' => out.push(b'\r'),
                b'\\' => out.push(b'\\'),
                b'\'' => out.push(b'\''),
                b'"' => out.push(b'"'),
                b'a' => out.push(0x07),
                b'b' => out.push(0x08),
                b'f' => out.push(0x0c),
                b'v' => out.push(0x0b),
                b'x' => {
                    let mut value: u32 = 0;
                    let mut digits = 0;
                    while digits < 2 {
                        match bytes.get(i).copied().filter(u8::is_ascii_hexdigit) {
                            Some(d) => {
                                value = value * 16 + u32::from(hex_digit(d));
                                i += 1;
                                digits += 1;
                            }
                            None => break,
                        }
                    }
                    if digits == 0 {
                        self.diag().error(loc, "\\x used with no following hex digits");
                    } else {
                        out.push(value as u8);
                    }
                }
                b'0'..=b'7' => {
                    let mut value: u32 = u32::from(esc - b'0');
                    let mut digits = 1;
                    while digits < 3 {
                        match bytes.get(i).copied().filter(|b| (b'0'..=b'7').contains(b)) {
                            Some(d) => {
                                value = value * 8 + u32::from(d - b'0');
                                i += 1;
                                digits += 1;
                            }
                            None => break,
                        }
                    }
                    out.push(value as u8);
                }
                other => {
                    self.diag().warning(
                        loc,
                        format!("unknown escape sequence '\\{}'", other as char),
                    );
                    out.push(other);
                }
            }
        }
    }
}

#[inline]
fn hex_digit(b: u8) -> u8 {
    match b {
        b'0'..=b'9' => b - b'0',
        b'a'..=b'f' => b - b'a' + 10,
        _ => b - b'A' + 10,
    }
}

/// Compute an integer literal's value from its digit run and radix.
/// Returns `None` on overflow of the widest integer type.
fn integer_value(digits: &str, radix: u32) -> Option<u64> {
    let mut value: u64 = 0;
    for b in digits.bytes() {
        let digit = match b {
            b'0'..=b'9' => u64::from(b - b'0'),
            b'a'..=b'f' => u64::from(b - b'a' + 10),
            b'A'..=b'F' => u64::from(b - b'A' + 10),
            _ => {
                debug_assert!(false, "classifier let through digit {b:?}");
                return None;
            }
        };
        debug_assert!(digit < u64::from(radix));
        value = value
            .checked_mul(u64::from(radix))?
            .checked_add(digit)?;
    }
    Some(value)
}

/// Compute a floating literal's value. Hexadecimal floating constants
/// need manual conversion (`f64` parsing only accepts decimal).
///
/// `long double` values are held as `f64`: only constant-folding
/// precision is affected, never the type.
fn float_value(lit: &NumericLiteral<'_>) -> f64 {
    let text = lit.value_text();
    if lit.radix() != 16 {
        return text.parse().unwrap_or(0.0);
    }

    // 0x h.hhh p[+/-]dd
    let hex = &text[2..]; // strip 0x/0X
    let (mantissa_text, exp_text) = match hex.find(['p', 'P']) {
        Some(idx) => (&hex[..idx], &hex[idx + 1..]),
        None => (hex, "0"),
    };
    let (int_part, frac_part) = match mantissa_text.find('.') {
        Some(idx) => (&mantissa_text[..idx], &mantissa_text[idx + 1..]),
        None => (mantissa_text, ""),
    };
    let mut value = 0.0f64;
    for b in int_part.bytes() {
        value = value * 16.0 + f64::from(hex_digit(b));
    }
    let mut scale = 1.0 / 16.0;
    for b in frac_part.bytes() {
        value += f64::from(hex_digit(b)) * scale;
        scale /= 16.0;
    }
    let exponent: i32 = exp_text.parse().unwrap_or(0);
    value * 2.0f64.powi(exponent)
}
