//! Numeric interpretation of atom text.
//!
//! Two questions are asked of atoms during parsing: whether a property name
//! is an array index, and what number a string converts to when the parser
//! folds constant expressions.

use super::AtomText;
use crate::error::{NumberError, NumberResult};

/// Largest valid array index, 2^32 - 2
pub const MAX_ARRAY_INDEX: u32 = u32::MAX - 1;

/// Number of decimal digits in the largest array index
pub const MAX_INDEX_DIGITS: usize = 10;

#[inline]
fn decimal_digit(unit: u16) -> Option<u32> {
    match unit {
        0x30..=0x39 => Some(u32::from(unit - 0x30)),
        _ => None,
    }
}

/// Parse a character sequence as an array index
///
/// Accepts the canonical decimal form only: no sign, no leading zeros except
/// for `"0"` itself, and a value no larger than [`MAX_ARRAY_INDEX`].
///
/// # Examples
///
/// ```
/// use parser_atoms::check_string_is_index;
///
/// assert_eq!(check_string_is_index("4294967294".encode_utf16()), Some(4294967294));
/// assert_eq!(check_string_is_index("4294967295".encode_utf16()), None);
/// assert_eq!(check_string_is_index("007".encode_utf16()), None);
/// ```
pub fn check_string_is_index<I>(chars: I) -> Option<u32>
where
    I: IntoIterator<Item = u16>,
{
    let mut chars = chars.into_iter();

    let first = decimal_digit(chars.next()?)?;
    if first == 0 {
        return chars.next().is_none().then_some(0);
    }

    let mut value = u64::from(first);
    let mut digits = 1;
    for unit in chars {
        digits += 1;
        if digits > MAX_INDEX_DIGITS {
            return None;
        }
        value = value * 10 + u64::from(decimal_digit(unit)?);
    }

    u32::try_from(value)
        .ok()
        .filter(|&index| index <= MAX_ARRAY_INDEX)
}

/// White space and line terminators stripped around numeric strings
fn is_js_space(unit: u16) -> bool {
    matches!(
        unit,
        0x0009 | 0x000a | 0x000b | 0x000c | 0x000d | 0x0020 | 0x00a0 | 0x1680
            | 0x2000..=0x200a
            | 0x2028 | 0x2029 | 0x202f | 0x205f | 0x3000 | 0xfeff
    )
}

/// Convert text to a number with the numeric string grammar
///
/// ```text
/// StringNumericLiteral ::= space* (NonDecimal | Signed)? space*
/// NonDecimal           ::= "0" [xX] hex+ | "0" [oO] octal+ | "0" [bB] binary+
/// Signed               ::= [+-]? ("Infinity" | Decimal)
/// Decimal              ::= digits ("." digits?)? exponent? | "." digits exponent?
/// ```
///
/// An all-space or empty text converts to `0.0`.
///
/// # Examples
///
/// ```
/// use parser_atoms::{chars_to_number, AtomText};
///
/// assert_eq!(chars_to_number(AtomText::Latin1(b" 0x1F ")), Ok(31.0));
/// assert_eq!(chars_to_number(AtomText::Latin1(b"-2.5e1")), Ok(-25.0));
/// assert!(chars_to_number(AtomText::Latin1(b"12px")).is_err());
/// ```
pub fn chars_to_number(text: AtomText<'_>) -> NumberResult<f64> {
    let units: Vec<u16> = text.chars().collect();

    let start = units.iter().position(|&unit| !is_js_space(unit));
    let Some(start) = start else {
        return Ok(0.0);
    };
    let end = units
        .iter()
        .rposition(|&unit| !is_js_space(unit))
        .map_or(start, |last| last + 1);
    let trimmed = &units[start..end];

    let invalid = || NumberError::InvalidLiteral {
        text: text.to_string(),
    };

    if let Some(radix) = radix_prefix(trimmed) {
        return parse_radix(&trimmed[2..], radix).ok_or_else(invalid);
    }

    let (negative, unsigned) = match trimmed.first() {
        Some(&unit) if unit == u16::from(b'-') => (true, &trimmed[1..]),
        Some(&unit) if unit == u16::from(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let magnitude = if unsigned.iter().copied().eq("Infinity".encode_utf16()) {
        f64::INFINITY
    } else {
        parse_decimal(unsigned).ok_or_else(invalid)?
    };

    Ok(if negative { -magnitude } else { magnitude })
}

fn radix_prefix(units: &[u16]) -> Option<u32> {
    match units {
        [zero, marker, ..] if *zero == u16::from(b'0') => match u8::try_from(*marker).ok()? {
            b'x' | b'X' => Some(16),
            b'o' | b'O' => Some(8),
            b'b' | b'B' => Some(2),
            _ => None,
        },
        _ => None,
    }
}

/// Integer digits in `radix`; at least one is required
fn parse_radix(digits: &[u16], radix: u32) -> Option<f64> {
    if digits.is_empty() {
        return None;
    }

    let mut exact: Option<u128> = Some(0);
    let mut approx = 0.0f64;
    for &unit in digits {
        let digit = char::from_u32(u32::from(unit))?.to_digit(radix)?;
        exact = exact
            .and_then(|value| value.checked_mul(u128::from(radix)))
            .and_then(|value| value.checked_add(u128::from(digit)));
        approx = approx * f64::from(radix) + f64::from(digit);
    }

    Some(match exact {
        Some(value) => value as f64,
        None => approx,
    })
}

/// Unsigned decimal literal, validated before conversion
fn parse_decimal(units: &[u16]) -> Option<f64> {
    let ascii: String = units
        .iter()
        .map(|&unit| u8::try_from(unit).ok().filter(u8::is_ascii).map(char::from))
        .collect::<Option<String>>()?;
    let bytes = ascii.as_bytes();

    let mut pos = 0;
    let integer_digits = count_digits(&bytes[pos..]);
    pos += integer_digits;

    let mut fraction_digits = 0;
    if bytes.get(pos) == Some(&b'.') {
        pos += 1;
        fraction_digits = count_digits(&bytes[pos..]);
        pos += fraction_digits;
    }
    if integer_digits + fraction_digits == 0 {
        return None;
    }

    if matches!(bytes.get(pos), Some(b'e' | b'E')) {
        pos += 1;
        if matches!(bytes.get(pos), Some(b'+' | b'-')) {
            pos += 1;
        }
        let exponent_digits = count_digits(&bytes[pos..]);
        if exponent_digits == 0 {
            return None;
        }
        pos += exponent_digits;
    }

    if pos != bytes.len() {
        return None;
    }
    ascii.parse::<f64>().ok()
}

fn count_digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|byte| byte.is_ascii_digit()).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index_of(text: &str) -> Option<u32> {
        check_string_is_index(text.encode_utf16())
    }

    fn number_of(text: &str) -> NumberResult<f64> {
        let units: Vec<u16> = text.encode_utf16().collect();
        chars_to_number(AtomText::TwoByte(&units))
    }

    // ========================================================================
    // Array Index Tests
    // ========================================================================

    #[test]
    fn test_index_zero_and_leading_zeros() {
        assert_eq!(index_of("0"), Some(0));
        assert_eq!(index_of("00"), None);
        assert_eq!(index_of("01"), None);
        assert_eq!(index_of("10"), Some(10));
    }

    #[test]
    fn test_index_upper_boundary() {
        assert_eq!(index_of("4294967294"), Some(MAX_ARRAY_INDEX));
        assert_eq!(index_of("4294967295"), None);
        assert_eq!(index_of("9999999999"), None);
        assert_eq!(index_of("10000000000"), None);
    }

    #[test]
    fn test_index_rejects_non_digits() {
        assert_eq!(index_of(""), None);
        assert_eq!(index_of("-1"), None);
        assert_eq!(index_of("+1"), None);
        assert_eq!(index_of("1a"), None);
        assert_eq!(index_of("1 "), None);
        assert_eq!(index_of("١"), None);
    }

    // ========================================================================
    // Numeric Conversion Tests
    // ========================================================================

    #[test]
    fn test_number_whitespace_and_empty() {
        assert_eq!(number_of(""), Ok(0.0));
        assert_eq!(number_of(" \t\n\u{a0}\u{feff}"), Ok(0.0));
        assert_eq!(number_of("\u{2028} 42 \u{3000}"), Ok(42.0));
    }

    #[test]
    fn test_number_decimal_forms() {
        assert_eq!(number_of("1.5"), Ok(1.5));
        assert_eq!(number_of(".5"), Ok(0.5));
        assert_eq!(number_of("5."), Ok(5.0));
        assert_eq!(number_of("1e3"), Ok(1000.0));
        assert_eq!(number_of("+2E-1"), Ok(0.2));
        assert_eq!(number_of("-7"), Ok(-7.0));
        assert!(number_of("-0").unwrap().is_sign_negative());
    }

    #[test]
    fn test_number_infinity() {
        assert_eq!(number_of("Infinity"), Ok(f64::INFINITY));
        assert_eq!(number_of("-Infinity"), Ok(f64::NEG_INFINITY));
        assert!(number_of("infinity").is_err());
        assert!(number_of("inf").is_err());
        assert!(number_of("NaN").is_err());
    }

    #[test]
    fn test_number_radix_prefixes() {
        assert_eq!(number_of("0x1F"), Ok(31.0));
        assert_eq!(number_of("0XfF"), Ok(255.0));
        assert_eq!(number_of("0o17"), Ok(15.0));
        assert_eq!(number_of("0b101"), Ok(5.0));
        assert!(number_of("0x").is_err());
        assert!(number_of("0b102").is_err());
        assert!(number_of("-0x10").is_err());
    }

    #[test]
    fn test_number_large_hex() {
        let value = number_of(&format!("0x{}", "f".repeat(40))).unwrap();
        assert!(value > 1.4e48 && value < 1.5e48);
    }

    #[test]
    fn test_number_rejects_garbage() {
        for text in [".", "e5", "1e", "1e+", "1.2.3", "12px", "1 2", "--1", "０"] {
            assert_eq!(
                number_of(text),
                Err(NumberError::InvalidLiteral {
                    text: text.to_string()
                }),
                "{text:?} should not convert"
            );
        }
    }
}
