//! Numbers as they cross the text boundary
//!
//! User input arrives as raw text and results leave as display strings.
//! Arithmetic itself is plain `f64`; this module owns both ends.

use thiserror::Error;

/// Default number of decimal places shown for results and rates
pub const DEFAULT_MAX_DECIMALS: usize = 6;

/// Upper bound on decimal places; `f64` digits beyond this are noise
pub const MAX_DECIMALS: usize = 15;

/// From here on numbers print in exponent form
const EXPONENT_THRESHOLD: f64 = 1e21;

/// Enough fractional digits to hold any `f64` exactly
const EXACT_DIGITS: usize = 1100;

/// Error type for number operations
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NumberError {
    #[error("Invalid number format: {0:?}")]
    Parse(String),

    #[error("Number out of range: {0:?}")]
    NonFinite(String),
}

/// Parse user input into a number.
///
/// Parsing is lenient about what follows the number: leading whitespace is
/// skipped and the longest numeric prefix wins, so `"12abc"` reads as `12`
/// and `"3.5 kg"` as `3.5`. Text with no numeric prefix is an error, as is a
/// prefix that overflows to infinity.
pub fn parse_value(text: &str) -> Result<f64, NumberError> {
    let trimmed = text.trim_start();
    let end = numeric_prefix_len(trimmed);
    if end == 0 {
        return Err(NumberError::Parse(text.to_string()));
    }

    let value: f64 = trimmed[..end]
        .parse()
        .map_err(|_| NumberError::Parse(text.to_string()))?;

    if !value.is_finite() {
        return Err(NumberError::NonFinite(text.to_string()));
    }
    Ok(value)
}

/// Length in bytes of the decimal literal at the start of `s`, or 0.
///
/// Grammar: `[+-]? (digits ('.' digits?)? | '.' digits) ([eE] [+-]? digits)?`
fn numeric_prefix_len(s: &str) -> usize {
    let bytes = s.as_bytes();
    let mut i = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        i += 1;
    }

    let int_start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    let mut digits = i - int_start;

    if i < bytes.len() && bytes[i] == b'.' {
        let frac_start = i + 1;
        let mut j = frac_start;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        let frac_digits = j - frac_start;
        if digits + frac_digits > 0 {
            digits += frac_digits;
            i = j;
        }
    }

    if digits == 0 {
        return 0;
    }

    // Exponent only counts when at least one digit follows it
    if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
        let mut j = i + 1;
        if matches!(bytes.get(j), Some(b'+') | Some(b'-')) {
            j += 1;
        }
        let exp_start = j;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if j > exp_start {
            i = j;
        }
    }

    i
}

/// Format a number for display.
///
/// Rounds to at most `max_decimals` places (clamped to `MAX_DECIMALS`),
/// exact ties away from zero, then prints the shortest digits that read back
/// as the rounded value. Magnitudes from 1e21 up use exponent form
/// (`"1e+21"`). Absent and non-finite values render as the empty string so a
/// failed conversion clears its output field.
pub fn format_number(value: Option<f64>, max_decimals: usize) -> String {
    let v = match value {
        Some(v) if v.is_finite() => v,
        _ => return String::new(),
    };

    if v.abs() >= EXPONENT_THRESHOLD {
        return shortest_repr(v);
    }

    let decimals = max_decimals.min(MAX_DECIMALS);
    let rounded: f64 = match round_half_up(v.abs(), decimals).parse() {
        Ok(r) => r,
        Err(_) => return String::new(),
    };

    // Rounding can leave a negative zero behind ("-0.0000001" -> "0")
    if rounded == 0.0 {
        return "0".to_string();
    }
    shortest_repr(if v < 0.0 { -rounded } else { rounded })
}

/// Decimal text of `magnitude` rounded to `decimals` places, ties up.
///
/// Works on the exact binary expansion, so a digit `>= 5` after the cut
/// means the value is at or above the midpoint.
fn round_half_up(magnitude: f64, decimals: usize) -> String {
    let exact = format!("{:.*}", EXACT_DIGITS, magnitude);
    let (int_part, frac_part) = exact.split_once('.').unwrap_or((exact.as_str(), ""));

    let mut digits: Vec<u8> = int_part.bytes().chain(frac_part.bytes().take(decimals)).collect();
    let round_up = frac_part.as_bytes().get(decimals).is_some_and(|d| *d >= b'5');

    let mut carry = round_up;
    for d in digits.iter_mut().rev() {
        if !carry {
            break;
        }
        if *d == b'9' {
            *d = b'0';
        } else {
            *d += 1;
            carry = false;
        }
    }
    if carry {
        digits.insert(0, b'1');
    }

    let split = digits.len() - decimals;
    let (int_digits, frac_digits) = digits.split_at(split);
    let mut text = String::from_utf8_lossy(int_digits).into_owned();
    if !frac_digits.is_empty() {
        text.push('.');
        text.push_str(&String::from_utf8_lossy(frac_digits));
    }
    text
}

/// Shortest round-trip digits of `v`, placed the way a browser prints numbers:
/// plain notation for decimal exponents in `-7..21`, exponent form otherwise.
fn shortest_repr(v: f64) -> String {
    let sci = format!("{:e}", v);
    let (mantissa, exponent) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);

    let negative = mantissa.starts_with('-');
    let digits: String = mantissa.chars().filter(char::is_ascii_digit).collect();
    let k = digits.len() as i32;
    let n = exponent + 1;

    let body = if k <= n && n <= 21 {
        format!("{}{}", digits, "0".repeat((n - k) as usize))
    } else if 0 < n && n <= 21 {
        format!("{}.{}", &digits[..n as usize], &digits[n as usize..])
    } else if -6 < n && n <= 0 {
        format!("0.{}{}", "0".repeat((-n) as usize), digits)
    } else {
        let sign = if n - 1 < 0 { '-' } else { '+' };
        let (lead, rest) = digits.split_at(1);
        if rest.is_empty() {
            format!("{}e{}{}", lead, sign, (n - 1).abs())
        } else {
            format!("{}.{}e{}{}", lead, rest, sign, (n - 1).abs())
        }
    };

    if negative {
        format!("-{}", body)
    } else {
        body
    }
}

/// Format with the default precision
pub fn format_value(value: f64) -> String {
    format_number(Some(value), DEFAULT_MAX_DECIMALS)
}
