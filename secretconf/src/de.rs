//! Conversion of raw environment strings into typed scalars

use chrono::TimeDelta;

use crate::field::{FieldKind, Scalar};

/// Convert `raw` to the scalar representation of `kind`.
///
/// The error is a human-readable reason; the decoder attaches the key,
/// kind and value.
pub fn convert(kind: FieldKind, raw: &str) -> Result<Scalar, String> {
    match kind {
        FieldKind::String => Ok(Scalar::Str(raw.to_string())),
        FieldKind::Int => parse_int(raw).map(Scalar::Int),
        FieldKind::Unsigned => parse_unsigned(raw).map(Scalar::Unsigned),
        FieldKind::Bool => parse_bool(raw).map(Scalar::Bool),
        FieldKind::Duration => parse_duration(raw).map(Scalar::Duration),
    }
}

/// Split an optional `0x`/`0o`/`0b` prefix off and strip `_` separators.
fn radix_digits(s: &str) -> (u32, String) {
    let lower = s.get(..2).map(str::to_ascii_lowercase);
    let (radix, digits) = match lower.as_deref() {
        Some("0x") => (16, &s[2..]),
        Some("0o") => (8, &s[2..]),
        Some("0b") => (2, &s[2..]),
        _ => (10, s),
    };
    (radix, digits.replace('_', ""))
}

/// Parse a signed integer, accepting a sign, radix prefixes and `_` separators.
pub fn parse_int(raw: &str) -> Result<i64, String> {
    let s = raw.trim();
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let (radix, digits) = radix_digits(rest);
    if digits.is_empty() || digits.starts_with(['+', '-']) {
        return Err("invalid integer syntax".to_string());
    }
    let magnitude = u64::from_str_radix(&digits, radix).map_err(|e| e.to_string())?;
    if negative {
        0i64.checked_sub_unsigned(magnitude)
            .ok_or_else(|| "out of range for a 64-bit integer".to_string())
    } else {
        i64::try_from(magnitude).map_err(|_| "out of range for a 64-bit integer".to_string())
    }
}

/// Parse an unsigned integer, accepting radix prefixes and `_` separators.
pub fn parse_unsigned(raw: &str) -> Result<u64, String> {
    let s = raw.trim();
    let s = s.strip_prefix('+').unwrap_or(s);
    let (radix, digits) = radix_digits(s);
    if digits.is_empty() || digits.starts_with(['+', '-']) {
        return Err("invalid unsigned integer syntax".to_string());
    }
    u64::from_str_radix(&digits, radix).map_err(|e| e.to_string())
}

/// Parse a boolean in any of the usual spellings.
pub fn parse_bool(raw: &str) -> Result<bool, String> {
    match raw.trim() {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Ok(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Ok(false),
        _ => Err("invalid boolean syntax".to_string()),
    }
}

/// Parse a signed duration such as `2h`, `1h30m`, `-5m`, `1.5h` or `0`.
///
/// Whole-number input goes through `humantime`, so `1h 30m` and `2days`
/// work too. Input with a decimal point is read unit by unit with the
/// `ns`, `us`, `µs`, `ms`, `s`, `m` and `h` units.
pub fn parse_duration(raw: &str) -> Result<TimeDelta, String> {
    let s = raw.trim();
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, s[1..].trim_start()),
        Some(b'+') => (false, s[1..].trim_start()),
        _ => (false, s),
    };
    if rest == "0" {
        return Ok(TimeDelta::zero());
    }
    let std = if rest.contains('.') {
        parse_fractional(rest)?
    } else {
        humantime::parse_duration(rest).map_err(|e| e.to_string())?
    };
    let delta = TimeDelta::from_std(std).map_err(|_| "duration is too large".to_string())?;
    Ok(if negative { -delta } else { delta })
}

fn unit_nanos(unit: &str) -> Option<u128> {
    Some(match unit {
        "ns" => 1,
        "us" | "µs" | "μs" => 1_000,
        "ms" => 1_000_000,
        "s" => 1_000_000_000,
        "m" => 60_000_000_000,
        "h" => 3_600_000_000_000,
        _ => return None,
    })
}

/// Sum of `<number><unit>` terms where numbers may carry a fraction.
fn parse_fractional(text: &str) -> Result<std::time::Duration, String> {
    const TOO_LARGE: &str = "duration is too large";
    let mut rest = text;
    let mut total: u128 = 0;

    while !rest.is_empty() {
        let int_len = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
        let (int_part, after) = rest.split_at(int_len);
        let (frac_part, after) = match after.strip_prefix('.') {
            Some(tail) => {
                let len = tail.find(|c: char| !c.is_ascii_digit()).unwrap_or(tail.len());
                tail.split_at(len)
            }
            None => ("", after),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return Err("invalid duration syntax".to_string());
        }

        let unit_len = after
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(after.len());
        let (unit, after) = after.split_at(unit_len);
        let scale = unit_nanos(unit.trim())
            .ok_or_else(|| format!("unknown duration unit '{}'", unit.trim()))?;

        let whole: u128 = if int_part.is_empty() {
            0
        } else {
            int_part.parse().map_err(|_| TOO_LARGE.to_string())?
        };
        // Digits past nanosecond precision cannot contribute.
        let frac_part = &frac_part[..frac_part.len().min(18)];
        let frac: u128 = if frac_part.is_empty() {
            0
        } else {
            frac_part.parse().map_err(|_| TOO_LARGE.to_string())?
        };
        let denom = 10u128.pow(frac_part.len() as u32);

        total = whole
            .checked_mul(scale)
            .and_then(|n| n.checked_add(frac * scale / denom))
            .and_then(|n| total.checked_add(n))
            .ok_or_else(|| TOO_LARGE.to_string())?;
        rest = after;
    }

    let nanos = u64::try_from(total).map_err(|_| TOO_LARGE.to_string())?;
    Ok(std::time::Duration::from_nanos(nanos))
}
