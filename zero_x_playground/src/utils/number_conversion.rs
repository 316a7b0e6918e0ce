//! Strict conversions from the string wire forms used by the 0x API.
//!
//! Every function takes the wire name of the field it is decoding so a failure
//! surfaces as `Error::DecodeError(field)`. Nothing here defaults to zero.

use crate::error::{Error, PlaygroundResult};
use alloy::primitives::{Address, Bytes, U256, hex};
use error_stack::report;
use rust_decimal::Decimal;
use std::str::FromStr;

const ADDRESS_HEX_LEN: usize = 40;

// Fractional digits a Decimal can hold
const DECIMAL_MAX_SCALE: i64 = 28;
// Integer digits above which a Decimal always overflows
const DECIMAL_MAX_INTEGER_DIGITS: i64 = 29;

fn decode_error(field: &str, message: String) -> error_stack::Report<Error> {
    report!(Error::DecodeError(field.to_string())).attach_printable(message)
}

/// Unwraps a wire field that must be present.
pub fn required<T>(field: &str, value: Option<T>) -> PlaygroundResult<T> {
    value.ok_or_else(|| decode_error(field, format!("Missing required field {field}")))
}

/// Parses a base-10 unsigned integer of at most 256 bits.
///
/// Accepts ASCII digits with an optional leading `+`. Separators, whitespace
/// and negative values are rejected.
pub fn parse_u256(field: &str, raw: &str) -> PlaygroundResult<U256> {
    let digits = raw.strip_prefix('+').unwrap_or(raw);

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(decode_error(
            field,
            format!("Invalid decimal integer for {field}: {raw:?}"),
        ));
    }

    U256::from_str_radix(digits, 10).map_err(|e| {
        decode_error(
            field,
            format!("Failed to parse {field} as U256 ({e}): {raw}"),
        )
    })
}

fn is_digits(s: &str) -> bool {
    s.bytes().all(|b| b.is_ascii_digit())
}

// sign? digits [. digits] [(e|E) sign? digits], at least one mantissa digit
fn is_plain_decimal(raw: &str) -> bool {
    let unsigned = raw.strip_prefix(['+', '-']).unwrap_or(raw);

    let (mantissa, exponent) = match unsigned.split_once(['e', 'E']) {
        Some((mantissa, exponent)) => (mantissa, Some(exponent)),
        None => (unsigned, None),
    };

    let (integer_part, fraction_part) = mantissa.split_once('.').unwrap_or((mantissa, ""));

    let mantissa_ok = !(integer_part.is_empty() && fraction_part.is_empty())
        && is_digits(integer_part)
        && is_digits(fraction_part);

    let exponent_ok = exponent.is_none_or(|exponent| {
        let exponent = exponent.strip_prefix(['+', '-']).unwrap_or(exponent);
        !exponent.is_empty() && is_digits(exponent)
    });

    mantissa_ok && exponent_ok
}

/// Rewrites `mantissa * 10^exponent` in positional notation so both notations
/// share the same rounding. Returns `None` when the value cannot fit a `Decimal`.
fn expand_scientific(mantissa: &str, exponent: &str) -> Option<String> {
    let (sign, unsigned) = match mantissa.strip_prefix(['+', '-']) {
        Some(rest) => (&mantissa[..1], rest),
        None => ("", mantissa),
    };
    let (integer_part, fraction_part) = unsigned.split_once('.').unwrap_or((unsigned, ""));

    let digits = format!("{integer_part}{fraction_part}");
    let digits = digits.trim_start_matches('0');
    if digits.is_empty() {
        return Some("0".to_string());
    }
    // leading zeros were dropped from the integer part
    let leading_zeros = (integer_part.len() + fraction_part.len() - digits.len()) as i64;

    let exponent = match exponent.parse::<i64>() {
        Ok(exponent) => exponent,
        Err(_) if exponent.starts_with('-') => i64::MIN / 2,
        Err(_) => i64::MAX / 2,
    };
    let point = integer_part.len() as i64 - leading_zeros + exponent;

    if point < -DECIMAL_MAX_SCALE {
        return Some("0".to_string());
    }
    if point > DECIMAL_MAX_INTEGER_DIGITS {
        return None;
    }

    let plain = if point <= 0 {
        format!("0.{}{digits}", "0".repeat(point.unsigned_abs() as usize))
    } else if point as usize >= digits.len() {
        format!("{digits}{}", "0".repeat(point as usize - digits.len()))
    } else {
        let (int, frac) = digits.split_at(point as usize);
        format!("{int}.{frac}")
    };

    Some(format!("{sign}{plain}"))
}

/// Parses a decimal such as a price or a source proportion.
///
/// Plain (`0.01`) and scientific (`1.5e-3`) notation are accepted and rounded
/// the same way: digits beyond the 28 `Decimal` holds are rounded, so values
/// too small to represent become zero. Values too large for it fail.
pub fn parse_decimal(field: &str, raw: &str) -> PlaygroundResult<Decimal> {
    if !is_plain_decimal(raw) {
        return Err(decode_error(
            field,
            format!("Invalid decimal for {field}: {raw:?}"),
        ));
    }

    let plain = match raw.split_once(['e', 'E']) {
        Some((mantissa, exponent)) => expand_scientific(mantissa, exponent).ok_or_else(|| {
            decode_error(field, format!("Decimal out of range for {field}: {raw}"))
        })?,
        None => raw.to_string(),
    };

    Decimal::from_str(&plain).map_err(|e| {
        decode_error(
            field,
            format!("Failed to parse {field} as decimal ({e}): {raw}"),
        )
    })
}

fn strip_hex_prefix<'a>(field: &str, raw: &'a str) -> PlaygroundResult<&'a str> {
    raw.strip_prefix("0x")
        .or_else(|| raw.strip_prefix("0X"))
        .ok_or_else(|| decode_error(field, format!("Missing 0x prefix for {field}: {raw:?}")))
}

/// Parses a `0x`-prefixed 20-byte address. Checksums are not verified.
pub fn parse_address(field: &str, raw: &str) -> PlaygroundResult<Address> {
    let hex_digits = strip_hex_prefix(field, raw)?;

    if hex_digits.len() != ADDRESS_HEX_LEN {
        return Err(decode_error(
            field,
            format!(
                "Expected {ADDRESS_HEX_LEN} hex digits for {field}, got {}: {raw}",
                hex_digits.len()
            ),
        ));
    }

    Address::from_str(hex_digits)
        .map_err(|e| decode_error(field, format!("Invalid hex address for {field} ({e}): {raw}")))
}

/// Parses a `0x`-prefixed byte string. `0x` alone is the empty sequence.
pub fn parse_hex_bytes(field: &str, raw: &str) -> PlaygroundResult<Bytes> {
    let hex_digits = strip_hex_prefix(field, raw)?;

    // hex::decode would accept a second prefix
    if !hex_digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(decode_error(
            field,
            format!("Invalid hex digits for {field}: {raw:?}"),
        ));
    }

    hex::decode(hex_digits)
        .map(Bytes::from)
        .map_err(|e| decode_error(field, format!("Invalid hex bytes for {field} ({e}): {raw}")))
}
