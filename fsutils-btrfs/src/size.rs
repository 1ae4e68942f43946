// SPDX-License-Identifier: GPL-3.0-only

//! Decoding of the size literals printed by `btrfs` ("40.00GiB", "466.88MiB")

use crate::error::{BtrfsError, Result};

/// Parse a human-readable size into an exact byte count
///
/// Binary units (`KiB`, `K`, `Ki`, ...) scale by 1024 and SI units (`KB`,
/// `MB`, ...) by 1000, both case-insensitive. A bare number is a byte count.
/// The fractional part is rounded to the nearest byte.
pub fn parse_size(literal: &str) -> Result<u64> {
    let malformed = || BtrfsError::MalformedSize(literal.to_string());

    let trimmed = literal.trim();
    let split_at = trimmed
        .find(|character: char| !character.is_ascii_digit() && character != '.')
        .unwrap_or(trimmed.len());
    let (number, unit) = trimmed.split_at(split_at);

    let (whole, fraction) = number.split_once('.').unwrap_or((number, ""));
    if (whole.is_empty() && fraction.is_empty()) || fraction.contains('.') {
        return Err(malformed());
    }

    let multiplier = unit_multiplier(unit.trim()).ok_or_else(malformed)?;

    let digits = format!("{whole}{fraction}");
    let mantissa: u128 = digits.parse().map_err(|_| malformed())?;
    let scale = u32::try_from(fraction.len())
        .ok()
        .and_then(|len| 10u128.checked_pow(len))
        .ok_or_else(malformed)?;

    let scaled = mantissa
        .checked_mul(multiplier)
        .and_then(|value| value.checked_add(scale / 2))
        .ok_or_else(malformed)?;

    u64::try_from(scaled / scale).map_err(|_| malformed())
}

fn unit_multiplier(unit: &str) -> Option<u128> {
    let unit = unit.to_ascii_lowercase();
    if matches!(unit.as_str(), "" | "b" | "byte" | "bytes") {
        return Some(1);
    }

    let mut chars = unit.chars();
    let exponent = match chars.next()? {
        'k' => 1,
        'm' => 2,
        'g' => 3,
        't' => 4,
        'p' => 5,
        'e' => 6,
        _ => return None,
    };

    let base: u128 = match chars.as_str() {
        "" | "i" | "ib" => 1024,
        "b" => 1000,
        _ => return None,
    };

    Some(base.pow(exponent))
}
