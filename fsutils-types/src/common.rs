// SPDX-License-Identifier: GPL-3.0-only

//! Byte formatting shared by report consumers

use num_format::{Locale, ToFormattedString};

const BINARY_UNITS: [&str; 7] = ["B", "KiB", "MiB", "GiB", "TiB", "PiB", "EiB"];

/// Render a byte count the way `btrfs` prints sizes (e.g. "40.00GiB")
///
/// The largest binary unit not exceeding the value is used, with the
/// fraction rounded to two decimals.
pub fn format_size(bytes: u64) -> String {
    let mut steps = 0;
    while steps + 1 < BINARY_UNITS.len() && bytes >= 1u64 << (10 * (steps + 1)) {
        steps += 1;
    }

    let unit = 1u128 << (10 * steps);
    let hundredths = (u128::from(bytes) * 100 + unit / 2) / unit;

    format!(
        "{}.{:02}{}",
        hundredths / 100,
        hundredths % 100,
        BINARY_UNITS[steps]
    )
}

/// Convert bytes to human-readable format (e.g., "1.50 GiB")
pub fn bytes_to_pretty(bytes: &u64, add_bytes: bool) -> String {
    let mut steps = 0;
    let mut val: f64 = *bytes as f64;

    while val >= 1024. && steps < BINARY_UNITS.len() - 1 {
        val /= 1024.;
        steps += 1;
    }

    let unit = BINARY_UNITS[steps];

    if add_bytes {
        let bytes_str = bytes.to_formatted_string(&Locale::en);
        format!("{:.2} {} ({} bytes)", val, unit, bytes_str)
    } else {
        format!("{:.2} {}", val, unit)
    }
}
