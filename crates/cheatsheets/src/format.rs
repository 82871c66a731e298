//! Human-friendly sizes and durations for logs and command output.

use std::time::Duration;

const SIZES: [(u64, &str); 3] = [(1 << 30, "GB"), (1 << 20, "MB"), (1 << 10, "kB")];

/// `512 bytes`, `1.50 kB`, `3 MB`: two decimals with a trailing `.00` dropped.
pub fn format_size(n: u64) -> String {
    for (size, suffix) in SIZES {
        if n >= size {
            let value = format!("{:.2}", n as f64 / size as f64);
            let value = value.strip_suffix(".00").unwrap_or(&value);
            return format!("{value} {suffix}");
        }
    }
    format!("{n} bytes")
}

/// Microseconds without a fraction, milliseconds and seconds with two
/// (truncated) decimals and a trailing `.00` dropped.
pub fn format_duration(d: Duration) -> String {
    let nanos = d.as_nanos();
    if nanos < 1_000 {
        format!("{nanos} ns")
    } else if nanos < 1_000_000 {
        format!("{} µs", nanos / 1_000)
    } else if nanos < 1_000_000_000 {
        format!("{} ms", two_decimals(nanos / 1_000_000, (nanos / 10_000) % 100))
    } else {
        format!(
            "{} s",
            two_decimals(nanos / 1_000_000_000, (nanos / 10_000_000) % 100)
        )
    }
}

fn two_decimals(whole: u128, hundredths: u128) -> String {
    if hundredths == 0 {
        whole.to_string()
    } else {
        format!("{whole}.{hundredths:02}")
    }
}
