/// Converts a memory quantity to whole MiB.
///
/// `KiB` divides by 1024, `GiB` multiplies by 1024, `TiB` by 1024²; any other
/// unit is taken as MiB already. Fractions truncate toward zero, so 1536 KiB
/// is 1 and 1023 KiB is 0.
pub fn normalize_memory_mb(value: f64, unit: &str) -> u64 {
    let mb = match unit.trim() {
        "KiB" | "K" | "k" => value / 1024.0,
        "GiB" | "G" => value * 1024.0,
        "TiB" | "T" => value * 1024.0 * 1024.0,
        _ => value,
    };
    if mb.is_finite() && mb > 0.0 {
        mb.trunc() as u64
    } else {
        0
    }
}

/// Parses text such as `128.50 MiB` or `2GiB` into whole MiB.
pub fn parse_memory_mb(text: &str) -> Option<u64> {
    let text = text.trim();
    let split = text
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(text.len());
    let (number, unit) = text.split_at(split);
    let value: f64 = number.parse().ok()?;
    Some(normalize_memory_mb(value, unit))
}
