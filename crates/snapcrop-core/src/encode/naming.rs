//! Output file names and size labels.

use super::types::OutputFormat;

const SIZE_UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

/// Replace the extension of `original` with the canonical one for `format`.
///
/// Only the last extension is dropped. A leading dot (hidden file) is part
/// of the stem, not an extension.
///
/// ```text
/// photo.png  + jpeg -> photo.jpg
/// a.b.png    + webp -> a.b.webp
/// scan       + pdf  -> scan.pdf
/// ```
pub fn format_file_name(original: &str, format: OutputFormat) -> String {
    let stem = match original.rfind('.') {
        Some(idx) if idx > 0 => &original[..idx],
        _ => original,
    };
    format!("{}.{}", stem, format.extension())
}

/// Human-readable byte size using 1024-based units.
///
/// At most two decimals, trailing zeros trimmed: `1536 -> "1.5 KB"`.
pub fn human_readable_size(bytes: u64) -> String {
    if bytes < 1024 {
        return format!("{} B", bytes);
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let formatted = format!("{:.2}", value);
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", trimmed, SIZE_UNITS[unit])
}
