//! Shared formatting helpers for terminal output

/// Percentage with one decimal below 100, e.g. "12.9%", and none from 100 up
///
/// Tiny non-zero values keep two decimals so they do not read as zero.
pub fn format_percentage(pct: f64) -> String {
    let magnitude = pct.abs();
    let decimals = match magnitude {
        m if m >= 100.0 => 0,
        m if m < 0.1 && m > 0.0 => 2,
        _ => 1,
    };
    format!("{:.*}%", decimals, pct)
}

/// Horizontal bar of `width` cells, filled in proportion to `value / max_value`
///
/// A value past the maximum fills the bar and marks the last cell with `!`.
pub fn format_bar(value: f64, max_value: f64, width: usize) -> String {
    if max_value <= 0.0 || value <= 0.0 || width == 0 {
        return " ".repeat(width);
    }
    if value > max_value {
        return format!("{}!", "█".repeat(width - 1));
    }

    let filled = ((value / max_value) * width as f64).round() as usize;
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

/// Cut `s` to at most `max_len` characters, ending in "..." when shortened
pub fn truncate(s: &str, max_len: usize) -> String {
    match s.char_indices().nth(max_len) {
        None => s.to_string(),
        Some(_) if max_len <= 3 => ".".repeat(max_len),
        Some(_) => {
            let cut = s
                .char_indices()
                .nth(max_len - 3)
                .map_or(s.len(), |(index, _)| index);
            format!("{}...", &s[..cut])
        }
    }
}
