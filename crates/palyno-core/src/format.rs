//! # Display Formatting
//!
//! String helpers for tables, charts and exported sheets. Lab reports use
//! `.` as the thousands separator.

use crate::NO_TAG_LABEL;

/// Formats a percentage, e.g. `format_percentage(12.5, 2)` → `"12.50%"`.
pub fn format_percentage(value: f64, decimals: usize) -> String {
    format!("{:.*}%", decimals, value)
}

/// Formats a grain count with `.` thousands separators.
///
/// ## Example
/// ```rust
/// use palyno_core::format::format_grain_count;
///
/// assert_eq!(format_grain_count(12345), "12.345");
/// assert_eq!(format_grain_count(-1000), "-1.000");
/// ```
pub fn format_grain_count(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);

    if value < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }
    out
}

/// `"Common (Scientific)"`, or the scientific name alone when the common
/// name is blank.
pub fn species_label(common_name: &str, scientific_name: &str) -> String {
    if common_name.trim().is_empty() {
        scientific_name.to_string()
    } else {
        format!("{} ({})", common_name, scientific_name)
    }
}

/// The tag text, or `"no tag"`.
pub fn tag_label(tag: Option<&str>) -> &str {
    tag.unwrap_or(NO_TAG_LABEL)
}
