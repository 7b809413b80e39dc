use rust_decimal::{Decimal, RoundingStrategy};

/// Format a total with thousand separators and 2 decimal places.
/// Non-negative totals carry no sign: `1234.5` → `"$1,234.50"`, `-3` → `"-$3.00"`.
pub(crate) fn format_amount(val: Decimal) -> String {
    let rounded = val.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let abs = rounded.abs();
    let formatted = format!("{abs:.2}");
    let mut parts = formatted.split('.');
    let int_part = parts.next().unwrap_or("0");
    let dec_part = parts.next().unwrap_or("00");

    let with_commas: String = int_part
        .as_bytes()
        .rchunks(3)
        .rev()
        .map(|chunk| std::str::from_utf8(chunk).unwrap_or(""))
        .collect::<Vec<_>>()
        .join(",");

    if rounded < Decimal::ZERO {
        format!("-${with_commas}.{dec_part}")
    } else {
        format!("${with_commas}.{dec_part}")
    }
}

/// Format a single record's amount, always signed: `"+$15.00"`, `"-$4.50"`.
pub(crate) fn format_signed(val: Decimal) -> String {
    let unsigned = format_amount(val);
    if unsigned.starts_with('-') {
        unsigned
    } else {
        format!("+{unsigned}")
    }
}

/// Truncate a string to `max` visible characters, appending "…" if truncated.
/// The result is guaranteed to be at most `max` characters (counting "…" as one).
/// Safe for multi-byte UTF-8 characters.
pub(crate) fn truncate(s: &str, max: usize) -> String {
    if max == 0 {
        return String::new();
    }
    let char_count = s.chars().count();
    if char_count <= max {
        return s.to_string();
    }
    let truncated: String = s.chars().take(max.saturating_sub(1)).collect();
    format!("{truncated}…")
}

/// Split off the first whitespace-delimited word; the remainder is trimmed.
pub(crate) fn split_first_word(s: &str) -> (&str, &str) {
    let s = s.trim();
    match s.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (s, ""),
    }
}

/// Lay out button labels `per_row` to a row.
pub(crate) fn button_rows(labels: Vec<String>, per_row: usize) -> Vec<Vec<String>> {
    labels
        .chunks(per_row.max(1))
        .map(<[String]>::to_vec)
        .collect()
}
