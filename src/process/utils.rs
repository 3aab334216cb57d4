/// Coerce a raw cell into a number: trim, drop thousands separators, parse.
///
/// Returns `None` for empty, non-numeric and non-finite input.
pub fn parse_number(raw: &str) -> Option<f64> {
    let cleaned: String = raw.trim().chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Shorten `text` to at most `max` chars with newlines escaped, for log previews.
pub fn preview(text: &str, max: usize) -> String {
    text.chars()
        .take(max)
        .collect::<String>()
        .replace('\r', "\\r")
        .replace('\n', "\\n")
}
