//! Turning user input into the `q` parameter sent to the provider.

/// Trims the input and returns `None` when nothing is left.
///
/// The provider reads a trailing `CA` as the country code for Canada, so
/// `"Sacramento, CA"` would resolve to a Canadian match (or nothing). When the
/// last comma-separated segment is exactly `CA`, the query is rewritten with an
/// explicit `US` country qualifier: `"Sacramento, CA"` becomes
/// `"Sacramento,CA,US"`.
pub fn normalize_city(input: &str) -> Option<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }

    if !(trimmed.contains(", CA") || trimmed.contains(",CA")) {
        return Some(trimmed.to_string());
    }

    let segments: Vec<&str> = trimmed.split(',').map(str::trim).collect();
    match segments.as_slice() {
        [.., place, "CA"] if !place.is_empty() => Some(format!("{},US", segments.join(","))),
        _ => Some(trimmed.to_string()),
    }
}
