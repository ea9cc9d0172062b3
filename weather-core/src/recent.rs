//! Recently searched city names, oldest first.

/// Append `city` unless it is already in the list.
///
/// Returns `true` when the list changed and needs to be written back.
pub fn record(list: &mut Vec<String>, city: &str) -> bool {
    let city = city.trim();
    if city.is_empty() || list.iter().any(|c| c == city) {
        return false;
    }
    list.push(city.to_string());
    true
}

/// Entries containing `text`, ignoring case. Empty input suggests nothing.
pub fn filter<'a>(list: &'a [String], text: &str) -> Vec<&'a str> {
    if text.is_empty() {
        return Vec::new();
    }
    let needle = text.to_lowercase();
    list.iter()
        .filter(|c| c.to_lowercase().contains(&needle))
        .map(String::as_str)
        .collect()
}
