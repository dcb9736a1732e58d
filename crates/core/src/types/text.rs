//! Small text helpers shared by the presentation layer.

/// Truncate `text` to at most `max_chars` characters, appending `...` when
/// anything was cut.
///
/// Counts Unicode scalar values, so multi-byte titles are never split inside
/// a character.
///
/// ```
/// use shopfront_core::truncate;
///
/// assert_eq!(truncate("Sunflower", 20), "Sunflower");
/// assert_eq!(truncate("Sunflower", 3), "Sun...");
/// ```
#[must_use]
pub fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        None => text.to_string(),
        Some((cut, _)) => format!("{}...", text.get(..cut).unwrap_or(text)),
    }
}
