use std::borrow::Cow;

const ELLIPSIS: &str = "...";

/// Truncate `text` to at most `max_chars` characters, preferring to cut at
/// the last sentence-ending punctuation mark inside the budget. When no
/// boundary exists the raw prefix is returned with an ellipsis marker.
///
/// This is a heuristic, not sentence segmentation: abbreviations and decimal
/// points cut early rather than crash. The budget is a character count, so
/// multi-byte text never splits inside a code point.
pub fn truncate(text: &str, max_chars: usize) -> Cow<'_, str> {
    if text.chars().count() <= max_chars {
        return Cow::Borrowed(text);
    }

    let mut prefix: String = text.chars().take(max_chars).collect();
    match prefix.rfind(['.', '?', '!']) {
        // A boundary at position 0 would leave nothing but punctuation.
        Some(pos) if pos > 0 => {
            prefix.truncate(pos + 1);
            Cow::Owned(prefix)
        }
        _ => {
            prefix.push_str(ELLIPSIS);
            Cow::Owned(prefix)
        }
    }
}
