//! Reply chunking: split one answer into bounded-length pieces.
//!
//! Lengths are counted in characters (Unicode scalar values), never bytes, so a
//! piece boundary always falls on a char boundary.

/// Split `text` into consecutive slices of at most `max_chars` characters.
///
/// The slices partition `text` in order: joining them yields `text` again. Only the
/// last slice may be shorter than `max_chars`. An empty `text` yields no slices.
/// A `max_chars` of 0 is treated as 1.
pub fn chunk_text(text: &str, max_chars: usize) -> Vec<&str> {
    let max_chars = max_chars.max(1);
    let mut chunks = Vec::new();
    let mut start = 0;
    let mut count = 0;
    for (idx, _) in text.char_indices() {
        if count == max_chars {
            chunks.push(&text[start..idx]);
            start = idx;
            count = 0;
        }
        count += 1;
    }
    if start < text.len() {
        chunks.push(&text[start..]);
    }
    chunks
}
