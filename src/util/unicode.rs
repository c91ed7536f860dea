use unicode_segmentation::UnicodeSegmentation;

/// True if `byte_offset` sits on a grapheme cluster boundary of `s`.
/// Cursor positions always live on these boundaries.
pub fn is_grapheme_boundary(s: &str, byte_offset: usize) -> bool {
    if byte_offset == 0 || byte_offset == s.len() {
        return true;
    }
    if byte_offset > s.len() {
        return false;
    }
    s.grapheme_indices(true).any(|(i, _)| i == byte_offset)
}
