//! Line-ending detection and preservation (spec.md §4.7).

/// Detect from the first CRLF/LF occurrence; defaults to `\n` when the
/// content has no newline at all.
pub fn detect(content: &str) -> &'static str {
    match content.find('\n') {
        Some(pos) if pos > 0 && content.as_bytes()[pos - 1] == b'\r' => "\r\n",
        Some(_) => "\n",
        None => "\n",
    }
}
