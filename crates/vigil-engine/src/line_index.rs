/// Monotonically increasing byte offsets of line starts, built once per
/// scanned content so every rule and heuristic can translate a match offset
/// to a 1-based line number without re-scanning the buffer (spec.md §4.3
/// "Line index").
pub struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    pub fn build(content: &str) -> Self {
        let mut starts = vec![0];
        for (i, b) in content.bytes().enumerate() {
            if b == b'\n' {
                starts.push(i + 1);
            }
        }
        Self { starts }
    }

    /// 1-based line number containing byte offset `pos`. Binary search over
    /// the line-start array for the last start `<= pos`.
    pub fn line_at(&self, pos: usize) -> usize {
        match self.starts.binary_search(&pos) {
            Ok(idx) => idx + 1,
            Err(idx) => idx,
        }
    }
}
