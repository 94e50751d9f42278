//! Per-extension comment style selection (spec.md §4.7).

use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentStyle {
    Prefix(&'static str),
    Wrap(&'static str, &'static str),
    /// No sensible comment syntax (or the format doesn't tolerate one, e.g.
    /// JSON); the line is always treated as already satisfied.
    None,
}

pub fn for_path(path: &Path) -> CommentStyle {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    match ext.as_deref() {
        Some("py" | "sh" | "bash" | "zsh" | "yml" | "yaml" | "rb" | "toml") => {
            CommentStyle::Prefix("#")
        }
        Some("js" | "jsx" | "ts" | "tsx" | "mjs" | "cjs") => CommentStyle::Prefix("//"),
        Some("md" | "mdx") => CommentStyle::Wrap("<!--", "-->"),
        Some("json") => CommentStyle::None,
        _ => CommentStyle::None,
    }
}

pub fn is_already_commented(line: &str, style: CommentStyle) -> bool {
    let trimmed = line.trim_start();
    match style {
        CommentStyle::Prefix(p) => trimmed.starts_with(p),
        CommentStyle::Wrap(open, _) => trimmed.starts_with(open),
        CommentStyle::None => true,
    }
}

pub fn comment_line(line: &str, style: CommentStyle) -> String {
    let indent_len = line.len() - line.trim_start().len();
    let (indent, rest) = line.split_at(indent_len);
    match style {
        CommentStyle::Prefix(p) => format!("{indent}{p} {rest}"),
        CommentStyle::Wrap(open, close) => format!("{indent}{open} {rest} {close}"),
        CommentStyle::None => line.to_string(),
    }
}
