//! Groups findings by file, rewrites targeted lines, and writes atomically
//! (spec.md §4.7). Writes go through a temp file in the same directory
//! followed by a rename, following `assay-core::fix::apply_ops_to_file`'s
//! atomic-ish write (Windows needs a remove-then-rename since `rename`
//! there won't overwrite an existing destination).

use std::collections::{BTreeMap, BTreeSet};
use std::io::Write;
use std::path::{Path, PathBuf};

use vigil_common::{Finding, FindingSource, VigilError};

use crate::comment_style::{self, CommentStyle};
use crate::line_ending;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixSummary {
    pub file: PathBuf,
    pub commented_lines: Vec<usize>,
    pub skipped_lines: Vec<usize>,
    pub changed: bool,
}

/// Build the per-file set of 1-based line numbers to comment. Heuristic
/// findings and findings without a line are skipped outright, never even
/// entering the per-file set.
pub fn group_target_lines(findings: &[Finding]) -> BTreeMap<String, BTreeSet<usize>> {
    let mut grouped: BTreeMap<String, BTreeSet<usize>> = BTreeMap::new();
    for finding in findings {
        if finding.source == FindingSource::Heuristic {
            continue;
        }
        let Some(line) = finding.line else { continue };
        grouped.entry(finding.file.clone()).or_default().insert(line);
    }
    grouped
}

/// Rewrite `content`'s targeted lines with the given comment style,
/// preserving the detected line ending. Lines already commented per that
/// style, and lines outside the content's range, are left untouched.
pub fn rewrite(content: &str, target_lines: &BTreeSet<usize>, style: CommentStyle) -> (String, Vec<usize>, Vec<usize>) {
    let ending = line_ending::detect(content);
    let normalized = content.replace("\r\n", "\n");
    let had_trailing_newline = normalized.ends_with('\n');
    let mut lines: Vec<String> = normalized.split('\n').map(String::from).collect();
    if had_trailing_newline {
        lines.pop();
    }

    let mut commented = Vec::new();
    let mut skipped = Vec::new();

    for &line_no in target_lines {
        let Some(line) = lines.get(line_no.wrapping_sub(1)).cloned() else {
            skipped.push(line_no);
            continue;
        };
        if comment_style::is_already_commented(&line, style) {
            skipped.push(line_no);
            continue;
        }
        if style == CommentStyle::None {
            skipped.push(line_no);
            continue;
        }
        lines[line_no - 1] = comment_style::comment_line(&line, style);
        commented.push(line_no);
    }

    let mut out = lines.join(ending);
    if had_trailing_newline {
        out.push_str(ending);
    }
    (out, commented, skipped)
}

/// Apply fixes for one file in-place. Reads, rewrites, and atomically
/// replaces the file only when at least one line actually changed.
pub fn apply_to_file(path: &Path, target_lines: &BTreeSet<usize>) -> Result<FixSummary, VigilError> {
    let content = std::fs::read_to_string(path).map_err(|e| VigilError::CacheIoError {
        detail: format!("failed to read {}: {e}", path.display()),
    })?;

    let style = comment_style::for_path(path);
    let (rewritten, commented, skipped) = rewrite(&content, target_lines, style);

    if commented.is_empty() {
        return Ok(FixSummary {
            file: path.to_path_buf(),
            commented_lines: commented,
            skipped_lines: skipped,
            changed: false,
        });
    }

    write_atomic(path, &rewritten)?;

    Ok(FixSummary {
        file: path.to_path_buf(),
        commented_lines: commented,
        skipped_lines: skipped,
        changed: true,
    })
}

/// Apply fixes across every file named by `findings`, grouping by file and
/// skipping heuristic/line-less findings per-finding before any I/O.
pub fn apply_fixes(findings: &[Finding]) -> Vec<Result<FixSummary, VigilError>> {
    group_target_lines(findings)
        .into_iter()
        .map(|(file, lines)| apply_to_file(Path::new(&file), &lines))
        .collect()
}

fn write_atomic(path: &Path, content: &str) -> Result<(), VigilError> {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    let mut tmp = tempfile::Builder::new()
        .prefix(".vigil_fix_")
        .tempfile_in(parent)
        .map_err(|e| VigilError::CacheIoError {
            detail: format!("failed to create temp file next to {}: {e}", path.display()),
        })?;

    tmp.as_file_mut()
        .write_all(content.as_bytes())
        .map_err(|e| VigilError::CacheIoError {
            detail: format!("failed to write temp file: {e}"),
        })?;
    let _ = tmp.as_file_mut().sync_all();

    let tmp_path = {
        let fname = path.file_name().and_then(|s| s.to_str()).unwrap_or("vigil_tmp");
        parent.join(format!(".{fname}.vigil_fix_tmp"))
    };
    let _ = std::fs::remove_file(&tmp_path);
    tmp.persist(&tmp_path).map_err(|e| VigilError::CacheIoError {
        detail: format!("failed to persist temp file: {e}"),
    })?;

    #[cfg(windows)]
    {
        let _ = std::fs::remove_file(path);
    }

    std::fs::rename(&tmp_path, path).map_err(|e| VigilError::CacheIoError {
        detail: format!("failed to rename {} -> {}: {e}", tmp_path.display(), path.display()),
    })
}
