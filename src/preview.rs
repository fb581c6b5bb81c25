//! Excerpt rendering for the preview pane collaborator.
//!
//! Given a file, a target line, and the active query, this produces the
//! target line plus a configurable number of surrounding context lines, with
//! the first case-insensitive query occurrence marked inside the target line
//! only. Rendering is left to the caller.

use std::fs;
use std::ops::Range;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PreviewError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("line {line} is out of range for {path} ({total} lines)")]
    LineOutOfRange {
        path: PathBuf,
        line: u32,
        total: usize,
    },
}

/// One rendered excerpt line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExcerptLine {
    /// 1-based line number in the source file.
    pub number: u32,
    pub text: String,
    /// Byte range of the query occurrence; set on the target line only.
    pub highlight: Option<Range<usize>>,
}

/// A window of file content centered on a target line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Excerpt {
    pub path: PathBuf,
    pub lines: Vec<ExcerptLine>,
    /// Index of the target line within `lines`.
    pub target: usize,
}

/// Read `path` and build an excerpt of `context` lines either side of the
/// 1-based `line`, clamped to the file bounds.
pub fn render(path: &Path, line: u32, query: &str, context: usize) -> Result<Excerpt, PreviewError> {
    let text = fs::read_to_string(path).map_err(|source| PreviewError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let all: Vec<&str> = text.lines().collect();
    let target_index = line.saturating_sub(1) as usize;
    if line == 0 || target_index >= all.len() {
        return Err(PreviewError::LineOutOfRange {
            path: path.to_path_buf(),
            line,
            total: all.len(),
        });
    }

    let start = target_index.saturating_sub(context);
    let end = (target_index + context + 1).min(all.len());

    let lines = (start..end)
        .map(|index| ExcerptLine {
            number: (index + 1) as u32,
            text: all[index].to_string(),
            highlight: (index == target_index)
                .then(|| find_case_insensitive(all[index], query))
                .flatten(),
        })
        .collect();

    Ok(Excerpt {
        path: path.to_path_buf(),
        lines,
        target: target_index - start,
    })
}

/// Byte range of the first case-insensitive occurrence of `query` in `text`.
///
/// Case folding is done per character so the returned range stays aligned to
/// the original string even when folding changes byte lengths.
fn find_case_insensitive(text: &str, query: &str) -> Option<Range<usize>> {
    if query.is_empty() {
        return None;
    }
    let folded_query = query.to_lowercase();

    for (start, _) in text.char_indices() {
        let candidate = &text[start..];
        let mut matched = 0usize;
        let mut folded = String::new();
        for ch in candidate.chars() {
            matched += ch.len_utf8();
            folded.extend(ch.to_lowercase());
            if folded.len() >= folded_query.len() {
                break;
            }
        }
        if folded == folded_query {
            return Some(start..start + matched);
        }
    }
    None
}
