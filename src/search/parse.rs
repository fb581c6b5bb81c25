use std::path::{Path, PathBuf};

use super::{MAX_CONTENT_LEN, SearchMode};

/// One matched line produced by a content scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineHit {
    /// Absolute path of the file containing the match.
    pub path: PathBuf,
    /// Final path segment, kept separate for list rendering.
    pub file_name: String,
    /// 1-based line number reported by the external tool.
    pub line_number: u32,
    /// Matched line text with surrounding whitespace trimmed.
    pub content: String,
    /// Path relative to the directory the scan was rooted at.
    pub relative_path: PathBuf,
}

/// One path produced by a file-name scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHit {
    /// Absolute path of the file.
    pub path: PathBuf,
    /// Final path segment.
    pub file_name: String,
    /// Path relative to the directory the scan was rooted at.
    pub relative_path: PathBuf,
}

/// A structured search record parsed from one raw output line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Hit {
    Line(LineHit),
    File(FileHit),
}

impl Hit {
    /// Absolute path of the file this record refers to.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Hit::Line(hit) => &hit.path,
            Hit::File(hit) => &hit.path,
        }
    }

    /// Line number for content hits; file hits have none.
    #[must_use]
    pub fn line_number(&self) -> Option<u32> {
        match self {
            Hit::Line(hit) => Some(hit.line_number),
            Hit::File(_) => None,
        }
    }
}

/// Parse one raw output line into a structured record.
///
/// Returns `None` for lines that do not form a valid record; callers drop
/// those silently rather than aborting the scan. The transformation is pure so
/// it can be unit tested against literal lines.
#[must_use]
pub fn parse_line(raw: &str, directory: &Path, mode: SearchMode) -> Option<Hit> {
    match mode {
        SearchMode::Content => parse_content_line(raw, directory).map(Hit::Line),
        SearchMode::Files => parse_file_line(raw, directory).map(Hit::File),
    }
}

/// Parse a `path:lineNumber:content` line emitted by the content scanner.
fn parse_content_line(raw: &str, directory: &Path) -> Option<LineHit> {
    let mut fields = raw.splitn(3, ':');
    let raw_path = fields.next()?;
    if raw_path.is_empty() {
        return None;
    }

    let line_number: u32 = fields.next()?.parse().ok()?;
    if line_number == 0 {
        return None;
    }

    let content = fields.next().unwrap_or("").trim();
    if content.len() >= MAX_CONTENT_LEN {
        return None;
    }

    let path = resolve(raw_path, directory);
    Some(LineHit {
        file_name: file_name_of(&path),
        relative_path: relative_to(&path, directory),
        content: content.to_string(),
        line_number,
        path,
    })
}

/// Parse a bare path line emitted by the file scanner.
///
/// The file scanner runs with an absolute-path flag, so the line already names
/// an absolute location; resolving against the scan directory is still applied
/// for relative output.
fn parse_file_line(raw: &str, directory: &Path) -> Option<FileHit> {
    if raw.is_empty() {
        return None;
    }

    let path = resolve(raw, directory);
    Some(FileHit {
        file_name: file_name_of(&path),
        relative_path: relative_to(&path, directory),
        path,
    })
}

/// Resolve a possibly relative tool-reported path against the scan directory.
fn resolve(raw: &str, directory: &Path) -> PathBuf {
    let trimmed = raw.strip_prefix("./").unwrap_or(raw);
    let candidate = Path::new(trimmed);
    if candidate.is_absolute() {
        candidate.to_path_buf()
    } else {
        directory.join(candidate)
    }
}

fn relative_to(path: &Path, directory: &Path) -> PathBuf {
    path.strip_prefix(directory).unwrap_or(path).to_path_buf()
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}
