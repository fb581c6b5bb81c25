//! Launch the user's editor positioned at a search hit.

use std::path::{Path, PathBuf};
use std::process::Command;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum OpenError {
    #[error("failed to launch {editor}: {source}")]
    Launch {
        editor: String,
        source: std::io::Error,
    },

    #[error("{editor} exited with {status} while opening {path}")]
    EditorFailed {
        editor: String,
        path: PathBuf,
        status: std::process::ExitStatus,
    },

    #[error("no editor configured; set $VISUAL or $EDITOR")]
    NoEditor,
}

/// Editor command resolved from the environment (`$VISUAL`, then `$EDITOR`).
pub fn editor_from_env() -> Result<String, OpenError> {
    ["VISUAL", "EDITOR"]
        .iter()
        .find_map(|name| std::env::var(name).ok().filter(|value| !value.is_empty()))
        .ok_or(OpenError::NoEditor)
}

/// Open `path` at the 1-based `line` with the given editor.
///
/// The `+<line>` convention is understood by vi, vim, nano, emacs, and
/// kakoune alike. Arguments are passed as discrete argv entries; a failure is
/// returned to the caller to report once, never retried.
pub fn open_at_line(editor: &str, path: &Path, line: u32) -> Result<(), OpenError> {
    let status = Command::new(editor)
        .arg(format!("+{line}"))
        .arg(path)
        .status()
        .map_err(|source| OpenError::Launch {
            editor: editor.to_string(),
            source,
        })?;

    if status.success() {
        Ok(())
    } else {
        Err(OpenError::EditorFailed {
            editor: editor.to_string(),
            path: path.to_path_buf(),
            status,
        })
    }
}
