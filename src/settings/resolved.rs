use std::path::PathBuf;

use thiserror::Error;

use pounce::{SearchMode, ToolPaths};

pub(crate) const DEFAULT_CONTEXT_LINES: usize = 20;
pub(crate) const MAX_CONTEXT_LINES: usize = 100;

#[derive(Debug, Error)]
pub(crate) enum SettingsError {
    #[error("context_lines must be at most {MAX_CONTEXT_LINES}, got {0}")]
    ContextLinesOutOfRange(usize),

    #[error("search directory not accessible: {path}: {source}")]
    MissingDirectory {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Fully validated configuration the rest of the binary runs on.
#[derive(Debug, Clone)]
pub(crate) struct ResolvedConfig {
    pub query: String,
    pub directories: Vec<PathBuf>,
    pub mode: SearchMode,
    pub tools: ToolPaths,
    pub context_lines: usize,
    pub auto_close: bool,
}

impl ResolvedConfig {
    pub(super) fn validate(&self) -> Result<(), SettingsError> {
        if self.context_lines > MAX_CONTEXT_LINES {
            return Err(SettingsError::ContextLinesOutOfRange(self.context_lines));
        }
        Ok(())
    }

    /// Canonicalize the search directories, failing on any that do not
    /// exist.
    pub(super) fn absolutize(mut self) -> Result<Self, SettingsError> {
        let mut directories = Vec::with_capacity(self.directories.len());
        for directory in &self.directories {
            let resolved =
                directory
                    .canonicalize()
                    .map_err(|source| SettingsError::MissingDirectory {
                        path: directory.clone(),
                        source,
                    })?;
            directories.push(resolved);
        }
        self.directories = directories;
        Ok(self)
    }

    /// Print the effective configuration, used by `--print-config`.
    pub(crate) fn print_summary(&self) {
        println!("query: {}", self.query);
        println!(
            "mode: {}",
            match self.mode {
                SearchMode::Content => "content",
                SearchMode::Files => "files",
            }
        );
        for directory in &self.directories {
            println!("directory: {}", directory.display());
        }
        println!("rg_path: {}", self.tools.rg.display());
        println!("fd_path: {}", self.tools.fd.display());
        println!("context_lines: {}", self.context_lines);
        println!("auto_close: {}", self.auto_close);
    }
}
