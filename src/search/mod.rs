//! Streaming search orchestration over the external `rg` and `fd` tools.
//!
//! The pipeline is: a [`SearchRuntime`] debounces user input and issues
//! generation-tagged requests to a background worker thread, the worker fans
//! each request out into one external process per directory, and parsed hits
//! stream back through an event channel into a [`ResultSink`]. A shared
//! generation counter retires superseded requests at every stage.

mod commands;
mod history;
mod parse;
mod process;
mod runtime;
mod session;
mod sink;
mod worker;

pub use commands::{SearchCommand, SearchEvent};
pub use history::QueryHistory;
pub use parse::{FileHit, Hit, LineHit, parse_line};
pub use process::ScanSpec;
pub use runtime::{GatePhase, SearchRuntime};
pub use sink::ResultSink;
pub use worker::spawn;

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::Duration;

/// Quiet period after the last keystroke before a search is issued.
pub const DEBOUNCE_DELAY: Duration = Duration::from_millis(300);

/// Content hits whose trimmed text reaches this length are dropped.
pub const MAX_CONTENT_LEN: usize = 1000;

/// Combined stdout ceiling per directory scan, to bound memory on
/// pathological matches.
pub(crate) const MAX_SCAN_OUTPUT: u64 = 200 * 1024 * 1024;

/// Which external tool a request drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchMode {
    /// Match line contents via `rg`.
    Content,
    /// Match file names via `fd`.
    Files,
}

/// Paths of the external search executables.
#[derive(Debug, Clone)]
pub struct ToolPaths {
    pub rg: PathBuf,
    pub fd: PathBuf,
}

impl Default for ToolPaths {
    fn default() -> Self {
        Self {
            rg: PathBuf::from("rg"),
            fd: PathBuf::from("fd"),
        }
    }
}

/// An immutable user query submitted for one search.
///
/// Requests are never mutated; retyping produces a new request that
/// supersedes this one.
#[derive(Debug, Clone)]
pub struct SearchRequest {
    pub query: String,
    pub directories: Vec<PathBuf>,
    pub mode: SearchMode,
}

impl SearchRequest {
    #[must_use]
    pub fn new(query: impl Into<String>, directories: Vec<PathBuf>, mode: SearchMode) -> Self {
        Self {
            query: query.into(),
            directories,
            mode,
        }
    }

    /// Whether the query is empty after trimming; such requests complete
    /// immediately without spawning any process.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.query.trim().is_empty()
    }
}

/// True once a newer query has superseded generation `id`.
pub(crate) fn should_abort(id: u64, latest: &AtomicU64) -> bool {
    latest.load(AtomicOrdering::Acquire) != id
}
