//! Core crate for `pounce`: incremental text and file search driven by the
//! external `rg` and `fd` tools.
//!
//! The root module re-exports the search pipeline types so embedders can wire
//! a [`search::SearchRuntime`] to their own [`search::ResultSink`] without
//! digging through the module hierarchy.

pub mod app_dirs;
pub mod logging;
pub mod open;
pub mod preview;
pub mod search;

pub use search::{
    DEBOUNCE_DELAY, FileHit, GatePhase, Hit, LineHit, QueryHistory, ResultSink, ScanSpec,
    SearchEvent, SearchMode, SearchRequest, SearchRuntime, ToolPaths, parse_line,
};
