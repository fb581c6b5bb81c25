use std::path::PathBuf;

use super::parse::Hit;
use super::SearchRequest;

/// Commands understood by the background search worker.
#[derive(Debug)]
pub enum SearchCommand {
    /// Cancel the active session, if any, and run this request instead.
    Search {
        /// Generation token correlating responses with the originating query.
        id: u64,
        request: SearchRequest,
    },
    /// Stop the background worker thread.
    Shutdown,
}

/// Events streamed back to the consumer, each tagged with the generation of
/// the request that produced it so stale ones can be discarded.
#[derive(Debug)]
pub enum SearchEvent {
    /// Previous results no longer apply; emitted before any hit of a request.
    Cleared { id: u64 },
    /// One parsed result record, forwarded as soon as it was produced.
    Hit { id: u64, hit: Hit },
    /// One directory's scan failed; sibling directories keep running.
    ScanFailed {
        id: u64,
        directory: PathBuf,
        message: String,
    },
    /// Every directory reached a terminal state; fires exactly once.
    Completed { id: u64, total: usize },
}

impl SearchEvent {
    /// Generation of the request this event belongs to.
    #[must_use]
    pub fn id(&self) -> u64 {
        match self {
            SearchEvent::Cleared { id }
            | SearchEvent::Hit { id, .. }
            | SearchEvent::ScanFailed { id, .. }
            | SearchEvent::Completed { id, .. } => *id,
        }
    }
}
