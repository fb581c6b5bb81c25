use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::mpsc::{Receiver, Sender, TryRecvError};
use std::sync::Arc;
use std::time::Instant;

use super::commands::{SearchCommand, SearchEvent};
use super::sink::ResultSink;
use super::{DEBOUNCE_DELAY, SearchMode, SearchRequest};

/// Externally observable state of the query gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatePhase {
    /// No pending input and no search in flight.
    Idle,
    /// Input arrived; waiting out the quiet period.
    Debouncing,
    /// A request has been issued and has not completed.
    Searching,
}

/// Input waiting for its quiet period to elapse.
struct PendingQuery {
    text: String,
    deadline: Instant,
}

/// Front side of the search pipeline: debounces raw input, issues
/// generation-tagged requests to the worker, and pumps events back into a
/// [`ResultSink`] while discarding anything from superseded generations.
pub struct SearchRuntime {
    tx: Sender<SearchCommand>,
    rx: Receiver<SearchEvent>,
    latest_query_id: Arc<AtomicU64>,
    directories: Vec<PathBuf>,
    mode: SearchMode,
    next_query_id: u64,
    current_query_id: Option<u64>,
    in_flight: bool,
    pending: Option<PendingQuery>,
}

impl SearchRuntime {
    pub fn new(
        tx: Sender<SearchCommand>,
        rx: Receiver<SearchEvent>,
        latest_query_id: Arc<AtomicU64>,
        directories: Vec<PathBuf>,
        mode: SearchMode,
    ) -> Self {
        Self {
            tx,
            rx,
            latest_query_id,
            directories,
            mode,
            next_query_id: 0,
            current_query_id: None,
            in_flight: false,
            pending: None,
        }
    }

    pub fn set_mode(&mut self, mode: SearchMode) {
        self.mode = mode;
    }

    pub fn shutdown(&self) {
        let _ = self.tx.send(SearchCommand::Shutdown);
    }

    /// Record a keystroke. Non-empty input restarts the quiet-period timer,
    /// discarding any not-yet-issued search; input reduced to the empty
    /// string bypasses the delay and clears displayed results immediately.
    pub fn on_query_changed(&mut self, text: &str, now: Instant) {
        if text.trim().is_empty() {
            self.pending = None;
            self.issue_search(String::new());
            return;
        }

        self.pending = Some(PendingQuery {
            text: text.to_string(),
            deadline: now + DEBOUNCE_DELAY,
        });
    }

    /// Issue the pending search once its quiet period has elapsed.
    pub fn poll(&mut self, now: Instant) {
        let due = self
            .pending
            .as_ref()
            .is_some_and(|pending| pending.deadline <= now);
        if due {
            if let Some(pending) = self.pending.take() {
                self.issue_search(pending.text);
            }
        }
    }

    /// Issue a search immediately, skipping the debounce window. One-shot
    /// callers use this; interactive callers go through `on_query_changed`.
    pub fn search_now(&mut self, query: &str) {
        self.pending = None;
        self.issue_search(query.to_string());
    }

    /// Bump the generation (retiring any in-flight session) and hand the
    /// request to the worker.
    fn issue_search(&mut self, query: String) {
        self.next_query_id = self.next_query_id.saturating_add(1);
        let id = self.next_query_id;
        self.current_query_id = Some(id);
        self.in_flight = true;
        self.latest_query_id.store(id, AtomicOrdering::Release);
        let request = SearchRequest::new(query, self.directories.clone(), self.mode);
        let _ = self.tx.send(SearchCommand::Search { id, request });
    }

    /// Drain available events into the sink, dropping those whose generation
    /// is no longer current. Returns the number of events forwarded.
    pub fn pump(&mut self, sink: &mut dyn ResultSink) -> usize {
        let mut forwarded = 0;
        loop {
            let event = match self.rx.try_recv() {
                Ok(event) => event,
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => break,
            };

            if !self.matches_latest(event.id()) {
                continue;
            }

            forwarded += 1;
            match event {
                SearchEvent::Cleared { .. } => sink.results_cleared(),
                SearchEvent::Hit { hit, .. } => sink.result_added(hit),
                SearchEvent::ScanFailed { message, .. } => sink.search_failed(&message),
                SearchEvent::Completed { total, .. } => {
                    self.in_flight = false;
                    sink.search_completed(total);
                }
            }
        }
        forwarded
    }

    #[must_use]
    pub fn phase(&self) -> GatePhase {
        if self.pending.is_some() {
            GatePhase::Debouncing
        } else if self.in_flight {
            GatePhase::Searching
        } else {
            GatePhase::Idle
        }
    }

    #[must_use]
    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    fn matches_latest(&self, event_id: u64) -> bool {
        Some(event_id) == self.current_query_id
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::sync::mpsc;
    use std::time::Duration;

    use super::super::parse::{Hit, LineHit};
    use super::*;

    #[derive(Default)]
    struct RecordingSink {
        cleared: usize,
        hits: Vec<Hit>,
        completions: Vec<usize>,
        failures: Vec<String>,
    }

    impl ResultSink for RecordingSink {
        fn results_cleared(&mut self) {
            self.cleared += 1;
        }

        fn result_added(&mut self, hit: Hit) {
            self.hits.push(hit);
        }

        fn search_completed(&mut self, total: usize) {
            self.completions.push(total);
        }

        fn search_failed(&mut self, message: &str) {
            self.failures.push(message.to_string());
        }
    }

    struct Harness {
        runtime: SearchRuntime,
        commands: mpsc::Receiver<SearchCommand>,
        events: mpsc::Sender<SearchEvent>,
    }

    fn harness() -> Harness {
        let (command_tx, command_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let runtime = SearchRuntime::new(
            command_tx,
            event_rx,
            Arc::new(AtomicU64::new(0)),
            vec![PathBuf::from("/a")],
            SearchMode::Content,
        );
        Harness {
            runtime,
            commands: command_rx,
            events: event_tx,
        }
    }

    fn sample_hit() -> Hit {
        Hit::Line(LineHit {
            path: PathBuf::from("/a/x.txt"),
            file_name: "x.txt".to_string(),
            line_number: 3,
            content: "foo bar".to_string(),
            relative_path: PathBuf::from("x.txt"),
        })
    }

    #[test]
    fn rapid_retyping_issues_a_single_search() {
        let mut h = harness();
        let start = Instant::now();

        h.runtime.on_query_changed("f", start);
        h.runtime
            .on_query_changed("fo", start + Duration::from_millis(100));
        h.runtime
            .on_query_changed("foo", start + Duration::from_millis(200));

        // Inside the quiet period nothing is issued.
        h.runtime.poll(start + Duration::from_millis(400));
        assert_eq!(h.runtime.phase(), GatePhase::Debouncing);
        // 200ms after the last keystroke: still quiet.
        h.runtime.poll(start + Duration::from_millis(499));
        assert!(h.commands.try_recv().is_err());

        h.runtime.poll(start + Duration::from_millis(501));
        let command = h.commands.try_recv().expect("one search issued");
        let SearchCommand::Search { request, .. } = command else {
            panic!("expected a search command");
        };
        assert_eq!(request.query, "foo");
        assert!(h.commands.try_recv().is_err());
        assert_eq!(h.runtime.phase(), GatePhase::Searching);
    }

    #[test]
    fn empty_query_bypasses_debounce() {
        let mut h = harness();
        h.runtime.on_query_changed("", Instant::now());

        let command = h.commands.try_recv().expect("issued immediately");
        let SearchCommand::Search { request, .. } = command else {
            panic!("expected a search command");
        };
        assert!(request.is_blank());
    }

    #[test]
    fn new_query_supersedes_in_flight_generation() {
        let mut h = harness();
        h.runtime.search_now("first");
        let SearchCommand::Search { id: first_id, .. } =
            h.commands.try_recv().expect("first search")
        else {
            panic!("expected a search command");
        };

        h.runtime.search_now("second");
        assert_eq!(
            h.runtime.latest_query_id.load(AtomicOrdering::Acquire),
            first_id + 1
        );

        // Late events from the first generation are dropped, not forwarded.
        h.events
            .send(SearchEvent::Hit {
                id: first_id,
                hit: sample_hit(),
            })
            .unwrap();
        h.events
            .send(SearchEvent::Completed {
                id: first_id,
                total: 1,
            })
            .unwrap();

        let mut sink = RecordingSink::default();
        assert_eq!(h.runtime.pump(&mut sink), 0);
        assert!(sink.hits.is_empty());
        assert!(sink.completions.is_empty());
        assert!(h.runtime.is_in_flight());
    }

    #[test]
    fn current_generation_events_reach_the_sink() {
        let mut h = harness();
        h.runtime.search_now("foo");
        let SearchCommand::Search { id, .. } = h.commands.try_recv().expect("search") else {
            panic!("expected a search command");
        };

        h.events.send(SearchEvent::Cleared { id }).unwrap();
        h.events
            .send(SearchEvent::Hit {
                id,
                hit: sample_hit(),
            })
            .unwrap();
        h.events.send(SearchEvent::Completed { id, total: 1 }).unwrap();

        let mut sink = RecordingSink::default();
        assert_eq!(h.runtime.pump(&mut sink), 3);
        assert_eq!(sink.cleared, 1);
        assert_eq!(sink.hits.len(), 1);
        assert_eq!(sink.hits[0].path(), Path::new("/a/x.txt"));
        assert_eq!(sink.completions, vec![1]);
        assert_eq!(h.runtime.phase(), GatePhase::Idle);
    }

    #[test]
    fn scan_failure_is_reported_without_ending_the_search() {
        let mut h = harness();
        h.runtime.search_now("foo");
        let SearchCommand::Search { id, .. } = h.commands.try_recv().expect("search") else {
            panic!("expected a search command");
        };

        h.events
            .send(SearchEvent::ScanFailed {
                id,
                directory: PathBuf::from("/a"),
                message: "failed to start rg".to_string(),
            })
            .unwrap();

        let mut sink = RecordingSink::default();
        h.runtime.pump(&mut sink);
        assert_eq!(sink.failures.len(), 1);
        assert!(h.runtime.is_in_flight());
    }
}
