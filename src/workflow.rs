use std::thread;
use std::time::Duration;

use pounce::search::spawn;
use pounce::{Hit, QueryHistory, ResultSink, SearchRuntime};

use crate::settings::ResolvedConfig;

/// How often the one-shot driver drains the event channel while a search is
/// in flight.
const PUMP_INTERVAL: Duration = Duration::from_millis(10);

/// Everything a search produced, gathered for printing once it completes.
#[derive(Debug, Default)]
pub(crate) struct SearchOutcome {
    pub query: String,
    pub total: usize,
    pub hits: Vec<Hit>,
    pub failures: Vec<String>,
}

/// Sink that accumulates streamed results for batch output.
#[derive(Default)]
struct CollectingSink {
    hits: Vec<Hit>,
    failures: Vec<String>,
    total: Option<usize>,
}

impl ResultSink for CollectingSink {
    fn results_cleared(&mut self) {
        self.hits.clear();
    }

    fn result_added(&mut self, hit: Hit) {
        self.hits.push(hit);
    }

    fn search_completed(&mut self, total: usize) {
        self.total = Some(total);
    }

    fn search_failed(&mut self, message: &str) {
        self.failures.push(message.to_string());
    }
}

/// One-shot driver around the search pipeline: issues a single query, pumps
/// events until completion, and returns the collected outcome.
pub(crate) struct SearchWorkflow {
    runtime: SearchRuntime,
    history: QueryHistory,
    query: String,
}

impl SearchWorkflow {
    pub(crate) fn from_config(config: &ResolvedConfig) -> Self {
        let (tx, rx, latest) = spawn(config.tools.clone());
        let runtime = SearchRuntime::new(
            tx,
            rx,
            latest,
            config.directories.clone(),
            config.mode,
        );
        Self {
            runtime,
            history: QueryHistory::default(),
            query: config.query.clone(),
        }
    }

    pub(crate) fn run(mut self) -> SearchOutcome {
        let mut sink = CollectingSink::default();
        self.runtime.search_now(&self.query);

        loop {
            self.runtime.pump(&mut sink);
            if !self.runtime.is_in_flight() {
                break;
            }
            thread::sleep(PUMP_INTERVAL);
        }

        self.history.push(&self.query);
        self.runtime.shutdown();

        SearchOutcome {
            query: self.query,
            total: sink.total.unwrap_or(sink.hits.len()),
            hits: sink.hits,
            failures: sink.failures,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use pounce::LineHit;

    use super::*;

    #[test]
    fn cleared_resets_collected_hits() {
        let mut sink = CollectingSink::default();
        sink.result_added(Hit::Line(LineHit {
            path: PathBuf::from("/a/x.txt"),
            file_name: "x.txt".to_string(),
            line_number: 1,
            content: "foo".to_string(),
            relative_path: PathBuf::from("x.txt"),
        }));
        sink.results_cleared();
        assert!(sink.hits.is_empty());
    }

    #[test]
    fn completion_records_the_reported_total() {
        let mut sink = CollectingSink::default();
        sink.search_completed(7);
        assert_eq!(sink.total, Some(7));
    }
}
