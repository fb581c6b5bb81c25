use std::path::PathBuf;
use std::sync::atomic::AtomicU64;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread;

use log::debug;

use super::commands::SearchEvent;
use super::parse::parse_line;
use super::process::{ScanEvent, ScanHandle, ScanSpec, spawn_scan};
use super::{SearchMode, should_abort};

/// One in-flight fan-out: a set of directory scans plus the aggregator that
/// merges their output into a single event stream.
///
/// The session exclusively owns its scan processes. Dropping or cancelling it
/// never affects a sibling session; the generation token keeps a retired
/// session from reaching the consumer.
pub(crate) struct Session {
    handles: Vec<ScanHandle>,
}

impl Session {
    /// Emit `Cleared`, launch one scan per spec, and start the aggregator.
    ///
    /// Hits are forwarded to `events` the moment they parse; completion fires
    /// exactly once, after every scan reached a terminal state.
    pub(crate) fn launch(
        id: u64,
        specs: Vec<ScanSpec>,
        mode: SearchMode,
        events: Sender<SearchEvent>,
        latest: Arc<AtomicU64>,
    ) -> Self {
        let _ = events.send(SearchEvent::Cleared { id });

        let directories: Vec<PathBuf> = specs.iter().map(|spec| spec.directory.clone()).collect();

        let (scan_tx, scan_rx) = mpsc::channel();
        let mut handles = Vec::with_capacity(specs.len());
        for (scan, spec) in specs.into_iter().enumerate() {
            handles.push(spawn_scan(scan, spec, scan_tx.clone(), id, latest.clone()));
        }
        // The aggregator's recv loop ends once every reader hangs up.
        drop(scan_tx);

        let aggregator_handles = handles.clone();
        thread::spawn(move || {
            aggregate(
                id,
                &directories,
                mode,
                &scan_rx,
                &events,
                &latest,
                &aggregator_handles,
            );
        });

        Self { handles }
    }

    /// Terminate every live scan process owned by this session.
    pub(crate) fn cancel(&self) {
        for handle in &self.handles {
            handle.terminate();
        }
    }
}

/// Merge raw scan events into parsed hits and a single completion.
fn aggregate(
    id: u64,
    directories: &[PathBuf],
    mode: SearchMode,
    scan_rx: &Receiver<ScanEvent>,
    events: &Sender<SearchEvent>,
    latest: &AtomicU64,
    handles: &[ScanHandle],
) {
    let mut pending = directories.len();
    let mut total = 0usize;

    while pending > 0 {
        let Ok(event) = scan_rx.recv() else {
            // All readers hung up; treat the missing scans as finished so the
            // countdown still terminates.
            break;
        };

        if should_abort(id, latest) {
            for handle in handles {
                handle.terminate();
            }
            return;
        }

        match event {
            ScanEvent::Line { scan, raw } => {
                match parse_line(&raw, &directories[scan], mode) {
                    Some(hit) => {
                        total += 1;
                        let _ = events.send(SearchEvent::Hit { id, hit });
                    }
                    None => debug!("dropping malformed output line: {raw:?}"),
                }
            }
            ScanEvent::Finished { .. } => pending -= 1,
            ScanEvent::Failed { scan, message } => {
                pending -= 1;
                let _ = events.send(SearchEvent::ScanFailed {
                    id,
                    directory: directories[scan].clone(),
                    message,
                });
            }
        }
    }

    if !should_abort(id, latest) {
        let _ = events.send(SearchEvent::Completed { id, total });
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering as AtomicOrdering;
    use std::time::Duration;

    use super::super::parse::Hit;
    use super::*;

    fn shell_spec(directory: PathBuf, script: &str) -> ScanSpec {
        ScanSpec {
            directory,
            program: "sh".into(),
            args: vec!["-c".to_string(), script.to_string()],
        }
    }

    fn drain_until_complete(rx: &Receiver<SearchEvent>) -> Vec<SearchEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.recv_timeout(Duration::from_secs(5)) {
            let done = matches!(event, SearchEvent::Completed { .. });
            events.push(event);
            if done {
                break;
            }
        }
        events
    }

    #[test]
    fn hits_from_one_directory_aggregate_with_empty_sibling() {
        let dir_a = tempfile::tempdir().expect("tempdir");
        let dir_b = tempfile::tempdir().expect("tempdir");
        let specs = vec![
            shell_spec(
                dir_a.path().to_path_buf(),
                "printf 'x.txt:3:foo bar\\n'",
            ),
            shell_spec(dir_b.path().to_path_buf(), "true"),
        ];

        let (tx, rx) = mpsc::channel();
        let latest = Arc::new(AtomicU64::new(1));
        Session::launch(1, specs, SearchMode::Content, tx, latest);

        let events = drain_until_complete(&rx);
        assert!(matches!(events.first(), Some(SearchEvent::Cleared { id: 1 })));

        let hits: Vec<_> = events
            .iter()
            .filter_map(|event| match event {
                SearchEvent::Hit { hit: Hit::Line(hit), .. } => Some(hit.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].path, dir_a.path().join("x.txt"));
        assert_eq!(hits[0].line_number, 3);
        assert_eq!(hits[0].content, "foo bar");

        assert!(matches!(
            events.last(),
            Some(SearchEvent::Completed { id: 1, total: 1 })
        ));
    }

    #[test]
    fn malformed_lines_are_dropped_but_scan_completes() {
        let dir = tempfile::tempdir().expect("tempdir");
        let specs = vec![shell_spec(
            dir.path().to_path_buf(),
            "printf 'x.txt:notanumber:text\\nx.txt:2:ok\\n'",
        )];

        let (tx, rx) = mpsc::channel();
        let latest = Arc::new(AtomicU64::new(4));
        Session::launch(4, specs, SearchMode::Content, tx, latest);

        let events = drain_until_complete(&rx);
        let hit_count = events
            .iter()
            .filter(|event| matches!(event, SearchEvent::Hit { .. }))
            .count();
        assert_eq!(hit_count, 1);
        assert!(matches!(
            events.last(),
            Some(SearchEvent::Completed { total: 1, .. })
        ));
    }

    #[test]
    fn failed_directory_does_not_abort_siblings() {
        let dir = tempfile::tempdir().expect("tempdir");
        let specs = vec![
            ScanSpec {
                directory: dir.path().to_path_buf(),
                program: "/nonexistent/pounce-test-binary".into(),
                args: Vec::new(),
            },
            shell_spec(dir.path().to_path_buf(), "printf 'ok.txt:1:still here\\n'"),
        ];

        let (tx, rx) = mpsc::channel();
        let latest = Arc::new(AtomicU64::new(2));
        Session::launch(2, specs, SearchMode::Content, tx, latest);

        let events = drain_until_complete(&rx);
        assert!(events
            .iter()
            .any(|event| matches!(event, SearchEvent::ScanFailed { .. })));
        assert!(events
            .iter()
            .any(|event| matches!(event, SearchEvent::Hit { .. })));
        assert!(matches!(
            events.last(),
            Some(SearchEvent::Completed { total: 1, .. })
        ));
    }

    #[test]
    fn completion_fires_exactly_once() {
        let dir = tempfile::tempdir().expect("tempdir");
        let specs = vec![
            shell_spec(dir.path().to_path_buf(), "printf 'a.txt:1:one\\n'"),
            shell_spec(dir.path().to_path_buf(), "printf 'b.txt:2:two\\n'"),
            shell_spec(dir.path().to_path_buf(), "true"),
        ];

        let (tx, rx) = mpsc::channel();
        let latest = Arc::new(AtomicU64::new(9));
        Session::launch(9, specs, SearchMode::Content, tx, latest);

        let events = drain_until_complete(&rx);
        let completions = events
            .iter()
            .filter(|event| matches!(event, SearchEvent::Completed { .. }))
            .count();
        assert_eq!(completions, 1);
        assert!(matches!(
            events.last(),
            Some(SearchEvent::Completed { total: 2, .. })
        ));

        // Nothing trails the completion event.
        assert!(rx.recv_timeout(Duration::from_millis(300)).is_err());
    }

    #[test]
    fn superseded_session_emits_nothing_after_cancellation() {
        let dir = tempfile::tempdir().expect("tempdir");
        let specs = vec![shell_spec(
            dir.path().to_path_buf(),
            "printf 'a.txt:1:first\\n'; sleep 30; printf 'a.txt:2:late\\n'",
        )];

        let (tx, rx) = mpsc::channel();
        let latest = Arc::new(AtomicU64::new(1));
        let session = Session::launch(1, specs, SearchMode::Content, tx, latest.clone());

        // Wait for the first hit so the scan is demonstrably running.
        loop {
            match rx.recv_timeout(Duration::from_secs(5)) {
                Ok(SearchEvent::Hit { .. }) => break,
                Ok(_) => continue,
                Err(err) => panic!("no hit before cancellation: {err}"),
            }
        }

        latest.store(2, AtomicOrdering::Release);
        session.cancel();

        // Neither late hits nor a completion cross the cancellation point.
        assert!(rx.recv_timeout(Duration::from_millis(500)).is_err());
    }
}
