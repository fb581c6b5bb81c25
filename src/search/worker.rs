use std::sync::atomic::AtomicU64;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread;

use log::debug;

use super::commands::{SearchCommand, SearchEvent};
use super::process::ScanSpec;
use super::session::Session;
use super::{SearchMode, SearchRequest, ToolPaths};

/// Launches the background search worker thread and returns its command
/// channel, event channel, and the shared generation counter.
pub fn spawn(tools: ToolPaths) -> (Sender<SearchCommand>, Receiver<SearchEvent>, Arc<AtomicU64>) {
    let (command_tx, command_rx) = mpsc::channel();
    let (event_tx, event_rx) = mpsc::channel();
    let latest_query_id = Arc::new(AtomicU64::new(0));
    let thread_latest = Arc::clone(&latest_query_id);

    thread::spawn(move || worker_loop(&tools, command_rx, event_tx, thread_latest));

    (command_tx, event_rx, latest_query_id)
}

fn worker_loop(
    tools: &ToolPaths,
    command_rx: Receiver<SearchCommand>,
    event_tx: Sender<SearchEvent>,
    latest_query_id: Arc<AtomicU64>,
) {
    let mut active: Option<Session> = None;
    while let Ok(command) = command_rx.recv() {
        if !handle_command(tools, &event_tx, &latest_query_id, &mut active, command) {
            break;
        }
    }
    if let Some(session) = active {
        session.cancel();
    }
}

fn handle_command(
    tools: &ToolPaths,
    event_tx: &Sender<SearchEvent>,
    latest_query_id: &Arc<AtomicU64>,
    active: &mut Option<Session>,
    command: SearchCommand,
) -> bool {
    match command {
        SearchCommand::Search { id, request } => {
            if let Some(previous) = active.take() {
                previous.cancel();
            }

            if request.is_blank() {
                // Nothing to scan; clear stale results and complete at once.
                let _ = event_tx.send(SearchEvent::Cleared { id });
                let _ = event_tx.send(SearchEvent::Completed { id, total: 0 });
                return true;
            }

            debug!(
                "starting generation {id}: {:?} across {} directories",
                request.query,
                request.directories.len()
            );
            *active = Some(Session::launch(
                id,
                build_specs(&request, tools),
                request.mode,
                event_tx.clone(),
                Arc::clone(latest_query_id),
            ));
            true
        }
        SearchCommand::Shutdown => false,
    }
}

fn build_specs(request: &SearchRequest, tools: &ToolPaths) -> Vec<ScanSpec> {
    request
        .directories
        .iter()
        .map(|directory| match request.mode {
            SearchMode::Content => {
                ScanSpec::content(directory.clone(), &request.query, tools)
            }
            SearchMode::Files => ScanSpec::files(directory.clone(), &request.query, tools),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn shutdown_command_stops_worker() {
        let (tx, _rx, latest) = spawn(ToolPaths::default());
        assert_eq!(latest.load(std::sync::atomic::Ordering::Relaxed), 0);
        tx.send(SearchCommand::Shutdown).unwrap();
    }

    #[test]
    fn blank_query_completes_without_spawning() {
        let (tx, rx, latest) = spawn(ToolPaths::default());
        latest.store(1, std::sync::atomic::Ordering::Release);
        tx.send(SearchCommand::Search {
            id: 1,
            request: SearchRequest::new("   ", vec!["/tmp".into()], SearchMode::Content),
        })
        .unwrap();

        assert!(matches!(
            rx.recv_timeout(Duration::from_secs(5)),
            Ok(SearchEvent::Cleared { id: 1 })
        ));
        assert!(matches!(
            rx.recv_timeout(Duration::from_secs(5)),
            Ok(SearchEvent::Completed { id: 1, total: 0 })
        ));
    }

    #[test]
    fn build_specs_covers_every_directory() {
        let request = SearchRequest::new(
            "query",
            vec!["/a".into(), "/b".into()],
            SearchMode::Content,
        );
        let specs = build_specs(&request, &ToolPaths::default());
        assert_eq!(specs.len(), 2);
        assert_eq!(specs[0].directory, std::path::Path::new("/a"));
        assert_eq!(specs[1].directory, std::path::Path::new("/b"));
    }
}
