use std::io::Read;
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::sync::atomic::AtomicU64;
use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex};
use std::thread;

use log::{debug, warn};

use super::{MAX_SCAN_OUTPUT, ToolPaths, should_abort};

/// Bytes read from the child's stdout per syscall.
const READ_CHUNK_SIZE: usize = 8192;

/// Cap on how much of the child's stderr is retained for diagnostics.
const STDERR_CAP: u64 = 64 * 1024;

/// Raw events produced by one directory scan.
///
/// `scan` is the index of the originating directory within the session so the
/// aggregator can parse lines against the right base path.
#[derive(Debug)]
pub(crate) enum ScanEvent {
    /// One complete output line, without its terminator.
    Line { scan: usize, raw: String },
    /// The scan reached the end of its output and exited.
    Finished { scan: usize },
    /// The scan could not run to completion.
    Failed { scan: usize, message: String },
}

/// Description of one external search process: program plus discrete argv.
///
/// Arguments are always passed as a vector, never joined into a
/// shell-interpreted string, so query text cannot escape into the command.
#[derive(Debug, Clone)]
pub struct ScanSpec {
    pub directory: PathBuf,
    pub program: PathBuf,
    pub args: Vec<String>,
}

impl ScanSpec {
    /// Build the content-search invocation: `rg -n -i <query> .` rooted at
    /// `directory`.
    #[must_use]
    pub fn content(directory: PathBuf, query: &str, tools: &ToolPaths) -> Self {
        Self {
            directory,
            program: tools.rg.clone(),
            args: vec![
                "-n".to_string(),
                "-i".to_string(),
                query.to_string(),
                ".".to_string(),
            ],
        }
    }

    /// Build the file-search invocation. `--ignore-case` is added only when
    /// the pattern contains no uppercase letter, mirroring smartcase.
    #[must_use]
    pub fn files(directory: PathBuf, pattern: &str, tools: &ToolPaths) -> Self {
        let mut args = Vec::new();
        if !pattern.chars().any(|ch| ch.is_uppercase()) {
            args.push("--ignore-case".to_string());
        }
        args.extend(
            [
                "--type",
                "f",
                "--hidden",
                "--follow",
                "--color",
                "never",
                "--absolute-path",
            ]
            .map(str::to_string),
        );
        args.push(pattern.to_string());
        Self {
            directory,
            program: tools.fd.clone(),
            args,
        }
    }
}

/// Handle for terminating a live scan from outside its reader thread.
///
/// Cloned freely; the underlying child is killed and reaped at most once.
#[derive(Clone)]
pub(crate) struct ScanHandle {
    child: Arc<Mutex<Option<Child>>>,
}

impl ScanHandle {
    fn empty() -> Self {
        Self {
            child: Arc::new(Mutex::new(None)),
        }
    }

    /// Kill and reap the child if it is still running.
    pub(crate) fn terminate(&self) {
        let Ok(mut slot) = self.child.lock() else {
            return;
        };
        if let Some(mut child) = slot.take() {
            if let Err(err) = child.kill() {
                debug!("failed to kill scan process: {err}");
            }
            let _ = child.wait();
        }
    }

    /// Take ownership of the child for reaping, if it has not been terminated.
    fn take(&self) -> Option<Child> {
        self.child.lock().ok().and_then(|mut slot| slot.take())
    }
}

/// Spawn one external scan process and a reader thread that streams its
/// stdout as [`ScanEvent`]s.
///
/// A spawn-level error (missing executable, permission denied) is reported as
/// `Failed` for this scan only; the caller's countdown still advances. The
/// returned handle terminates the process mid-flight; the generation token
/// suppresses any events produced after supersession.
pub(crate) fn spawn_scan(
    scan: usize,
    spec: ScanSpec,
    tx: Sender<ScanEvent>,
    id: u64,
    latest: Arc<AtomicU64>,
) -> ScanHandle {
    let handle = ScanHandle::empty();

    let mut command = Command::new(&spec.program);
    command
        .args(&spec.args)
        .current_dir(&spec.directory)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let mut child = match command.spawn() {
        Ok(child) => child,
        Err(err) => {
            warn!(
                "failed to spawn {} in {}: {err}",
                spec.program.display(),
                spec.directory.display()
            );
            let _ = tx.send(ScanEvent::Failed {
                scan,
                message: format!("failed to start {}: {err}", spec.program.display()),
            });
            return handle;
        }
    };

    // Both pipes were requested above, so the handles are present.
    let stdout = child.stdout.take();
    let stderr = child.stderr.take();
    if let Ok(mut slot) = handle.child.lock() {
        *slot = Some(child);
    }

    let reader_handle = handle.clone();
    thread::spawn(move || {
        read_scan_output(scan, stdout, stderr, &tx, id, &latest, &reader_handle);
    });

    handle
}

fn read_scan_output(
    scan: usize,
    stdout: Option<impl Read>,
    stderr: Option<impl Read>,
    tx: &Sender<ScanEvent>,
    id: u64,
    latest: &AtomicU64,
    handle: &ScanHandle,
) {
    let mut lines = LineBuffer::default();
    let mut chunk = [0u8; READ_CHUNK_SIZE];
    let mut total: u64 = 0;

    if let Some(mut stdout) = stdout {
        loop {
            if should_abort(id, latest) {
                handle.terminate();
                return;
            }

            let read = match stdout.read(&mut chunk) {
                Ok(0) => break,
                Ok(read) => read,
                // A terminated child surfaces here as a broken pipe.
                Err(_) => break,
            };

            total += read as u64;
            if total > MAX_SCAN_OUTPUT {
                handle.terminate();
                let _ = tx.send(ScanEvent::Failed {
                    scan,
                    message: "scan output exceeded the size ceiling".to_string(),
                });
                return;
            }

            for raw in lines.push_chunk(&chunk[..read]) {
                let _ = tx.send(ScanEvent::Line { scan, raw });
            }
        }
    }

    if should_abort(id, latest) {
        handle.terminate();
        return;
    }

    if let Some(raw) = lines.finish() {
        let _ = tx.send(ScanEvent::Line { scan, raw });
    }

    let mut diagnostics = String::new();
    if let Some(stderr) = stderr {
        let _ = stderr.take(STDERR_CAP).read_to_string(&mut diagnostics);
    }

    // A non-zero exit with no output means "no matches" for both rg and fd.
    if let Some(mut child) = handle.take() {
        match child.wait() {
            Ok(status) if !status.success() => {
                debug!("scan exited with {status}: {}", diagnostics.trim_end());
            }
            Ok(_) => {}
            Err(err) => debug!("failed to reap scan process: {err}"),
        }
    }

    let _ = tx.send(ScanEvent::Finished { scan });
}

/// Accumulates raw stdout bytes and yields complete lines.
///
/// The unterminated tail of each chunk is carried into the next call, so
/// arbitrary chunk boundaries (including mid-line and mid-codepoint splits)
/// never duplicate or drop a line.
#[derive(Debug, Default)]
pub(crate) struct LineBuffer {
    partial: Vec<u8>,
}

impl LineBuffer {
    /// Append a chunk and return every line completed by it.
    pub(crate) fn push_chunk(&mut self, chunk: &[u8]) -> Vec<String> {
        self.partial.extend_from_slice(chunk);

        let mut lines = Vec::new();
        let mut start = 0;
        while let Some(offset) = self.partial[start..].iter().position(|&b| b == b'\n') {
            let end = start + offset;
            lines.push(decode_line(&self.partial[start..end]));
            start = end + 1;
        }
        self.partial.drain(..start);
        lines
    }

    /// Flush the trailing unterminated fragment, if any.
    pub(crate) fn finish(self) -> Option<String> {
        if self.partial.is_empty() {
            None
        } else {
            Some(decode_line(&self.partial))
        }
    }
}

fn decode_line(bytes: &[u8]) -> String {
    let bytes = bytes.strip_suffix(b"\r").unwrap_or(bytes);
    String::from_utf8_lossy(bytes).into_owned()
}
