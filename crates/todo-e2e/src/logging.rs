// Run log
//
// One plain-text log file per process run, shared by every test. Each test
// executes inside a `test{name=...}` span, so its own lines can be pulled back
// out of the shared file and attached to that test's trace archive.
//
// Initialisation is explicit: the harness calls `init` when a session starts.
// Nothing is installed at load time.

use crate::Result;
use parking_lot::Mutex;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

/// File name of the shared log under `<artifacts>/logs/`
pub const LOG_FILE_NAME: &str = "test.log";

/// Name of the span every test runs inside
pub const TEST_SPAN_NAME: &str = "test";

static RUN_LOG: Mutex<Option<Arc<RunLog>>> = Mutex::new(None);

/// Handle to the shared log file of this run.
#[derive(Debug)]
pub struct RunLog {
    path: PathBuf,
    file: Arc<File>,
    capturing: bool,
}

/// Installs the global subscriber and opens (truncating) the run log.
///
/// Only the first call does any work; later calls return the same handle,
/// even if they pass a different artifacts directory.
pub fn init(artifacts_dir: &Path) -> Result<Arc<RunLog>> {
    let mut slot = RUN_LOG.lock();
    if let Some(log) = slot.as_ref() {
        return Ok(Arc::clone(log));
    }

    let dir = artifacts_dir.join("logs");
    std::fs::create_dir_all(&dir)?;
    let path = dir.join(LOG_FILE_NAME);
    let file = Arc::new(File::create(&path)?);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let file_layer = fmt::layer()
        .with_writer(Arc::clone(&file))
        .with_ansi(false)
        .with_target(false);
    let console_layer = fmt::layer().with_test_writer().with_target(false);

    // A subscriber installed by the host binary keeps the global slot; the
    // log file still exists so archives stay well-formed, but stays empty.
    let capturing = match tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(console_layer)
        .try_init()
    {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(path = %path.display(), "Run log is not capturing events: {e}");
            eprintln!("todo-e2e: run log {} is not capturing events: {e}", path.display());
            false
        }
    };

    let log = Arc::new(RunLog {
        path,
        file,
        capturing,
    });
    *slot = Some(Arc::clone(&log));
    tracing::debug!(path = %log.path.display(), "Run log initialised");
    Ok(log)
}

/// Flushes the run log, if one was initialised.
pub fn flush() -> Result<()> {
    let log = RUN_LOG.lock().clone();
    match log {
        Some(log) => log.flush(),
        None => Ok(()),
    }
}

impl RunLog {
    /// Path of the shared log file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether this crate's subscriber receives events.
    ///
    /// False when another global subscriber was installed first; excerpts
    /// are then always empty.
    pub fn is_capturing(&self) -> bool {
        self.capturing
    }

    pub fn flush(&self) -> Result<()> {
        (&*self.file).flush()?;
        Ok(())
    }

    /// Returns the lines logged inside the span of `test_name`.
    pub fn excerpt(&self, test_name: &str) -> Result<String> {
        self.flush()?;
        let contents = std::fs::read_to_string(&self.path)?;
        Ok(filter_test_lines(&contents, test_name))
    }
}

/// The span prefix the fmt layer writes for lines of `test_name`.
pub fn span_marker(test_name: &str) -> String {
    format!("{TEST_SPAN_NAME}{{name={test_name}}}")
}

fn filter_test_lines(contents: &str, test_name: &str) -> String {
    let marker = span_marker(test_name);
    let mut excerpt = String::new();
    for line in contents.lines().filter(|line| line.contains(&marker)) {
        excerpt.push_str(line);
        excerpt.push('\n');
    }
    excerpt
}
