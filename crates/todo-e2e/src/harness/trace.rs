// Trace recorder
//
// Timeline of what one test did: named steps (scenario and page object
// workflows) and the browser actions underneath them. The harness serializes
// it into the test's trace archive at teardown.

use super::panic_message;
use crate::{Error, Result};
use futures_util::FutureExt;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use tracing::Instrument;

/// What a trace event describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// A named workflow step, possibly containing other steps and actions
    Step,
    /// A single primitive browser interaction
    Action,
}

/// One completed step or action.
///
/// Events are appended when they finish, so a step appears after everything
/// it contains. `depth` restores the nesting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceEvent {
    pub seq: usize,
    pub kind: EventKind,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selector: Option<String>,
    pub depth: usize,
    /// Start, relative to the recorder's creation
    pub offset_ms: u64,
    pub duration_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Shared, cheaply clonable recorder for one test.
#[derive(Clone)]
pub struct TraceRecorder {
    inner: Arc<RecorderInner>,
}

struct RecorderInner {
    started: Instant,
    depth: AtomicUsize,
    events: Mutex<Vec<TraceEvent>>,
}

impl Default for TraceRecorder {
    fn default() -> Self {
        Self::new()
    }
}

impl TraceRecorder {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RecorderInner {
                started: Instant::now(),
                depth: AtomicUsize::new(0),
                events: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Runs `fut` as a named step.
    ///
    /// The step is logged, wrapped in a `step` span and recorded with its
    /// outcome. Errors pass through untouched. A panic (a failed assertion)
    /// is recorded as the step's error and then resumed.
    pub async fn step<T, F>(&self, name: impl Into<String>, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        let name = name.into();
        let span = tracing::info_span!("step", name = %name);
        let guard = DepthGuard::enter(&self.inner.depth);
        let start = Instant::now();

        let outcome = AssertUnwindSafe(
            async {
                tracing::info!("{name}");
                fut.await
            }
            .instrument(span),
        )
        .catch_unwind()
        .await;

        let depth = guard.level;
        drop(guard);
        match outcome {
            Ok(result) => {
                if let Err(e) = &result {
                    tracing::warn!(step = %name, error = %e, "Step failed");
                }
                let error = result.as_ref().err().map(ToString::to_string);
                self.push(EventKind::Step, name, None, depth, start, error);
                result
            }
            Err(panic) => {
                let error = format!("panicked: {}", panic_message(&*panic));
                tracing::error!(step = %name, "Step {error}");
                self.push(EventKind::Step, name, None, depth, start, Some(error));
                std::panic::resume_unwind(panic)
            }
        }
    }

    /// Records a primitive action that started at `start`.
    pub(crate) fn record_action(
        &self,
        name: &str,
        selector: &str,
        start: Instant,
        error: Option<&Error>,
    ) {
        let depth = self.inner.depth.load(Ordering::SeqCst);
        self.push(
            EventKind::Action,
            name.to_string(),
            Some(selector.to_string()),
            depth,
            start,
            error.map(ToString::to_string),
        );
    }

    fn push(
        &self,
        kind: EventKind,
        name: String,
        selector: Option<String>,
        depth: usize,
        start: Instant,
        error: Option<String>,
    ) {
        let offset = start.saturating_duration_since(self.inner.started);
        let mut events = self.inner.events.lock();
        let seq = events.len();
        events.push(TraceEvent {
            seq,
            kind,
            name,
            selector,
            depth,
            offset_ms: millis(offset),
            duration_ms: millis(start.elapsed()),
            error,
        });
    }

    /// Snapshot of every event recorded so far
    pub fn events(&self) -> Vec<TraceEvent> {
        self.inner.events.lock().clone()
    }

    /// Time since the recorder was created
    pub fn elapsed(&self) -> Duration {
        self.inner.started.elapsed()
    }
}

/// Nesting level held by a running step.
///
/// Released on drop, so a step that unwinds or is dropped mid-flight never
/// leaves later events one level too deep.
struct DepthGuard<'a> {
    counter: &'a AtomicUsize,
    level: usize,
}

impl<'a> DepthGuard<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        let level = counter.fetch_add(1, Ordering::SeqCst);
        Self { counter, level }
    }
}

impl Drop for DepthGuard<'_> {
    fn drop(&mut self) {
        self.counter.fetch_sub(1, Ordering::SeqCst);
    }
}

impl std::fmt::Debug for TraceRecorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TraceRecorder")
            .field("events", &self.inner.events.lock().len())
            .finish()
    }
}

pub(crate) fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
