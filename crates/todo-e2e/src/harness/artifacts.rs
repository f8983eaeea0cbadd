// Per-test artifacts
//
// Layout under the configured artifacts directory:
//
//   logs/test.log           shared run log (see `logging`)
//   traces/<test>.zip       trace.json + log.txt (+ screenshot.png on failure)
//   screenshots/<test>.png  full-page screenshot, failures only

use super::Outcome;
use super::trace::TraceEvent;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;

/// Archive entry holding the serialized [`TraceDocument`]
pub const TRACE_ENTRY: &str = "trace.json";
/// Archive entry holding the test's log excerpt
pub const LOG_ENTRY: &str = "log.txt";
/// Archive entry holding the failure screenshot
pub const SCREENSHOT_ENTRY: &str = "screenshot.png";

/// File locations for one test
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub trace_archive: PathBuf,
    pub screenshot: PathBuf,
}

impl ArtifactPaths {
    pub fn for_test(root: &Path, test_name: &str) -> Self {
        let stem = sanitize_test_name(test_name);
        Self {
            trace_archive: root.join("traces").join(format!("{stem}.zip")),
            screenshot: root.join("screenshots").join(format!("{stem}.png")),
        }
    }
}

/// What teardown produced for one test
#[derive(Debug, Clone, Default)]
pub struct ArtifactReport {
    /// Trace archive, if it could be written
    pub trace_archive: Option<PathBuf>,
    /// Failure screenshot, if the test failed and capture succeeded
    pub screenshot: Option<PathBuf>,
    /// Artifact failures that did not block teardown
    pub warnings: Vec<String>,
}

/// Structured content of `trace.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceDocument {
    pub test: String,
    pub base_url: String,
    pub browser: String,
    pub outcome: Outcome,
    /// Wall-clock start of the session, Unix epoch milliseconds
    pub started_at_ms: u64,
    pub duration_ms: u64,
    pub events: Vec<TraceEvent>,
}

/// Keeps `[A-Za-z0-9_-]`, replaces everything else with `_`.
pub fn sanitize_test_name(name: &str) -> String {
    let stem: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if stem.is_empty() {
        "test".to_string()
    } else {
        stem
    }
}

/// Writes the trace archive for one test, replacing any previous one.
pub fn write_trace_archive(
    path: &Path,
    document: &TraceDocument,
    log_excerpt: &str,
    screenshot: Option<&[u8]>,
) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let options =
        SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);
    let mut zip = zip::ZipWriter::new(File::create(path)?);

    zip.start_file(TRACE_ENTRY, options)?;
    zip.write_all(&serde_json::to_vec_pretty(document)?)?;

    zip.start_file(LOG_ENTRY, options)?;
    zip.write_all(log_excerpt.as_bytes())?;

    if let Some(png) = screenshot {
        // PNG data is already compressed
        let stored = options.compression_method(zip::CompressionMethod::Stored);
        zip.start_file(SCREENSHOT_ENTRY, stored)?;
        zip.write_all(png)?;
    }

    zip.finish()?;
    Ok(())
}

/// Contents of a trace archive, as read back for inspection
#[derive(Debug, Clone)]
pub struct TraceArchive {
    pub document: TraceDocument,
    pub log_excerpt: String,
    pub screenshot: Option<Vec<u8>>,
}

/// Reads a trace archive written by [`write_trace_archive`].
pub fn read_trace_archive(path: &Path) -> Result<TraceArchive> {
    let mut zip = zip::ZipArchive::new(File::open(path)?)?;

    let mut json = String::new();
    zip.by_name(TRACE_ENTRY)?.read_to_string(&mut json)?;
    let document = serde_json::from_str(&json)?;

    let mut log_excerpt = String::new();
    zip.by_name(LOG_ENTRY)?.read_to_string(&mut log_excerpt)?;

    let screenshot = match zip.by_name(SCREENSHOT_ENTRY) {
        Ok(mut entry) => {
            let mut bytes = Vec::new();
            entry.read_to_end(&mut bytes)?;
            Some(bytes)
        }
        Err(zip::result::ZipError::FileNotFound) => None,
        Err(e) => return Err(e.into()),
    };

    Ok(TraceArchive {
        document,
        log_excerpt,
        screenshot,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::harness::trace::EventKind;

    fn document(outcome: Outcome) -> TraceDocument {
        TraceDocument {
            test: "delete_task".to_string(),
            base_url: "http://127.0.0.1:3000".to_string(),
            browser: "chromium".to_string(),
            outcome,
            started_at_ms: 1_700_000_000_000,
            duration_ms: 1234,
            events: vec![TraceEvent {
                seq: 0,
                kind: EventKind::Action,
                name: "click".to_string(),
                selector: Some("[aria-label='Task Menu']".to_string()),
                depth: 1,
                offset_ms: 10,
                duration_ms: 25,
                error: None,
            }],
        }
    }

    #[test]
    fn test_sanitize_test_name() {
        assert_eq!(sanitize_test_name("add_task-Buy milk"), "add_task-Buy_milk");
        assert_eq!(sanitize_test_name("a/b\\c:d"), "a_b_c_d");
        assert_eq!(sanitize_test_name(""), "test");
    }

    #[test]
    fn test_paths_share_one_stem() {
        let paths = ArtifactPaths::for_test(Path::new("out"), "mark complete");
        assert_eq!(paths.trace_archive, PathBuf::from("out/traces/mark_complete.zip"));
        assert_eq!(paths.screenshot, PathBuf::from("out/screenshots/mark_complete.png"));
    }

    #[test]
    fn test_failed_archive_carries_screenshot_and_log() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("traces").join("delete_task.zip");
        let doc = document(Outcome::Failed("Task was not deleted".to_string()));
        let png = [0x89, b'P', b'N', b'G'];

        write_trace_archive(&path, &doc, "INFO test{name=delete_task}: Deleting\n", Some(&png))
            .unwrap();

        let archive = read_trace_archive(&path).unwrap();
        assert_eq!(archive.document, doc);
        assert!(archive.log_excerpt.contains("Deleting"));
        assert_eq!(archive.screenshot.as_deref(), Some(&png[..]));
    }

    #[test]
    fn test_passed_archive_has_no_screenshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.zip");

        write_trace_archive(&path, &document(Outcome::Passed), "", None).unwrap();

        let archive = read_trace_archive(&path).unwrap();
        assert_eq!(archive.document.outcome, Outcome::Passed);
        assert!(archive.screenshot.is_none());
        assert!(archive.log_excerpt.is_empty());
    }
}
