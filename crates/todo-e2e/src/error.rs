// Error types for todo-e2e

use std::time::Duration;
use thiserror::Error;

/// Result type alias for page object and harness operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by page objects, the harness and configuration loading.
///
/// Nothing in this crate catches and suppresses these: every failure
/// propagates to the owning test.
#[derive(Debug, Error)]
pub enum Error {
    /// A click target never became actionable within the click timeout
    #[error("Element '{selector}' was not actionable within {timeout:?}")]
    ActionTimeout { selector: String, timeout: Duration },

    /// An element never became visible within the wait timeout
    #[error("Element '{selector}' was not visible within {timeout:?}")]
    VisibilityTimeout { selector: String, timeout: Duration },

    /// An element was visible but never became enabled within the wait timeout
    #[error("Element '{selector}' was visible but not enabled within {timeout:?}")]
    NotClickable { selector: String, timeout: Duration },

    /// An element that must disappear was still visible after the wait timeout
    #[error("Element '{selector}' was still visible after {timeout:?}")]
    StillVisible { selector: String, timeout: Duration },

    /// Scraped text did not have the expected literal shape
    ///
    /// Raised by header parsing. A changed copy string on the target app is a
    /// contract break and must surface, so callers are not expected to handle it.
    #[error("Cannot parse '{text}': {reason}")]
    Parse { text: String, reason: String },

    /// A positional index was outside the currently rendered elements
    #[error("{what} index {index} is out of range ({len} rendered)")]
    IndexOutOfRange {
        what: &'static str,
        index: usize,
        len: usize,
    },

    /// No rendered task has the requested title
    #[error("No task titled '{0}' is rendered")]
    TaskNotFound(String),

    /// Invalid or missing configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// A diagnostic artifact could not be written
    #[error("Artifact error: {0}")]
    Artifact(String),

    /// Closing the context, browser or Playwright server failed
    #[error("Teardown failed: {0}")]
    Teardown(String),

    /// Any other failure reported by the browser automation engine
    #[error("Browser error: {0}")]
    Browser(#[from] playwright_rs::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Config file parse error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Trace archive error
    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
}
