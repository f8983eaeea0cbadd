// Harness configuration
//
// Loaded once per test at harness start: defaults, then an optional TOML file,
// then a dotenv file, then the process environment. Nothing reads
// configuration after that.

use crate::pages::locators;
use crate::{Error, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// Environment variable naming an explicit config file
pub const CONFIG_PATH_ENV: &str = "TODO_E2E_CONFIG";

/// Config file picked up from the working directory when present
pub const DEFAULT_CONFIG_FILE: &str = "todo-e2e.toml";

/// Environment variable naming an explicit dotenv file
pub const ENV_FILE_ENV: &str = "TODO_E2E_ENV_FILE";

/// Dotenv files tried in order when `$TODO_E2E_ENV_FILE` is unset.
///
/// `utils/.env` is where existing suites keep `BASE_URL` and `HEADLESS`.
pub const DEFAULT_ENV_FILES: [&str; 2] = [".env", "utils/.env"];

/// Default root for logs, traces and screenshots
pub const DEFAULT_ARTIFACTS_DIR: &str = "ui_tests-artifacts";

/// Browser engine to launch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrowserKind {
    #[default]
    Chromium,
    Firefox,
    Webkit,
}

impl FromStr for BrowserKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "chromium" | "chrome" => Ok(Self::Chromium),
            "firefox" => Ok(Self::Firefox),
            "webkit" => Ok(Self::Webkit),
            other => Err(Error::Config(format!(
                "unknown browser '{other}' (expected chromium, firefox or webkit)"
            ))),
        }
    }
}

/// Fixed waits shared by every page object.
///
/// Values are in milliseconds so they read naturally in the TOML file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Timeouts {
    /// Actionability wait for non-forced clicks
    pub click_ms: u64,
    /// Visibility / clickability waits
    pub visible_ms: u64,
    /// Delay applied by list composites after a mutation
    pub settle_ms: u64,
    /// Delay before checking the offline-preparation banners
    pub app_ready_ms: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            click_ms: crate::DEFAULT_CLICK_TIMEOUT.as_millis() as u64,
            visible_ms: crate::DEFAULT_VISIBLE_TIMEOUT.as_millis() as u64,
            settle_ms: crate::DEFAULT_SETTLE_DELAY.as_millis() as u64,
            app_ready_ms: crate::DEFAULT_APP_READY_DELAY.as_millis() as u64,
        }
    }
}

impl Timeouts {
    pub fn click(&self) -> Duration {
        Duration::from_millis(self.click_ms)
    }

    pub fn visible(&self) -> Duration {
        Duration::from_millis(self.visible_ms)
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    pub fn app_ready(&self) -> Duration {
        Duration::from_millis(self.app_ready_ms)
    }
}

/// Run configuration consumed by [`BrowserSession`](crate::harness::BrowserSession).
///
/// # Example
///
/// ```toml
/// base_url = "http://localhost:5173"
/// headless = true
/// browser = "chromium"
/// artifacts_dir = "target/ui-artifacts"
///
/// [timeouts]
/// settle_ms = 500
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// URL of the application under test
    pub base_url: Option<String>,
    /// Run the browser without a window
    pub headless: bool,
    /// Browser engine
    pub browser: BrowserKind,
    /// Root directory for run artifacts
    pub artifacts_dir: PathBuf,
    /// Selector for the per-row completion marker.
    ///
    /// The default is a generated style class of the target app and breaks
    /// whenever its CSS build changes. Point this at a semantic attribute as
    /// soon as the app exposes one.
    pub completed_marker: String,
    /// Fixed waits
    pub timeouts: Timeouts,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            headless: false,
            browser: BrowserKind::default(),
            artifacts_dir: PathBuf::from(DEFAULT_ARTIFACTS_DIR),
            completed_marker: locators::todo_list::COMPLETED_MARKER.to_string(),
            timeouts: Timeouts::default(),
        }
    }
}

impl HarnessConfig {
    /// Loads configuration from the config file (if any), a dotenv file (if
    /// any) and the process environment.
    ///
    /// The config file is `$TODO_E2E_CONFIG` when set (it must then exist),
    /// otherwise `todo-e2e.toml` in the working directory when present. The
    /// dotenv file is `$TODO_E2E_ENV_FILE` when set (it must then exist),
    /// otherwise the first of `.env` and `utils/.env` that exists. Process
    /// variables win over dotenv entries.
    pub fn load() -> Result<Self> {
        let file = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => Some(read_config_file(Path::new(&path))?),
            Err(_) => {
                let path = Path::new(DEFAULT_CONFIG_FILE);
                if path.exists() {
                    Some(read_config_file(path)?)
                } else {
                    None
                }
            }
        };

        let dotenv = match std::env::var(ENV_FILE_ENV) {
            Ok(path) => read_env_file(Path::new(&path))?,
            Err(_) => match DEFAULT_ENV_FILES.iter().map(Path::new).find(|p| p.exists()) {
                Some(path) => read_env_file(path)?,
                None => HashMap::new(),
            },
        };

        Self::from_sources(file.as_deref(), |key| {
            std::env::var(key).ok().or_else(|| dotenv.get(key).cloned())
        })
    }

    /// Builds configuration from TOML text and an environment lookup.
    ///
    /// Environment values win over the file.
    pub fn from_sources<F>(file: Option<&str>, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match file {
            Some(text) => toml::from_str(text)?,
            None => Self::default(),
        };
        config.apply_env(env)?;
        Ok(config)
    }

    fn apply_env<F>(&mut self, env: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = env("BASE_URL").filter(|url| !url.trim().is_empty()) {
            self.base_url = Some(url.trim().to_string());
        }
        if let Some(value) = env("HEADLESS") {
            self.headless = parse_flag(&value);
        }
        if let Some(value) = env("BROWSER") {
            self.browser = value.parse()?;
        }
        if let Some(dir) = env("ARTIFACTS_DIR").filter(|dir| !dir.is_empty()) {
            self.artifacts_dir = PathBuf::from(dir);
        }
        if let Some(selector) = env("COMPLETED_MARKER").filter(|s| !s.trim().is_empty()) {
            self.completed_marker = selector;
        }
        Ok(())
    }

    /// Returns the base URL, failing when none was configured.
    pub fn base_url(&self) -> Result<&str> {
        self.base_url.as_deref().ok_or_else(|| {
            Error::Config(format!(
                "BASE_URL is not set (export it or add base_url to {DEFAULT_CONFIG_FILE})"
            ))
        })
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn with_artifacts_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.artifacts_dir = dir.into();
        self
    }

    pub fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    pub fn with_timeouts(mut self, timeouts: Timeouts) -> Self {
        self.timeouts = timeouts;
        self
    }
}

// Only a literal (case-insensitive) "true" enables a flag.
fn parse_flag(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case("true")
}

fn read_config_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("cannot read {}: {e}", path.display())))
}

/// Reads `KEY=value` pairs from a dotenv file without touching the process
/// environment.
fn read_env_file(path: &Path) -> Result<HashMap<String, String>> {
    let invalid = |e: dotenvy::Error| Error::Config(format!("cannot read {}: {e}", path.display()));
    dotenvy::from_path_iter(path)
        .map_err(invalid)?
        .map(|item| item.map_err(invalid))
        .collect()
}
