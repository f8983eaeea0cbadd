// Browser session harness
//
// Owns the per-test browser lifecycle: Playwright server, browser, one
// isolated context and one page. Teardown always writes the test's artifacts
// before anything is closed, and always attempts every close.

pub mod artifacts;
pub mod trace;

use crate::config::{BrowserKind, HarnessConfig};
use crate::context::TestContext;
use crate::logging::{self, RunLog};
use crate::pages::BasePage;
use crate::{Error, Result};
use artifacts::{ArtifactPaths, ArtifactReport, TraceDocument};
use futures_util::FutureExt;
use playwright_rs::protocol::{Browser, BrowserContext, Page, Playwright};
use playwright_rs::{BrowserContextOptions, LaunchOptions, ScreenshotOptions, Viewport};
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use trace::{TraceRecorder, millis};
use tracing::Instrument;

/// Chromium flag that hides the `navigator.webdriver` automation hint
const DISABLE_AUTOMATION_FLAG: &str = "--disable-blink-features=AutomationControlled";

const MAXIMIZE_WINDOW_JS: &str =
    "window.moveTo(0, 0); window.resizeTo(screen.availWidth, screen.availHeight);";
const WINDOW_SIZE_JS: &str = "() => ({ width: window.innerWidth, height: window.innerHeight })";

/// How a test ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "message", rename_all = "snake_case")]
pub enum Outcome {
    Passed,
    /// Failed with the scenario's error or panic message
    Failed(String),
}

impl Outcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, Outcome::Failed(_))
    }
}

/// One test's browser, context and page.
///
/// Built by [`BrowserSession::start`] and consumed by
/// [`BrowserSession::finish`]; there is no other way to release it.
pub struct BrowserSession {
    playwright: Playwright,
    browser: Browser,
    context: BrowserContext,
    page: Page,
    trace: TraceRecorder,
    log: Arc<RunLog>,
    config: HarnessConfig,
    base_url: String,
    test_name: String,
    paths: ArtifactPaths,
    started_at_ms: u64,
}

impl BrowserSession {
    /// Launches the configured browser and opens the app under test.
    ///
    /// Fails with [`Error::Config`] when no base URL is configured. If the
    /// initial navigation fails, the session is torn down (artifacts included)
    /// before the error is returned.
    pub async fn start(config: &HarnessConfig, test_name: &str) -> Result<Self> {
        let base_url = config.base_url()?.to_string();
        let log = logging::init(&config.artifacts_dir)?;
        let paths = ArtifactPaths::for_test(&config.artifacts_dir, test_name);
        let started_at_ms = unix_millis();

        tracing::info!(
            browser = ?config.browser,
            headless = config.headless,
            "Starting browser session for {base_url}"
        );

        let playwright = Playwright::launch().await?;
        let browser = match launch_browser(&playwright, config).await {
            Ok(browser) => browser,
            Err(e) => {
                shutdown_quietly(&playwright).await;
                return Err(e);
            }
        };

        let opened = async {
            let context = browser
                .new_context_with_options(context_options(config))
                .await?;
            let page = context.new_page().await?;
            Ok::<_, Error>((context, page))
        }
        .await;
        let (context, page) = match opened {
            Ok(opened) => opened,
            Err(e) => {
                if let Err(close) = browser.close().await {
                    tracing::warn!("Failed to close browser after setup error: {close}");
                }
                shutdown_quietly(&playwright).await;
                return Err(e);
            }
        };

        let session = Self {
            playwright,
            browser,
            context,
            page,
            trace: TraceRecorder::new(),
            log,
            config: config.clone(),
            base_url,
            test_name: test_name.to_string(),
            paths,
            started_at_ms,
        };

        if let Err(e) = session.open_app().await {
            tracing::error!("Browser session setup failed: {e}");
            if let Err(teardown) = session.finish(Outcome::Failed(e.to_string())).await {
                tracing::error!("{teardown}");
            }
            return Err(e);
        }
        Ok(session)
    }

    async fn open_app(&self) -> Result<()> {
        if !self.config.headless {
            self.page.evaluate_expression(MAXIMIZE_WINDOW_JS).await?;
            let size: Viewport = self.page.evaluate::<(), _>(WINDOW_SIZE_JS, None).await?;
            tracing::debug!(width = size.width, height = size.height, "Maximised window");
            self.page.set_viewport_size(size).await?;
        }
        self.page.goto(&self.base_url, None).await?;
        Ok(())
    }

    /// Page objects bound to this session's page.
    pub fn context(&self) -> TestContext {
        let base = BasePage::new(
            self.page.clone(),
            self.config.timeouts.clone(),
            self.trace.clone(),
        );
        TestContext::new(base, &self.base_url, &self.config.completed_marker)
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn trace(&self) -> &TraceRecorder {
        &self.trace
    }

    pub fn paths(&self) -> &ArtifactPaths {
        &self.paths
    }

    pub fn test_name(&self) -> &str {
        &self.test_name
    }

    /// Writes the test's artifacts, then closes context, browser and server.
    ///
    /// Artifact problems end up in [`ArtifactReport::warnings`]. A failed
    /// close is returned as [`Error::Teardown`], but only after every close
    /// has been attempted.
    pub async fn finish(self, outcome: Outcome) -> Result<ArtifactReport> {
        let mut report = ArtifactReport::default();

        let screenshot = if outcome.is_failed() {
            match self.capture_screenshot().await {
                Ok(png) => {
                    tracing::info!("Saved failure screenshot to {}", self.paths.screenshot.display());
                    report.screenshot = Some(self.paths.screenshot.clone());
                    Some(png)
                }
                Err(e) => {
                    tracing::warn!("{e}");
                    report.warnings.push(e.to_string());
                    None
                }
            }
        } else {
            None
        };

        tracing::info!(outcome = ?outcome, "Finishing browser session");
        if !self.log.is_capturing() {
            report.warnings.push(format!(
                "run log {} is not capturing events, the archived log excerpt is empty",
                self.log.path().display()
            ));
        }
        let excerpt = match self.log.excerpt(&self.test_name) {
            Ok(excerpt) => excerpt,
            Err(e) => {
                report.warnings.push(format!("log excerpt unavailable: {e}"));
                String::new()
            }
        };

        let document = TraceDocument {
            test: self.test_name.clone(),
            base_url: self.base_url.clone(),
            browser: browser_name(self.config.browser).to_string(),
            outcome,
            started_at_ms: self.started_at_ms,
            duration_ms: millis(self.trace.elapsed()),
            events: self.trace.events(),
        };
        match artifacts::write_trace_archive(
            &self.paths.trace_archive,
            &document,
            &excerpt,
            screenshot.as_deref(),
        ) {
            Ok(()) => report.trace_archive = Some(self.paths.trace_archive.clone()),
            Err(e) => {
                let e = Error::Artifact(format!(
                    "cannot write trace archive {}: {e}",
                    self.paths.trace_archive.display()
                ));
                tracing::warn!("{e}");
                report.warnings.push(e.to_string());
            }
        }

        let mut failures = Vec::new();
        if let Err(e) = self.context.close().await {
            failures.push(format!("context: {e}"));
        }
        if let Err(e) = self.browser.close().await {
            failures.push(format!("browser: {e}"));
        }
        if let Err(e) = self.playwright.shutdown().await {
            failures.push(format!("playwright server: {e}"));
        }

        if let Err(e) = logging::flush() {
            report.warnings.push(format!("log flush failed: {e}"));
        }

        if failures.is_empty() {
            Ok(report)
        } else {
            Err(Error::Teardown(failures.join("; ")))
        }
    }

    async fn capture_screenshot(&self) -> Result<Vec<u8>> {
        let path = &self.paths.screenshot;
        let capture = async {
            if let Some(dir) = path.parent() {
                std::fs::create_dir_all(dir)?;
            }
            let options = ScreenshotOptions::builder().full_page(true).build();
            Ok::<_, Error>(self.page.screenshot_to_file(path, Some(options)).await?)
        };
        capture.await.map_err(|e| {
            Error::Artifact(format!("cannot capture screenshot {}: {e}", path.display()))
        })
    }
}

impl std::fmt::Debug for BrowserSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BrowserSession")
            .field("test_name", &self.test_name)
            .field("base_url", &self.base_url)
            .field("browser", &self.config.browser)
            .field("paths", &self.paths)
            .finish()
    }
}

/// Runs `scenario` in a fresh browser session named `test_name`.
///
/// The scenario runs inside a `test` span so its log lines can be attributed.
/// Its error or panic becomes the failed outcome; artifacts are written and
/// the session is closed, then the panic is resumed or the error returned.
/// A teardown failure only surfaces when the scenario itself passed.
pub async fn run<F, Fut>(config: &HarnessConfig, test_name: &str, scenario: F) -> Result<()>
where
    F: FnOnce(TestContext) -> Fut,
    Fut: Future<Output = Result<()>>,
{
    config.base_url()?;
    // The subscriber must exist before the span is created or the span is disabled
    logging::init(&config.artifacts_dir)?;
    let span = tracing::info_span!("test", name = %test_name);

    async move {
        let session = BrowserSession::start(config, test_name).await?;
        let result = AssertUnwindSafe(scenario(session.context()))
            .catch_unwind()
            .await;

        let outcome = match &result {
            Ok(Ok(())) => Outcome::Passed,
            Ok(Err(e)) => Outcome::Failed(e.to_string()),
            Err(panic) => Outcome::Failed(panic_message(&**panic)),
        };
        match &outcome {
            Outcome::Passed => tracing::info!("Test passed"),
            Outcome::Failed(message) => tracing::error!("Test failed: {message}"),
        }

        let teardown = session.finish(outcome).await;
        match result {
            Ok(Ok(())) => {
                let report = teardown?;
                for warning in &report.warnings {
                    tracing::warn!("Artifact warning: {warning}");
                }
                Ok(())
            }
            Ok(Err(e)) => {
                if let Err(teardown) = teardown {
                    tracing::error!("{teardown}");
                }
                Err(e)
            }
            Err(panic) => {
                if let Err(teardown) = teardown {
                    tracing::error!("{teardown}");
                }
                std::panic::resume_unwind(panic)
            }
        }
    }
    .instrument(span)
    .await
}

async fn launch_browser(playwright: &Playwright, config: &HarnessConfig) -> Result<Browser> {
    let browser_type = match config.browser {
        BrowserKind::Chromium => playwright.chromium(),
        BrowserKind::Firefox => playwright.firefox(),
        BrowserKind::Webkit => playwright.webkit(),
    };

    let mut options = LaunchOptions::new().headless(config.headless);
    if config.browser == BrowserKind::Chromium {
        options = options.args(vec![DISABLE_AUTOMATION_FLAG.to_string()]);
    }
    Ok(browser_type.launch_with_options(options).await?)
}

fn context_options(config: &HarnessConfig) -> BrowserContextOptions {
    let mut builder = BrowserContextOptions::builder().locale("en-US".to_string());
    if !config.headless {
        // Let the maximised window define the viewport
        builder = builder.no_viewport(true);
    }
    builder.build()
}

async fn shutdown_quietly(playwright: &Playwright) {
    if let Err(e) = playwright.shutdown().await {
        tracing::warn!("Failed to shut down Playwright server: {e}");
    }
}

fn browser_name(kind: BrowserKind) -> &'static str {
    match kind {
        BrowserKind::Chromium => "chromium",
        BrowserKind::Firefox => "firefox",
        BrowserKind::Webkit => "webkit",
    }
}

fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(millis)
        .unwrap_or_default()
}

pub(crate) fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "test panicked".to_string()
    }
}
