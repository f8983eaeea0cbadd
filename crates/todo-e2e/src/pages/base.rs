// Base page capability
//
// The only place that acts on playwright-rs locators. Page objects build and
// chain locators, then drive them through these primitives so every one of
// them gets the same timeouts and the same failure classification.

use crate::config::Timeouts;
use crate::harness::trace::TraceRecorder;
use crate::pages::locators;
use crate::{Error, Result};
use playwright_rs::protocol::{ClickOptions, Locator, Page};
use playwright_rs::expect;
use std::future::Future;
use std::time::{Duration, Instant};

/// Low-level interaction primitives shared by all page objects.
///
/// Selectors are resolved against the live page on every call; nothing is
/// cached between operations.
#[derive(Clone)]
pub struct BasePage {
    page: Page,
    timeouts: Timeouts,
    trace: TraceRecorder,
}

impl BasePage {
    pub fn new(page: Page, timeouts: Timeouts, trace: TraceRecorder) -> Self {
        Self {
            page,
            timeouts,
            trace,
        }
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn timeouts(&self) -> &Timeouts {
        &self.timeouts
    }

    pub fn trace(&self) -> &TraceRecorder {
        &self.trace
    }

    /// Resolves `selector` against the current page.
    ///
    /// The returned locator is lazy: it is matched again on every action.
    pub async fn locator(&self, selector: &str) -> Locator {
        self.page.locator(selector).await
    }

    /// Runs `fut` as a named, traced step.
    pub async fn step<T, F>(&self, name: impl Into<String>, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        self.trace.step(name, fut).await
    }

    /// Clicks `target`.
    ///
    /// Waits up to the click timeout for actionability. `force` skips the
    /// actionability checks entirely; only use it where the target app is
    /// known to report a false negative (e.g. a transient overlay).
    pub async fn click(&self, target: &Locator, force: bool) -> Result<()> {
        let start = Instant::now();
        let timeout = self.timeouts.click();
        let options = ClickOptions::builder()
            .force(force)
            .timeout(timeout.as_millis() as f64)
            .build();

        let result = target
            .click(Some(options))
            .await
            .map_err(|e| classify_action_error(e, target.selector(), timeout));

        let name = if force { "force_click" } else { "click" };
        self.trace
            .record_action(name, target.selector(), start, result.as_ref().err());
        result
    }

    /// Clears the field `target` and types `text` into it.
    pub async fn fill(&self, target: &Locator, text: &str) -> Result<()> {
        let start = Instant::now();
        let result = target.fill(text, None).await.map_err(Error::from);
        self.trace
            .record_action("fill", target.selector(), start, result.as_ref().err());
        result
    }

    /// Returns the rendered inner text of `target`.
    pub async fn get_text(&self, target: &Locator) -> Result<String> {
        let start = Instant::now();
        let result = target.inner_text().await.map_err(Error::from);
        self.trace
            .record_action("get_text", target.selector(), start, result.as_ref().err());
        result
    }

    /// Waits until `target` is visible.
    pub async fn wait_for_visible(&self, target: &Locator, timeout: Duration) -> Result<()> {
        let start = Instant::now();
        let result = visible_within(target, timeout).await;
        self.trace
            .record_action("wait_for_visible", target.selector(), start, result.as_ref().err());
        result
    }

    /// Waits until `target` is visible and enabled.
    pub async fn wait_for_clickable(&self, target: &Locator, timeout: Duration) -> Result<()> {
        let start = Instant::now();
        let result = async {
            visible_within(target, timeout).await?;
            expect(target.clone())
                .with_timeout(timeout)
                .to_be_enabled()
                .await
                .map_err(|e| match e {
                    playwright_rs::Error::AssertionTimeout(_) => Error::NotClickable {
                        selector: target.selector().to_string(),
                        timeout,
                    },
                    other => Error::Browser(other),
                })
        }
        .await;
        self.trace
            .record_action("wait_for_clickable", target.selector(), start, result.as_ref().err());
        result
    }

    /// Visibility wait with the configured default timeout
    pub async fn wait_for_visible_default(&self, target: &Locator) -> Result<()> {
        self.wait_for_visible(target, self.timeouts.visible()).await
    }

    /// Clickability wait with the configured default timeout
    pub async fn wait_for_clickable_default(&self, target: &Locator) -> Result<()> {
        self.wait_for_clickable(target, self.timeouts.visible()).await
    }

    /// Waits until nothing matched by `target` is visible.
    pub async fn wait_for_hidden(&self, target: &Locator, timeout: Duration) -> Result<()> {
        let start = Instant::now();
        let result = expect(target.clone())
            .with_timeout(timeout)
            .to_be_hidden()
            .await
            .map_err(|e| match e {
                playwright_rs::Error::AssertionTimeout(_) => Error::StillVisible {
                    selector: target.selector().to_string(),
                    timeout,
                },
                other => Error::Browser(other),
            });
        self.trace
            .record_action("wait_for_hidden", target.selector(), start, result.as_ref().err());
        result
    }

    /// Waits out the app's offline-preparation banners.
    ///
    /// The app shows two transient banners while its service worker installs;
    /// they can cover controls. After a fixed delay both must be gone.
    pub async fn wait_for_app_ready(&self) -> Result<()> {
        tokio::time::sleep(self.timeouts.app_ready()).await;
        for banner in [
            locators::app::PREPARING_OFFLINE_BANNER,
            locators::app::READY_OFFLINE_BANNER,
        ] {
            let banner = self.locator(banner).await;
            self.wait_for_hidden(&banner, self.timeouts.visible()).await?;
        }
        Ok(())
    }

    /// Fixed delay that lets the UI re-render after a mutation.
    pub async fn settle(&self) {
        tokio::time::sleep(self.timeouts.settle()).await;
    }

    /// Number of elements currently matched by `target`.
    pub async fn count(&self, target: &Locator) -> Result<usize> {
        Ok(target.count().await?)
    }
}

async fn visible_within(target: &Locator, timeout: Duration) -> Result<()> {
    expect(target.clone())
        .with_timeout(timeout)
        .to_be_visible()
        .await
        .map_err(|e| match e {
            playwright_rs::Error::AssertionTimeout(_) => Error::VisibilityTimeout {
                selector: target.selector().to_string(),
                timeout,
            },
            other => Error::Browser(other),
        })
}

/// Picks the `index`-th match of `rows` (0-based).
pub(crate) fn nth(rows: &Locator, index: usize) -> Locator {
    rows.nth(i32::try_from(index).unwrap_or(i32::MAX))
}

impl std::fmt::Debug for BasePage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BasePage")
            .field("url", &self.page.url())
            .field("timeouts", &self.timeouts)
            .finish()
    }
}

/// Maps an engine timeout on an action to `Error::ActionTimeout`.
///
/// The Playwright server reports action timeouts as protocol errors whose
/// message reads "Timeout <n>ms exceeded".
fn classify_action_error(error: playwright_rs::Error, selector: &str, timeout: Duration) -> Error {
    let timed_out = match &error {
        playwright_rs::Error::Timeout(_) => true,
        playwright_rs::Error::ProtocolError(msg) => is_timeout_message(msg),
        _ => false,
    };

    if timed_out {
        Error::ActionTimeout {
            selector: selector.to_string(),
            timeout,
        }
    } else {
        Error::Browser(error)
    }
}

fn is_timeout_message(message: &str) -> bool {
    message.contains("Timeout") && message.contains("exceeded")
}
