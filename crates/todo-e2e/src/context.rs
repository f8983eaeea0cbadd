// Test context
//
// Everything a scenario touches, built once per test by the harness.

use crate::Result;
use crate::harness::trace::TraceRecorder;
use crate::pages::{AddTaskPage, BasePage, EditTaskPage, TodoListPage};
use playwright_rs::protocol::Page;
use std::future::Future;

/// One page object per screen plus the raw page, all bound to the same
/// browser page.
#[derive(Debug, Clone)]
pub struct TestContext {
    pub page: Page,
    pub base_url: String,
    pub todo_list: TodoListPage,
    pub add_task: AddTaskPage,
    pub edit_task: EditTaskPage,
    trace: TraceRecorder,
}

impl TestContext {
    pub fn new(base: BasePage, base_url: impl Into<String>, completed_marker: &str) -> Self {
        Self {
            page: base.page().clone(),
            base_url: base_url.into(),
            trace: base.trace().clone(),
            todo_list: TodoListPage::new(base.clone(), completed_marker),
            add_task: AddTaskPage::new(base.clone()),
            edit_task: EditTaskPage::new(base),
        }
    }

    /// Runs a scenario-level step, recorded in the trace like page object steps.
    pub async fn step<T, F>(&self, name: impl Into<String>, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        self.trace.step(name, fut).await
    }

    /// Waits until the app's offline-preparation banners are gone.
    pub async fn wait_for_app_ready(&self) -> Result<()> {
        self.todo_list.base().wait_for_app_ready().await
    }

    /// Time from navigation start to the end of the load event, in milliseconds.
    pub async fn page_load_time_ms(&self) -> Result<f64> {
        let elapsed: f64 = self
            .page
            .evaluate::<(), f64>(
                "() => performance.timing.loadEventEnd - performance.timing.navigationStart",
                None,
            )
            .await?;
        tracing::info!("Page load time: {elapsed} ms");
        Ok(elapsed)
    }
}
