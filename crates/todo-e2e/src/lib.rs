//! todo-e2e: page objects and a browser session harness for the Todo web app
//!
//! The crate wraps raw element lookups behind intention-revealing page
//! operations and owns the per-test browser lifecycle, including artifact
//! capture (trace archive, failure screenshot, log excerpt).
//!
//! # Configuration
//!
//! [`HarnessConfig::load`] layers defaults, `todo-e2e.toml`, a dotenv file
//! and the process environment. Suites that keep `BASE_URL` and `HEADLESS`
//! in `utils/.env` work unchanged; `.env` in the working directory is tried
//! first.
//!
//! # Examples
//!
//! ## Running a scenario through the harness
//!
//! ```ignore
//! use todo_e2e::{HarnessConfig, harness};
//!
//! #[tokio::test]
//! async fn add_task() -> todo_e2e::Result<()> {
//!     let config = HarnessConfig::load()?;
//!     harness::run(&config, "add_task", |ctx| async move {
//!         ctx.todo_list.add_task("Buy milk").await?;
//!         let tasks = ctx.todo_list.get_tasks().await?;
//!         assert!(tasks.contains(&"Buy milk".to_string()));
//!         Ok(())
//!     })
//!     .await
//! }
//! ```
//!
//! ## Driving a session by hand
//!
//! ```ignore
//! use todo_e2e::{HarnessConfig, harness::{BrowserSession, Outcome}};
//!
//! let config = HarnessConfig::load()?.with_base_url("http://localhost:5173");
//! let session = BrowserSession::start(&config, "manual").await?;
//! let ctx = session.context();
//! ctx.todo_list.add_task("Remove me").await?;
//! ctx.todo_list.delete_task(0).await?;
//! let report = session.finish(Outcome::Passed).await?;
//! if let Some(archive) = report.trace_archive {
//!     println!("trace archive: {}", archive.display());
//! }
//! ```

pub mod config;
pub mod context;
mod error;
pub mod harness;
pub mod logging;
pub mod pages;

use std::time::Duration;

/// How long a non-forced click waits for actionability.
pub const DEFAULT_CLICK_TIMEOUT: Duration = Duration::from_millis(1000);

/// How long visibility and readiness waits poll before failing.
pub const DEFAULT_VISIBLE_TIMEOUT: Duration = Duration::from_millis(5000);

/// Fixed delay the list page applies after a mutation to let the UI re-render.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(1000);

/// Fixed delay before checking that the offline-preparation banners are gone.
pub const DEFAULT_APP_READY_DELAY: Duration = Duration::from_millis(3000);

pub use config::{BrowserKind, HarnessConfig, Timeouts};
pub use context::TestContext;
pub use error::{Error, Result};
pub use pages::{AddTaskPage, BasePage, EditTaskPage, TaskRef, TodoListPage};
