// TodoList page object
//
// The main screen: task rows, their per-row menu, the completion header and
// the Add Task entry point.

use super::add_task::AddTaskPage;
use super::base::{BasePage, nth};
use super::locators::todo_list as loc;
use super::TaskRef;
use crate::{Error, Result};
use playwright_rs::protocol::Locator;

/// Workflows on the task list.
#[derive(Debug, Clone)]
pub struct TodoListPage {
    base: BasePage,
    completed_marker: String,
}

impl TodoListPage {
    /// `completed_marker` is the selector, relative to a row, whose presence
    /// marks that row as completed.
    pub fn new(base: BasePage, completed_marker: impl Into<String>) -> Self {
        Self {
            base,
            completed_marker: completed_marker.into(),
        }
    }

    pub fn base(&self) -> &BasePage {
        &self.base
    }

    /// Force-clicks Add Task and hands back the create-task form.
    pub async fn open_add_task_screen(&self) -> Result<AddTaskPage> {
        self.base
            .step("Navigate to Add Task screen", async {
                let add = self.base.locator(loc::ADD_TASK_BUTTON).await;
                self.base.click(&add, true).await?;
                Ok(AddTaskPage::new(self.base.clone()))
            })
            .await
    }

    /// Creates a task through the form and lets the list re-render.
    pub async fn add_task(&self, name: &str) -> Result<()> {
        self.base
            .step(format!("Add task through /add screen: {name}"), async {
                let form = self.open_add_task_screen().await?;
                form.submit_task(name).await?;
                self.base.settle().await;
                Ok(())
            })
            .await
    }

    pub async fn wait_for_add_task_button(&self) -> Result<()> {
        self.base
            .step("Wait for add task button to be visible", async {
                self.base.settle().await;
                let add = self.base.locator(loc::ADD_TASK_BUTTON).await;
                self.base.wait_for_clickable_default(&add).await
            })
            .await
    }

    /// Titles of all rendered tasks, in DOM order.
    pub async fn get_tasks(&self) -> Result<Vec<String>> {
        self.base
            .step("Get current task titles", async {
                self.all_texts(loc::TASK_TITLE).await
            })
            .await
    }

    /// Timestamp lines of all rendered tasks, in DOM order.
    pub async fn get_timestamps(&self) -> Result<Vec<String>> {
        self.base
            .step("Get task timestamps", async {
                self.all_texts(loc::TASK_TIMESTAMP).await
            })
            .await
    }

    /// Current position of the first task titled exactly `title`.
    pub async fn position_of(&self, title: &str) -> Result<Option<usize>> {
        let tasks = self.get_tasks().await?;
        Ok(tasks.iter().position(|t| t == title))
    }

    /// Types `query` into the search box and lets the list filter.
    pub async fn search(&self, query: &str) -> Result<()> {
        self.base
            .step(format!("Search tasks for: {query}"), async {
                let search = self.base.locator(loc::SEARCH_INPUT).await;
                self.base.fill(&search, query).await?;
                self.base.settle().await;
                Ok(())
            })
            .await
    }

    pub async fn mark_complete(&self, task: impl Into<TaskRef>) -> Result<()> {
        let task = task.into();
        self.base
            .step(format!("Mark task {task} as complete"), async {
                let index = self.resolve(&task).await?;
                self.base.wait_for_visible_default(&self.row(index).await).await?;
                self.open_row_menu(index).await?;
                self.click(loc::MARK_AS_DONE_MENU_ITEM).await?;
                self.base.settle().await;
                Ok(())
            })
            .await
    }

    /// Deletes a task through its menu and the confirmation dialog.
    pub async fn delete_task(&self, task: impl Into<TaskRef>) -> Result<()> {
        let task = task.into();
        self.base
            .step(format!("Delete task {task}"), async {
                let index = self.resolve(&task).await?;
                self.open_row_menu(index).await?;
                self.click(loc::DELETE_MENU_ITEM).await?;
                self.click(loc::CONFIRM_DELETE_BUTTON).await?;
                self.base.settle().await;
                Ok(())
            })
            .await
    }

    /// Renames a task through its menu's Edit entry.
    pub async fn edit_task(&self, task: impl Into<TaskRef>, new_name: &str) -> Result<()> {
        let task = task.into();
        self.base
            .step(format!("Edit task {task} to '{new_name}'"), async {
                let index = self.resolve(&task).await?;
                self.open_row_menu(index).await?;
                self.click(loc::EDIT_MENU_ITEM).await?;
                let input = self.base.locator(loc::EDIT_INPUT).await;
                self.base.fill(&input, new_name).await?;
                self.click(loc::SAVE_BUTTON).await?;
                self.base.settle().await;
                Ok(())
            })
            .await
    }

    /// Opens the row menu of `task` and picks Edit, leaving the dialog open.
    ///
    /// Hand over to [`EditTaskPage`](super::EditTaskPage) for the dialog itself.
    pub async fn open_edit_dialog(&self, task: impl Into<TaskRef>) -> Result<()> {
        let task = task.into();
        self.base
            .step(format!("Open edit dialog for task {task}"), async {
                let index = self.resolve(&task).await?;
                self.open_row_menu(index).await?;
                self.click(loc::EDIT_MENU_ITEM).await
            })
            .await
    }

    /// Completed count as stated by the list header ("You have completed N out of M tasks").
    pub async fn filter_completed_from_title(&self) -> Result<u32> {
        self.base
            .step("Filter completed tasks from title", async {
                let header = self.base.locator(loc::COMPLETED_INFO).await;
                let text = self.base.get_text(&header).await?;
                parse_completed_count(&text)
            })
            .await
    }

    /// Number of task rows that are currently visible.
    pub async fn get_number_of_visible_tasks(&self) -> Result<usize> {
        self.base
            .step("Get number of visible tasks", async {
                let rows = self.base.locator(loc::TASK_ITEMS).await;
                let total = self.base.count(&rows).await?;
                let mut visible = 0;
                for index in 0..total {
                    if nth(&rows, index).is_visible().await? {
                        visible += 1;
                    }
                }
                Ok(visible)
            })
            .await
    }

    /// Number of rows carrying the completion marker.
    pub async fn count_completed_tasks(&self) -> Result<usize> {
        self.base
            .step("Count completed tasks (by check icon presence)", async {
                let rows = self.base.locator(loc::TASK_ITEMS).await;
                let total = self.base.count(&rows).await?;
                let mut completed = 0;
                for index in 0..total {
                    let marker = nth(&rows, index).locator(&self.completed_marker);
                    if self.base.count(&marker).await? > 0 {
                        completed += 1;
                    }
                }
                Ok(completed)
            })
            .await
    }

    /// Resolves `task` to a row position against the list as rendered now.
    pub async fn resolve(&self, task: &TaskRef) -> Result<usize> {
        match task {
            TaskRef::Index(index) => {
                let rows = self.base.locator(loc::TASK_ITEMS).await;
                let len = self.base.count(&rows).await?;
                if *index >= len {
                    return Err(Error::IndexOutOfRange {
                        what: "task",
                        index: *index,
                        len,
                    });
                }
                Ok(*index)
            }
            TaskRef::Title(title) => self
                .position_of(title)
                .await?
                .ok_or_else(|| Error::TaskNotFound(title.clone())),
        }
    }

    async fn row(&self, index: usize) -> Locator {
        nth(&self.base.locator(loc::TASK_ITEMS).await, index)
    }

    async fn open_row_menu(&self, index: usize) -> Result<()> {
        let menu = self.row(index).await.locator(loc::TASK_MENU_BUTTON);
        self.base.click(&menu, false).await
    }

    /// Plain click on a page-level element (menu items, dialog buttons).
    async fn click(&self, selector: &str) -> Result<()> {
        self.base.click(&self.base.locator(selector).await, false).await
    }

    async fn all_texts(&self, selector: &str) -> Result<Vec<String>> {
        let matches = self.base.locator(selector).await;
        let total = self.base.count(&matches).await?;
        let mut texts = Vec::with_capacity(total);
        for index in 0..total {
            texts.push(self.base.get_text(&nth(&matches, index)).await?);
        }
        Ok(texts)
    }
}

/// Extracts N from a header reading "... completed N out ...".
///
/// Takes the text between the first "completed" and the following "out".
/// Any other shape is an [`Error::Parse`].
pub fn parse_completed_count(text: &str) -> Result<u32> {
    let parse_error = |reason: &str| Error::Parse {
        text: text.to_string(),
        reason: reason.to_string(),
    };

    let after = text
        .split("completed")
        .nth(1)
        .ok_or_else(|| parse_error("missing 'completed'"))?;
    let count = after.split("out").next().unwrap_or(after).trim();

    count
        .parse::<u32>()
        .map_err(|_| parse_error(&format!("'{count}' is not a task count")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_completed_count() {
        assert_eq!(
            parse_completed_count("You have completed 1 out of 2 tasks").unwrap(),
            1
        );
        assert_eq!(parse_completed_count("completed 0 out of 0").unwrap(), 0);
        assert_eq!(
            parse_completed_count("You have completed\n 12 \nout of 30 tasks").unwrap(),
            12
        );
    }

    #[test]
    fn test_parse_completed_count_missing_keyword() {
        let err = parse_completed_count("You have done 1 out of 2 tasks").unwrap_err();
        match err {
            Error::Parse { text, reason } => {
                assert_eq!(text, "You have done 1 out of 2 tasks");
                assert!(reason.contains("completed"));
            }
            other => panic!("expected Parse, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_completed_count_non_numeric() {
        assert!(matches!(
            parse_completed_count("You have completed all out of 3 tasks"),
            Err(Error::Parse { .. })
        ));
        // Without "out" the whole tail is taken, which is not a number
        assert!(matches!(
            parse_completed_count("You have completed 3 of 3 tasks"),
            Err(Error::Parse { .. })
        ));
    }

    #[test]
    fn test_task_ref_conversions() {
        assert_eq!(TaskRef::from(2), TaskRef::Index(2));
        assert_eq!(TaskRef::from("Buy milk"), TaskRef::Title("Buy milk".into()));
        assert_eq!(TaskRef::from(String::from("x")).to_string(), "'x'");
        assert_eq!(TaskRef::Index(0).to_string(), "#0");
    }
}
