// AddTask page object
//
// The "create task" screen reached from the list's Add Task button.

use super::base::BasePage;
use super::locators::add_task as loc;
use crate::Result;

/// Workflows on the create-task form.
#[derive(Debug, Clone)]
pub struct AddTaskPage {
    base: BasePage,
}

impl AddTaskPage {
    pub fn new(base: BasePage) -> Self {
        Self { base }
    }

    pub fn base(&self) -> &BasePage {
        &self.base
    }

    /// Fills the name field and submits the form.
    ///
    /// The Create Task button is force-clicked: the app sometimes covers it
    /// with a transient overlay that fails the actionability check although
    /// the click lands fine. On success the app navigates back to the list.
    pub async fn submit_task(&self, name: &str) -> Result<()> {
        self.base
            .step(format!("Submit task with name: {name}"), async {
                tracing::info!("Filling task name: '{name}'");
                let input = self.base.locator(loc::TASK_NAME_INPUT).await;
                self.base.fill(&input, name).await?;
                tracing::info!("Clicking Create Task button");
                let create = self.base.locator(loc::CREATE_TASK_BUTTON).await;
                self.base.click(&create, true).await
            })
            .await
    }

    /// Fills only the name field, leaving the form open.
    ///
    /// Used to trigger client-side validation without submitting.
    pub async fn fill_task_name_only(&self, name: &str) -> Result<()> {
        self.base
            .step(format!("Fill task name only: {name}"), async {
                tracing::info!(
                    "Filling task name field with: '{name}' (length: {} characters)",
                    name.chars().count()
                );
                let input = self.base.locator(loc::TASK_NAME_INPUT).await;
                self.base.fill(&input, name).await
            })
            .await
    }

    /// Fills the optional description field.
    pub async fn fill_description(&self, description: &str) -> Result<()> {
        self.base
            .step("Fill task description", async {
                let textarea = self.base.locator(loc::TASK_DESCRIPTION_TEXTAREA).await;
                self.base.fill(&textarea, description).await
            })
            .await
    }

    /// Fills the optional deadline field with a `datetime-local` value.
    pub async fn fill_deadline(&self, deadline: &str) -> Result<()> {
        self.base
            .step(format!("Fill task deadline: {deadline}"), async {
                let input = self.base.locator(loc::TASK_DEADLINE_INPUT).await;
                self.base.fill(&input, deadline).await
            })
            .await
    }

    /// Clicks Create Task without filling anything.
    pub async fn submit_empty_task(&self) -> Result<()> {
        self.base
            .step("Attempt to submit empty task", async {
                tracing::info!("Clicking Create Task with empty input");
                let create = self.base.locator(loc::CREATE_TASK_BUTTON).await;
                self.base.wait_for_clickable_default(&create).await?;
                self.base.click(&create, true).await
            })
            .await
    }

    /// Returns to the list through the menu button.
    pub async fn navigate_to_main_tasks(&self) -> Result<()> {
        self.base
            .step("Navigate back to main tasks", async {
                tracing::info!("Navigate back to main tasks");
                let back = self.base.locator(loc::BACK_TO_MAIN_TASKS).await;
                self.base.wait_for_clickable_default(&back).await?;
                self.base.click(&back, false).await
            })
            .await
    }

    /// Waits for the name field's error helper and returns its exact text.
    ///
    /// Times out when no error appears, which means the caller expected
    /// validation that did not happen.
    pub async fn get_validation_error_message(&self) -> Result<String> {
        self.base
            .step("Get validation error message for name field", async {
                let error = self.base.locator(loc::NAME_VALIDATION_ERROR).await;
                self.base.wait_for_visible_default(&error).await?;
                self.base.get_text(&error).await
            })
            .await
    }
}
