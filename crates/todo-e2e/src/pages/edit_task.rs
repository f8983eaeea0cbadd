// EditTask page object
//
// The modal opened from a row's "Edit" menu item. Every element is chained
// below the dialog locator, so nothing outside the modal can match.

use super::base::{BasePage, nth};
use super::locators::edit_task as loc;
use crate::{Error, Result};
use playwright_rs::protocol::Locator;

/// Workflows inside the edit-task dialog.
#[derive(Debug, Clone)]
pub struct EditTaskPage {
    base: BasePage,
}

impl EditTaskPage {
    pub fn new(base: BasePage) -> Self {
        Self { base }
    }

    pub fn base(&self) -> &BasePage {
        &self.base
    }

    async fn in_dialog(&self, selector: &str) -> Locator {
        self.base.locator(loc::DIALOG).await.locator(selector)
    }

    /// Waits until the name field is usable and Save is shown.
    pub async fn wait_for_ready(&self) -> Result<()> {
        self.base
            .step("Wait for Edit Task dialog to be visible", async {
                let name = self.in_dialog(loc::NAME_INPUT).await;
                self.base.wait_for_clickable_default(&name).await?;
                let save = self.in_dialog(loc::SAVE_BUTTON).await;
                self.base.wait_for_visible_default(&save).await
            })
            .await
    }

    /// Replaces the name and, when given, the description and deadline, then saves.
    ///
    /// `None` leaves the corresponding field as the app rendered it.
    pub async fn edit_task(
        &self,
        name: &str,
        description: Option<&str>,
        deadline: Option<&str>,
    ) -> Result<()> {
        self.base
            .step(format!("Edit task with name: {name}"), async {
                self.wait_for_ready().await?;
                let dialog = self.base.locator(loc::DIALOG).await;
                self.base.fill(&dialog.locator(loc::NAME_INPUT), name).await?;
                if let Some(description) = description {
                    self.base
                        .fill(&dialog.locator(loc::DESCRIPTION_TEXTAREA), description)
                        .await?;
                }
                if let Some(deadline) = deadline {
                    self.base
                        .fill(&dialog.locator(loc::DEADLINE_INPUT), deadline)
                        .await?;
                }
                self.base.click(&dialog.locator(loc::SAVE_BUTTON), false).await
            })
            .await
    }

    /// Dismisses the dialog through its first button (the close icon).
    pub async fn close_dialog(&self) -> Result<()> {
        self.base
            .step("Close edit dialog", async {
                let close = self.in_dialog(loc::BUTTONS).await.first();
                self.base.click(&close, false).await
            })
            .await
    }

    pub async fn cancel_edit(&self) -> Result<()> {
        self.base
            .step("Cancel editing", async {
                let cancel = self.in_dialog(loc::CANCEL_BUTTON).await;
                self.base.click(&cancel, false).await
            })
            .await
    }

    /// Opens the category dropdown.
    pub async fn select_category(&self) -> Result<()> {
        self.base
            .step("Select category", async {
                let dropdown = self.in_dialog(loc::CATEGORY_DROPDOWN).await;
                self.base.click(&dropdown, false).await
            })
            .await
    }

    /// Expands or collapses the colour accordion.
    pub async fn open_color_picker(&self) -> Result<()> {
        self.base
            .step("Toggle color picker", async {
                let accordion = self.in_dialog(loc::COLOR_ACCORDION).await;
                self.base.click(&accordion, false).await
            })
            .await
    }

    /// Clicks the `index`-th colour swatch (0-based).
    ///
    /// The picker must be open. Fails with [`Error::IndexOutOfRange`] when
    /// fewer swatches are rendered.
    pub async fn pick_color(&self, index: usize) -> Result<()> {
        self.base
            .step(format!("Pick color by index {index}"), async {
                let swatches = self.in_dialog(loc::COLOR_BUTTONS).await;
                let len = self.base.count(&swatches).await?;
                if index >= len {
                    return Err(Error::IndexOutOfRange {
                        what: "color swatch",
                        index,
                        len,
                    });
                }
                self.base.click(&nth(&swatches, index), false).await
            })
            .await
    }

    /// Whether the dialog is rendered and visible right now.
    pub async fn is_open(&self) -> Result<bool> {
        Ok(self.base.locator(loc::DIALOG).await.is_visible().await?)
    }

    /// Waits until the dialog is gone.
    pub async fn wait_until_closed(&self) -> Result<()> {
        let dialog = self.base.locator(loc::DIALOG).await;
        self.base
            .wait_for_hidden(&dialog, self.base.timeouts().visible())
            .await
    }
}
