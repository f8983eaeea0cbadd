// Element locator sets
//
// Where each interactive element of the target app lives, as Playwright
// selector strings. These are the app's DOM contract: a changed placeholder,
// aria-label, test id or copy string on the app side breaks this layer.
//
// Nothing here holds state. Page objects resolve a selector against the live
// page on every interaction and chain scoped lookups with `Locator::locator`
// and `Locator::nth`.

/// Offline-preparation banners shown while the app's service worker installs
pub mod app {
    pub const PREPARING_OFFLINE_BANNER: &str = "text=Preparing app for offline use...";
    pub const READY_OFFLINE_BANNER: &str = "text=App is ready to work offline.";
}

/// The "create task" screen (`/add`)
pub mod add_task {
    pub const TASK_NAME_INPUT: &str = "input[placeholder='Enter task name']";
    pub const TASK_DESCRIPTION_TEXTAREA: &str = "textarea[placeholder='Enter task description']";
    pub const TASK_DEADLINE_INPUT: &str = "input[placeholder='Enter deadline date']";
    pub const CREATE_TASK_BUTTON: &str = "button[type='button']:has-text('Create Task')";
    pub const BACK_TO_MAIN_TASKS: &str = "button[aria-label='menu']";
    pub const NAME_VALIDATION_ERROR: &str = "p[id$='-helper-text'].Mui-error";

    /// Copy shown when the name exceeds the app's length limit
    pub const NAME_TOO_LONG_MESSAGE: &str = "Name should be less than or equal to 40 characters";
}

/// The edit-task modal. Every selector except `DIALOG` is chained below it.
pub mod edit_task {
    pub const DIALOG: &str = "div[role='dialog']";
    pub const NAME_INPUT: &str = "input[name='name']";
    pub const DESCRIPTION_TEXTAREA: &str = "textarea[name='description']";
    pub const DEADLINE_INPUT: &str = "input[type='datetime-local']";
    pub const CATEGORY_DROPDOWN: &str = "div[role='combobox']";
    pub const COLOR_ACCORDION: &str = "button.MuiAccordionSummary-root";
    pub const COLOR_BUTTONS: &str = "button[id^='color-element-']";
    /// Any dialog button; the first one is the close icon
    pub const BUTTONS: &str = "button";
    pub const CANCEL_BUTTON: &str = "button:has-text('Cancel')";
    pub const SAVE_BUTTON: &str = "button:has-text('Save')";
}

/// The main task list
pub mod todo_list {
    pub const SEARCH_INPUT: &str = "input[placeholder='Search for task...']";
    pub const TASK_ITEMS: &str = "[data-testid='task-container']";
    pub const ADD_TASK_BUTTON: &str = "button[aria-label='Add Task']";
    pub const TASK_TITLE: &str = "[data-testid='task-container'] h3";
    pub const TASK_TIMESTAMP: &str = "[data-testid='task-container'] p";

    /// Per-row menu button, resolved inside a task row
    pub const TASK_MENU_BUTTON: &str = "[aria-label='Task Menu']";

    pub const EDIT_INPUT: &str = "input[name='name']";
    pub const EDIT_MENU_ITEM: &str = "li:has-text('Edit')";
    pub const SAVE_BUTTON: &str = "button:has-text('Save')";
    pub const DELETE_MENU_ITEM: &str = "li:has-text('Delete')";
    pub const MARK_AS_DONE_MENU_ITEM: &str = "li:has-text('Mark as done')";
    pub const CONFIRM_DELETE_BUTTON: &str = "button:has-text('Confirm Delete')";
    pub const COMPLETED_INFO: &str = "h4:has-text('You')";

    /// Check icon rendered inside completed rows, resolved inside a task row.
    ///
    /// This is a generated emotion class, not a semantic attribute. It is the
    /// only marker the app exposes today; override it through
    /// `HarnessConfig::completed_marker` once the app ships a stable one.
    pub const COMPLETED_MARKER: &str = "span.css-d6pu1g";
}
