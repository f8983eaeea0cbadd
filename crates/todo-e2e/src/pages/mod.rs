// Page objects for the Todo app
//
// One type per screen (list, create form, edit dialog) built on the shared
// `BasePage` primitives, plus the selector sets they resolve.

pub mod add_task;
pub mod base;
pub mod edit_task;
pub mod locators;
pub mod todo_list;

pub use add_task::AddTaskPage;
pub use base::BasePage;
pub use edit_task::EditTaskPage;
pub use todo_list::TodoListPage;

use std::fmt;

/// Identifies one rendered task row.
///
/// Resolved against the list at the moment of the call. A position is only
/// meaningful until the next mutation; a title survives reordering but picks
/// the first row when several share it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskRef {
    /// 0-based position in the rendered list
    Index(usize),
    /// Exact task title
    Title(String),
}

impl From<usize> for TaskRef {
    fn from(index: usize) -> Self {
        TaskRef::Index(index)
    }
}

impl From<&str> for TaskRef {
    fn from(title: &str) -> Self {
        TaskRef::Title(title.to_string())
    }
}

impl From<String> for TaskRef {
    fn from(title: String) -> Self {
        TaskRef::Title(title)
    }
}

impl fmt::Display for TaskRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskRef::Index(index) => write!(f, "#{index}"),
            TaskRef::Title(title) => write!(f, "'{title}'"),
        }
    }
}
