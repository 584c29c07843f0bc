//! Task form normalization and validation.

use taskdeck_core::{Priority, Task, TaskDraft, format_due_date, parse_due_date};
use thiserror::Error;
use time::UtcOffset;

/// User-correctable problems with a task form.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// Title is empty after trimming.
    #[error("Task title is required")]
    EmptyTitle,

    /// Due date is neither `YYYY-MM-DD` nor an RFC 3339 instant.
    #[error("Invalid due date '{input}' (expected YYYY-MM-DD)")]
    InvalidDueDate {
        /// Raw input.
        input: String,
        /// Parser failure.
        #[source]
        source: time::error::Parse,
    },
}

/// Raw field values as entered by the user.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TaskForm {
    /// Title text (trimmed on submit).
    pub title: String,
    /// Description text (trimmed on submit).
    pub description: String,
    /// Due date text; empty means none.
    pub due_date: String,
    /// Selected priority.
    pub priority: Priority,
    /// Category name; empty means none.
    pub category: String,
    /// Entered tags.
    pub tags: Vec<String>,
}

impl TaskForm {
    /// Empty form for create mode.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Form pre-populated from an existing task (edit mode), showing the due
    /// day as seen at `offset`.
    #[must_use]
    pub fn from_task(task: &Task, offset: UtcOffset) -> Self {
        Self {
            title: task.title.clone(),
            description: task.description.clone(),
            due_date: task
                .due_date
                .map(|due| format_due_date(due, offset))
                .unwrap_or_default(),
            priority: task.priority,
            category: task.category.clone().unwrap_or_default(),
            tags: task.tags.clone(),
        }
    }

    /// Add a tag. Blank and already-present tags are ignored; returns whether it was added.
    pub fn add_tag(&mut self, raw: &str) -> bool {
        let tag = raw.trim();
        if tag.is_empty() || self.tags.iter().any(|existing| existing == tag) {
            return false;
        }
        self.tags.push(tag.to_owned());
        true
    }

    /// Remove a tag; returns whether it was present.
    pub fn remove_tag(&mut self, tag: &str) -> bool {
        let tag = tag.trim();
        let before = self.tags.len();
        self.tags.retain(|existing| existing != tag);
        self.tags.len() != before
    }
}

/// Trim tags, drop blanks and duplicates, keep first-seen order.
#[must_use]
pub fn normalize_tags<I, S>(candidates: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut form = TaskForm::new();
    for candidate in candidates {
        form.add_tag(candidate.as_ref());
    }
    form.tags
}

/// Validate a form and turn it into a draft for the data service.
///
/// The title is checked first. A date-only due date means midnight at
/// `offset`. When `original` is given (edit mode) its `completed` flag and
/// creation time are carried over unchanged.
///
/// # Errors
/// Returns [`ValidationError`] when the title is blank or the due date cannot be parsed.
pub fn validate(
    form: &TaskForm,
    original: Option<&Task>,
    offset: UtcOffset,
) -> Result<TaskDraft, ValidationError> {
    let title = form.title.trim();
    if title.is_empty() {
        return Err(ValidationError::EmptyTitle);
    }

    let due_date =
        parse_due_date(&form.due_date, offset).map_err(|source| ValidationError::InvalidDueDate {
            input: form.due_date.clone(),
            source,
        })?;

    let category = form.category.trim();

    Ok(TaskDraft {
        title: title.to_owned(),
        description: form.description.trim().to_owned(),
        due_date,
        priority: form.priority,
        category: (!category.is_empty()).then(|| category.to_owned()),
        completed: original.is_some_and(|task| task.completed),
        tags: normalize_tags(&form.tags),
        created_at: original.map(|task| task.created_at),
    })
}

/// Draft for the completion toggle: every field kept, `completed` flipped.
#[must_use]
pub fn toggled(task: &Task) -> TaskDraft {
    let mut draft = task.to_draft();
    draft.completed = !task.completed;
    draft
}
