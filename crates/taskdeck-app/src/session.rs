//! Session controller: owns the task store, the active filter and the editor,
//! and turns data service outcomes into notifications.

use taskdeck_core::id::TaskId;
use taskdeck_core::{Category, CategoryDraft, StatusFilter, Task, TaskFilter, TaskStats};
use time::{OffsetDateTime, UtcOffset};
use tracing::{debug, warn};

use crate::data_service::{CategoryDataService, TaskDataService};
use crate::editor::{EditorError, SubmitRequest, TaskEditor};
use crate::notification::Notification;
use crate::task_store::{TaskSnapshot, TaskStore};
use crate::validator::{TaskForm, toggled};

const SAVE_FAILED: &str = "Failed to save task";
const UPDATE_FAILED: &str = "Failed to update task";
const DELETE_FAILED: &str = "Failed to delete task";

/// Single-writer session over a pair of data services.
pub struct TaskSession<T, C> {
    tasks: T,
    categories: C,
    store: TaskStore,
    category_list: Vec<Category>,
    filter: TaskFilter,
    editor: TaskEditor,
    offset: UtcOffset,
}

#[allow(clippy::future_not_send)]
impl<T, C> TaskSession<T, C>
where
    T: TaskDataService,
    C: CategoryDataService,
{
    /// Empty session; call [`TaskSession::load`] to fetch records.
    #[must_use]
    pub fn new(tasks: T, categories: C) -> Self {
        Self {
            tasks,
            categories,
            store: TaskStore::new(),
            category_list: Vec::new(),
            filter: TaskFilter::new(),
            editor: TaskEditor::new(),
            offset: UtcOffset::UTC,
        }
    }

    /// Use `offset` to decide calendar days for overdue counts and due labels,
    /// and to anchor date-only due dates entered in forms.
    #[must_use]
    pub const fn with_utc_offset(mut self, offset: UtcOffset) -> Self {
        self.offset = offset;
        self.editor.set_utc_offset(offset);
        self
    }

    /// Start with the given status filter.
    #[must_use]
    pub fn with_status_filter(mut self, status: StatusFilter) -> Self {
        self.filter = self.filter.with_status(status);
        self
    }

    /// Fetch tasks and categories concurrently and replace local state.
    pub async fn load(&mut self) -> TaskSnapshot {
        let (tasks, categories) = tokio::join!(self.tasks.get_all(), self.categories.get_all());
        debug!(
            tasks = tasks.len(),
            categories = categories.len(),
            "Session loaded"
        );
        self.category_list = categories;
        self.store.load(tasks)
    }

    /// Current store snapshot.
    #[must_use]
    pub fn snapshot(&self) -> TaskSnapshot {
        self.store.snapshot()
    }

    /// Look up a task held by the session.
    #[must_use]
    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.store.get(id)
    }

    /// Tasks passing the active filter, in store order.
    #[must_use]
    pub fn visible(&self) -> Vec<&Task> {
        self.filter.apply(self.store.tasks())
    }

    /// Categories fetched at load time plus any created since.
    #[must_use]
    pub fn categories(&self) -> &[Category] {
        &self.category_list
    }

    /// Active filter.
    #[must_use]
    pub const fn filter(&self) -> &TaskFilter {
        &self.filter
    }

    /// Replace the status filter.
    pub fn set_status_filter(&mut self, status: StatusFilter) {
        self.filter = std::mem::take(&mut self.filter).with_status(status);
    }

    /// Replace the search query; blank clears it.
    pub fn set_query(&mut self, query: &str) {
        self.filter = std::mem::take(&mut self.filter).with_query(query);
    }

    /// "Now" in the session's offset.
    #[must_use]
    pub fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc().to_offset(self.offset)
    }

    /// Statistics over the whole store as of now.
    #[must_use]
    pub fn stats(&self) -> TaskStats {
        self.stats_at(self.now())
    }

    /// Statistics over the whole store as of `now`.
    #[must_use]
    pub fn stats_at(&self, now: OffsetDateTime) -> TaskStats {
        TaskStats::compute(self.store.tasks(), now)
    }

    /// Read-only access to the editor.
    #[must_use]
    pub const fn editor(&self) -> &TaskEditor {
        &self.editor
    }

    /// Open an empty create form.
    ///
    /// # Errors
    /// Returns [`EditorError::Busy`] while a save is pending.
    pub fn begin_create(&mut self) -> Result<(), EditorError> {
        self.editor.begin_create()
    }

    /// Open an edit form pre-populated from the stored task.
    ///
    /// # Errors
    /// Returns [`EditorError::UnknownTask`] when the id is not in the store.
    pub fn begin_edit(&mut self, id: TaskId) -> Result<(), EditorError> {
        let task = self.store.get(id).cloned().ok_or(EditorError::UnknownTask(id))?;
        self.editor.begin_edit(task)
    }

    /// Mutable access to the open form.
    ///
    /// # Errors
    /// Returns an [`EditorError`] when no form is open or a save is pending.
    pub fn form_mut(&mut self) -> Result<&mut TaskForm, EditorError> {
        self.editor.form_mut()
    }

    /// Close the form without saving.
    ///
    /// # Errors
    /// Returns an [`EditorError`] when no form is open or a save is pending.
    pub fn cancel(&mut self) -> Result<(), EditorError> {
        self.editor.cancel()
    }

    /// Validate the open form and persist it.
    ///
    /// Validation and service failures come back as error notifications; the
    /// form stays open in both cases.
    ///
    /// # Errors
    /// Returns an [`EditorError`] only for invalid transitions (no form open).
    pub async fn submit(&mut self) -> Result<Notification, EditorError> {
        let request = match self.editor.submit() {
            Ok(request) => request,
            Err(EditorError::Invalid(err)) => return Ok(Notification::error(err.to_string())),
            Err(err) => return Err(err),
        };

        match request {
            SubmitRequest::Create(draft) => {
                let outcome = self.tasks.create(draft).await;
                self.editor.finish(&outcome)?;
                Ok(match outcome {
                    Ok(task) => {
                        self.store.apply_create(task);
                        Notification::success("Task created successfully!")
                    }
                    Err(err) => {
                        warn!(error = %err, "Failed to create task");
                        Notification::error(SAVE_FAILED)
                    }
                })
            }
            SubmitRequest::Update { id, draft } => {
                let outcome = self.tasks.update(id, draft).await;
                self.editor.finish(&outcome)?;
                Ok(match outcome {
                    Ok(task) => {
                        self.store.apply_update(task);
                        Notification::success("Task updated successfully!")
                    }
                    Err(err) => {
                        warn!(task = %id, error = %err, "Failed to update task");
                        Notification::error(SAVE_FAILED)
                    }
                })
            }
        }
    }

    /// Flip a task's completion flag, keeping every other field.
    pub async fn toggle_complete(&mut self, id: TaskId) -> Notification {
        let Some(task) = self.store.get(id) else {
            warn!(task = %id, "Toggle requested for unknown task");
            return Notification::error(UPDATE_FAILED);
        };
        let draft = toggled(task);
        match self.tasks.update(id, draft).await {
            Ok(updated) => {
                let message = if updated.completed {
                    "Task completed!"
                } else {
                    "Task reopened!"
                };
                self.store.apply_update(updated);
                Notification::success(message)
            }
            Err(err) => {
                warn!(task = %id, error = %err, "Failed to toggle task");
                Notification::error(UPDATE_FAILED)
            }
        }
    }

    /// Delete a task; the store only changes when the service confirms.
    pub async fn delete(&mut self, id: TaskId) -> Notification {
        match self.tasks.delete(id).await {
            Ok(true) => {
                self.store.apply_delete(id);
                Notification::success("Task deleted successfully!")
            }
            Ok(false) => {
                warn!(task = %id, "Backend declined delete");
                Notification::error(DELETE_FAILED)
            }
            Err(err) => {
                warn!(task = %id, error = %err, "Failed to delete task");
                Notification::error(DELETE_FAILED)
            }
        }
    }

    /// Create a category and add it to the session's list.
    pub async fn create_category(&mut self, draft: CategoryDraft) -> Notification {
        match self.categories.create(draft).await {
            Ok(category) => {
                self.category_list.push(category);
                Notification::success("Category created successfully!")
            }
            Err(err) => {
                warn!(error = %err, "Failed to create category");
                Notification::error("Failed to create category")
            }
        }
    }
}
