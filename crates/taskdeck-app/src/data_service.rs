//! Async CRUD contract for tasks and categories.

use taskdeck_core::id::{CategoryId, TaskId};
use taskdeck_core::{Category, CategoryDraft, Task, TaskDraft};
use thiserror::Error;

/// Failures surfaced by a data service backend.
#[derive(Debug, Error)]
pub enum DataServiceError {
    /// Target entity does not exist (or vanished between read and write).
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Entity kind (`task` or `category`).
        entity: &'static str,
        /// Identifier that was requested.
        id: String,
    },

    /// Backend refused or failed to create the entity.
    #[error("failed to create {entity}: {reason}")]
    Create {
        /// Entity kind.
        entity: &'static str,
        /// Backend-provided reason.
        reason: String,
    },

    /// Backend could not be reached or answered with an error.
    #[error("transport error: {0}")]
    Transport(#[source] anyhow::Error),

    /// Backend answered with a record that could not be mapped.
    #[error("malformed {entity} record: {source}")]
    Decode {
        /// Entity kind.
        entity: &'static str,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
}

impl DataServiceError {
    /// Convenience constructor for a missing task.
    #[must_use]
    pub fn task_not_found(id: TaskId) -> Self {
        Self::NotFound {
            entity: "task",
            id: id.to_string(),
        }
    }

    /// Convenience constructor for a missing category.
    #[must_use]
    pub fn category_not_found(id: CategoryId) -> Self {
        Self::NotFound {
            entity: "category",
            id: id.to_string(),
        }
    }

    /// Returns true for [`DataServiceError::NotFound`].
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Result alias for data service calls.
pub type DataResult<T> = Result<T, DataServiceError>;

/// Task persistence collaborator.
///
/// Reads never fail: backends log the problem and resolve to an empty list
/// or `None`, so the caller only has to handle write failures.
#[allow(async_fn_in_trait)]
pub trait TaskDataService: Send + Sync {
    /// Fetch every task.
    async fn get_all(&self) -> Vec<Task>;

    /// Fetch a single task.
    async fn get_by_id(&self, id: TaskId) -> Option<Task>;

    /// Persist a new task, assigning its id and creation time.
    ///
    /// # Errors
    /// Returns [`DataServiceError::Create`] or a transport error.
    async fn create(&self, draft: TaskDraft) -> DataResult<Task>;

    /// Replace the stored task with the draft's fields.
    ///
    /// # Errors
    /// Returns [`DataServiceError::NotFound`] when the id is unknown.
    async fn update(&self, id: TaskId, draft: TaskDraft) -> DataResult<Task>;

    /// Remove a task. `Ok(false)` means the backend declined.
    ///
    /// # Errors
    /// Returns [`DataServiceError::NotFound`] when the backend reports unknown ids as errors.
    async fn delete(&self, id: TaskId) -> DataResult<bool>;
}

/// Category persistence collaborator; same shape as [`TaskDataService`].
#[allow(async_fn_in_trait)]
pub trait CategoryDataService: Send + Sync {
    /// Fetch every category.
    async fn get_all(&self) -> Vec<Category>;

    /// Fetch a single category.
    async fn get_by_id(&self, id: CategoryId) -> Option<Category>;

    /// Persist a new category.
    ///
    /// # Errors
    /// Returns [`DataServiceError::Create`] or a transport error.
    async fn create(&self, draft: CategoryDraft) -> DataResult<Category>;

    /// Replace a stored category.
    ///
    /// # Errors
    /// Returns [`DataServiceError::NotFound`] when the id is unknown.
    async fn update(&self, id: CategoryId, draft: CategoryDraft) -> DataResult<Category>;

    /// Remove a category.
    ///
    /// # Errors
    /// Returns [`DataServiceError::NotFound`] when the backend reports unknown ids as errors.
    async fn delete(&self, id: CategoryId) -> DataResult<bool>;
}
