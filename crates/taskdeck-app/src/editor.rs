//! Create/edit form lifecycle.

use taskdeck_core::id::TaskId;
use taskdeck_core::{Task, TaskDraft};
use thiserror::Error;
use time::UtcOffset;

use crate::validator::{TaskForm, ValidationError, validate};

/// Invalid editor transitions and rejected submissions.
#[derive(Debug, Error)]
pub enum EditorError {
    /// No form is open.
    #[error("no task is being edited")]
    NotEditing,

    /// A submission is already waiting for the data service.
    #[error("a save is already in progress")]
    Busy,

    /// `finish` was called without a pending submission.
    #[error("no save is in progress")]
    NotSubmitting,

    /// Edit requested for a task the session does not hold.
    #[error("task not found: {0}")]
    UnknownTask(TaskId),

    /// The form did not validate; the editor stays open.
    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

/// An open form plus the record it edits, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditSession {
    /// Field values.
    pub form: TaskForm,
    original: Option<Task>,
}

impl EditSession {
    /// Id of the task being edited (`None` in create mode).
    #[must_use]
    pub fn target(&self) -> Option<TaskId> {
        self.original.as_ref().map(|task| task.id)
    }

    /// Record as it was when editing began.
    #[must_use]
    pub const fn original(&self) -> Option<&Task> {
        self.original.as_ref()
    }
}

/// Editor lifecycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum EditorState {
    /// No form open.
    #[default]
    Idle,
    /// Form open and accepting changes.
    Editing(EditSession),
    /// Form submitted; waiting for the data service.
    Submitting(EditSession),
}

/// What the caller must send to the data service after a successful submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitRequest {
    /// Create a new task.
    Create(TaskDraft),
    /// Replace an existing task.
    Update {
        /// Target id.
        id: TaskId,
        /// New field values.
        draft: TaskDraft,
    },
}

/// Drives [`EditorState`] transitions.
#[derive(Debug, Clone)]
pub struct TaskEditor {
    state: EditorState,
    offset: UtcOffset,
}

impl Default for TaskEditor {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskEditor {
    /// Idle editor reading and writing dates in UTC.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: EditorState::Idle,
            offset: UtcOffset::UTC,
        }
    }

    /// Offset used to show and parse date-only due dates.
    pub const fn set_utc_offset(&mut self, offset: UtcOffset) {
        self.offset = offset;
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> &EditorState {
        &self.state
    }

    /// Returns true while a form is open (editing or submitting).
    #[must_use]
    pub const fn is_open(&self) -> bool {
        !matches!(self.state, EditorState::Idle)
    }

    /// Open an empty form. Any open, unsubmitted form is discarded.
    ///
    /// # Errors
    /// Returns [`EditorError::Busy`] while a submission is pending.
    pub fn begin_create(&mut self) -> Result<(), EditorError> {
        self.open(None)
    }

    /// Open a form pre-populated from `task`.
    ///
    /// # Errors
    /// Returns [`EditorError::Busy`] while a submission is pending.
    pub fn begin_edit(&mut self, task: Task) -> Result<(), EditorError> {
        self.open(Some(task))
    }

    fn open(&mut self, original: Option<Task>) -> Result<(), EditorError> {
        if matches!(self.state, EditorState::Submitting(_)) {
            return Err(EditorError::Busy);
        }
        let form = original
            .as_ref()
            .map_or_else(TaskForm::new, |task| TaskForm::from_task(task, self.offset));
        self.state = EditorState::Editing(EditSession { form, original });
        Ok(())
    }

    /// Open session, if editing.
    #[must_use]
    pub const fn session(&self) -> Option<&EditSession> {
        match &self.state {
            EditorState::Editing(session) | EditorState::Submitting(session) => Some(session),
            EditorState::Idle => None,
        }
    }

    /// Mutable access to the form while editing.
    ///
    /// # Errors
    /// Returns [`EditorError::NotEditing`] when idle and [`EditorError::Busy`] while submitting.
    pub fn form_mut(&mut self) -> Result<&mut TaskForm, EditorError> {
        match &mut self.state {
            EditorState::Editing(session) => Ok(&mut session.form),
            EditorState::Submitting(_) => Err(EditorError::Busy),
            EditorState::Idle => Err(EditorError::NotEditing),
        }
    }

    /// Close the form without saving.
    ///
    /// # Errors
    /// Returns [`EditorError::NotEditing`] when idle and [`EditorError::Busy`] while submitting.
    pub fn cancel(&mut self) -> Result<(), EditorError> {
        match self.state {
            EditorState::Editing(_) => {
                self.state = EditorState::Idle;
                Ok(())
            }
            EditorState::Submitting(_) => Err(EditorError::Busy),
            EditorState::Idle => Err(EditorError::NotEditing),
        }
    }

    /// Validate the form and move to `Submitting`.
    ///
    /// On a validation failure the editor stays in `Editing` with the form intact.
    ///
    /// # Errors
    /// Returns [`EditorError::Invalid`] for a bad form, otherwise a transition error.
    pub fn submit(&mut self) -> Result<SubmitRequest, EditorError> {
        let session = match &self.state {
            EditorState::Editing(session) => session,
            EditorState::Submitting(_) => return Err(EditorError::Busy),
            EditorState::Idle => return Err(EditorError::NotEditing),
        };
        let draft = validate(&session.form, session.original.as_ref(), self.offset)?;
        let request = match session.target() {
            Some(id) => SubmitRequest::Update { id, draft },
            None => SubmitRequest::Create(draft),
        };
        if let EditorState::Editing(session) = std::mem::take(&mut self.state) {
            self.state = EditorState::Submitting(session);
        }
        Ok(request)
    }

    /// Feed back the data service outcome: success closes the form, failure reopens it.
    ///
    /// # Errors
    /// Returns [`EditorError::NotSubmitting`] when no submission is pending.
    pub fn finish<T, E>(&mut self, outcome: &Result<T, E>) -> Result<(), EditorError> {
        let EditorState::Submitting(session) = std::mem::take(&mut self.state) else {
            return Err(EditorError::NotSubmitting);
        };
        self.state = if outcome.is_ok() {
            EditorState::Idle
        } else {
            EditorState::Editing(session)
        };
        Ok(())
    }
}
