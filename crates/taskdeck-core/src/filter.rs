use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::Task;
use crate::text_matcher::TextMatcher;

/// Which completion states are visible.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    /// Every task.
    #[default]
    All,
    /// Tasks with `completed == false`.
    Pending,
    /// Tasks with `completed == true`.
    Completed,
}

impl StatusFilter {
    /// Every variant, in the order shown in filter bars.
    pub const ALL: [Self; 3] = [Self::All, Self::Pending, Self::Completed];

    /// Whether a task passes this status filter.
    #[must_use]
    pub const fn admits(self, task: &Task) -> bool {
        match self {
            Self::All => true,
            Self::Pending => !task.completed,
            Self::Completed => task.completed,
        }
    }

    /// Token form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Pending => "pending",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised for status tokens other than `all`, `pending`, `completed`.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid status filter: {token} (expected all, pending or completed)")]
pub struct StatusFilterParseError {
    /// Offending input.
    pub token: String,
}

impl FromStr for StatusFilter {
    type Err = StatusFilterParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "pending" => Ok(Self::Pending),
            "completed" | "done" => Ok(Self::Completed),
            _ => Err(StatusFilterParseError { token: s.to_owned() }),
        }
    }
}

/// Status filter combined with an optional search query (logical AND).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    /// Completion-state filter.
    pub status: StatusFilter,
    /// Free-text matcher; `None` matches everything.
    pub text: Option<TextMatcher>,
}

impl TaskFilter {
    /// Create a filter that passes every task.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the status filter.
    #[must_use]
    pub const fn with_status(mut self, status: StatusFilter) -> Self {
        self.status = status;
        self
    }

    /// Replace the search query (blank queries clear it).
    #[must_use]
    pub fn with_query(mut self, query: &str) -> Self {
        self.text = TextMatcher::new(query);
        self
    }

    /// Returns true when the filter passes every task.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self.status, StatusFilter::All) && self.text.is_none()
    }

    /// Whether a task is visible under this filter.
    #[must_use]
    pub fn matches(&self, task: &Task) -> bool {
        self.status.admits(task) && self.text.as_ref().is_none_or(|text| text.matches(task))
    }

    /// Visible tasks in store order.
    #[must_use]
    pub fn apply<'a>(&self, tasks: &'a [Task]) -> Vec<&'a Task> {
        tasks.iter().filter(|task| self.matches(task)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TaskDraft;
    use crate::id::TaskId;
    use time::macros::datetime;

    fn fixed_task_id(n: u8) -> TaskId {
        TaskId::from_str(&format!("00000000-0000-0000-0000-0000000000{n:02}"))
            .unwrap_or_else(|err| panic!("must parse task id: {err}"))
    }

    fn task(n: u8, title: &str, description: &str, completed: bool) -> Task {
        Task::from_draft(
            fixed_task_id(n),
            datetime!(2025-01-01 00:00 UTC),
            TaskDraft {
                title: title.into(),
                description: description.into(),
                completed,
                ..TaskDraft::default()
            },
        )
    }

    fn ids(tasks: &[&Task]) -> Vec<TaskId> {
        tasks.iter().map(|task| task.id).collect()
    }

    fn sample() -> Vec<Task> {
        vec![
            task(1, "A", "", false),
            task(2, "B", "", true),
            task(3, "Call plumber", "about the sink", false),
            task(4, "Write report", "Quarterly numbers", true),
        ]
    }

    #[test]
    fn parse_status_tokens() {
        assert_eq!("ALL".parse::<StatusFilter>(), Ok(StatusFilter::All));
        assert_eq!(" pending".parse::<StatusFilter>(), Ok(StatusFilter::Pending));
        assert_eq!("Completed".parse::<StatusFilter>(), Ok(StatusFilter::Completed));
        let Err(err) = "archived".parse::<StatusFilter>() else {
            panic!("unknown status must fail");
        };
        assert_eq!(err.token, "archived");
    }

    #[test]
    fn status_filter_partitions_tasks() {
        let tasks = sample();
        let all = TaskFilter::new().apply(&tasks);
        let pending = TaskFilter::new().with_status(StatusFilter::Pending).apply(&tasks);
        let completed = TaskFilter::new()
            .with_status(StatusFilter::Completed)
            .apply(&tasks);

        assert_eq!(all.len(), 4);
        assert_eq!(ids(&pending), vec![fixed_task_id(1), fixed_task_id(3)]);
        assert_eq!(ids(&completed), vec![fixed_task_id(2), fixed_task_id(4)]);
    }

    #[test]
    fn pending_with_query_a_returns_first_task_only() {
        let tasks = vec![task(1, "A", "", false), task(2, "B", "", true)];
        let visible = TaskFilter::new()
            .with_status(StatusFilter::Pending)
            .with_query("a")
            .apply(&tasks);
        assert_eq!(ids(&visible), vec![fixed_task_id(1)]);
    }

    #[test]
    fn status_and_query_combine_with_and() {
        let tasks = sample();
        // "report" matches task 4 only, which is completed.
        let visible = TaskFilter::new()
            .with_status(StatusFilter::Pending)
            .with_query("report")
            .apply(&tasks);
        assert!(visible.is_empty());

        let visible = TaskFilter::new().with_query("SINK").apply(&tasks);
        assert_eq!(ids(&visible), vec![fixed_task_id(3)]);
    }

    #[test]
    fn whitespace_query_matches_everything() {
        let tasks = sample();
        let filter = TaskFilter::new().with_query("   ");
        assert!(filter.is_empty());
        assert_eq!(filter.apply(&tasks).len(), tasks.len());
    }

    #[test]
    fn filtering_is_idempotent_and_order_stable() {
        let tasks = sample();
        let filter = TaskFilter::new()
            .with_status(StatusFilter::All)
            .with_query("r");
        let first = ids(&filter.apply(&tasks));
        let second = ids(&filter.apply(&tasks));
        assert_eq!(first, second);
        assert_eq!(first, vec![fixed_task_id(3), fixed_task_id(4)]);
    }
}
