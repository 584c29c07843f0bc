use serde::Serialize;
use time::macros::format_description;
use time::{Date, OffsetDateTime};

use crate::Task;

/// Summary counts over a task snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TaskStats {
    /// Number of tasks.
    pub total: usize,
    /// Tasks marked completed.
    pub completed: usize,
    /// Tasks not yet completed.
    pub pending: usize,
    /// Pending tasks whose due day is strictly before today.
    pub overdue: usize,
}

impl TaskStats {
    /// Count the snapshot as seen at `now`.
    ///
    /// Overdue is decided per calendar day in `now`'s offset, so a task due
    /// later today is not overdue yet.
    #[must_use]
    pub fn compute(tasks: &[Task], now: OffsetDateTime) -> Self {
        let today = now.date();
        tasks.iter().fold(Self::default(), |mut stats, task| {
            stats.total += 1;
            if task.completed {
                stats.completed += 1;
            } else {
                stats.pending += 1;
                if due_day(task, now).is_some_and(|day| day < today) {
                    stats.overdue += 1;
                }
            }
            stats
        })
    }
}

/// How a task's due date relates to the current day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DueStatus {
    /// No due date, or the task is already completed.
    None,
    /// Due day is in the past.
    Overdue,
    /// Due today.
    DueToday,
    /// Due tomorrow.
    DueTomorrow,
    /// Due after tomorrow.
    Upcoming,
}

impl DueStatus {
    /// Classify a task relative to `now`.
    #[must_use]
    pub fn of(task: &Task, now: OffsetDateTime) -> Self {
        if task.completed {
            return Self::None;
        }
        let Some(day) = due_day(task, now) else {
            return Self::None;
        };
        let today = now.date();
        if day < today {
            Self::Overdue
        } else if day == today {
            Self::DueToday
        } else if Some(day) == today.next_day() {
            Self::DueTomorrow
        } else {
            Self::Upcoming
        }
    }
}

/// Calendar day of the task's due date in `now`'s offset.
#[must_use]
pub fn due_day(task: &Task, now: OffsetDateTime) -> Option<Date> {
    task.due_date.map(|due| due.to_offset(now.offset()).date())
}

/// Human label for a due date: "Today", "Tomorrow", or `Mon DD, YYYY`.
#[must_use]
pub fn due_label(due: OffsetDateTime, now: OffsetDateTime) -> String {
    let day = due.to_offset(now.offset()).date();
    let today = now.date();
    if day == today {
        return "Today".to_owned();
    }
    if today.next_day() == Some(day) {
        return "Tomorrow".to_owned();
    }
    day.format(format_description!("[month repr:short] [day], [year]"))
        .unwrap_or_else(|_| day.to_string())
}
