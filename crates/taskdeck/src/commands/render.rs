//! Plain-text rendering for tasks, stats and categories.

use std::fmt::Write as _;

use taskdeck_app::{Notification, TaskForm};
use taskdeck_core::stats::due_label;
use taskdeck_core::{Category, DueStatus, Task, TaskStats, resolve_category};
use time::OffsetDateTime;
use time::macros::format_description;

fn or_dash(text: &str) -> &str {
    if text.is_empty() { "-" } else { text }
}

fn due_cell(task: &Task, now: OffsetDateTime) -> String {
    let Some(due) = task.due_date else {
        return "-".to_owned();
    };
    let label = due_label(due, now);
    if DueStatus::of(task, now) == DueStatus::Overdue {
        format!("{label} (overdue)")
    } else {
        label
    }
}

const fn status_mark(task: &Task) -> &'static str {
    if task.completed { "[x]" } else { "[ ]" }
}

/// Numbered table of the visible tasks; numbers are what the shell's `<n>` refers to.
pub fn task_table(tasks: &[&Task], now: OffsetDateTime) -> String {
    let mut out = String::new();
    out.push_str("# | ID | Done | Priority | Title | Due | Category | Tags\n");
    out.push_str("- | -- | ---- | -------- | ----- | --- | -------- | ----\n");
    for (index, task) in tasks.iter().enumerate() {
        let _ = writeln!(
            out,
            "{} | {} | {} | {} | {} | {} | {} | {}",
            index + 1,
            task.id.short(),
            status_mark(task),
            task.priority,
            task.title,
            due_cell(task, now),
            or_dash(task.category.as_deref().unwrap_or_default()),
            or_dash(&task.tags.join(", ")),
        );
    }
    out
}

pub fn stats_line(stats: &TaskStats) -> String {
    format!(
        "Total: {}  Completed: {}  Pending: {}  Overdue: {}",
        stats.total, stats.completed, stats.pending, stats.overdue
    )
}

pub fn category_table(categories: &[Category]) -> String {
    if categories.is_empty() {
        return "No categories found\n".to_owned();
    }
    let mut out = String::new();
    out.push_str("Name | Tags\n");
    out.push_str("---- | ----\n");
    for category in categories {
        let _ = writeln!(out, "{} | {}", category.name, or_dash(&category.tags.join(", ")));
    }
    out
}

/// Detail view of one task.
pub fn task_detail(task: &Task, categories: &[Category], now: OffsetDateTime) -> String {
    let category = match (task.category.as_deref(), resolve_category(task, categories)) {
        (None, _) => "-".to_owned(),
        (Some(name), Some(_)) => name.to_owned(),
        (Some(name), None) => format!("{name} (unknown category)"),
    };
    let created = task
        .created_at
        .to_offset(now.offset())
        .format(format_description!("[year]-[month]-[day] [hour]:[minute]"))
        .unwrap_or_else(|_| task.created_at.to_string());

    let mut out = String::new();
    let _ = writeln!(out, "{} {}", status_mark(task), task.title);
    let _ = writeln!(out, "  id:       {}", task.id);
    let _ = writeln!(out, "  priority: {}", task.priority);
    let _ = writeln!(out, "  due:      {}", due_cell(task, now));
    let _ = writeln!(out, "  category: {category}");
    let _ = writeln!(out, "  tags:     {}", or_dash(&task.tags.join(", ")));
    let _ = writeln!(out, "  created:  {created}");
    if !task.description.is_empty() {
        let _ = writeln!(out, "\n{}", task.description);
    }
    out
}

/// Current field values of an open form.
pub fn form_summary(form: &TaskForm, editing: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", if editing { "Editing task" } else { "New task" });
    let _ = writeln!(out, "  title:       {}", or_dash(&form.title));
    let _ = writeln!(out, "  description: {}", or_dash(&form.description));
    let _ = writeln!(out, "  due:         {}", or_dash(&form.due_date));
    let _ = writeln!(out, "  priority:    {}", form.priority);
    let _ = writeln!(out, "  category:    {}", or_dash(&form.category));
    let _ = writeln!(out, "  tags:        {}", or_dash(&form.tags.join(", ")));
    out
}

pub fn notification(note: &Notification) -> String {
    match note {
        Notification::Success(message) => format!("ok: {message}"),
        Notification::Error(message) => format!("error: {message}"),
    }
}
