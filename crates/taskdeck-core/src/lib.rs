//! Domain types, filtering and statistics for taskdeck.

/// Visible-list filtering (status + free text).
pub mod filter;
/// Identifier types.
pub mod id;
/// Summary counts and due-date classification.
pub mod stats;
/// Case-insensitive search over task text.
pub mod text_matcher;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime, UtcOffset};

use crate::id::{CategoryId, TaskId};

pub use filter::{StatusFilter, StatusFilterParseError, TaskFilter};
pub use stats::{DueStatus, TaskStats};
pub use text_matcher::TextMatcher;

/// Task urgency shown next to the title.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Can wait.
    Low,
    /// Default for new tasks.
    #[default]
    Medium,
    /// Should be handled first.
    High,
}

impl Priority {
    /// Wire/token form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when a priority token is not one of `low`, `medium`, `high`.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid priority: {0} (expected low, medium or high)")]
pub struct PriorityParseError(pub String);

impl FromStr for Priority {
    type Err = PriorityParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(PriorityParseError(s.to_owned())),
        }
    }
}

/// A to-do item as held by the task store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Identifier assigned by the data service.
    pub id: TaskId,
    /// Non-empty, trimmed title.
    pub title: String,
    /// Free-form description (may be empty).
    #[serde(default)]
    pub description: String,
    /// Due instant; `None` hides due-date displays. A date-only value decodes
    /// as midnight UTC; loaders that know the viewer's offset re-anchor it.
    #[serde(default, with = "due_date_serde")]
    pub due_date: Option<OffsetDateTime>,
    /// Priority level.
    #[serde(default)]
    pub priority: Priority,
    /// Name of a category (soft reference, may dangle).
    #[serde(default, with = "optional_text")]
    pub category: Option<String>,
    /// Completion flag.
    #[serde(default)]
    pub completed: bool,
    /// Tags in insertion order.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Creation instant, never changed by updates.
    #[serde(default = "OffsetDateTime::now_utc", with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Task {
    /// Build a full task from a draft once an id and creation time are known.
    #[must_use]
    pub fn from_draft(id: TaskId, created_at: OffsetDateTime, draft: TaskDraft) -> Self {
        let TaskDraft {
            title,
            description,
            due_date,
            priority,
            category,
            completed,
            tags,
            created_at: _,
        } = draft;
        Self {
            id,
            title,
            description,
            due_date,
            priority,
            category,
            completed,
            tags,
            created_at,
        }
    }

    /// Copy every field except the id into a draft.
    #[must_use]
    pub fn to_draft(&self) -> TaskDraft {
        TaskDraft {
            title: self.title.clone(),
            description: self.description.clone(),
            due_date: self.due_date,
            priority: self.priority,
            category: self.category.clone(),
            completed: self.completed,
            tags: self.tags.clone(),
            created_at: Some(self.created_at),
        }
    }
}

/// Task fields without an id, as sent to the data service.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TaskDraft {
    /// Trimmed title.
    pub title: String,
    /// Trimmed description.
    pub description: String,
    /// Normalized due instant.
    pub due_date: Option<OffsetDateTime>,
    /// Priority level.
    pub priority: Priority,
    /// Category name.
    pub category: Option<String>,
    /// Completion flag.
    pub completed: bool,
    /// De-duplicated tags.
    pub tags: Vec<String>,
    /// Creation instant carried over on edit (`None` for new tasks).
    pub created_at: Option<OffsetDateTime>,
}

/// A named grouping label tasks can reference by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    /// Identifier assigned by the data service.
    pub id: CategoryId,
    /// Display name, matched against `Task::category`.
    pub name: String,
    /// The category's own tags.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Creation instant.
    #[serde(default = "OffsetDateTime::now_utc", with = "time::serde::rfc3339")]
    pub created_on: OffsetDateTime,
}

/// Category fields without an id.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CategoryDraft {
    /// Display name.
    pub name: String,
    /// Category tags.
    pub tags: Vec<String>,
}

/// Look up the category a task points at. Dangling names resolve to `None`.
#[must_use]
pub fn resolve_category<'a>(task: &Task, categories: &'a [Category]) -> Option<&'a Category> {
    let name = task.category.as_deref()?;
    categories.iter().find(|category| category.name == name)
}

/// Parse user or wire input into a due instant.
///
/// Blank input means "no due date". A plain `YYYY-MM-DD` date expands to
/// midnight of that day at `offset`, so its calendar day stays the same when
/// viewed in that offset. Full RFC 3339 instants are kept as-is.
///
/// # Errors
/// Returns the parse error of the date-only format when neither form matches.
pub fn parse_due_date(
    input: &str,
    offset: UtcOffset,
) -> Result<Option<OffsetDateTime>, time::error::Parse> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    if let Ok(instant) = OffsetDateTime::parse(trimmed, &Rfc3339) {
        return Ok(Some(instant));
    }
    let date = Date::parse(trimmed, format_description!("[year]-[month]-[day]"))?;
    Ok(Some(date.midnight().assume_offset(offset)))
}

/// Calendar day of a due instant at `offset`, as `YYYY-MM-DD`.
#[must_use]
pub fn format_due_date(due: OffsetDateTime, offset: UtcOffset) -> String {
    format_date(due.to_offset(offset).date())
}

/// Render the calendar day of an instant as `YYYY-MM-DD`.
#[must_use]
pub fn format_date(date: Date) -> String {
    date.format(format_description!("[year]-[month]-[day]"))
        .unwrap_or_else(|_| date.to_string())
}

mod due_date_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use time::OffsetDateTime;
    use time::format_description::well_known::Rfc3339;

    #[allow(clippy::ref_option)]
    pub fn serialize<S>(value: &Option<OffsetDateTime>, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(instant) => match instant.format(&Rfc3339) {
                Ok(text) => s.serialize_str(&text),
                Err(err) => Err(serde::ser::Error::custom(err)),
            },
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(d: D) -> Result<Option<OffsetDateTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(d)?;
        raw.map_or(Ok(None), |text| {
            super::parse_due_date(&text, time::UtcOffset::UTC).map_err(serde::de::Error::custom)
        })
    }
}

mod optional_text {
    use serde::{Deserialize, Deserializer, Serializer};

    #[allow(clippy::ref_option)]
    pub fn serialize<S>(value: &Option<String>, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        s.serialize_str(value.as_deref().unwrap_or(""))
    }

    pub fn deserialize<'de, D>(d: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(d)?;
        Ok(raw.filter(|text| !text.trim().is_empty()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{date, datetime, offset};

    fn fixed_task_id(n: u8) -> TaskId {
        TaskId::from_str(&format!("00000000-0000-0000-0000-0000000000{n:02}"))
            .unwrap_or_else(|err| panic!("must parse task id: {err}"))
    }

    #[test]
    fn priority_defaults_to_medium_and_parses_tokens() {
        assert_eq!(Priority::default(), Priority::Medium);
        assert_eq!("HIGH".parse::<Priority>(), Ok(Priority::High));
        assert_eq!(" low ".parse::<Priority>(), Ok(Priority::Low));
        assert!("urgent".parse::<Priority>().is_err());
    }

    #[test]
    fn parse_due_date_handles_blank_date_only_and_instants() {
        let none = parse_due_date("   ", UtcOffset::UTC)
            .unwrap_or_else(|err| panic!("blank must parse: {err}"));
        assert!(none.is_none());

        let date_only = parse_due_date("2020-01-01", UtcOffset::UTC)
            .unwrap_or_else(|err| panic!("date must parse: {err}"));
        assert_eq!(date_only, Some(datetime!(2020-01-01 00:00 UTC)));

        let instant = parse_due_date("2025-03-04T10:30:00+09:00", offset!(-5))
            .unwrap_or_else(|err| panic!("instant must parse: {err}"));
        assert_eq!(instant, Some(datetime!(2025-03-04 10:30 +09:00)));

        assert!(parse_due_date("next tuesday", UtcOffset::UTC).is_err());
    }

    #[test]
    fn date_only_due_date_keeps_its_day_at_the_given_offset() {
        for offset in [offset!(-8), offset!(-5), offset!(+9), offset!(+14)] {
            let due = parse_due_date("2025-01-10", offset)
                .unwrap_or_else(|err| panic!("date must parse: {err}"))
                .unwrap_or_else(|| panic!("date must be present"));
            assert_eq!(due.to_offset(offset).date(), date!(2025-01-10));
            assert_eq!(format_due_date(due, offset), "2025-01-10");
        }
        let new_york = parse_due_date("2025-01-10", offset!(-5))
            .unwrap_or_else(|err| panic!("date must parse: {err}"));
        assert_eq!(new_york, Some(datetime!(2025-01-10 05:00 UTC)));
    }

    #[test]
    fn task_deserializes_seed_shape_with_defaults() {
        let json = r#"{
            "id": "00000000-0000-0000-0000-000000000001",
            "title": "Buy milk",
            "dueDate": "",
            "category": "",
            "createdAt": "2024-12-31T08:00:00Z"
        }"#;
        let task: Task =
            serde_json::from_str(json).unwrap_or_else(|err| panic!("seed task must parse: {err}"));
        assert_eq!(task.id, fixed_task_id(1));
        assert_eq!(task.priority, Priority::Medium);
        assert!(task.due_date.is_none());
        assert!(task.category.is_none());
        assert!(!task.completed);
        assert!(task.tags.is_empty());
        assert_eq!(task.created_at, datetime!(2024-12-31 08:00 UTC));
    }

    #[test]
    fn task_serializes_camel_case_fields() {
        let task = Task {
            id: fixed_task_id(2),
            title: "Ship".into(),
            description: String::new(),
            due_date: Some(datetime!(2025-01-02 00:00 UTC)),
            priority: Priority::High,
            category: Some("Work".into()),
            completed: true,
            tags: vec!["release".into()],
            created_at: datetime!(2025-01-01 00:00 UTC),
        };
        let value = serde_json::to_value(&task)
            .unwrap_or_else(|err| panic!("task must serialize: {err}"));
        assert_eq!(value["dueDate"], "2025-01-02T00:00:00Z");
        assert_eq!(value["createdAt"], "2025-01-01T00:00:00Z");
        assert_eq!(value["priority"], "high");
        assert_eq!(value["category"], "Work");
    }

    #[test]
    fn draft_roundtrip_keeps_id_and_creation_time_outside() {
        let created = datetime!(2025-01-01 00:00 UTC);
        let draft = TaskDraft {
            title: "Plan".into(),
            tags: vec!["a".into()],
            ..TaskDraft::default()
        };
        let task = Task::from_draft(fixed_task_id(3), created, draft.clone());
        assert_eq!(task.created_at, created);
        let back = task.to_draft();
        assert_eq!(back.title, draft.title);
        assert_eq!(back.tags, draft.tags);
        assert_eq!(back.created_at, Some(created));
    }

    #[test]
    fn resolve_category_tolerates_dangling_names() {
        let work = Category {
            id: CategoryId::new(),
            name: "Work".into(),
            tags: Vec::new(),
            created_on: datetime!(2025-01-01 00:00 UTC),
        };
        let mut task = Task::from_draft(
            fixed_task_id(4),
            datetime!(2025-01-01 00:00 UTC),
            TaskDraft {
                title: "Report".into(),
                category: Some("Work".into()),
                ..TaskDraft::default()
            },
        );
        let categories = vec![work];
        assert_eq!(
            resolve_category(&task, &categories).map(|c| c.name.as_str()),
            Some("Work")
        );

        task.category = Some("Deleted".into());
        assert!(resolve_category(&task, &categories).is_none());

        task.category = None;
        assert!(resolve_category(&task, &categories).is_none());
    }
}
