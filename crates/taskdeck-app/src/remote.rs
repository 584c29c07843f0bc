//! Data services backed by a generic remote record store.
//!
//! Records use snake_case task fields plus the store's own `Id`, `Name`,
//! `Tags` (comma-joined) and `CreatedOn` columns. The transport itself is
//! abstracted behind [`RecordClient`].

use serde::{Deserialize, Serialize};
use serde_json::Value;
use taskdeck_core::id::{CategoryId, TaskId};
use taskdeck_core::{
    Category, CategoryDraft, Priority, Task, TaskDraft, format_due_date, parse_due_date,
};
use time::{OffsetDateTime, UtcOffset};
use time::format_description::well_known::Rfc3339;
use tracing::{info, warn};

use crate::data_service::{CategoryDataService, DataResult, DataServiceError, TaskDataService};

const TASK_TABLE: &str = "task";
const CATEGORY_TABLE: &str = "category";

const TASK_FIELDS: &[&str] = &[
    "Name",
    "Tags",
    "CreatedOn",
    "title",
    "description",
    "due_date",
    "priority",
    "category",
    "completed",
    "created_at",
];
const CATEGORY_FIELDS: &[&str] = &["Name", "Tags", "CreatedOn"];

/// Sort direction for [`FetchQuery`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// Smallest first.
    Ascending,
    /// Largest first.
    Descending,
}

/// Listing parameters passed to [`RecordClient::fetch_records`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchQuery {
    /// Columns to return.
    pub fields: &'static [&'static str],
    /// Column to sort on.
    pub order_by: &'static str,
    /// Sort direction.
    pub order: SortOrder,
    /// Page size.
    pub limit: usize,
    /// Page start.
    pub offset: usize,
}

impl FetchQuery {
    /// Newest tasks first, first page of 100.
    #[must_use]
    pub const fn tasks() -> Self {
        Self {
            fields: TASK_FIELDS,
            order_by: "CreatedOn",
            order: SortOrder::Descending,
            limit: 100,
            offset: 0,
        }
    }

    /// Categories by name, first page of 50.
    #[must_use]
    pub const fn categories() -> Self {
        Self {
            fields: CATEGORY_FIELDS,
            order_by: "Name",
            order: SortOrder::Ascending,
            limit: 50,
            offset: 0,
        }
    }
}

/// Per-record outcome of a batch write.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RecordResult {
    /// Whether this record was written.
    pub success: bool,
    /// Stored record, when the store echoes it back.
    #[serde(default)]
    pub data: Option<Value>,
    /// Failure reason reported by the store.
    #[serde(default)]
    pub message: Option<String>,
}

/// Transport to a remote table-oriented record store.
#[allow(async_fn_in_trait)]
pub trait RecordClient: Send + Sync {
    /// List records of a table.
    async fn fetch_records(&self, table: &str, query: &FetchQuery) -> anyhow::Result<Vec<Value>>;

    /// Fetch one record; `None` when the store has no such id.
    async fn get_record(
        &self,
        table: &str,
        id: &str,
        fields: &[&str],
    ) -> anyhow::Result<Option<Value>>;

    /// Insert records.
    async fn create_records(&self, table: &str, records: Vec<Value>)
    -> anyhow::Result<Vec<RecordResult>>;

    /// Update records identified by their `Id` column.
    async fn update_records(&self, table: &str, records: Vec<Value>)
    -> anyhow::Result<Vec<RecordResult>>;

    /// Delete records by id.
    async fn delete_records(&self, table: &str, ids: Vec<String>)
    -> anyhow::Result<Vec<RecordResult>>;
}

#[derive(Debug, Deserialize)]
struct TaskRecord {
    #[serde(rename = "Id")]
    id: TaskId,
    #[serde(rename = "Name", default)]
    name: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    due_date: Option<String>,
    #[serde(default)]
    priority: Option<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    completed: Option<bool>,
    #[serde(rename = "Tags", default)]
    tags: Option<String>,
    #[serde(default)]
    created_at: Option<String>,
    #[serde(rename = "CreatedOn", default)]
    created_on: Option<String>,
}

#[derive(Debug, Serialize)]
struct TaskRecordWrite<'a> {
    #[serde(rename = "Id", skip_serializing_if = "Option::is_none")]
    id: Option<TaskId>,
    #[serde(rename = "Name")]
    name: &'a str,
    title: &'a str,
    description: &'a str,
    due_date: String,
    priority: Priority,
    category: &'a str,
    completed: bool,
    #[serde(rename = "Tags")]
    tags: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    created_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CategoryRecord {
    #[serde(rename = "Id")]
    id: CategoryId,
    #[serde(rename = "Name", default)]
    name: Option<String>,
    #[serde(rename = "Tags", default)]
    tags: Option<String>,
    #[serde(rename = "CreatedOn", default)]
    created_on: Option<String>,
}

#[derive(Debug, Serialize)]
struct CategoryRecordWrite<'a> {
    #[serde(rename = "Id", skip_serializing_if = "Option::is_none")]
    id: Option<CategoryId>,
    #[serde(rename = "Name")]
    name: &'a str,
    #[serde(rename = "Tags")]
    tags: String,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|text| !text.trim().is_empty())
}

fn split_tags(joined: Option<&str>) -> Vec<String> {
    joined
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_owned)
        .collect()
}

fn parse_instant(text: Option<&str>) -> Option<OffsetDateTime> {
    text.and_then(|text| OffsetDateTime::parse(text.trim(), &Rfc3339).ok())
}

impl TaskRecord {
    fn into_task(self, offset: UtcOffset) -> Task {
        let due_date = self.due_date.as_deref().and_then(|text| {
            parse_due_date(text, offset).unwrap_or_else(|err| {
                warn!(task = %self.id, input = text, error = %err, "Ignoring unparseable due date");
                None
            })
        });
        let created_at = parse_instant(self.created_at.as_deref())
            .or_else(|| parse_instant(self.created_on.as_deref()))
            .unwrap_or_else(OffsetDateTime::now_utc);
        Task {
            id: self.id,
            title: non_blank(self.title)
                .or_else(|| non_blank(self.name))
                .unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            due_date,
            priority: self
                .priority
                .and_then(|token| token.parse().ok())
                .unwrap_or_default(),
            category: non_blank(self.category),
            completed: self.completed.unwrap_or(false),
            tags: split_tags(self.tags.as_deref()),
            created_at,
        }
    }
}

impl<'a> TaskRecordWrite<'a> {
    fn from_draft(
        id: Option<TaskId>,
        draft: &'a TaskDraft,
        created_at: Option<String>,
        offset: UtcOffset,
    ) -> Self {
        Self {
            id,
            name: &draft.title,
            title: &draft.title,
            description: &draft.description,
            due_date: draft
                .due_date
                .map(|due| format_due_date(due, offset))
                .unwrap_or_default(),
            priority: draft.priority,
            category: draft.category.as_deref().unwrap_or_default(),
            completed: draft.completed,
            tags: draft.tags.join(","),
            created_at,
        }
    }
}

impl CategoryRecord {
    fn into_category(self) -> Category {
        Category {
            id: self.id,
            name: self.name.unwrap_or_default(),
            tags: split_tags(self.tags.as_deref()),
            created_on: parse_instant(self.created_on.as_deref())
                .unwrap_or_else(OffsetDateTime::now_utc),
        }
    }
}

fn decode<T: for<'de> Deserialize<'de>>(entity: &'static str, value: Value) -> DataResult<T> {
    serde_json::from_value(value).map_err(|source| DataServiceError::Decode { entity, source })
}

fn encode<T: Serialize>(entity: &'static str, record: &T) -> DataResult<Value> {
    serde_json::to_value(record).map_err(|source| DataServiceError::Decode { entity, source })
}

/// First successful record echoed back by a batch write.
fn first_success(results: Vec<RecordResult>) -> Result<Value, Option<String>> {
    let mut reason = None;
    for result in results {
        if result.success {
            if let Some(data) = result.data {
                return Ok(data);
            }
        } else if reason.is_none() {
            reason = result.message;
        }
    }
    Err(reason)
}

/// [`TaskDataService`] over a [`RecordClient`].
///
/// Remote `due_date` columns hold calendar days, read and written at the
/// service's offset (UTC unless set).
#[derive(Debug, Clone)]
pub struct RemoteTaskService<R> {
    client: R,
    offset: UtcOffset,
}

impl<R: RecordClient> RemoteTaskService<R> {
    /// Wrap a record client.
    pub const fn new(client: R) -> Self {
        Self {
            client,
            offset: UtcOffset::UTC,
        }
    }

    /// Read and write due days at `offset`.
    #[must_use]
    pub const fn with_utc_offset(mut self, offset: UtcOffset) -> Self {
        self.offset = offset;
        self
    }
}

impl<R: RecordClient> TaskDataService for RemoteTaskService<R> {
    async fn get_all(&self) -> Vec<Task> {
        let records = match self.client.fetch_records(TASK_TABLE, &FetchQuery::tasks()).await {
            Ok(records) => records,
            Err(err) => {
                warn!(error = %err, "Failed to fetch tasks");
                return Vec::new();
            }
        };
        records
            .into_iter()
            .filter_map(|value| match decode::<TaskRecord>("task", value) {
                Ok(record) => Some(record.into_task(self.offset)),
                Err(err) => {
                    warn!(error = %err, "Skipping malformed task record");
                    None
                }
            })
            .collect()
    }

    async fn get_by_id(&self, id: TaskId) -> Option<Task> {
        let value = match self
            .client
            .get_record(TASK_TABLE, &id.to_string(), TASK_FIELDS)
            .await
        {
            Ok(value) => value?,
            Err(err) => {
                warn!(task = %id, error = %err, "Failed to fetch task");
                return None;
            }
        };
        match decode::<TaskRecord>("task", value) {
            Ok(record) => Some(record.into_task(self.offset)),
            Err(err) => {
                warn!(task = %id, error = %err, "Malformed task record");
                None
            }
        }
    }

    async fn create(&self, draft: TaskDraft) -> DataResult<Task> {
        let created_at = OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .map_err(|err| DataServiceError::Transport(err.into()))?;
        let record = encode(
            "task",
            &TaskRecordWrite::from_draft(None, &draft, Some(created_at), self.offset),
        )?;
        let results = self
            .client
            .create_records(TASK_TABLE, vec![record])
            .await
            .map_err(DataServiceError::Transport)?;
        let data = first_success(results).map_err(|reason| DataServiceError::Create {
            entity: "task",
            reason: reason.unwrap_or_else(|| "no record was created".to_owned()),
        })?;
        let task = decode::<TaskRecord>("task", data)?.into_task(self.offset);
        info!(task = %task.id, "Created remote task");
        Ok(task)
    }

    async fn update(&self, id: TaskId, draft: TaskDraft) -> DataResult<Task> {
        let record = encode(
            "task",
            &TaskRecordWrite::from_draft(Some(id), &draft, None, self.offset),
        )?;
        let results = self
            .client
            .update_records(TASK_TABLE, vec![record])
            .await
            .map_err(DataServiceError::Transport)?;
        let data = first_success(results).map_err(|_| DataServiceError::task_not_found(id))?;
        let task = decode::<TaskRecord>("task", data)?.into_task(self.offset);
        info!(task = %id, "Updated remote task");
        Ok(task)
    }

    async fn delete(&self, id: TaskId) -> DataResult<bool> {
        let results = self
            .client
            .delete_records(TASK_TABLE, vec![id.to_string()])
            .await
            .map_err(DataServiceError::Transport)?;
        let deleted = results.iter().any(|result| result.success);
        info!(task = %id, deleted, "Deleted remote task");
        Ok(deleted)
    }
}

/// [`CategoryDataService`] over a [`RecordClient`].
#[derive(Debug, Clone)]
pub struct RemoteCategoryService<R> {
    client: R,
}

impl<R: RecordClient> RemoteCategoryService<R> {
    /// Wrap a record client.
    pub const fn new(client: R) -> Self {
        Self { client }
    }
}

impl<R: RecordClient> CategoryDataService for RemoteCategoryService<R> {
    async fn get_all(&self) -> Vec<Category> {
        let records = match self
            .client
            .fetch_records(CATEGORY_TABLE, &FetchQuery::categories())
            .await
        {
            Ok(records) => records,
            Err(err) => {
                warn!(error = %err, "Failed to fetch categories");
                return Vec::new();
            }
        };
        records
            .into_iter()
            .filter_map(|value| match decode::<CategoryRecord>("category", value) {
                Ok(record) => Some(record.into_category()),
                Err(err) => {
                    warn!(error = %err, "Skipping malformed category record");
                    None
                }
            })
            .collect()
    }

    async fn get_by_id(&self, id: CategoryId) -> Option<Category> {
        match self
            .client
            .get_record(CATEGORY_TABLE, &id.to_string(), CATEGORY_FIELDS)
            .await
        {
            Ok(value) => decode::<CategoryRecord>("category", value?)
                .map(CategoryRecord::into_category)
                .map_err(|err| warn!(category = %id, error = %err, "Malformed category record"))
                .ok(),
            Err(err) => {
                warn!(category = %id, error = %err, "Failed to fetch category");
                None
            }
        }
    }

    async fn create(&self, draft: CategoryDraft) -> DataResult<Category> {
        let record = encode(
            "category",
            &CategoryRecordWrite {
                id: None,
                name: &draft.name,
                tags: draft.tags.join(","),
            },
        )?;
        let results = self
            .client
            .create_records(CATEGORY_TABLE, vec![record])
            .await
            .map_err(DataServiceError::Transport)?;
        let data = first_success(results).map_err(|reason| DataServiceError::Create {
            entity: "category",
            reason: reason.unwrap_or_else(|| "no record was created".to_owned()),
        })?;
        let category = decode::<CategoryRecord>("category", data)?.into_category();
        info!(category = %category.id, "Created remote category");
        Ok(category)
    }

    async fn update(&self, id: CategoryId, draft: CategoryDraft) -> DataResult<Category> {
        let record = encode(
            "category",
            &CategoryRecordWrite {
                id: Some(id),
                name: &draft.name,
                tags: draft.tags.join(","),
            },
        )?;
        let results = self
            .client
            .update_records(CATEGORY_TABLE, vec![record])
            .await
            .map_err(DataServiceError::Transport)?;
        let data = first_success(results).map_err(|_| DataServiceError::category_not_found(id))?;
        let category = decode::<CategoryRecord>("category", data)?.into_category();
        info!(category = %id, "Updated remote category");
        Ok(category)
    }

    async fn delete(&self, id: CategoryId) -> DataResult<bool> {
        let results = self
            .client
            .delete_records(CATEGORY_TABLE, vec![id.to_string()])
            .await
            .map_err(DataServiceError::Transport)?;
        Ok(results.iter().any(|result| result.success))
    }
}
