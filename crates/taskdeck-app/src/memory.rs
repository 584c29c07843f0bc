//! In-memory data service backend, optionally seeded from a JSON file.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use taskdeck_core::id::{CategoryId, TaskId};
use taskdeck_core::{Category, CategoryDraft, Task, TaskDraft, parse_due_date};
use time::format_description::well_known::Rfc3339;
use time::{OffsetDateTime, UtcOffset};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::data_service::{CategoryDataService, DataResult, DataServiceError, TaskDataService};

/// Contents of a seed file (`{ "tasks": [...], "categories": [...] }`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeedData {
    /// Initial tasks.
    #[serde(default)]
    pub tasks: Vec<Task>,
    /// Initial categories.
    #[serde(default)]
    pub categories: Vec<Category>,
}

/// Seed file as read from disk, before date-only due dates are anchored.
#[derive(Deserialize)]
struct RawSeed {
    #[serde(default)]
    tasks: Vec<Value>,
    #[serde(default)]
    categories: Vec<Category>,
}

impl SeedData {
    /// Read and parse a seed file. Date-only `dueDate` values mean midnight at `offset`.
    ///
    /// # Errors
    /// Returns an error when the file cannot be read or is not valid seed JSON.
    pub fn load(path: impl AsRef<Path>, offset: UtcOffset) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let seed = Self::from_json(&contents, offset)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        debug!(
            tasks = seed.tasks.len(),
            categories = seed.categories.len(),
            path = %path.display(),
            "Loaded seed data"
        );
        Ok(seed)
    }

    fn from_json(contents: &str, offset: UtcOffset) -> Result<Self> {
        let raw: RawSeed = serde_json::from_str(contents)?;
        let tasks = raw
            .tasks
            .into_iter()
            .map(|mut value| -> Result<Task> {
                anchor_due_date(&mut value, offset)?;
                Ok(serde_json::from_value(value)?)
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            tasks,
            categories: raw.categories,
        })
    }
}

/// Rewrite a task's `dueDate` text as a full instant at `offset`.
fn anchor_due_date(task: &mut Value, offset: UtcOffset) -> Result<()> {
    let Some(slot) = task.get_mut("dueDate") else {
        return Ok(());
    };
    let Some(text) = slot.as_str() else {
        return Ok(());
    };
    let due = parse_due_date(text, offset).with_context(|| format!("invalid dueDate '{text}'"))?;
    *slot = match due {
        Some(instant) => Value::String(instant.format(&Rfc3339)?),
        None => Value::Null,
    };
    Ok(())
}

/// Shared record lists behind the task and category services.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    tasks: Arc<Mutex<Vec<Task>>>,
    categories: Arc<Mutex<Vec<Category>>>,
    latency: Duration,
}

impl MemoryBackend {
    /// Empty backend without simulated latency.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend pre-populated with seed records.
    #[must_use]
    pub fn from_seed(seed: SeedData) -> Self {
        Self {
            tasks: Arc::new(Mutex::new(seed.tasks)),
            categories: Arc::new(Mutex::new(seed.categories)),
            latency: Duration::ZERO,
        }
    }

    /// Sleep this long before answering each call.
    #[must_use]
    pub const fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Task service sharing this backend's records.
    #[must_use]
    pub fn task_service(&self) -> MemoryTaskService {
        MemoryTaskService {
            records: Arc::clone(&self.tasks),
            latency: self.latency,
        }
    }

    /// Category service sharing this backend's records.
    #[must_use]
    pub fn category_service(&self) -> MemoryCategoryService {
        MemoryCategoryService {
            records: Arc::clone(&self.categories),
            latency: self.latency,
        }
    }
}

async fn simulate_latency(latency: Duration) {
    if !latency.is_zero() {
        tokio::time::sleep(latency).await;
    }
}

/// [`TaskDataService`] over the in-memory record list.
#[derive(Debug, Clone)]
pub struct MemoryTaskService {
    records: Arc<Mutex<Vec<Task>>>,
    latency: Duration,
}

impl TaskDataService for MemoryTaskService {
    async fn get_all(&self) -> Vec<Task> {
        simulate_latency(self.latency).await;
        self.records.lock().await.clone()
    }

    async fn get_by_id(&self, id: TaskId) -> Option<Task> {
        simulate_latency(self.latency).await;
        self.records
            .lock()
            .await
            .iter()
            .find(|task| task.id == id)
            .cloned()
    }

    async fn create(&self, draft: TaskDraft) -> DataResult<Task> {
        simulate_latency(self.latency).await;
        let task = Task::from_draft(TaskId::new(), OffsetDateTime::now_utc(), draft);
        self.records.lock().await.push(task.clone());
        info!(task = %task.id, "Created task");
        Ok(task)
    }

    async fn update(&self, id: TaskId, draft: TaskDraft) -> DataResult<Task> {
        simulate_latency(self.latency).await;
        let mut records = self.records.lock().await;
        let Some(slot) = records.iter_mut().find(|task| task.id == id) else {
            return Err(DataServiceError::task_not_found(id));
        };
        *slot = Task::from_draft(id, slot.created_at, draft);
        info!(task = %id, "Updated task");
        Ok(slot.clone())
    }

    async fn delete(&self, id: TaskId) -> DataResult<bool> {
        simulate_latency(self.latency).await;
        let mut records = self.records.lock().await;
        let Some(index) = records.iter().position(|task| task.id == id) else {
            return Err(DataServiceError::task_not_found(id));
        };
        records.remove(index);
        info!(task = %id, "Deleted task");
        Ok(true)
    }
}

/// [`CategoryDataService`] over the in-memory record list.
#[derive(Debug, Clone)]
pub struct MemoryCategoryService {
    records: Arc<Mutex<Vec<Category>>>,
    latency: Duration,
}

impl CategoryDataService for MemoryCategoryService {
    async fn get_all(&self) -> Vec<Category> {
        simulate_latency(self.latency).await;
        self.records.lock().await.clone()
    }

    async fn get_by_id(&self, id: CategoryId) -> Option<Category> {
        simulate_latency(self.latency).await;
        self.records
            .lock()
            .await
            .iter()
            .find(|category| category.id == id)
            .cloned()
    }

    async fn create(&self, draft: CategoryDraft) -> DataResult<Category> {
        simulate_latency(self.latency).await;
        let category = Category {
            id: CategoryId::new(),
            name: draft.name,
            tags: draft.tags,
            created_on: OffsetDateTime::now_utc(),
        };
        self.records.lock().await.push(category.clone());
        info!(category = %category.id, name = %category.name, "Created category");
        Ok(category)
    }

    async fn update(&self, id: CategoryId, draft: CategoryDraft) -> DataResult<Category> {
        simulate_latency(self.latency).await;
        let mut records = self.records.lock().await;
        let Some(slot) = records.iter_mut().find(|category| category.id == id) else {
            return Err(DataServiceError::category_not_found(id));
        };
        slot.name = draft.name;
        slot.tags = draft.tags;
        info!(category = %id, "Updated category");
        Ok(slot.clone())
    }

    async fn delete(&self, id: CategoryId) -> DataResult<bool> {
        simulate_latency(self.latency).await;
        let mut records = self.records.lock().await;
        let Some(index) = records.iter().position(|category| category.id == id) else {
            return Err(DataServiceError::category_not_found(id));
        };
        records.remove(index);
        info!(category = %id, "Deleted category");
        Ok(true)
    }
}
