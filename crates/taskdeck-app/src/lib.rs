//! Application layer for taskdeck.
//!
//! This crate owns the session state (task store, filter, editor), the data
//! service contract with its in-memory and remote backends, and configuration
//! shared by the CLI.

pub mod config;
pub mod data_service;
pub mod editor;
pub mod memory;
pub mod notification;
pub mod remote;
pub mod session;
pub mod task_store;
pub mod validator;

// Re-exports for convenience
pub use config::{AppConfig, CONFIG_FILE};
pub use data_service::{CategoryDataService, DataResult, DataServiceError, TaskDataService};
pub use editor::{EditSession, EditorError, EditorState, SubmitRequest, TaskEditor};
pub use memory::{MemoryBackend, MemoryCategoryService, MemoryTaskService, SeedData};
pub use notification::Notification;
pub use remote::{FetchQuery, RecordClient, RecordResult, RemoteCategoryService, RemoteTaskService};
pub use session::TaskSession;
pub use task_store::{TaskSnapshot, TaskStore};
pub use validator::{TaskForm, ValidationError, normalize_tags, toggled, validate};
