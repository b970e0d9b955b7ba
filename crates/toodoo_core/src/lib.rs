//! Core domain logic for Toodoo.
//! This crate owns the task collection, the onboarding profile and the
//! command interpreter; presentation layers only read views and call
//! operations.

pub mod board;
pub mod command;
pub mod config;
pub mod db;
pub mod kv;
pub mod logging;
pub mod model;
pub mod speech;
pub mod store;

pub use board::{CommandOutcome, TaskBoard};
pub use command::interpreter::{detect_category, interpret, CreateIntent, Interpretation};
pub use config::{ConfigError, CoreConfig};
pub use kv::{KeyValueStore, KvError, KvResult, MemoryKeyValueStore, SqliteKeyValueStore};
pub use logging::{default_log_level, init_logging, logging_status, LoggingConfig, LoggingError};
pub use model::profile::UserProfile;
pub use model::task::{normalize_title, Task, TaskCategory, TaskFilter, TaskId};
pub use speech::{
    ListeningState, SpeechError, SpeechEvent, SpeechSource, VoiceError, VoiceSession,
};
pub use store::profile_store::{ProfileError, ProfileStore};
pub use store::task_store::{SubscriptionId, TaskChange, TaskCounts, TaskStore, TaskView};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
