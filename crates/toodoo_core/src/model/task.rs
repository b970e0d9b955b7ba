//! Task domain model.
//!
//! # Responsibility
//! - Define the task record, its category set and the display filters.
//! - Provide copy-on-write helpers used by store mutations.
//!
//! # Invariants
//! - `title` is trimmed, non-empty and at most the configured char bound.
//! - `id` and `created_at` never change after creation.
//! - `order` is assigned once and is not renumbered when tasks are removed.

use chrono::{DateTime, SubsecRound, Utc};
use uuid::Uuid;

/// Stable identifier for a task.
pub type TaskId = Uuid;

/// Closed set of task categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TaskCategory {
    #[default]
    None,
    Work,
    Personal,
    Urgent,
}

impl TaskCategory {
    /// All categories in picker order.
    pub const ALL: [TaskCategory; 4] = [
        TaskCategory::None,
        TaskCategory::Work,
        TaskCategory::Personal,
        TaskCategory::Urgent,
    ];

    /// Stable string id used in persisted records.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Work => "work",
            Self::Personal => "personal",
            Self::Urgent => "urgent",
        }
    }

    /// Parses a persisted category id. Matching is case-insensitive.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "none" => Some(Self::None),
            "work" => Some(Self::Work),
            "personal" => Some(Self::Personal),
            "urgent" => Some(Self::Urgent),
            _ => None,
        }
    }
}

/// Completion filter applied by task views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TaskFilter {
    #[default]
    All,
    Active,
    Completed,
}

impl TaskFilter {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Active => "active",
            Self::Completed => "completed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "all" => Some(Self::All),
            "active" => Some(Self::Active),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }

    /// Returns whether `task` belongs to this filter.
    pub fn matches(self, task: &Task) -> bool {
        match self {
            Self::All => true,
            Self::Active => !task.completed,
            Self::Completed => task.completed,
        }
    }
}

/// One to-do record.
///
/// Records are replaced wholesale on mutation; the `toggled`/`retitled`/
/// `recategorized` helpers return a fresh copy and leave `self` untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub completed: bool,
    pub category: TaskCategory,
    /// UTC creation time, millisecond precision.
    pub created_at: DateTime<Utc>,
    /// Display rank among tasks of the same completion state.
    pub order: u64,
}

impl Task {
    /// Creates an incomplete task with a generated id.
    ///
    /// `title` must already be normalized with [`normalize_title`].
    pub fn new(title: impl Into<String>, category: TaskCategory, order: u64) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            completed: false,
            category,
            created_at: now_millis(),
            order,
        }
    }

    pub fn toggled(&self) -> Self {
        Self {
            completed: !self.completed,
            ..self.clone()
        }
    }

    pub fn retitled(&self, title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..self.clone()
        }
    }

    pub fn recategorized(&self, category: TaskCategory) -> Self {
        Self {
            category,
            ..self.clone()
        }
    }
}

/// Trims and bounds a raw title.
///
/// Returns `None` when nothing but whitespace remains. The bound counts
/// chars, not bytes, and the result is trimmed again after truncation so a
/// cut never leaves trailing whitespace behind.
pub fn normalize_title(raw: &str, max_chars: usize) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || max_chars == 0 {
        return None;
    }
    if trimmed.chars().count() <= max_chars {
        return Some(trimmed.to_string());
    }

    let truncated: String = trimmed.chars().take(max_chars).collect();
    Some(truncated.trim_end().to_string())
}

/// Current UTC time truncated to whole milliseconds, the persisted precision.
pub fn now_millis() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}
