//! Task entry state kept beside the store.
//!
//! # Responsibility
//! - Hold the ambient category and the active view filter.
//! - Route manual submits and interpreted commands into `TaskStore`.
//!
//! # Invariants
//! - A command's create-intent is added before its category hint is
//!   applied, so the hint only affects later entries.
//! - Clearing completed tasks never leaves the board on an empty
//!   `Completed` filter.

use crate::command::interpreter::{interpret, Interpretation};
use crate::kv::KeyValueStore;
use crate::model::task::{TaskCategory, TaskFilter, TaskId};
use crate::speech::{SpeechEvent, SpeechSource, VoiceSession};
use crate::store::task_store::{TaskCounts, TaskStore, TaskView};
use log::debug;

/// Effect of one applied command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutcome {
    pub created: Option<TaskId>,
    pub category_update: Option<TaskCategory>,
}

/// Entry-form and filter state over a `TaskStore`.
pub struct TaskBoard<S: KeyValueStore> {
    store: TaskStore<S>,
    ambient: TaskCategory,
    filter: TaskFilter,
}

impl<S: KeyValueStore> TaskBoard<S> {
    pub fn new(store: TaskStore<S>) -> Self {
        Self {
            store,
            ambient: TaskCategory::None,
            filter: TaskFilter::All,
        }
    }

    pub fn store(&self) -> &TaskStore<S> {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut TaskStore<S> {
        &mut self.store
    }

    pub fn into_store(self) -> TaskStore<S> {
        self.store
    }

    pub fn ambient_category(&self) -> TaskCategory {
        self.ambient
    }

    pub fn set_ambient_category(&mut self, category: TaskCategory) {
        self.ambient = category;
    }

    pub fn filter(&self) -> TaskFilter {
        self.filter
    }

    pub fn set_filter(&mut self, filter: TaskFilter) {
        self.filter = filter;
    }

    pub fn visible(&self) -> TaskView<'_> {
        self.store.view(self.filter)
    }

    pub fn counts(&self) -> TaskCounts {
        self.store.counts()
    }

    /// Adds `text` with the ambient category, as a form submit does.
    ///
    /// On success the ambient category resets to `none`. Blank text changes
    /// nothing, including the category.
    pub fn submit(&mut self, text: &str) -> Option<TaskId> {
        let id = self.store.add(text, self.ambient)?;
        self.ambient = TaskCategory::None;
        Some(id)
    }

    /// Interprets and applies one free-text command.
    pub fn apply_command(&mut self, utterance: &str) -> CommandOutcome {
        let Interpretation {
            intent,
            category_update,
        } = interpret(
            utterance,
            self.ambient,
            self.store.config().max_title_chars,
        );

        let created = intent.and_then(|intent| self.store.add(&intent.title, intent.category));
        if let Some(category) = category_update {
            self.ambient = category;
        }

        debug!(
            "event=command_apply module=board status=ok created={} category_update={}",
            created.is_some(),
            category_update.map_or("none", TaskCategory::as_str)
        );
        CommandOutcome {
            created,
            category_update,
        }
    }

    /// Forwards a recognizer event; a final transcript becomes a command.
    pub fn handle_voice_event<V: SpeechSource>(
        &mut self,
        session: &mut VoiceSession<V>,
        event: SpeechEvent,
    ) -> Option<CommandOutcome> {
        let transcript = session.handle_event(event)?;
        Some(self.apply_command(&transcript))
    }

    /// Clears completed tasks and leaves the `Completed` filter.
    pub fn clear_completed(&mut self) -> usize {
        let removed = self.store.clear_completed();
        if self.filter == TaskFilter::Completed {
            self.filter = TaskFilter::All;
        }
        removed
    }
}
