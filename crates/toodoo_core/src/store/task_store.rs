//! Task collection state container.
//!
//! # Responsibility
//! - Own the task collection and apply every mutation to it.
//! - Mirror the collection to the key-value backend after each change.
//! - Notify subscribers and expose derived, filtered views.
//!
//! # Invariants
//! - Mutations are total: invalid input or an unknown id leaves the
//!   collection, the backend and the revision untouched.
//! - The in-memory collection is authoritative. Backend failures are logged
//!   and never surface to callers.
//! - Views are derived on demand; stored `order` values are never rewritten.

use crate::config::{ConfigError, CoreConfig};
use crate::kv::KeyValueStore;
use crate::model::task::{normalize_title, Task, TaskCategory, TaskFilter, TaskId};
use crate::store::codec::{decode_tasks, encode_tasks};
use log::{debug, error, info, warn};

/// Mutation applied to the collection, delivered to subscribers afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskChange {
    Added(TaskId),
    Updated(TaskId),
    Removed(TaskId),
    /// Bulk removal by `clear_completed`, in collection order.
    ClearedCompleted(Vec<TaskId>),
    /// Collection replaced from the backend; carries the loaded count.
    Loaded(usize),
}

/// Handle returned by [`TaskStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Observer = Box<dyn FnMut(&TaskChange)>;

/// Active/completed tallies for the whole collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskCounts {
    pub active: usize,
    pub completed: usize,
}

impl TaskCounts {
    pub fn total(&self) -> usize {
        self.active + self.completed
    }
}

/// Ordered, filtered snapshot of a store.
///
/// Iterating does not consume the view; call [`TaskView::iter`] as often as
/// needed.
#[derive(Debug, Clone)]
pub struct TaskView<'a> {
    filter: TaskFilter,
    ordered: Vec<&'a Task>,
}

impl<'a> TaskView<'a> {
    fn new(tasks: &'a [Task], filter: TaskFilter) -> Self {
        let mut ordered: Vec<&Task> = tasks.iter().filter(|task| filter.matches(task)).collect();
        // Stable: tasks sharing an `order` (legacy backfill) keep collection order.
        ordered.sort_by_key(|task| (task.completed, task.order));
        Self { filter, ordered }
    }

    pub fn filter(&self) -> TaskFilter {
        self.filter
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a Task> + '_ {
        self.ordered.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }

    pub fn ids(&self) -> Vec<TaskId> {
        self.iter().map(|task| task.id).collect()
    }
}

impl<'v, 'a> IntoIterator for &'v TaskView<'a> {
    type Item = &'a Task;
    type IntoIter = std::iter::Copied<std::slice::Iter<'v, &'a Task>>;

    fn into_iter(self) -> Self::IntoIter {
        self.ordered.iter().copied()
    }
}

/// Single source of truth for the task collection.
///
/// All methods run to completion on the caller's thread. There is no
/// internal locking; exclusive access comes from `&mut self`.
pub struct TaskStore<S: KeyValueStore> {
    backend: S,
    config: CoreConfig,
    tasks: Vec<Task>,
    revision: u64,
    observers: Vec<(SubscriptionId, Observer)>,
    next_subscription: u64,
}

impl<S: KeyValueStore> TaskStore<S> {
    /// Creates an empty store with default configuration.
    ///
    /// Nothing is read from `backend` until [`TaskStore::load`] runs.
    pub fn new(backend: S) -> Self {
        Self::build(backend, CoreConfig::default())
    }

    /// Creates an empty store with custom configuration.
    pub fn with_config(backend: S, config: CoreConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(backend, config))
    }

    /// Creates a store and loads the persisted collection.
    pub fn open(backend: S, config: CoreConfig) -> Result<Self, ConfigError> {
        let mut store = Self::with_config(backend, config)?;
        store.load();
        Ok(store)
    }

    fn build(backend: S, config: CoreConfig) -> Self {
        Self {
            backend,
            config,
            tasks: Vec::new(),
            revision: 0,
            observers: Vec::new(),
            next_subscription: 0,
        }
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    pub fn into_backend(self) -> S {
        self.backend
    }

    /// Tasks in insertion order.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Bumped once per effective mutation, including `load`.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn counts(&self) -> TaskCounts {
        let completed = self.tasks.iter().filter(|task| task.completed).count();
        TaskCounts {
            active: self.tasks.len() - completed,
            completed,
        }
    }

    /// Derived display sequence: incomplete tasks first, then ascending `order`.
    pub fn view(&self, filter: TaskFilter) -> TaskView<'_> {
        TaskView::new(&self.tasks, filter)
    }

    /// Registers an observer called after every effective mutation.
    pub fn subscribe(&mut self, observer: impl FnMut(&TaskChange) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Removes an observer. Returns `false` when `id` was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(registered, _)| *registered != id);
        self.observers.len() != before
    }

    /// Replaces the collection with the persisted one.
    ///
    /// Missing data yields an empty collection. A read failure or a payload
    /// that does not parse is logged and also yields an empty collection.
    pub fn load(&mut self) -> &[Task] {
        let raw = match self.backend.get(&self.config.tasks_key) {
            Ok(raw) => raw,
            Err(err) => {
                error!(
                    "event=tasks_load module=store status=error error_code=kv_read_failed error={}",
                    err
                );
                None
            }
        };

        self.tasks = match raw {
            None => Vec::new(),
            Some(raw) => match decode_tasks(&raw, self.config.max_title_chars) {
                Ok(decoded) => {
                    info!(
                        "event=tasks_load module=store status=ok count={} skipped={} backfilled={}",
                        decoded.tasks.len(),
                        decoded.skipped,
                        decoded.backfilled
                    );
                    decoded.tasks
                }
                Err(err) => {
                    error!(
                        "event=tasks_load module=store status=error error_code=parse_failed error={}",
                        err
                    );
                    Vec::new()
                }
            },
        };

        self.revision += 1;
        self.notify(&TaskChange::Loaded(self.tasks.len()));
        &self.tasks
    }

    /// Appends a new incomplete task.
    ///
    /// Returns `None` without side effects when `title` is blank.
    pub fn add(&mut self, title: &str, category: TaskCategory) -> Option<TaskId> {
        let Some(title) = normalize_title(title, self.config.max_title_chars) else {
            debug!("event=task_add module=store status=skip reason=empty_title");
            return None;
        };

        let task = Task::new(title, category, self.tasks.len() as u64);
        let id = task.id;
        debug!(
            "event=task_add module=store status=ok task_id={} category={} order={}",
            id,
            category.as_str(),
            task.order
        );
        self.tasks.push(task);
        self.commit(TaskChange::Added(id));
        Some(id)
    }

    /// Removes the task with `id`. Unknown ids are ignored.
    pub fn delete(&mut self, id: TaskId) -> bool {
        let Some(index) = self.position(id) else {
            debug!("event=task_delete module=store status=skip reason=not_found task_id={id}");
            return false;
        };

        self.tasks.remove(index);
        self.commit(TaskChange::Removed(id));
        true
    }

    /// Flips `completed` on the task with `id`.
    pub fn toggle(&mut self, id: TaskId) -> bool {
        self.replace(id, "task_toggle", |task| Some(task.toggled()))
    }

    /// Replaces the title of the task with `id`.
    ///
    /// Blank titles are ignored; long titles are truncated to the bound.
    pub fn update(&mut self, id: TaskId, new_title: &str) -> bool {
        let Some(title) = normalize_title(new_title, self.config.max_title_chars) else {
            debug!("event=task_update module=store status=skip reason=empty_title task_id={id}");
            return false;
        };
        self.replace(id, "task_update", |task| {
            (task.title != title).then(|| task.retitled(title.as_str()))
        })
    }

    /// Replaces the category of the task with `id`.
    pub fn set_category(&mut self, id: TaskId, category: TaskCategory) -> bool {
        self.replace(id, "task_set_category", |task| {
            (task.category != category).then(|| task.recategorized(category))
        })
    }

    /// Removes every completed task in one replacement. Returns the count.
    pub fn clear_completed(&mut self) -> usize {
        let (removed, kept): (Vec<Task>, Vec<Task>) = std::mem::take(&mut self.tasks)
            .into_iter()
            .partition(|task| task.completed);
        self.tasks = kept;

        if removed.is_empty() {
            debug!("event=tasks_clear_completed module=store status=skip reason=none_completed");
            return 0;
        }

        let ids: Vec<TaskId> = removed.iter().map(|task| task.id).collect();
        let count = ids.len();
        self.commit(TaskChange::ClearedCompleted(ids));
        count
    }

    fn position(&self, id: TaskId) -> Option<usize> {
        self.tasks.iter().position(|task| task.id == id)
    }

    /// Swaps in the record produced by `mutate`; `None` means "unchanged".
    fn replace<F>(&mut self, id: TaskId, event: &'static str, mutate: F) -> bool
    where
        F: FnOnce(&Task) -> Option<Task>,
    {
        let Some(index) = self.position(id) else {
            debug!("event={event} module=store status=skip reason=not_found task_id={id}");
            return false;
        };
        let Some(next) = mutate(&self.tasks[index]) else {
            debug!("event={event} module=store status=skip reason=unchanged task_id={id}");
            return false;
        };

        self.tasks[index] = next;
        self.commit(TaskChange::Updated(id));
        true
    }

    fn commit(&mut self, change: TaskChange) {
        self.revision += 1;
        self.persist();
        self.notify(&change);
    }

    fn persist(&mut self) {
        let payload = match encode_tasks(&self.tasks) {
            Ok(payload) => payload,
            Err(err) => {
                error!(
                    "event=tasks_persist module=store status=error error_code=encode_failed error={}",
                    err
                );
                return;
            }
        };

        if let Err(err) = self.backend.set(&self.config.tasks_key, &payload) {
            warn!(
                "event=tasks_persist module=store status=error error_code=kv_write_failed count={} error={}",
                self.tasks.len(),
                err
            );
        }
    }

    fn notify(&mut self, change: &TaskChange) {
        for (_, observer) in self.observers.iter_mut() {
            observer(change);
        }
    }
}
