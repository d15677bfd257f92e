//! The task collection and its derived views.
//!
//! # Invariants
//! - Insertion order is the backing order; display order is recomputed on
//!   demand by [`TodoList::sorted_view`] and never persisted.
//! - Ids are handed out from a counter that stays above every id in the list;
//!   once the counter runs past exactly representable ids, the lowest unused
//!   whole number is handed out instead.
//! - Every successful mutation is written to the store before returning.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use log::{info, warn};

use crate::codec;
use crate::error::{DecodeError, Result, StoreError, ValidationError};
use crate::store::Store;
use crate::task::{Priority, Task, TaskId, MAX_EXACT_ID};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum FilterMode {
    #[default]
    All,
    Pending,
    Completed,
}

impl FilterMode {
    pub fn matches(self, task: &Task) -> bool {
        match self {
            FilterMode::All => true,
            FilterMode::Pending => !task.is_completed(),
            FilterMode::Completed => task.is_completed(),
        }
    }

    /// The mode after this one, wrapping around.
    pub fn next(self) -> Self {
        match self {
            FilterMode::All => FilterMode::Pending,
            FilterMode::Pending => FilterMode::Completed,
            FilterMode::Completed => FilterMode::All,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FilterMode::All => "all",
            FilterMode::Pending => "pending",
            FilterMode::Completed => "completed",
        }
    }
}

impl fmt::Display for FilterMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(FilterMode::All),
            "pending" => Ok(FilterMode::Pending),
            "completed" => Ok(FilterMode::Completed),
            other => Err(format!(
                "unknown filter `{other}`; expected all|pending|completed"
            )),
        }
    }
}

/// Counts over the whole list, independent of any filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    pub total: usize,
    pub pending: usize,
    pub completed: usize,
}

/// Owns the tasks of one session and keeps the store in sync with them.
#[derive(Debug)]
pub struct TodoList<S: Store> {
    tasks: Vec<Task>,
    /// `None` once the counter is exhausted.
    next_id: Option<u64>,
    store: S,
}

impl<S: Store> TodoList<S> {
    /// Loads the list from `store`.
    ///
    /// Missing, unreadable or corrupt data starts an empty list; the problem
    /// is logged and not reported to the caller.
    pub fn open(store: S) -> Self {
        let tasks = match store.load() {
            Ok(Some(data)) => codec::decode_json(&data).unwrap_or_else(|err| {
                warn!("event=store_load module=todo_list status=corrupt error={err}");
                Vec::new()
            }),
            Ok(None) => Vec::new(),
            Err(err) => {
                warn!("event=store_load module=todo_list status=error error={err}");
                Vec::new()
            }
        };
        info!(
            "event=store_load module=todo_list status=ok count={}",
            tasks.len()
        );

        Self {
            next_id: next_counter(&tasks),
            tasks,
            store,
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id() == id)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Appends a new pending task and returns its id.
    ///
    /// The description is stored trimmed; an empty one is rejected.
    pub fn add(
        &mut self,
        description: &str,
        priority: Priority,
        due_date: Option<NaiveDate>,
    ) -> Result<TaskId> {
        let description = description.trim();
        if description.is_empty() {
            return Err(ValidationError::EmptyDescription.into());
        }

        let id = self.allocate_id();
        self.tasks.push(Task::new(id, description, priority, due_date));
        info!("event=task_add module=todo_list status=ok id={id} priority={priority}");

        self.persist()?;
        Ok(id)
    }

    /// Removes the task with `id`. Returns `false` when there was none.
    pub fn remove(&mut self, id: TaskId) -> Result<bool> {
        let before = self.tasks.len();
        self.tasks.retain(|task| task.id() != id);
        if self.tasks.len() == before {
            return Ok(false);
        }

        info!("event=task_remove module=todo_list status=ok id={id}");
        self.persist()?;
        Ok(true)
    }

    /// Flips completion of the task with `id`. Returns `false` when there was none.
    pub fn toggle(&mut self, id: TaskId) -> Result<bool> {
        let Some(task) = self.tasks.iter_mut().find(|task| task.id() == id) else {
            return Ok(false);
        };

        task.toggle();
        info!(
            "event=task_toggle module=todo_list status=ok id={id} completed={}",
            task.is_completed()
        );
        self.persist()?;
        Ok(true)
    }

    /// Tasks matching `mode`, in backing order.
    pub fn filter(&self, mode: FilterMode) -> Vec<&Task> {
        self.tasks.iter().filter(|task| mode.matches(task)).collect()
    }

    /// Tasks matching `mode`, in display order.
    ///
    /// Open tasks come before completed ones, then higher priority first,
    /// then earlier due date first with undated tasks last. Ties keep their
    /// backing order.
    pub fn sorted_view(&self, mode: FilterMode) -> Vec<&Task> {
        let mut view = self.filter(mode);
        view.sort_by(|a, b| display_order(a, b));
        view
    }

    pub fn stats(&self) -> Stats {
        let completed = self.tasks.iter().filter(|task| task.is_completed()).count();
        Stats {
            total: self.tasks.len(),
            pending: self.tasks.len() - completed,
            completed,
        }
    }

    /// Swaps the whole list for `tasks`, e.g. after an import.
    ///
    /// Confirming the loss of the current tasks is the caller's job. A list
    /// with repeated ids is rejected and the current tasks are kept.
    pub fn replace(&mut self, tasks: Vec<Task>) -> Result<()> {
        let mut seen = HashSet::with_capacity(tasks.len());
        if let Some(dup) = tasks.iter().find(|task| !seen.insert(task.id())) {
            return Err(DecodeError::DuplicateId(dup.id()).into());
        }

        self.next_id = self
            .next_id
            .zip(next_counter(&tasks))
            .map(|(current, imported)| current.max(imported));
        self.tasks = tasks;
        info!(
            "event=task_replace module=todo_list status=ok count={}",
            self.tasks.len()
        );
        self.persist()
    }

    fn allocate_id(&mut self) -> TaskId {
        match self.next_id {
            Some(raw) => {
                self.next_id = raw.checked_add(1).filter(|&next| next <= MAX_EXACT_ID);
                TaskId::new(raw)
            }
            None => lowest_unused_id(&self.tasks),
        }
    }

    fn persist(&mut self) -> Result<()> {
        let data = codec::encode_json(&self.tasks).map_err(StoreError::from)?;
        self.store.save(&data).map_err(|err| {
            warn!("event=store_save module=todo_list status=error error={err}");
            err.into()
        })
    }
}

/// One past the integer part of the highest id, or `None` when that is no
/// longer exactly representable.
fn next_counter(tasks: &[Task]) -> Option<u64> {
    let highest = tasks
        .iter()
        .map(|task| task.id().value())
        .fold(0.0, f64::max);
    let next = highest.floor() + 1.0;
    (next <= MAX_EXACT_ID as f64).then_some(next as u64)
}

fn lowest_unused_id(tasks: &[Task]) -> TaskId {
    let used: HashSet<TaskId> = tasks.iter().map(Task::id).collect();
    (1u64..)
        .map(TaskId::new)
        .find(|id| !used.contains(id))
        .unwrap_or(TaskId::new(0))
}

fn display_order(a: &Task, b: &Task) -> Ordering {
    a.is_completed()
        .cmp(&b.is_completed())
        .then_with(|| a.priority().rank().cmp(&b.priority().rank()))
        .then_with(|| match (a.due_date(), b.due_date()) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
}
