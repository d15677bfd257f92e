//! Task domain model.
//!
//! # Invariants
//! - `id` and `created_at` are fixed at construction.
//! - `completed` is the only field that changes afterwards, through `toggle`.
//! - Due dates are calendar dates; all day arithmetic is done on whole days.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, SubsecRound, Utc};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Largest integer every id up to which is exactly representable.
pub const MAX_EXACT_ID: u64 = 1 << 53;

/// Identifier of a task, unique within one list.
///
/// Ids handed out by a list are whole numbers, but imported ids may be any
/// finite decimal number, such as the fractional ids of older exports.
#[derive(Debug, Clone, Copy)]
pub struct TaskId(f64);

impl TaskId {
    /// Values above [`MAX_EXACT_ID`] are rounded to the nearest `f64`.
    pub fn new(value: u64) -> Self {
        Self(value as f64)
    }

    /// Returns `None` for NaN and infinities.
    pub fn from_f64(value: f64) -> Option<Self> {
        // `+ 0.0` folds -0.0 into 0.0 so equal ids have equal bits.
        value.is_finite().then_some(Self(value + 0.0))
    }

    pub fn value(self) -> f64 {
        self.0
    }

    /// The whole-number id when it is exactly representable.
    pub fn as_u64(self) -> Option<u64> {
        let exact = self.0.fract() == 0.0 && (0.0..=MAX_EXACT_ID as f64).contains(&self.0);
        exact.then_some(self.0 as u64)
    }
}

impl PartialEq for TaskId {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}

impl Eq for TaskId {}

impl Hash for TaskId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

impl PartialOrd for TaskId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TaskId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid task id `{0}`; expected a finite number")]
pub struct ParseTaskIdError(pub String);

impl FromStr for TaskId {
    type Err = ParseTaskIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<f64>()
            .ok()
            .and_then(Self::from_f64)
            .ok_or_else(|| ParseTaskIdError(s.to_string()))
    }
}

impl Serialize for TaskId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.as_u64() {
            Some(whole) => serializer.serialize_u64(whole),
            None => serializer.serialize_f64(self.0),
        }
    }
}

impl<'de> Deserialize<'de> for TaskId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = f64::deserialize(deserializer)?;
        Self::from_f64(value).ok_or_else(|| de::Error::custom("task id must be a finite number"))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    /// Display rank; lower ranks are shown first.
    pub fn rank(self) -> u8 {
        match self {
            Priority::High => 1,
            Priority::Medium => 2,
            Priority::Low => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown priority `{0}`; expected low|medium|high")]
pub struct ParsePriorityError(pub String);

impl FromStr for Priority {
    type Err = ParsePriorityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            other => Err(ParsePriorityError(other.to_string())),
        }
    }
}

/// A single to-do item.
///
/// Serialized with the field names `id`, `description`, `priority`,
/// `dueDate`, `completed` and `createdAt`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    id: TaskId,
    description: String,
    #[serde(default)]
    priority: Priority,
    due_date: Option<NaiveDate>,
    completed: bool,
    created_at: DateTime<Utc>,
}

impl Task {
    /// Creates a pending task stamped with the current time.
    pub fn new(
        id: TaskId,
        description: impl Into<String>,
        priority: Priority,
        due_date: Option<NaiveDate>,
    ) -> Self {
        Self::from_parts(
            id,
            description,
            priority,
            due_date,
            false,
            Utc::now().trunc_subsecs(3),
        )
    }

    /// Rebuilds a task whose identity already exists, e.g. from an import.
    pub fn from_parts(
        id: TaskId,
        description: impl Into<String>,
        priority: Priority,
        due_date: Option<NaiveDate>,
        completed: bool,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            description: description.into(),
            priority,
            due_date,
            completed,
            created_at,
        }
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    pub fn due_date(&self) -> Option<NaiveDate> {
        self.due_date
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn toggle(&mut self) {
        self.completed = !self.completed;
    }

    /// Returns whether an open task's due date lies before `today`.
    ///
    /// A task due today is not overdue yet.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        match self.due_date {
            Some(due) if !self.completed => due < today,
            _ => false,
        }
    }

    /// Whole calendar days from `today` until the due date.
    ///
    /// `Some(0)` means due today, negative values mean the date has passed.
    pub fn days_until_due(&self, today: NaiveDate) -> Option<i64> {
        self.due_date.map(|due| (due - today).num_days())
    }
}
