//! JSON and CSV encodings of a task list.
//!
//! # Invariants
//! - JSON is an array of objects with the fields `id`, `description`,
//!   `priority`, `dueDate`, `completed` and `createdAt`.
//! - CSV starts with [`CSV_HEADER`]; the description is always quoted with
//!   inner quotes doubled, every other field is written bare.
//! - Decoding either format never yields two tasks with the same id.

use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use csv::StringRecord;
use log::debug;

use crate::error::DecodeError;
use crate::task::{Task, TaskId};

pub const CSV_HEADER: &str = "ID,Description,Priority,Due Date,Completed,Created At";

const CSV_FIELDS: usize = 6;
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Compact JSON, used for the persisted copy.
pub fn encode_json(tasks: &[Task]) -> Result<String, serde_json::Error> {
    serde_json::to_string(tasks)
}

/// Indented JSON, used for exports.
pub fn encode_json_pretty(tasks: &[Task]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(tasks)
}

/// Decodes a JSON task array. Nothing is returned unless every entry is valid.
pub fn decode_json(text: &str) -> Result<Vec<Task>, DecodeError> {
    let tasks: Vec<Task> = serde_json::from_str(text)?;
    let mut seen = HashSet::with_capacity(tasks.len());
    for task in &tasks {
        if !seen.insert(task.id()) {
            return Err(DecodeError::DuplicateId(task.id()));
        }
    }
    Ok(tasks)
}

pub fn encode_csv(tasks: &[Task]) -> String {
    let mut lines = Vec::with_capacity(tasks.len() + 1);
    lines.push(CSV_HEADER.to_string());
    lines.extend(tasks.iter().map(csv_row));
    lines.join("\n")
}

fn csv_row(task: &Task) -> String {
    [
        task.id().to_string(),
        quote(task.description()),
        task.priority().to_string(),
        task.due_date()
            .map(|due| due.format(DATE_FORMAT).to_string())
            .unwrap_or_default(),
        task.is_completed().to_string(),
        task.created_at().to_rfc3339_opts(SecondsFormat::Millis, true),
    ]
    .join(",")
}

fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

/// Outcome of a CSV decode: the rows that parsed and how many were dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CsvImport {
    pub tasks: Vec<Task>,
    pub skipped: usize,
}

/// Decodes CSV text, skipping the header row.
///
/// Rows with fewer than six fields, an unparseable id, priority, due date or
/// creation time, or an id already seen earlier in the file are skipped and
/// counted rather than failing the whole import.
pub fn decode_csv(text: &str) -> CsvImport {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.trim().as_bytes());

    let mut import = CsvImport::default();
    let mut seen = HashSet::new();
    for (index, record) in reader.records().enumerate() {
        match record.ok().and_then(|record| parse_row(&record)) {
            Some(task) if seen.insert(task.id()) => import.tasks.push(task),
            _ => {
                debug!("event=csv_row_skipped module=codec row={}", index + 1);
                import.skipped += 1;
            }
        }
    }
    import
}

fn parse_row(record: &StringRecord) -> Option<Task> {
    if record.len() < CSV_FIELDS {
        return None;
    }

    let id: TaskId = record[0].trim().parse().ok()?;
    let priority = record[2].parse().ok()?;
    let due_date = match record[3].trim() {
        "" => None,
        text => Some(NaiveDate::parse_from_str(text, DATE_FORMAT).ok()?),
    };
    let completed = record[4].trim() == "true";
    let created_at = DateTime::parse_from_rfc3339(record[5].trim())
        .ok()?
        .with_timezone(&Utc);

    Some(Task::from_parts(
        id,
        &record[1],
        priority,
        due_date,
        completed,
        created_at,
    ))
}
