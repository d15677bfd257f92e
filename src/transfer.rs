//! File export and import of the task list.
//!
//! Import only decodes; swapping the decoded tasks into a list is left to the
//! caller, after the user has agreed to lose the current tasks.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use log::info;

use crate::codec;
use crate::error::{Result, TodoError};
use crate::task::Task;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Json,
    Csv,
}

impl FileFormat {
    pub fn extension(self) -> &'static str {
        match self {
            FileFormat::Json => "json",
            FileFormat::Csv => "csv",
        }
    }

    /// Picks the format from the file extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);

        match extension.as_deref() {
            Some("json") => Ok(FileFormat::Json),
            Some("csv") => Ok(FileFormat::Csv),
            _ => Err(TodoError::UnsupportedFormat(
                path.file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_default(),
            )),
        }
    }
}

/// `todo-list-<YYYY-MM-DD>.<ext>`
pub fn export_file_name(format: FileFormat, date: NaiveDate) -> String {
    format!(
        "todo-list-{}.{}",
        date.format("%Y-%m-%d"),
        format.extension()
    )
}

pub fn export_text(tasks: &[Task], format: FileFormat) -> Result<String> {
    match format {
        FileFormat::Json => Ok(codec::encode_json_pretty(tasks)?),
        FileFormat::Csv => Ok(codec::encode_csv(tasks)),
    }
}

/// Writes an export named after `date` into `dir` and returns its path.
pub fn write_export(
    dir: &Path,
    tasks: &[Task],
    format: FileFormat,
    date: NaiveDate,
) -> Result<PathBuf> {
    let text = export_text(tasks, format)?;
    let path = dir.join(export_file_name(format, date));
    fs::write(&path, text).map_err(|source| TodoError::Io {
        path: path.clone(),
        source,
    })?;

    info!(
        "event=export module=transfer status=ok format={} count={}",
        format.extension(),
        tasks.len()
    );
    Ok(path)
}

/// Decoded import, not yet applied to any list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Import {
    pub format: FileFormat,
    pub tasks: Vec<Task>,
    /// Rows dropped as malformed; always zero for JSON.
    pub skipped: usize,
}

/// Decodes `content` as `format`. JSON fails as a whole; CSV skips bad rows.
pub fn decode_import(format: FileFormat, content: &str) -> Result<Import> {
    let (tasks, skipped) = match format {
        FileFormat::Json => (codec::decode_json(content)?, 0),
        FileFormat::Csv => {
            let import = codec::decode_csv(content);
            (import.tasks, import.skipped)
        }
    };

    info!(
        "event=import_decode module=transfer status=ok format={} count={} skipped={}",
        format.extension(),
        tasks.len(),
        skipped
    );
    Ok(Import {
        format,
        tasks,
        skipped,
    })
}

/// Reads and decodes the file at `path`, dispatching on its extension.
pub fn read_import(path: &Path) -> Result<Import> {
    let format = FileFormat::from_path(path)?;
    let content = fs::read_to_string(path).map_err(|source| TodoError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    decode_import(format, &content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn export_file_name_uses_iso_date() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 7).unwrap();
        assert_eq!(
            export_file_name(FileFormat::Json, date),
            "todo-list-2026-03-07.json"
        );
        assert_eq!(
            export_file_name(FileFormat::Csv, date),
            "todo-list-2026-03-07.csv"
        );
    }

    #[test]
    fn format_follows_extension() {
        assert_eq!(
            FileFormat::from_path(Path::new("a/tasks.json")).unwrap(),
            FileFormat::Json
        );
        assert_eq!(
            FileFormat::from_path(Path::new("TASKS.CSV")).unwrap(),
            FileFormat::Csv
        );

        let err = FileFormat::from_path(Path::new("tasks.txt")).unwrap_err();
        assert!(matches!(err, TodoError::UnsupportedFormat(name) if name == "tasks.txt"));
        assert!(FileFormat::from_path(Path::new("tasks")).is_err());
    }

    #[test]
    fn malformed_json_import_is_an_error() {
        let err = decode_import(FileFormat::Json, "[{").unwrap_err();
        assert!(matches!(err, TodoError::Decode(_)));
    }
}
