use std::fs;

use serde_json::json;
use todolist::transfer::{self, read_import, FileFormat};
use todolist::{
    decode_csv, encode_csv, FilterMode, MemoryStore, Priority, TaskId, TodoError, TodoList,
};

fn three_tasks() -> serde_json::Value {
    json!([
        {
            "id": 101,
            "description": "Write report",
            "priority": "high",
            "dueDate": "2026-10-25",
            "completed": false,
            "createdAt": "2026-10-01T09:00:00.000Z",
        },
        {
            "id": 205,
            "description": "Call Sam",
            "priority": "low",
            "dueDate": null,
            "completed": true,
            "createdAt": "2026-10-02T10:15:30.500Z",
        },
        {
            "id": 317,
            "description": "Pay rent",
            "priority": "medium",
            "dueDate": "2026-11-01",
            "completed": false,
            "createdAt": "2026-10-03T11:00:00.000Z",
        },
    ])
}

#[test]
fn json_import_replaces_tasks_and_keeps_ids() {
    let mut list = TodoList::open(MemoryStore::new());
    list.add("old one", Priority::Low, None).unwrap();
    list.add("old two", Priority::Low, None).unwrap();

    let import = transfer::decode_import(FileFormat::Json, &three_tasks().to_string()).unwrap();
    list.replace(import.tasks).unwrap();

    let ids: Vec<_> = list.tasks().iter().map(|task| task.id()).collect();
    assert_eq!(ids, [TaskId::new(101), TaskId::new(205), TaskId::new(317)]);
    assert!(list.get(TaskId::new(205)).unwrap().is_completed());
    assert_eq!(list.stats().total, 3);

    let next = list.add("after import", Priority::Low, None).unwrap();
    assert_eq!(next, TaskId::new(318));
}

#[test]
fn malformed_json_import_leaves_list_unchanged() {
    let mut list = TodoList::open(MemoryStore::new());
    list.add("keep me", Priority::Low, None).unwrap();
    let saved = list.store().data().map(str::to_string);

    let mut broken = three_tasks();
    broken[1]["priority"] = json!("someday");
    let err = transfer::decode_import(FileFormat::Json, &broken.to_string()).unwrap_err();

    assert!(matches!(err, TodoError::Decode(_)));
    assert_eq!(list.len(), 1);
    assert_eq!(list.store().data().map(str::to_string), saved);
}

#[test]
fn csv_export_escapes_quotes_and_decodes_back() {
    let mut list = TodoList::open(MemoryStore::new());
    let id = list.add(r#"Say "hi", bye"#, Priority::Low, None).unwrap();

    let csv = encode_csv(list.tasks());
    let row = csv.lines().nth(1).unwrap();
    assert!(row.starts_with(&format!(r#"{id},"Say ""hi"", bye",low,,false,"#)));

    let import = decode_csv(&csv);
    assert_eq!(import.skipped, 0);
    assert_eq!(import.tasks, list.tasks());
}

#[test]
fn files_round_trip_through_both_formats() {
    let dir = tempfile::tempdir().unwrap();
    let today = chrono::NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();

    let mut list = TodoList::open(MemoryStore::new());
    list.add("plain", Priority::High, today.succ_opt()).unwrap();
    let done = list.add("a, b and \"c\"", Priority::Medium, None).unwrap();
    list.toggle(done).unwrap();

    for format in [FileFormat::Json, FileFormat::Csv] {
        let path = transfer::write_export(dir.path(), list.tasks(), format, today).unwrap();
        assert_eq!(
            path.file_name().and_then(|name| name.to_str()),
            Some(transfer::export_file_name(format, today).as_str())
        );

        let import = read_import(&path).unwrap();
        assert_eq!(import.format, format);
        assert_eq!(import.skipped, 0);
        assert_eq!(import.tasks, list.tasks());
    }
}

#[test]
fn csv_file_with_bad_rows_reports_skip_count() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tasks.csv");
    fs::write(
        &path,
        "ID,Description,Priority,Due Date,Completed,Created At\n\
         1,\"good\",high,,false,2026-10-01T09:00:00.000Z\n\
         2,\"truncated\"\n",
    )
    .unwrap();

    let import = read_import(&path).unwrap();
    assert_eq!(import.tasks.len(), 1);
    assert_eq!(import.skipped, 1);

    let mut list = TodoList::open(MemoryStore::new());
    list.replace(import.tasks).unwrap();
    assert_eq!(list.filter(FilterMode::Pending).len(), 1);
}

#[test]
fn unsupported_extension_is_rejected_before_reading() {
    let err = read_import(std::path::Path::new("/nonexistent/tasks.xlsx")).unwrap_err();
    assert!(matches!(err, TodoError::UnsupportedFormat(_)));
    assert_eq!(
        err.to_string(),
        "unsupported file format `tasks.xlsx`; use JSON or CSV"
    );
}

#[test]
fn exports_with_fractional_ids_import_and_keep_counter_ahead() {
    let dir = tempfile::tempdir().unwrap();
    let json_path = dir.path().join("todo-list-2023-10-19.json");
    fs::write(
        &json_path,
        r#"[
  {
    "id": 1697712345678.4321,
    "description": "Buy milk",
    "priority": "high",
    "dueDate": null,
    "completed": false,
    "createdAt": "2023-10-19T10:45:45.678Z"
  },
  {
    "id": 1697712399001.0923,
    "description": "Say \"hi\", bye",
    "priority": "low",
    "dueDate": "2023-10-25",
    "completed": true,
    "createdAt": "2023-10-19T10:46:39.001Z"
  }
]"#,
    )
    .unwrap();
    let csv_path = dir.path().join("todo-list-2023-10-19.csv");
    fs::write(
        &csv_path,
        "ID,Description,Priority,Due Date,Completed,Created At\n\
         1697712345678.4321,\"Buy milk\",high,,false,2023-10-19T10:45:45.678Z\n\
         1697712399001.0923,\"Say \"\"hi\"\", bye\",low,2023-10-25,true,2023-10-19T10:46:39.001Z",
    )
    .unwrap();

    let from_json = read_import(&json_path).unwrap();
    let from_csv = read_import(&csv_path).unwrap();
    assert_eq!(from_json.tasks.len(), 2);
    assert_eq!(from_csv.skipped, 0);
    assert_eq!(from_csv.tasks, from_json.tasks);

    let mut list = TodoList::open(MemoryStore::new());
    list.replace(from_json.tasks).unwrap();
    assert_eq!(list.tasks()[1].description(), r#"Say "hi", bye"#);

    let id = list.add("new", Priority::Medium, None).unwrap();
    assert_eq!(id, TaskId::new(1697712399002));
}
