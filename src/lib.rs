//! Task list core: the task model, its JSON/CSV codec and the collection
//! that keeps a store in sync, plus the terminal front end that drives them.

pub mod codec;
pub mod config;
pub mod error;
pub mod logging;
pub mod store;
pub mod task;
pub mod todo_list;
pub mod transfer;
pub mod ui;

pub use codec::{decode_csv, decode_json, encode_csv, encode_json, CsvImport, CSV_HEADER};
pub use config::Config;
pub use error::{DecodeError, Result, StoreError, TodoError, ValidationError};
pub use store::{FileStore, MemoryStore, Store, STORAGE_KEY};
pub use task::{Priority, Task, TaskId};
pub use todo_list::{FilterMode, Stats, TodoList};
pub use transfer::{FileFormat, Import};
