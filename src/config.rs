//! Runtime configuration read from the environment.

use std::path::{Path, PathBuf};

use crate::logging::default_log_level;

pub const DATA_DIR_ENV: &str = "TODOLIST_DATA_DIR";
pub const LOG_LEVEL_ENV: &str = "TODOLIST_LOG_LEVEL";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Holds the stored list and receives exports. Always absolute.
    pub data_dir: PathBuf,
    pub log_level: String,
}

impl Config {
    pub fn from_env() -> std::io::Result<Self> {
        let cwd = std::env::current_dir()?;
        Ok(Self::resolve(
            std::env::var(DATA_DIR_ENV).ok().as_deref(),
            std::env::var(LOG_LEVEL_ENV).ok().as_deref(),
            &cwd,
        ))
    }

    /// Builds a config from raw values; blank values fall back to defaults
    /// and relative data dirs are taken relative to `cwd`.
    pub fn resolve(data_dir: Option<&str>, log_level: Option<&str>, cwd: &Path) -> Self {
        let data_dir = match data_dir.map(str::trim).filter(|dir| !dir.is_empty()) {
            Some(dir) => cwd.join(dir),
            None => cwd.to_path_buf(),
        };
        let log_level = log_level
            .map(str::trim)
            .filter(|level| !level.is_empty())
            .unwrap_or(default_log_level())
            .to_string();

        Self {
            data_dir,
            log_level,
        }
    }

    pub fn log_dir(&self) -> PathBuf {
        self.data_dir.join("logs")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_working_directory() {
        let config = Config::resolve(None, Some("  "), Path::new("/home/me"));
        assert_eq!(config.data_dir, PathBuf::from("/home/me"));
        assert_eq!(config.log_level, default_log_level());
        assert_eq!(config.log_dir(), PathBuf::from("/home/me/logs"));
    }

    #[test]
    fn resolves_relative_and_keeps_absolute_data_dir() {
        let cwd = Path::new("/home/me");
        assert_eq!(
            Config::resolve(Some("todo"), None, cwd).data_dir,
            PathBuf::from("/home/me/todo")
        );
        assert_eq!(
            Config::resolve(Some("/var/todo"), Some("warn"), cwd),
            Config {
                data_dir: PathBuf::from("/var/todo"),
                log_level: "warn".to_string(),
            }
        );
    }
}
