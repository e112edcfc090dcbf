use std::path::{Path, PathBuf};

const STATS_CACHE_FILE: &str = "stats-cache.json";
const PROJECTS_DIR: &str = "projects";
const RAW_LOG_PATTERN: &str = "**/*.jsonl";

/// Locations of the upstream logging tool's data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataPaths {
    data_dir: PathBuf,
}

impl DataPaths {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// `~/.claude`, or `.claude` relative to the working directory without a home
    pub fn default_data_dir() -> PathBuf {
        home::home_dir()
            .map(|home| home.join(".claude"))
            .unwrap_or_else(|| PathBuf::from(".claude"))
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn stats_file(&self) -> PathBuf {
        self.data_dir.join(STATS_CACHE_FILE)
    }

    pub fn projects_dir(&self) -> PathBuf {
        self.data_dir.join(PROJECTS_DIR)
    }

    /// Recursive glob matching every raw log file
    pub fn raw_log_pattern(&self) -> String {
        self.projects_dir()
            .join(RAW_LOG_PATTERN)
            .to_string_lossy()
            .into_owned()
    }
}

impl Default for DataPaths {
    fn default() -> Self {
        Self::new(Self::default_data_dir())
    }
}

/// Default location of the coefficient override file
pub fn default_config_path() -> PathBuf {
    home::home_dir()
        .map(|home| home.join(".config"))
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ccgreen")
        .join("config.json")
}
