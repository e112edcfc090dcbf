use crate::error::{CcgError, Result};
use crate::types::StatsCache;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// Read and parse the stats cache, reporting why it could not be loaded
pub fn load_stats_cache(path: &Path) -> Result<StatsCache> {
    let contents = fs::read_to_string(path).map_err(|source| CcgError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_str(&contents).map_err(|source| CcgError::JsonParse {
        context: path.display().to_string(),
        source,
    })
}

/// Read the stats cache, collapsing every failure to `None`.
///
/// Missing files are expected before the logging tool first runs and are only
/// logged at debug level.
pub fn read_summary(path: &Path) -> Option<StatsCache> {
    match load_stats_cache(path) {
        Ok(stats) => Some(stats),
        Err(CcgError::FileRead { source, .. }) if source.kind() == ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "stats cache not found");
            None
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "stats cache unavailable");
            None
        }
    }
}
