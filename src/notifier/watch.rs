use crate::error::Result;
use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::Path;
use tokio::sync::mpsc;

/// Watch `path` for modification and send a wake-up on `changes` per event.
///
/// The parent directory is watched so that the file being replaced or created
/// later is still seen. The returned watcher must be kept alive.
pub fn watch_file(path: &Path, changes: mpsc::Sender<()>) -> Result<RecommendedWatcher> {
    let file_name = path.file_name().map(|name| name.to_os_string());

    let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| match res {
        Ok(event) => {
            if event.kind.is_access() {
                return;
            }
            let matches = match &file_name {
                Some(name) => event
                    .paths
                    .iter()
                    .any(|p| p.file_name() == Some(name.as_os_str())),
                None => true,
            };
            if matches {
                // A full queue already holds a pending wake-up
                let _ = changes.try_send(());
            }
        }
        Err(e) => tracing::debug!(error = %e, "file watch error"),
    })?;

    let watch_dir = path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    watcher.watch(watch_dir, RecursiveMode::NonRecursive)?;

    tracing::info!(path = %path.display(), "watching for changes");
    Ok(watcher)
}
