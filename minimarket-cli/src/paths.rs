//! Where the panel keeps its config, exports and logs.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;

/// Archived logs kept next to `latest.log`.
const MAX_ARCHIVED_LOGS: usize = 25;

const LATEST_LOG: &str = "latest.log";

/// Resolved application directories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppDirs {
    config: PathBuf,
    data: PathBuf,
    cache: PathBuf,
}

impl AppDirs {
    /// Platform locations (XDG on Linux), or everything under the working
    /// directory when no home directory is known.
    pub fn discover() -> Self {
        match ProjectDirs::from("pe", "minimarket", "minimarket") {
            Some(dirs) => Self {
                config: dirs.config_dir().to_path_buf(),
                data: dirs.data_dir().to_path_buf(),
                cache: dirs.cache_dir().to_path_buf(),
            },
            None => Self::under(Path::new(".minimarket")),
        }
    }

    /// All directories below `root`.
    pub fn under(root: &Path) -> Self {
        Self {
            config: root.to_path_buf(),
            data: root.join("data"),
            cache: root.join("logs"),
        }
    }

    pub fn config_file(&self) -> PathBuf {
        self.config.join("config.toml")
    }

    pub fn export_dir(&self) -> &Path {
        &self.data
    }

    pub fn log_file(&self) -> PathBuf {
        self.cache.join(LATEST_LOG)
    }

    /// Archive the previous `latest.log` under a timestamped name and prune
    /// the archive. Returns the path for the new log.
    pub fn prepare_log_file(&self) -> io::Result<PathBuf> {
        fs::create_dir_all(&self.cache)?;
        let latest = self.log_file();
        if latest.exists() {
            let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
            fs::rename(&latest, self.cache.join(format!("{}.log", stamp)))?;
        }
        prune_archived_logs(&self.cache, MAX_ARCHIVED_LOGS)?;
        Ok(latest)
    }
}

/// Delete all but the `keep` newest archived logs. Archive names are
/// timestamps, so name order is age order.
fn prune_archived_logs(dir: &Path, keep: usize) -> io::Result<()> {
    let mut archived: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.extension().is_some_and(|ext| ext == "log")
                && path.file_name().is_some_and(|name| name != LATEST_LOG)
        })
        .collect();
    archived.sort();

    let excess = archived.len().saturating_sub(keep);
    for path in &archived[..excess] {
        if let Err(e) = fs::remove_file(path) {
            log::warn!("Could not remove old log {}: {}", path.display(), e);
        }
    }
    Ok(())
}
