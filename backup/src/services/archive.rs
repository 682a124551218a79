use glob::{glob, Pattern};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

use super::commands::run_tool;
use crate::config::ToolsConfig;
use crate::constants::archive::{ARCHIVE_SUFFIX, PART_INFIX};
use crate::errors::{BackupError, Result};

/// Compress `dump` into `staging`, split the archive into `split_size_mb`
/// chunks next to it, then drop the archive.
///
/// Returns the produced part files in split order. `staging` must be owned by
/// the caller's job so that every matching file was created here.
pub async fn archive_and_split(
    tools: &ToolsConfig,
    dump: &Path,
    staging: &Path,
    split_size_mb: u64,
) -> Result<Vec<PathBuf>> {
    let archive_error = |reason: String| BackupError::Archive {
        path: dump.display().to_string(),
        reason,
    };

    let dump_name = dump
        .file_name()
        .ok_or_else(|| archive_error("dump path has no file name".to_string()))?;
    let dump_dir = match dump.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };

    let archive_name = format!("{}{}", dump_name.to_string_lossy(), ARCHIVE_SUFFIX);
    let archive_path = staging.join(&archive_name);

    run_tool(
        &tools.tar,
        [
            OsStr::new("-czf"),
            archive_path.as_os_str(),
            OsStr::new("-C"),
            dump_dir.as_os_str(),
            dump_name,
        ],
        &[],
    )
    .await
    .map_err(|e| archive_error(e.to_string()))?;
    info!("Archived {} into {}", dump.display(), archive_path.display());

    let part_prefix = staging.join(format!("{}{}", archive_name, PART_INFIX));
    let size_arg = format!("{}M", split_size_mb);
    run_tool(
        &tools.split,
        [
            OsStr::new("-b"),
            OsStr::new(&size_arg),
            archive_path.as_os_str(),
            part_prefix.as_os_str(),
        ],
        &[],
    )
    .await
    .map_err(|e| archive_error(e.to_string()))?;
    info!("Split {} into {} MB parts", archive_path.display(), split_size_mb);

    fs::remove_file(&archive_path)
        .await
        .map_err(|e| archive_error(format!("failed to remove {}: {}", archive_path.display(), e)))?;
    info!("Removed archive {}", archive_path.display());

    let parts = list_parts(staging, &archive_name).map_err(archive_error)?;
    if parts.is_empty() {
        return Err(archive_error("split produced no parts".to_string()));
    }

    debug!("Produced {} parts: {:?}", parts.len(), parts);
    Ok(parts)
}

/// Part files for `archive_name` inside `staging`, sorted by split suffix.
pub fn list_parts(staging: &Path, archive_name: &str) -> std::result::Result<Vec<PathBuf>, String> {
    let pattern = format!(
        "{}/{}*",
        Pattern::escape(&staging.to_string_lossy()),
        Pattern::escape(&format!("{}{}", archive_name, PART_INFIX))
    );

    let mut parts = Vec::new();
    for entry in glob(&pattern).map_err(|e| format!("glob pattern error: {}", e))? {
        let path = entry.map_err(|e| format!("glob entry error: {}", e))?;
        if path.is_file() {
            parts.push(path);
        }
    }
    parts.sort();
    Ok(parts)
}
