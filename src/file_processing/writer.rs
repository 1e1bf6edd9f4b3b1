use crate::errors::{AppError, FileSystemError};
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Directory under the workspace root that holds the rollback record.
pub const ROLLBACK_DIR: &str = ".codemind";
const ROLLBACK_FILE: &str = "rollback.toml";

/// Files touched by the last run: created ones to delete, overwritten ones to
/// restore from their backups as (original, backup) pairs.
#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq, Eq)]
pub struct RollbackRecord {
    pub new_files: Vec<String>,
    pub rollback_files: Vec<(String, String)>,
}

impl RollbackRecord {
    pub fn is_empty(&self) -> bool {
        self.new_files.is_empty() && self.rollback_files.is_empty()
    }
}

/// What a rollback changed on disk.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct RollbackSummary {
    pub deleted: Vec<PathBuf>,
    pub restored: Vec<PathBuf>,
}

/// `<path>.backup`
pub fn backup_path_for(path: &Path) -> PathBuf {
    let mut backup = OsString::from(path.as_os_str());
    backup.push(".backup");
    PathBuf::from(backup)
}

/// Writes an accepted code suggestion over the open file.
///
/// The current buffer is snapshotted to `<file>.backup` first when `backup`
/// is set. Returns what a rollback would need to undo the write.
pub async fn apply_code_suggestion(
    current_file: &Path,
    buffer: &str,
    code: &str,
    backup: bool,
) -> Result<RollbackRecord, FileSystemError> {
    let mut record = RollbackRecord::default();
    let existed = fs::try_exists(current_file).await.unwrap_or(false);

    if backup && existed {
        let backup_path = backup_path_for(current_file);
        fs::write(&backup_path, buffer.as_bytes())
            .await
            .map_err(|source| FileSystemError::Backup {
                path: current_file.to_path_buf(),
                source,
            })?;
        log::info!("Backup created at: {}", backup_path.display());
        record.rollback_files.push((
            current_file.display().to_string(),
            backup_path.display().to_string(),
        ));
    } else if !existed {
        record.new_files.push(current_file.display().to_string());
    }

    if let Some(parent) = current_file
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
    {
        fs::create_dir_all(parent)
            .await
            .map_err(|source| FileSystemError::CreateDir {
                path: current_file.to_path_buf(),
                dir: parent.to_path_buf(),
                source,
            })?;
    }

    fs::write(current_file, code.as_bytes())
        .await
        .map_err(|source| FileSystemError::Write {
            path: current_file.to_path_buf(),
            source,
        })?;
    log::info!(
        "Code changed from {} characters to {} characters",
        buffer.len(),
        code.len()
    );

    Ok(record)
}

fn rollback_record_path(workspace_root: &Path) -> PathBuf {
    workspace_root.join(ROLLBACK_DIR).join(ROLLBACK_FILE)
}

/// Saves the record of this run, replacing the previous one.
pub async fn save_rollback_record(
    workspace_root: &Path,
    record: &RollbackRecord,
) -> Result<(), AppError> {
    if record.is_empty() {
        return Ok(());
    }

    let rollback_dir = workspace_root.join(ROLLBACK_DIR);
    fs::create_dir_all(&rollback_dir).await?;

    let record_str = toml::to_string(record)?;
    fs::write(rollback_record_path(workspace_root), record_str).await?;
    Ok(())
}

/// Undoes the last run recorded under `workspace_root`.
pub async fn rollback_last_run(workspace_root: &Path) -> Result<RollbackSummary, AppError> {
    let record_path = rollback_record_path(workspace_root);
    if !fs::try_exists(&record_path).await.unwrap_or(false) {
        return Err(AppError::RollbackError(
            "No changes to rollback".to_string(),
        ));
    }

    let record_str = fs::read_to_string(&record_path).await?;
    let record: RollbackRecord = toml::from_str(&record_str)?;
    let mut summary = RollbackSummary::default();

    // Delete new files created during the run
    for new_file in record.new_files {
        let path = PathBuf::from(new_file);
        if fs::try_exists(&path).await.unwrap_or(false) {
            fs::remove_file(&path).await?;
            log::info!("Deleted new file: {}", path.display());
            summary.deleted.push(path);
        }
    }

    // Restore overwritten files from their backups
    for (original_path, backup_path) in record.rollback_files {
        let original_path = PathBuf::from(original_path);
        let backup_path = PathBuf::from(backup_path);
        if fs::try_exists(&backup_path).await.unwrap_or(false) {
            fs::copy(&backup_path, &original_path).await?;
            fs::remove_file(&backup_path).await?;
            log::info!("Restored: {}", original_path.display());
            summary.restored.push(original_path);
        } else {
            log::warn!("Backup missing, cannot restore: {}", backup_path.display());
        }
    }

    fs::remove_file(&record_path).await?;

    Ok(summary)
}
