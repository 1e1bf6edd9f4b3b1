use super::TEXT_EXTENSIONS;
use crate::errors::AppError;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tokio::fs;
use walkdir::WalkDir;

/// Maximum allowed file size (10 MB).
const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Reads a file for use as chat context, refusing oversized files.
pub async fn read_text_file(path: &Path) -> Result<String, AppError> {
    let metadata = fs::metadata(path).await?;
    if metadata.len() > MAX_FILE_SIZE {
        return Err(AppError::InvalidInput(format!(
            "File too large: {} (max {} bytes)",
            path.display(),
            MAX_FILE_SIZE
        )));
    }
    Ok(fs::read_to_string(path).await?)
}

/// Reads every context file as (path, content), in the given order.
pub async fn read_context_files(paths: &[PathBuf]) -> Result<Vec<(String, String)>, AppError> {
    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        let content = read_text_file(path).await?;
        files.push((path.display().to_string(), content));
    }
    Ok(files)
}

/// Expands the context arguments into a list of files, filtering out ignored
/// paths. Directories contribute every text file below them.
pub fn collect_context_files(paths: &[String], ignore_paths: &[String]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    let mut seen = HashSet::new();
    let ignored: HashSet<_> = ignore_paths.iter().map(PathBuf::from).collect();

    for path in paths {
        let path = PathBuf::from(path);
        if path.is_file() && !is_ignored(&path, &ignored) {
            if seen.insert(path.clone()) {
                files.push(path);
            }
        } else if path.is_dir() {
            for file in get_directory_text_files(&path, &ignored) {
                if seen.insert(file.clone()) {
                    files.push(file);
                }
            }
        } else {
            log::warn!("Skipping missing context path: {}", path.display());
        }
    }
    files
}

/// Checks if a path should be ignored.
fn is_ignored(path: &Path, ignored: &HashSet<PathBuf>) -> bool {
    ignored
        .iter()
        .any(|ignored_path| path.starts_with(ignored_path))
}

fn is_text_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| TEXT_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Recursively gets all text files in a directory, sorted for a stable prompt.
fn get_directory_text_files(directory: &Path, ignored: &HashSet<PathBuf>) -> Vec<PathBuf> {
    WalkDir::new(directory)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !is_ignored(entry.path(), ignored))
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                log::warn!("Error walking {}: {}", directory.display(), e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file() && is_text_file(entry.path()))
        .map(|entry| entry.into_path())
        .collect()
}
