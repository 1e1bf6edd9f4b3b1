use super::fs::{FileSystem, LocalFileSystem};
use super::path_resolver::ResolutionContext;
use super::writer::{backup_path_for, RollbackRecord};
use crate::errors::FileSystemError;
use crate::models::{FileSet, PendingFileChange};
use similar::TextDiff;

/// What the shell should show before the user decides to apply a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Preview {
    /// Unified diff of on-disk content against the proposal.
    Diff(String),
    /// The file does not exist yet; carries the full proposed content.
    NewFile(String),
}

/// Applies a multi-file proposal one file at a time.
///
/// Failures are recorded per file and never stop the remaining files from
/// being written. Entries keep the order in which the model named them; names
/// that resolve to the same path share the first entry.
pub struct FileChangeApplier {
    entries: Vec<(String, PendingFileChange)>,
    context: ResolutionContext,
    fs: Box<dyn FileSystem>,
    backup_before_overwrite: bool,
    editor_refresh: Option<String>,
}

impl FileChangeApplier {
    /// Resolves every file against the real disk.
    pub fn new(files: &FileSet, context: ResolutionContext) -> Self {
        Self::with_file_system(files, context, Box::new(LocalFileSystem))
    }

    pub fn with_file_system(
        files: &FileSet,
        context: ResolutionContext,
        fs: Box<dyn FileSystem>,
    ) -> Self {
        let mut entries: Vec<(String, PendingFileChange)> = Vec::with_capacity(files.len());

        for (filename, content) in files.iter() {
            let filename = filename.replace(['\n', '\r'], "");
            if filename.is_empty() {
                continue;
            }

            let resolved_path = context.resolve(&filename);
            if let Some((first, change)) = entries
                .iter_mut()
                .find(|(_, change)| change.resolved_path == resolved_path)
            {
                log::debug!(
                    "{} resolves to the same file as {}, keeping the later content",
                    filename,
                    first
                );
                change.proposed_content = content.to_string();
                continue;
            }

            let existed_before = fs.exists(&resolved_path);
            let original_content = if existed_before {
                fs.read_to_string(&resolved_path).unwrap_or_else(|e| {
                    log::error!("Error reading file {}: {}", resolved_path.display(), e);
                    String::new()
                })
            } else {
                String::new()
            };

            log::debug!("Filename: {} -> {}", filename, resolved_path.display());
            entries.push((
                filename,
                PendingFileChange::new(
                    resolved_path,
                    existed_before,
                    original_content,
                    content.to_string(),
                ),
            ));
        }

        Self {
            entries,
            context,
            fs,
            backup_before_overwrite: true,
            editor_refresh: None,
        }
    }

    /// Whether an existing file gets a `.backup` sibling before it is replaced.
    pub fn backup_before_overwrite(mut self, enabled: bool) -> Self {
        self.backup_before_overwrite = enabled;
        self
    }

    pub fn filenames(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn get(&self, filename: &str) -> Option<&PendingFileChange> {
        self.entries
            .iter()
            .find(|(name, _)| name == filename)
            .map(|(_, change)| change)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Diff or new-file marker for `filename`; `None` if it is not pending.
    pub fn preview(&self, filename: &str) -> Option<Preview> {
        let change = self.get(filename)?;
        if !change.existed_before {
            return Some(Preview::NewFile(change.proposed_content.clone()));
        }

        let diff = TextDiff::from_lines(&change.original_content, &change.proposed_content);
        let unified = diff
            .unified_diff()
            .context_radius(3)
            .header(
                &format!("Original: {}", filename),
                &format!("Modified: {}", filename),
            )
            .to_string();
        Some(Preview::Diff(unified))
    }

    /// Applies one file. Returns true on success or if it was already applied.
    pub fn apply(&mut self, filename: &str) -> bool {
        match self.try_apply(filename) {
            Ok(()) => true,
            Err(e) => {
                log::error!("Error applying changes to {}: {}", filename, e);
                if let Some((_, change)) = self.entries.iter_mut().find(|(n, _)| n == filename) {
                    change.last_error = Some(e.to_string());
                }
                false
            }
        }
    }

    /// Like [`apply`](Self::apply) but hands back the failure.
    pub fn try_apply(&mut self, filename: &str) -> Result<(), FileSystemError> {
        let fs = &self.fs;
        let (_, change) = self
            .entries
            .iter_mut()
            .find(|(name, _)| name == filename)
            .ok_or_else(|| FileSystemError::UnknownFile(filename.to_string()))?;

        if change.applied {
            log::debug!("Skipping {}, already applied", filename);
            return Ok(());
        }

        let path = change.resolved_path.clone();

        if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs.create_dir_all(dir)
                .map_err(|source| FileSystemError::CreateDir {
                    path: path.clone(),
                    dir: dir.to_path_buf(),
                    source,
                })?;
        }

        if self.backup_before_overwrite && fs.exists(&path) {
            let backup_path = backup_path_for(&path);
            fs.read_to_string(&path)
                .and_then(|current| fs.write(&backup_path, &current))
                .map_err(|source| FileSystemError::Backup {
                    path: path.clone(),
                    source,
                })?;
            change.backup_path = Some(backup_path);
        }

        fs.write(&path, &change.proposed_content)
            .map_err(|source| FileSystemError::Write {
                path: path.clone(),
                source,
            })?;

        change.applied = true;
        change.last_error = None;
        log::info!("Applied changes to: {}", path.display());

        if self.context.is_current_file(&path) {
            self.editor_refresh = Some(change.proposed_content.clone());
        }

        Ok(())
    }

    /// Applies every pending file in order and returns (succeeded, total).
    pub fn apply_all(&mut self) -> (usize, usize) {
        let filenames: Vec<String> = self.entries.iter().map(|(name, _)| name.clone()).collect();
        let total = filenames.len();
        let succeeded = filenames
            .iter()
            .filter(|filename| self.apply(filename))
            .count();

        if succeeded == total {
            log::info!("Successfully applied all changes ({} files)", succeeded);
        } else {
            log::warn!("Applied changes to {} out of {} files", succeeded, total);
        }
        (succeeded, total)
    }

    /// Files whose last apply attempt failed, with the error text.
    pub fn failures(&self) -> Vec<(&str, &str)> {
        self.entries
            .iter()
            .filter_map(|(name, change)| {
                change
                    .last_error
                    .as_deref()
                    .map(|error| (name.as_str(), error))
            })
            .collect()
    }

    /// New buffer content for the open file, if an apply just replaced it.
    pub fn take_editor_refresh(&mut self) -> Option<String> {
        self.editor_refresh.take()
    }

    /// What a rollback would need to undo the files applied so far.
    pub fn rollback_record(&self) -> RollbackRecord {
        let mut record = RollbackRecord::default();
        for (_, change) in self.entries.iter().filter(|(_, change)| change.applied) {
            let path = change.resolved_path.display().to_string();
            match &change.backup_path {
                Some(backup) => record
                    .rollback_files
                    .push((path, backup.display().to_string())),
                None if !change.existed_before => record.new_files.push(path),
                None => {}
            }
        }
        record
    }
}
