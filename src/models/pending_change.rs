use std::path::PathBuf;

/// State of one proposed file write during an apply session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingFileChange {
    pub resolved_path: PathBuf,
    pub existed_before: bool,
    /// On-disk content at preview time; empty when the file did not exist.
    pub original_content: String,
    pub proposed_content: String,
    /// Flips to true once and stays there.
    pub applied: bool,
    pub backup_path: Option<PathBuf>,
    pub last_error: Option<String>,
}

impl PendingFileChange {
    pub fn new(
        resolved_path: PathBuf,
        existed_before: bool,
        original_content: String,
        proposed_content: String,
    ) -> Self {
        Self {
            resolved_path,
            existed_before,
            original_content,
            proposed_content,
            applied: false,
            backup_path: None,
            last_error: None,
        }
    }

    /// True when the proposal would leave an existing file unchanged.
    pub fn is_noop(&self) -> bool {
        self.existed_before && self.original_content == self.proposed_content
    }
}
