use std::path::{Component, Path, PathBuf};

/// Top-level directories that mark a filename as relative to the workspace root.
pub const PROJECT_PREFIXES: [&str; 2] = ["src", "tests"];

/// Where the editor currently is: used to turn model-written filenames into paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionContext {
    pub current_file: Option<PathBuf>,
    pub context_files: Vec<PathBuf>,
    pub workspace_root: PathBuf,
}

impl ResolutionContext {
    pub fn new(workspace_root: impl Into<PathBuf>) -> Self {
        Self {
            current_file: None,
            context_files: Vec::new(),
            workspace_root: workspace_root.into(),
        }
    }

    pub fn with_current_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.current_file = Some(path.into());
        self
    }

    pub fn with_context_files(mut self, paths: Vec<PathBuf>) -> Self {
        self.context_files = paths;
        self
    }

    /// Resolves `filename` to a normalized path.
    ///
    /// 1. absolute paths are used as-is;
    /// 2. `src/...` and `tests/...` are joined to the workspace root;
    /// 3. a bare name matching an attached context file resolves to that file;
    /// 4. anything else sits next to the open file, or in the workspace root.
    pub fn resolve(&self, filename: &str) -> PathBuf {
        let candidate = Path::new(filename);

        let resolved = if candidate.is_absolute() {
            candidate.to_path_buf()
        } else if has_project_prefix(filename) {
            self.workspace_root.join(candidate)
        } else if let Some(context_file) = self.matching_context_file(filename) {
            context_file.clone()
        } else {
            let base_dir = self
                .current_file
                .as_deref()
                .and_then(Path::parent)
                .unwrap_or(&self.workspace_root);
            base_dir.join(candidate)
        };

        normalize_path(&resolved)
    }

    fn matching_context_file(&self, filename: &str) -> Option<&PathBuf> {
        self.context_files.iter().find(|path| {
            path.file_name()
                .map(|name| name.to_string_lossy() == filename)
                .unwrap_or(false)
        })
    }

    /// True when `path` is the file open in the editor.
    pub fn is_current_file(&self, path: &Path) -> bool {
        self.current_file
            .as_deref()
            .map(|current| normalize_path(current) == normalize_path(path))
            .unwrap_or(false)
    }
}

fn has_project_prefix(filename: &str) -> bool {
    PROJECT_PREFIXES.iter().any(|prefix| {
        filename
            .strip_prefix(prefix)
            .map(|rest| rest.starts_with('/') || rest.starts_with('\\'))
            .unwrap_or(false)
    })
}

/// Collapses `.` and `..` segments and redundant separators without touching
/// the disk.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match normalized.components().next_back() {
                Some(Component::Normal(_)) => {
                    normalized.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => normalized.push(".."),
            },
            other => normalized.push(other.as_os_str()),
        }
    }
    if normalized.as_os_str().is_empty() {
        normalized.push(".");
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> ResolutionContext {
        ResolutionContext::new("/work")
            .with_current_file("/work/pkg/main.py")
            .with_context_files(vec![PathBuf::from("/ctx/foo.py")])
    }

    #[test]
    fn absolute_filename_is_used_as_is() {
        assert_eq!(context().resolve("/etc/app/x.py"), PathBuf::from("/etc/app/x.py"));
    }

    #[test]
    fn project_prefix_joins_workspace_root() {
        assert_eq!(context().resolve("src/a.py"), PathBuf::from("/work/src/a.py"));
        assert_eq!(context().resolve("tests/t.py"), PathBuf::from("/work/tests/t.py"));
    }

    #[test]
    fn prefix_must_be_a_whole_directory() {
        assert_eq!(
            context().resolve("srcutil/a.py"),
            PathBuf::from("/work/pkg/srcutil/a.py")
        );
    }

    #[test]
    fn context_file_base_name_wins() {
        assert_eq!(context().resolve("foo.py"), PathBuf::from("/ctx/foo.py"));
    }

    #[test]
    fn falls_back_to_open_file_directory() {
        assert_eq!(context().resolve("bar.py"), PathBuf::from("/work/pkg/bar.py"));
    }

    #[test]
    fn falls_back_to_workspace_root_without_open_file() {
        let ctx = ResolutionContext::new("/work");
        assert_eq!(ctx.resolve("bar.py"), PathBuf::from("/work/bar.py"));
    }

    #[test]
    fn resolved_paths_are_normalized() {
        assert_eq!(
            context().resolve("src/./models/../views//v.py"),
            PathBuf::from("/work/src/views/v.py")
        );
        assert_eq!(context().resolve("../up.py"), PathBuf::from("/work/up.py"));
    }

    #[test]
    fn normalize_keeps_leading_parent_of_relative_path() {
        assert_eq!(normalize_path(Path::new("../a/./b")), PathBuf::from("../a/b"));
        assert_eq!(normalize_path(Path::new("/../a")), PathBuf::from("/a"));
        assert_eq!(normalize_path(Path::new("a/..")), PathBuf::from("."));
    }

    #[test]
    fn recognizes_current_file() {
        let ctx = context();
        assert!(ctx.is_current_file(Path::new("/work/pkg/./main.py")));
        assert!(!ctx.is_current_file(Path::new("/work/pkg/other.py")));
    }
}
