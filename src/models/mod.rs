pub mod pending_change;

pub use pending_change::PendingFileChange;

/// One chat turn's input. Built once by the shell and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatRequest {
    pub query: String,
    /// Text of the editor buffer that is currently open.
    pub primary_context: String,
    /// Attached context files as (path, content), in the order they were added.
    pub auxiliary_files: Vec<(String, String)>,
}

impl ChatRequest {
    pub fn new(
        query: impl Into<String>,
        primary_context: impl Into<String>,
        auxiliary_files: Vec<(String, String)>,
    ) -> Self {
        Self {
            query: query.into(),
            primary_context: primary_context.into(),
            auxiliary_files,
        }
    }
}

/// Proposed file contents keyed by the filename the model wrote, in order of
/// first appearance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileSet {
    entries: Vec<(String, String)>,
}

impl FileSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `content` under `name`. A name seen before keeps its original
    /// position and takes the new content.
    pub fn insert(&mut self, name: String, content: String) {
        match self.entries.iter_mut().find(|(existing, _)| *existing == name) {
            Some(entry) => entry.1 = content,
            None => self.entries.push((name, content)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, content)| content.as_str())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(name, content)| (name.as_str(), content.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<N: Into<String>, C: Into<String>> FromIterator<(N, C)> for FileSet {
    fn from_iter<I: IntoIterator<Item = (N, C)>>(iter: I) -> Self {
        let mut files = FileSet::new();
        for (name, content) in iter {
            files.insert(name.into(), content.into());
        }
        files
    }
}

/// What the assistant's reply turned out to be. Exactly one variant per parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedResponse {
    PlainMessage {
        text: String,
    },
    CodeSuggestion {
        code: String,
        explanation: String,
    },
    MultiFileChange {
        explanation: String,
        files: FileSet,
    },
}

impl ParsedResponse {
    /// Text the shell should show in the chat transcript.
    pub fn explanation(&self) -> &str {
        match self {
            ParsedResponse::PlainMessage { text } => text,
            ParsedResponse::CodeSuggestion { explanation, .. }
            | ParsedResponse::MultiFileChange { explanation, .. } => explanation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_name_keeps_first_position() {
        let mut files = FileSet::new();
        files.insert("a.py".into(), "1".into());
        files.insert("b.py".into(), "2".into());
        files.insert("a.py".into(), "3".into());

        assert_eq!(files.names().collect::<Vec<_>>(), vec!["a.py", "b.py"]);
        assert_eq!(files.get("a.py"), Some("3"));
        assert_eq!(files.len(), 2);
    }

    #[test]
    fn explanation_of_plain_message_is_its_text() {
        let response = ParsedResponse::PlainMessage {
            text: "no code here".into(),
        };
        assert_eq!(response.explanation(), "no code here");
    }
}
