// src/api/prompt.rs

use std::path::Path;

/// Fence language used when the primary context has no better hint.
pub const DEFAULT_LANGUAGE: &str = "python";

/// Builds the user prompt for one chat turn.
///
/// The open buffer comes first, then each context file in the order given,
/// and the query is always the last line.
pub fn build_prompt(
    query: &str,
    primary_context: &str,
    auxiliary_files: &[(String, String)],
    language: &str,
) -> String {
    let mut prompt = String::new();

    if !primary_context.is_empty() {
        prompt.push_str(&format!(
            "Here's my main code:\n```{}\n{}\n```\n\n",
            language, primary_context
        ));
    }

    if !auxiliary_files.is_empty() {
        prompt.push_str("Here are additional files in the project:\n\n");
        for (path, content) in auxiliary_files {
            let file_language = language_for_path(Path::new(path)).unwrap_or(language);
            prompt.push_str(&format!(
                "File: {}\n```{}\n{}\n```\n\n",
                path, file_language, content
            ));
        }
    }

    prompt.push_str(&format!("My question: {}", query));
    prompt
}

/// Fence language for a file, guessed from its extension.
pub fn language_for_path(path: &Path) -> Option<&'static str> {
    let extension = path.extension()?.to_str()?.to_lowercase();
    let language = match extension.as_str() {
        "py" | "pyi" => "python",
        "rs" => "rust",
        "js" | "jsx" => "javascript",
        "ts" | "tsx" => "typescript",
        "go" => "go",
        "c" | "h" => "c",
        "cpp" | "hpp" => "cpp",
        "java" => "java",
        "kt" => "kotlin",
        "rb" => "ruby",
        "php" => "php",
        "cs" => "csharp",
        "sh" => "bash",
        "sql" => "sql",
        "swift" => "swift",
        "json" => "json",
        "toml" => "toml",
        "yaml" | "yml" => "yaml",
        "xml" => "xml",
        "html" => "html",
        "css" => "css",
        "md" => "markdown",
        "txt" => "text",
        _ => return None,
    };
    Some(language)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_only() {
        assert_eq!(
            build_prompt("What is a decorator?", "", &[], DEFAULT_LANGUAGE),
            "My question: What is a decorator?"
        );
    }

    #[test]
    fn primary_context_then_files_then_query() {
        let files = vec![
            ("/p/util.py".to_string(), "def u(): pass".to_string()),
            ("/p/lib.rs".to_string(), "pub fn l() {}".to_string()),
        ];
        let prompt = build_prompt("Refactor this", "x = 1", &files, DEFAULT_LANGUAGE);

        assert_eq!(
            prompt,
            "Here's my main code:\n```python\nx = 1\n```\n\n\
             Here are additional files in the project:\n\n\
             File: /p/util.py\n```python\ndef u(): pass\n```\n\n\
             File: /p/lib.rs\n```rust\npub fn l() {}\n```\n\n\
             My question: Refactor this"
        );
    }

    #[test]
    fn unknown_extension_falls_back_to_default_language() {
        let files = vec![("notes.cfg".to_string(), "a=b".to_string())];
        let prompt = build_prompt("q", "", &files, "rust");
        assert!(prompt.contains("File: notes.cfg\n```rust\na=b\n```"));
        assert!(!prompt.contains("Here's my main code"));
    }

    #[test]
    fn is_deterministic() {
        let files = vec![("a.py".to_string(), "a".to_string())];
        assert_eq!(
            build_prompt("q", "ctx", &files, DEFAULT_LANGUAGE),
            build_prompt("q", "ctx", &files, DEFAULT_LANGUAGE)
        );
    }
}
