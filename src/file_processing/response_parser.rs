use super::fence::{scan_fences, Fence};
use super::TEXT_EXTENSIONS;
use crate::models::{FileSet, ParsedResponse};

/// How a fence was annotated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FenceKind<'a> {
    /// Names a file, either in the annotation or in a heading right above it.
    Named(String),
    /// Tagged with a language only, e.g. ```` ```python ````.
    Language(&'a str),
    /// No annotation at all.
    Bare,
}

/// Turns raw assistant text into a structured proposal.
///
/// Named fences win over unnamed ones: any fence that names a file makes the
/// whole reply a multi-file change, even when it is the only one. Otherwise the
/// first unnamed fence becomes a code suggestion and later ones are ignored.
/// Text without fences comes back untouched.
pub fn parse_response(raw_text: &str) -> ParsedResponse {
    let fences = scan_fences(raw_text);
    if fences.is_empty() {
        log::debug!("No code blocks found in response");
        return ParsedResponse::PlainMessage {
            text: raw_text.to_string(),
        };
    }

    let mut files = FileSet::new();
    let mut first_unnamed: Option<&Fence> = None;

    for fence in &fences {
        match classify_fence(fence) {
            FenceKind::Named(name) => {
                log::debug!("Found block for file: {}", name);
                files.insert(name, fence.body.to_string());
            }
            FenceKind::Language(_) | FenceKind::Bare => {
                if first_unnamed.is_none() {
                    first_unnamed = Some(fence);
                }
            }
        }
    }

    if !files.is_empty() {
        let explanation = raw_text[..fences[0].open].trim().to_string();
        log::debug!("Found changes for {} files", files.len());
        return ParsedResponse::MultiFileChange { explanation, files };
    }

    match first_unnamed {
        Some(fence) => {
            let before = raw_text[..fence.open].trim();
            let after = raw_text[fence.close..].trim();
            let explanation = [before, after]
                .into_iter()
                .filter(|part| !part.is_empty())
                .collect::<Vec<_>>()
                .join("\n\n");

            log::debug!("Found code block, length: {}", fence.body.len());
            ParsedResponse::CodeSuggestion {
                code: fence.body.to_string(),
                explanation,
            }
        }
        None => ParsedResponse::PlainMessage {
            text: raw_text.to_string(),
        },
    }
}

/// Decides what a fence's annotation (or the heading above it) says.
pub fn classify_fence<'a>(fence: &Fence<'a>) -> FenceKind<'a> {
    let mut tokens = fence.annotation.split_whitespace();
    let first = tokens.next();
    let second = tokens.next();

    if let Some(token) = first {
        let name = clean_filename(token);
        if is_filename(&name) {
            return FenceKind::Named(name);
        }
    }

    if let (Some(language), Some(token)) = (first, second) {
        let name = clean_filename(token);
        if is_language_marker(language) && is_filename(&name) {
            return FenceKind::Named(name);
        }
    }

    if let Some(name) = heading_filename(fence.lead) {
        return FenceKind::Named(name);
    }

    match first {
        Some(language) => FenceKind::Language(language),
        None => FenceKind::Bare,
    }
}

/// Strips surrounding quotes and any embedded line breaks.
pub fn clean_filename(raw: &str) -> String {
    let mut name = raw.trim();
    for quote in ['"', '\''] {
        if name.len() >= 2 && name.starts_with(quote) && name.ends_with(quote) {
            name = &name[1..name.len() - 1];
        }
    }
    name.replace(['\n', '\r'], "")
}

/// True for tokens like `main.py` or `src/app/view.tsx`.
pub fn is_filename(token: &str) -> bool {
    if token.is_empty() || token.chars().any(char::is_whitespace) {
        return false;
    }
    match token.rsplit_once('.') {
        Some((stem, extension)) => {
            !stem.is_empty()
                && !stem.ends_with('/')
                && !stem.ends_with('\\')
                && TEXT_EXTENSIONS.contains(&extension.to_lowercase().as_str())
        }
        None => false,
    }
}

fn is_language_marker(token: &str) -> bool {
    !token.is_empty()
        && token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '#' | '-' | '_'))
}

/// Filename named by the last non-blank line of `lead`.
///
/// Accepts a markdown heading that mentions a filename (`### src/a.py`) or a
/// line holding only a bold or backticked filename, optionally labelled
/// `File:`.
fn heading_filename(lead: &str) -> Option<String> {
    let line = lead.lines().rev().map(str::trim).find(|l| !l.is_empty())?;

    if let Some(title) = line.strip_prefix('#') {
        return title
            .trim_start_matches('#')
            .split_whitespace()
            .map(strip_decoration)
            .find(|name| is_filename(name));
    }

    if !(line.starts_with("**") || line.starts_with('`')) {
        return None;
    }
    let mut tokens = line
        .split_whitespace()
        .map(strip_decoration)
        .filter(|token| !token.is_empty() && !token.eq_ignore_ascii_case("file"));
    match (tokens.next(), tokens.next()) {
        (Some(name), None) if is_filename(&name) => Some(name),
        _ => None,
    }
}

fn strip_decoration(token: &str) -> String {
    clean_filename(token.trim_matches(|c| matches!(c, '`' | '*' | ':' | ',' | '(' | ')')))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn files_of(response: &ParsedResponse) -> Vec<(String, String)> {
        match response {
            ParsedResponse::MultiFileChange { files, .. } => files
                .iter()
                .map(|(name, content)| (name.to_string(), content.to_string()))
                .collect(),
            other => panic!("expected MultiFileChange, got {:?}", other),
        }
    }

    #[test]
    fn single_language_block_is_code_suggestion() {
        let raw = "Here is the fix:\n```python\ndef f():\n    return 1\n```\nThis returns 1.";
        assert_eq!(
            parse_response(raw),
            ParsedResponse::CodeSuggestion {
                code: "def f():\n    return 1\n".to_string(),
                explanation: "Here is the fix:\n\nThis returns 1.".to_string(),
            }
        );
    }

    #[test]
    fn filename_fences_become_multi_file_change_in_order() {
        let raw = "Two files:\n```src/a.py\nA=1\n```\nand\n```src/b.py\nB=2\n```\n";
        let response = parse_response(raw);

        assert_eq!(
            files_of(&response),
            vec![
                ("src/a.py".to_string(), "A=1\n".to_string()),
                ("src/b.py".to_string(), "B=2\n".to_string()),
            ]
        );
        assert_eq!(response.explanation(), "Two files:");
    }

    #[test]
    fn one_named_block_is_still_multi_file() {
        let raw = "```utils.py\ndef helper():\n    pass\n```";
        let response = parse_response(raw);

        assert_eq!(
            files_of(&response),
            vec![("utils.py".to_string(), "def helper():\n    pass\n".to_string())]
        );
        assert_eq!(response.explanation(), "");
    }

    #[test]
    fn language_then_filename_annotation() {
        let raw = "Update:\n```python app/main.py\nprint('hi')\n```";
        assert_eq!(
            files_of(&parse_response(raw)),
            vec![("app/main.py".to_string(), "print('hi')\n".to_string())]
        );
    }

    #[test]
    fn heading_names_following_fence() {
        let raw = "Changes below.\n\n### src/models.py\n```python\nclass A: pass\n```\n\n## notes.txt\n```\nremember\n```\n";
        assert_eq!(
            files_of(&parse_response(raw)),
            vec![
                ("src/models.py".to_string(), "class A: pass\n".to_string()),
                ("notes.txt".to_string(), "remember\n".to_string()),
            ]
        );
    }

    #[test]
    fn heading_with_decorated_filename() {
        let raw = "## File: `config.toml`\n```toml\nkey = 1\n```";
        assert_eq!(
            files_of(&parse_response(raw)),
            vec![("config.toml".to_string(), "key = 1\n".to_string())]
        );
    }

    #[test]
    fn bold_label_names_following_fence() {
        let raw = "**utils.py**\n```python\nx = 1\n```\n";
        let response = parse_response(raw);

        assert_eq!(
            files_of(&response),
            vec![("utils.py".to_string(), "x = 1\n".to_string())]
        );
        assert_eq!(response.explanation(), "**utils.py**");
    }

    #[test]
    fn backtick_labels_name_following_fences() {
        let raw = "`a.py`:\n```python\na = 1\n```\n**File:** `b.py`\n```python\nb = 2\n```";
        assert_eq!(
            files_of(&parse_response(raw)),
            vec![
                ("a.py".to_string(), "a = 1\n".to_string()),
                ("b.py".to_string(), "b = 2\n".to_string()),
            ]
        );
    }

    #[test]
    fn bold_sentence_mentioning_a_file_is_not_a_label() {
        let raw = "**Note:** this replaces main.py\n```python\nx = 1\n```";
        assert!(matches!(
            parse_response(raw),
            ParsedResponse::CodeSuggestion { .. }
        ));
    }

    #[test]
    fn fence_syntax_mentioned_in_prose() {
        let raw = "Wrap code with ``` to fence it.\n```python\nx = 1\n```\n";
        assert_eq!(
            parse_response(raw),
            ParsedResponse::CodeSuggestion {
                code: "x = 1\n".to_string(),
                explanation: "Wrap code with ``` to fence it.".to_string(),
            }
        );
    }

    #[test]
    fn named_blocks_win_over_unnamed_ones() {
        let raw = "```python\nscratch = True\n```\nThen:\n```lib.rs\npub fn x() {}\n```";
        let response = parse_response(raw);

        assert_eq!(
            files_of(&response),
            vec![("lib.rs".to_string(), "pub fn x() {}\n".to_string())]
        );
        assert_eq!(response.explanation(), "");
    }

    #[test]
    fn quoted_filename_is_cleaned() {
        let raw = "```\"main.py\"\nx = 2\n```";
        assert_eq!(
            files_of(&parse_response(raw)),
            vec![("main.py".to_string(), "x = 2\n".to_string())]
        );
    }

    #[test]
    fn only_first_unnamed_block_is_used() {
        let raw = "First:\n```python\na = 1\n```\nSecond:\n```python\nb = 2\n```";
        match parse_response(raw) {
            ParsedResponse::CodeSuggestion { code, explanation } => {
                assert_eq!(code, "a = 1\n");
                assert_eq!(explanation, "First:\n\nSecond:\n```python\nb = 2\n```");
            }
            other => panic!("expected CodeSuggestion, got {:?}", other),
        }
    }

    #[test]
    fn code_is_not_trimmed() {
        let raw = "```rust\n\n    let x = 1;  \n\n```";
        match parse_response(raw) {
            ParsedResponse::CodeSuggestion { code, explanation } => {
                assert_eq!(code, "\n    let x = 1;  \n\n");
                assert_eq!(explanation, "");
            }
            other => panic!("expected CodeSuggestion, got {:?}", other),
        }
    }

    #[test]
    fn bare_fence_is_code_suggestion() {
        let raw = "Try this\n```\necho hi\n```";
        match parse_response(raw) {
            ParsedResponse::CodeSuggestion { code, explanation } => {
                assert_eq!(code, "echo hi\n");
                assert_eq!(explanation, "Try this");
            }
            other => panic!("expected CodeSuggestion, got {:?}", other),
        }
    }

    #[test]
    fn text_without_fences_is_returned_unchanged() {
        let raw = "  Sure, that function looks fine.\n\nNo changes needed.  ";
        assert_eq!(
            parse_response(raw),
            ParsedResponse::PlainMessage {
                text: raw.to_string()
            }
        );
    }

    #[test]
    fn unterminated_fence_falls_back_to_plain_message() {
        let raw = "Here:\n```python\nprint(1)\n";
        assert_eq!(
            parse_response(raw),
            ParsedResponse::PlainMessage {
                text: raw.to_string()
            }
        );
    }

    #[test]
    fn filename_detection() {
        assert!(is_filename("main.py"));
        assert!(is_filename("src/app/View.TSX"));
        assert!(!is_filename("python"));
        assert!(!is_filename(".py"));
        assert!(!is_filename("src/.py"));
        assert!(!is_filename("archive.zip"));
        assert!(!is_filename("my file.py"));
    }

    #[test]
    fn cleaning_strips_quotes_and_line_breaks() {
        assert_eq!(clean_filename("'a.py'"), "a.py");
        assert_eq!(clean_filename("\"src/b\r\n.py\""), "src/b.py");
        assert_eq!(clean_filename("\"\""), "");
    }

    #[test]
    fn classify_reports_language() {
        let fences = scan_fences("```rust\nfn main() {}\n```");
        assert_eq!(classify_fence(&fences[0]), FenceKind::Language("rust"));
    }
}
