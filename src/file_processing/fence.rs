/// Opening and closing marker of a fenced block.
pub const FENCE_MARKER: &str = "```";

/// A fenced region found in assistant text.
///
/// Offsets are byte positions into the scanned text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fence<'a> {
    /// Position of the opening marker.
    pub open: usize,
    /// Position just past the closing marker.
    pub close: usize,
    /// Whatever followed the opening marker on its line, trimmed.
    pub annotation: &'a str,
    /// Everything between the annotation line and the closing marker.
    pub body: &'a str,
    /// Text between the previous fence (or the start) and this one.
    pub lead: &'a str,
}

/// Finds every fenced block in `text`, in order.
///
/// A block opens only at a marker that starts its line, ignoring indentation;
/// markers in the middle of prose are skipped. It closes at the next marker
/// after its annotation line, so a marker inside a string literal ends the
/// block early. Markers that open and close on the same line are inline spans
/// and are skipped. Scanning stops at the first fence that never closes.
pub fn scan_fences(text: &str) -> Vec<Fence<'_>> {
    let mut fences = Vec::new();
    let mut cursor = 0;
    let mut previous_close = 0;

    while let Some(found) = text[cursor..].find(FENCE_MARKER) {
        let open = cursor + found;
        let annotation_start = open + FENCE_MARKER.len();

        if !starts_line(text, open) {
            cursor = annotation_start;
            continue;
        }

        let Some(line_len) = text[annotation_start..].find('\n') else {
            break;
        };
        let annotation_line = &text[annotation_start..annotation_start + line_len];

        if let Some(inline) = annotation_line.find(FENCE_MARKER) {
            cursor = annotation_start + inline + FENCE_MARKER.len();
            continue;
        }

        let body_start = annotation_start + line_len + 1;
        let Some(body_len) = text[body_start..].find(FENCE_MARKER) else {
            log::debug!("Unterminated fence at byte {}", open);
            break;
        };
        let body_end = body_start + body_len;
        let close = body_end + FENCE_MARKER.len();

        fences.push(Fence {
            open,
            close,
            annotation: annotation_line.trim(),
            body: &text[body_start..body_end],
            lead: &text[previous_close..open],
        });

        previous_close = close;
        cursor = close;
    }

    fences
}

fn starts_line(text: &str, offset: usize) -> bool {
    let line_start = text[..offset].rfind('\n').map_or(0, |i| i + 1);
    text[line_start..offset].chars().all(char::is_whitespace)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_blocks_in_order() {
        let text = "intro\n```python\nx = 1\n```\nmiddle\n```src/a.py\nA=1\n```\n";
        let fences = scan_fences(text);

        assert_eq!(fences.len(), 2);
        assert_eq!(fences[0].annotation, "python");
        assert_eq!(fences[0].body, "x = 1\n");
        assert_eq!(fences[0].lead, "intro\n");
        assert_eq!(fences[1].annotation, "src/a.py");
        assert_eq!(fences[1].body, "A=1\n");
        assert_eq!(fences[1].lead, "\nmiddle\n");
        assert_eq!(&text[fences[1].close..], "\n");
    }

    #[test]
    fn empty_body_is_kept() {
        let fences = scan_fences("```python\n```");
        assert_eq!(fences.len(), 1);
        assert_eq!(fences[0].body, "");
    }

    #[test]
    fn inline_spans_are_skipped() {
        let text = "Use ```let x``` inline.\n```rust\nfn main() {}\n```";
        let fences = scan_fences(text);

        assert_eq!(fences.len(), 1);
        assert_eq!(fences[0].annotation, "rust");
        assert_eq!(fences[0].lead, "Use ```let x``` inline.\n");
    }

    #[test]
    fn marker_in_prose_does_not_open_a_block() {
        let text = "Wrap code with ``` to fence it.\n```python\nx = 1\n```\n";
        let fences = scan_fences(text);

        assert_eq!(fences.len(), 1);
        assert_eq!(fences[0].annotation, "python");
        assert_eq!(fences[0].body, "x = 1\n");
        assert_eq!(fences[0].lead, "Wrap code with ``` to fence it.\n");
    }

    #[test]
    fn indented_fence_opens_a_block() {
        let fences = scan_fences("1. Run:\n   ```sh\n   make\n   ```\n");
        assert_eq!(fences.len(), 1);
        assert_eq!(fences[0].annotation, "sh");
        assert_eq!(fences[0].body, "   make\n   ");
    }

    #[test]
    fn unterminated_fence_stops_scan() {
        let fences = scan_fences("```python\nprint('never closed')\n");
        assert!(fences.is_empty());
    }

    #[test]
    fn marker_inside_string_literal_closes_early() {
        let text = "```python\ns = \"```\"\n```\n";
        let fences = scan_fences(text);

        assert_eq!(fences[0].body, "s = \"");
    }

    #[test]
    fn crlf_annotation_is_trimmed() {
        let fences = scan_fences("```python\r\nx = 1\r\n```");
        assert_eq!(fences[0].annotation, "python");
        assert_eq!(fences[0].body, "x = 1\r\n");
    }
}
