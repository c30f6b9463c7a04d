use std::ops::Range;

const OPEN: &str = "{{";
const CLOSE: u8 = b'}';

/// Byte ranges of every `{{content}}` match in `string`, left to right.
///
/// `content` is non-empty and never contains `}`; the first `}}` after a `{{` closes the match.
/// When the first `}` after a `{{` is not doubled (or the content is empty), scanning resumes one
/// byte after that `{{`, so `{{{a}}` matches as a whole with content `{a`.
pub(crate) fn scan_placeholders(string: &str) -> Vec<Range<usize>> {
    let bytes = string.as_bytes();
    let mut spans = Vec::new();
    let mut cursor = 0;
    while let Some(offset) = string[cursor..].find(OPEN) {
        let start = cursor + offset;
        let content_start = start + OPEN.len();
        let close = bytes[content_start..]
            .iter()
            .position(|b| *b == CLOSE)
            .map(|p| content_start + p);
        match close {
            Some(close) if close > content_start && bytes.get(close + 1) == Some(&CLOSE) => {
                let end = close + 2;
                spans.push(start..end);
                cursor = end;
            }
            Some(_) => cursor = start + 1,
            // no `}` left, so no later `{{` can match either
            None => break,
        }
    }
    spans
}

/// Strips the `{{` and `}}` around a span produced by [scan_placeholders].
#[inline]
pub(crate) fn strip_format(raw: &str) -> &str {
    &raw[OPEN.len()..raw.len() - 2]
}

/// Line terminators as understood by the option grammar (`.` never crosses these).
#[inline]
pub(crate) fn has_line_terminator(string: &str) -> bool {
    string.contains(&['\n', '\r', '\u{2028}', '\u{2029}'][..])
}

/// Parses `label: [opt1;;opt2]` from already-trimmed placeholder content.
///
/// The label is the shortest non-empty prefix ending before a `:` that is followed by optional
/// whitespace and a `[...]` block closing at the very end of the content. Returns `None` if no such
/// split exists.
pub(crate) fn split_label_and_options(content: &str) -> Option<(&str, &str)> {
    let block = content.strip_suffix(']')?;
    for (colon, _) in content.match_indices(':') {
        let label = &content[..colon];
        if has_line_terminator(label) {
            return None;
        }
        if label.is_empty() {
            continue;
        }
        // `block` ends one byte before `content`, so a `[` found here always precedes the final `]`
        let after_colon = &block[colon + 1..];
        let Some(options) = after_colon.trim_start().strip_prefix('[') else {
            continue;
        };
        if options.is_empty() || has_line_terminator(options) {
            continue;
        }
        return Some((label, options));
    }
    None
}

/// Converts every CRLF to LF.
pub fn normalize_line_endings(string: &str) -> String {
    string.replace("\r\n", "\n")
}
