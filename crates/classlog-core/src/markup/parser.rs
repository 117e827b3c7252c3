//! Tokenizer for the inline markup used in record content,
//! person aliases/bios and glossary definitions.
//!
//! | syntax               | span          |
//! |----------------------|---------------|
//! | `[[REDACT|payload]]` | `Redaction`   |
//! | `{{id|label}}`       | `TermRef`     |
//! | `[[id|label]]`       | `PersonRef`   |
//! | `^text^`             | `Superscript` |
//! | `_text_`             | `Subscript`   |
//!
//! Ids are `[a-zA-Z0-9_-]+`. Labels and payloads hold at least one
//! character, never cross a line break and end at the first closing
//! delimiter. Anything that does not form a complete construct is text.
//!
//! Redactions and references are read first. Superscript and subscript
//! only apply to the text between them, so a stray `^` or `_` never
//! closes inside a reference.

const REDACT_OPEN: &str = "[[REDACT|";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Span<'a> {
    Text(&'a str),
    PersonRef { id: &'a str, label: &'a str },
    TermRef { id: &'a str, label: &'a str },
    Redaction(&'a str),
    Superscript(&'a str),
    Subscript(&'a str),
}

impl<'a> Span<'a> {
    /// The text a reader sees, ignoring styling.
    pub fn visible_text(&self) -> &'a str {
        match *self {
            Span::Text(t) | Span::Redaction(t) | Span::Superscript(t) | Span::Subscript(t) => t,
            Span::PersonRef { label, .. } | Span::TermRef { label, .. } => label,
        }
    }
}

pub fn tokenize(text: &str) -> Vec<Span<'_>> {
    let mut spans = Vec::new();
    scan(text, reference_at, styles, &mut spans);
    spans
}

/// Superscript and subscript within text that holds no references.
fn styles<'a>(text: &'a str, spans: &mut Vec<Span<'a>>) {
    scan(text, style_at, plain, spans);
}

fn plain<'a>(text: &'a str, spans: &mut Vec<Span<'a>>) {
    if !text.is_empty() {
        spans.push(Span::Text(text));
    }
}

/// Walk `text` left to right. Every construct `read` finds is pushed as is;
/// the text between constructs goes to `gap`.
fn scan<'a, R, G>(text: &'a str, read: R, mut gap: G, spans: &mut Vec<Span<'a>>)
where
    R: Fn(&'a str, usize) -> Option<(Span<'a>, usize)>,
    G: FnMut(&'a str, &mut Vec<Span<'a>>),
{
    let mut literal_start = 0;
    let mut pos = 0;

    while pos < text.len() {
        match read(text, pos) {
            Some((span, end)) => {
                gap(&text[literal_start..pos], spans);
                spans.push(span);
                pos = end;
                literal_start = end;
            }
            None => {
                pos += text[pos..].chars().next().map_or(1, char::len_utf8);
            }
        }
    }
    gap(&text[literal_start..], spans);
}

/// A redaction, term or person reference starting exactly at `pos`, with
/// the byte offset just past it.
fn reference_at(text: &str, pos: usize) -> Option<(Span<'_>, usize)> {
    let rest = &text[pos..];

    if rest.starts_with(REDACT_OPEN) {
        let start = pos + REDACT_OPEN.len();
        if let Some(end) = find_close(text, start, "]]") {
            return Some((Span::Redaction(&text[start..end]), end + 2));
        }
    }

    if rest.starts_with("{{") {
        if let Some((id, label, end)) = reference(text, pos + 2, "}}") {
            return Some((Span::TermRef { id, label }, end));
        }
    }

    if rest.starts_with("[[") {
        if let Some((id, label, end)) = reference(text, pos + 2, "]]") {
            return Some((Span::PersonRef { id, label }, end));
        }
    }

    None
}

/// A superscript or subscript starting exactly at `pos`.
fn style_at(text: &str, pos: usize) -> Option<(Span<'_>, usize)> {
    match text.as_bytes().get(pos)? {
        b'^' => find_close(text, pos + 1, "^")
            .map(|end| (Span::Superscript(&text[pos + 1..end]), end + 1)),
        b'_' => find_close(text, pos + 1, "_")
            .map(|end| (Span::Subscript(&text[pos + 1..end]), end + 1)),
        _ => None,
    }
}

/// `id|label<close>` starting at `start`.
fn reference<'a>(text: &'a str, start: usize, close: &str) -> Option<(&'a str, &'a str, usize)> {
    let id_len = text[start..]
        .bytes()
        .take_while(|b| is_id_byte(*b))
        .count();
    if id_len == 0 {
        return None;
    }
    let bar = start + id_len;
    if text.as_bytes().get(bar) != Some(&b'|') {
        return None;
    }
    let label_start = bar + 1;
    let end = find_close(text, label_start, close)?;
    Some((&text[start..bar], &text[label_start..end], end + close.len()))
}

/// Offset of the first `close` after at least one character of content,
/// provided the content stays on one line.
fn find_close(text: &str, start: usize, close: &str) -> Option<usize> {
    let first = text.get(start..)?.chars().next()?;
    if first == '\n' {
        return None;
    }
    let search_from = start + first.len_utf8();
    let found = search_from + text[search_from..].find(close)?;
    let line_end = text[start..].find('\n').map_or(text.len(), |i| start + i);
    (found < line_end).then_some(found)
}

pub fn is_id_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'-'
}

/// True if `id` could appear as a reference id.
pub fn is_valid_id(id: &str) -> bool {
    !id.is_empty() && id.bytes().all(is_id_byte)
}
