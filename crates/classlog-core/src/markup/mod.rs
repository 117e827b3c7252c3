//! Inline markup: tokenizer and renderers.
//!
//! Text is tokenized once into `Span`s and each output format gets its own
//! `Renderer`, so no rule ever sees another rule's output.

pub mod parser;
pub mod render;

pub use parser::{is_valid_id, tokenize, Span};
pub use render::{HtmlRenderer, PlainRenderer, Renderer};

/// Expand inline markup to HTML. Empty input gives an empty string.
pub fn parse(text: &str) -> String {
    HtmlRenderer::new().render(&tokenize(text))
}

/// Paragraph-aware HTML: blank lines split paragraphs, single newlines
/// become `<br>`, and paragraphs are joined without a separator.
pub fn format(text: &str) -> String {
    format_with(&HtmlRenderer::new(), text)
}

pub fn format_with<R: Renderer + ?Sized>(renderer: &R, text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    text.split("\n\n")
        .map(|paragraph| {
            renderer
                .render(&tokenize(paragraph))
                .replace('\n', renderer.line_break())
        })
        .collect::<Vec<_>>()
        .join(renderer.paragraph_separator())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_empty() {
        assert_eq!(parse(""), "");
        assert_eq!(format(""), "");
    }

    #[test]
    fn test_parse_without_markup_is_identity() {
        let text = "Ordinary text, with punctuation! 100% <b>kept</b>\nand a newline";
        assert_eq!(parse(text), text);
    }

    #[test]
    fn test_redaction_then_term() {
        let html = parse("[[REDACT|secret]] and {{t1|slang}}");
        assert_eq!(
            html,
            r#"<span class="redacted">secret</span> and <span class="term-tag" data-id="t1">slang</span>"#
        );
    }

    #[test]
    fn test_underscore_id_after_stray_underscore() {
        assert_eq!(
            parse("a_b met [[stu_02|Bo]]"),
            r#"a_b met <span class="person-tag" data-id="stu_02" title="stu_02">Bo</span>"#
        );
    }

    #[test]
    fn test_format_paragraphs() {
        let html = format("first [[p1|A]]\nline two\n\nsecond ^up^");
        assert_eq!(
            html,
            r#"first <span class="person-tag" data-id="p1" title="p1">A</span><br>line twosecond <sup>up</sup>"#
        );
    }

    #[test]
    fn test_format_plain() {
        let text = format_with(&PlainRenderer, "one\ntwo\n\nthree [[p1|A]]");
        assert_eq!(text, "one\ntwo\n\nthree A");
    }
}
