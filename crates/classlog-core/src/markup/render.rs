use std::fmt::Write;

use super::parser::Span;
use crate::models::GlossaryTerm;

/// Character used to mask redacted text in plain output.
const MASK_CHAR: char = '█';

/// Turns tokenized markup into one output format.
pub trait Renderer {
    fn render_span(&self, span: &Span<'_>, out: &mut String);

    /// Separator placed between paragraphs by `format_with`.
    fn paragraph_separator(&self) -> &'static str;

    /// Replacement for a line break inside a paragraph.
    fn line_break(&self) -> &'static str;

    fn render(&self, spans: &[Span<'_>]) -> String {
        let mut out = String::new();
        for span in spans {
            self.render_span(span, &mut out);
        }
        out
    }
}

/// HTML fragments for the browser views. Text is copied verbatim; the
/// datasets are trusted static content and may carry their own inline HTML.
#[derive(Debug, Default, Clone, Copy)]
pub struct HtmlRenderer<'g> {
    glossary: &'g [GlossaryTerm],
}

impl<'g> HtmlRenderer<'g> {
    pub fn new() -> Self {
        Self { glossary: &[] }
    }

    /// Term tags get a `title` with the term's name when it is found in
    /// `glossary`.
    pub fn with_glossary(glossary: &'g [GlossaryTerm]) -> Self {
        Self { glossary }
    }

    fn term_title(&self, id: &str) -> Option<&'g str> {
        self.glossary
            .iter()
            .find(|t| t.id == id)
            .map(|t| t.term.as_str())
            .filter(|name| !name.is_empty())
    }
}

impl Renderer for HtmlRenderer<'_> {
    fn render_span(&self, span: &Span<'_>, out: &mut String) {
        // Writing into a String never fails
        let _ = match *span {
            Span::Text(text) => {
                out.push_str(text);
                Ok(())
            }
            Span::Redaction(payload) => write!(out, r#"<span class="redacted">{}</span>"#, payload),
            Span::TermRef { id, label } => match self.term_title(id) {
                Some(title) => write!(
                    out,
                    r#"<span class="term-tag" data-id="{}" title="{}">{}</span>"#,
                    id,
                    escape_attr(title),
                    label
                ),
                None => write!(out, r#"<span class="term-tag" data-id="{}">{}</span>"#, id, label),
            },
            Span::PersonRef { id, label } => write!(
                out,
                r#"<span class="person-tag" data-id="{}" title="{}">{}</span>"#,
                id, id, label
            ),
            Span::Superscript(text) => write!(out, "<sup>{}</sup>", text),
            Span::Subscript(text) => write!(out, "<sub>{}</sub>", text),
        };
    }

    fn paragraph_separator(&self) -> &'static str {
        ""
    }

    fn line_break(&self) -> &'static str {
        "<br>"
    }
}

/// Terminal text. Redactions stay masked.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainRenderer;

impl Renderer for PlainRenderer {
    fn render_span(&self, span: &Span<'_>, out: &mut String) {
        match *span {
            Span::Redaction(payload) => {
                out.extend(std::iter::repeat(MASK_CHAR).take(payload.chars().count()));
            }
            other => out.push_str(other.visible_text()),
        }
    }

    fn paragraph_separator(&self) -> &'static str {
        "\n\n"
    }

    fn line_break(&self) -> &'static str {
        "\n"
    }
}

fn escape_attr(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::tokenize;

    fn term(id: &str, name: &str) -> GlossaryTerm {
        GlossaryTerm {
            id: id.to_string(),
            term: name.to_string(),
            since: String::new(),
            definition: String::new(),
            related_people: vec![],
        }
    }

    #[test]
    fn test_html_person_tag() {
        let html = HtmlRenderer::new().render(&tokenize("[[p1|Alice]] said hi"));
        assert_eq!(
            html,
            r#"<span class="person-tag" data-id="p1" title="p1">Alice</span> said hi"#
        );
    }

    #[test]
    fn test_html_term_title_from_glossary() {
        let glossary = [term("t1", "Slang \"word\"")];
        let html = HtmlRenderer::with_glossary(&glossary).render(&tokenize("{{t1|slang}} {{t2|x}}"));
        assert_eq!(
            html,
            r#"<span class="term-tag" data-id="t1" title="Slang &quot;word&quot;">slang</span> <span class="term-tag" data-id="t2">x</span>"#
        );
    }

    #[test]
    fn test_html_sup_sub() {
        let html = HtmlRenderer::new().render(&tokenize("x^2^ H_2_O"));
        assert_eq!(html, "x<sup>2</sup> H<sub>2</sub>O");
    }

    #[test]
    fn test_plain_masks_redaction() {
        let plain = PlainRenderer.render(&tokenize("the [[REDACT|密码ab]] is {{t1|here}}"));
        assert_eq!(plain, "the ████ is here");
    }
}
