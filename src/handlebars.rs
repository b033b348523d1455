//! Literal passthrough for handlebars tags.
//!
//! Markdown inline rules would otherwise turn `{{user_name}}` into emphasis
//! or escape the `>` in `{{#if (gt a b)}}`, breaking the templating step
//! that runs on the HTML afterwards.

use std::sync::LazyLock;

use regex::Regex;

use crate::engine::extension::{InlineExtension, Token};

// Complete tag, anchored at the start of the remaining input. The interior
// never crosses a newline and extra closing braces are absorbed.
static TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\{\{(?:\{.*?\}|.*?)\}\}+").unwrap());

/// Inline extension emitting `{{ ... }}` and `{{{ ... }}}` verbatim.
#[derive(Clone, Copy, Debug, Default)]
pub struct HandlebarsTag;

impl HandlebarsTag {
    pub const NAME: &'static str = "handlebarsTag";
}

impl InlineExtension for HandlebarsTag {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn start(&self, src: &str) -> Option<usize> {
        src.find("{{")
    }

    fn tokenize(&self, src: &str, _tokens: &[Token]) -> Option<Token> {
        TAG.find(src).map(|m| Token::new(Self::NAME, m.as_str()))
    }

    fn render(&self, token: &Token) -> String {
        token.text.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(src: &str) -> Option<String> {
        HandlebarsTag.tokenize(src, &[]).map(|t| t.raw)
    }

    #[test]
    fn start_hint() {
        assert_eq!(HandlebarsTag.start("ab {{c}}"), Some(3));
        assert_eq!(HandlebarsTag.start("a { b }"), None);
    }

    #[test]
    fn double_and_triple_braces() {
        assert_eq!(raw("{{name}} rest").as_deref(), Some("{{name}}"));
        assert_eq!(raw("{{{body}}} rest").as_deref(), Some("{{{body}}}"));
        assert_eq!(raw("{{}}").as_deref(), Some("{{}}"));
    }

    #[test]
    fn interior_is_not_interpreted() {
        assert_eq!(
            raw("{{ *a_b* [c](d) }}").as_deref(),
            Some("{{ *a_b* [c](d) }}")
        );
    }

    #[test]
    fn absorbs_trailing_braces() {
        assert_eq!(raw("{{a}}}} x").as_deref(), Some("{{a}}}}"));
    }

    #[test]
    fn stops_at_first_close() {
        assert_eq!(raw("{{a}}{{b}}").as_deref(), Some("{{a}}"));
        assert_eq!(raw("{{a}} and {{b}}").as_deref(), Some("{{a}}"));
    }

    #[test]
    fn declines_without_close() {
        assert_eq!(raw("{{ unterminated"), None);
        assert_eq!(raw("{{ a\n}}"), None);
        assert_eq!(raw("{ a }}"), None);
    }

    #[test]
    fn anchored_at_start() {
        assert_eq!(raw("x {{a}}"), None);
    }

    #[test]
    fn renders_raw_text() {
        let token = HandlebarsTag.tokenize("{{ a < b }}", &[]).unwrap();
        assert_eq!(token.kind, HandlebarsTag::NAME);
        assert_eq!(HandlebarsTag.render(&token), "{{ a < b }}");
    }
}
