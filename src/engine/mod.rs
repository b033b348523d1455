//! Markdown engine with pluggable inline extensions.
//!
//! [`Engine`] renders markdown through `pulldown-cmark`. Extensions are
//! registered on an [`EngineBuilder`]; once built, the engine is immutable
//! and can be shared freely between threads.

pub mod extension;
mod mask;
mod scan;

use std::sync::Arc;

use pulldown_cmark::{Event, Options, Parser};
use serde::Deserialize;

use crate::Result;
use extension::{Extensions, InlineExtension};
use mask::Masked;

/// Options for markdown rendering, forwarded to `pulldown-cmark`.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct EngineOptions {
    /// GitHub flavoured extensions: tables, strikethrough, task lists and
    /// blockquote tags
    pub gfm: bool,
    /// Render soft line breaks as `<br />`
    pub breaks: bool,
    /// Enable footnotes extension
    pub footnotes: bool,
    /// Typographic quotes, dashes and ellipses
    pub smart_punctuation: bool,
    /// Enable heading attributes extension (e.g., `# Heading {#custom-id}`)
    pub heading_attributes: bool,
    /// Enable `$inline$` and `$$display$$` math
    pub math: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            gfm: true,
            breaks: false,
            footnotes: false,
            smart_punctuation: false,
            heading_attributes: false,
            math: false,
        }
    }
}

impl EngineOptions {
    /// Plain CommonMark, no extensions.
    pub fn commonmark() -> Self {
        Self {
            gfm: false,
            ..Self::default()
        }
    }

    /// Convert to pulldown-cmark Options
    pub fn to_pulldown_options(&self) -> Options {
        let mut opts = Options::empty();
        if self.gfm {
            opts.insert(Options::ENABLE_TABLES);
            opts.insert(Options::ENABLE_STRIKETHROUGH);
            opts.insert(Options::ENABLE_TASKLISTS);
            opts.insert(Options::ENABLE_GFM);
        }
        if self.footnotes {
            opts.insert(Options::ENABLE_FOOTNOTES);
        }
        if self.smart_punctuation {
            opts.insert(Options::ENABLE_SMART_PUNCTUATION);
        }
        if self.heading_attributes {
            opts.insert(Options::ENABLE_HEADING_ATTRIBUTES);
        }
        if self.math {
            opts.insert(Options::ENABLE_MATH);
        }
        opts
    }
}

/// A configured markdown renderer.
#[derive(Clone, Debug, Default)]
pub struct Engine {
    extensions: Extensions,
    options: EngineOptions,
}

/// Collects extensions and default options for an [`Engine`].
#[derive(Debug, Default)]
pub struct EngineBuilder {
    extensions: Extensions,
    options: EngineOptions,
}

impl EngineBuilder {
    /// Register an inline extension. Registering a second extension with
    /// the same name replaces the first.
    pub fn extension<E: InlineExtension + 'static>(mut self, extension: E) -> Self {
        self.extensions.register(Arc::new(extension));
        self
    }

    /// Set the options used by [`Engine::render`].
    pub fn options(mut self, options: EngineOptions) -> Self {
        self.options = options;
        self
    }

    pub fn build(self) -> Engine {
        Engine {
            extensions: self.extensions,
            options: self.options,
        }
    }
}

impl Engine {
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    pub fn extensions(&self) -> &Extensions {
        &self.extensions
    }

    /// Render markdown to HTML with the engine's default options.
    pub fn render(&self, markdown: &str) -> Result<String> {
        self.render_with(markdown, &self.options)
    }

    /// Render markdown to HTML with per-call options.
    pub fn render_with(&self, markdown: &str, options: &EngineOptions) -> Result<String> {
        let opts = options.to_pulldown_options();
        if self.extensions.next_start(markdown).is_none() {
            return Ok(push_html(markdown, opts, options.breaks));
        }

        let spans = scan::scan(markdown, opts, &self.extensions)?;
        if spans.is_empty() {
            return Ok(push_html(markdown, opts, options.breaks));
        }

        let masked = Masked::new(markdown, spans);
        let html = push_html(masked.source(), opts, options.breaks);
        Ok(masked.restore(&html))
    }
}

fn push_html(markdown: &str, opts: Options, breaks: bool) -> String {
    let parser = Parser::new_ext(markdown, opts).map(|event| match event {
        Event::SoftBreak if breaks => Event::HardBreak,
        other => other,
    });
    let mut html = String::with_capacity(markdown.len() * 3 / 2);
    pulldown_cmark::html::push_html(&mut html, parser);
    html
}
