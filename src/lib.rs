//! # site-markdown
//!
//! Markdown to HTML conversion for static site build pipelines.
//!
//! The crate wraps [`pulldown_cmark`] with two additions:
//! - **Inline extensions**: rules plugged into the inline lexer through a
//!   start hint, a tokenizer and a renderer. [`HandlebarsTag`] is the one
//!   shipped here; it passes `{{ ... }}` placeholders through untouched so a
//!   later templating step still sees them.
//! - **Batch conversion**: the [`Markdown`] plugin converts every matching
//!   file of a working collection in place, optionally re-rendering selected
//!   metadata fields.
//!
//! ## Example
//!
//! ```rust
//! use site_markdown::{File, Files, Markdown, Plugin, RenderOptions};
//!
//! let mut files = Files::new();
//! files.insert(
//!     "a.md".to_string(),
//!     File::new("# Hi {{name}}").with_meta("title", "Hello {{name}}"),
//! );
//!
//! let plugin = Markdown::new(RenderOptions::default().with_keys(["title"]))?;
//! plugin.run(&mut files)?;
//!
//! assert_eq!(files["a.md"].contents, b"<h1>Hi {{name}}</h1>\n");
//! assert_eq!(files["a.md"].metadata["title"], "<p>Hello {{name}}</p>\n");
//! # Ok::<(), site_markdown::Error>(())
//! ```

pub mod engine;
pub mod handlebars;
pub mod plugin;

pub use engine::extension::{Extensions, InlineExtension, Token};
pub use engine::{Engine, EngineBuilder, EngineOptions};
pub use handlebars::HandlebarsTag;
pub use plugin::markdown::{Markdown, RenderOptions};
pub use plugin::{File, Files, Matcher, Metadata, Plugin};

/// Error type for site-markdown operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// File contents are not valid UTF-8
    #[error("cannot decode `{path}` as UTF-8")]
    Decode {
        path: String,
        #[source]
        source: std::str::Utf8Error,
    },

    /// An inline extension produced a token the engine cannot use
    #[error("inline extension `{extension}` failed: {message}")]
    Render { extension: String, message: String },

    /// A file match pattern is not a valid glob
    #[error("invalid match pattern `{pattern}`")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    /// Options file parsing failed
    #[error("options parse error")]
    Config(#[from] toml::de::Error),
}

/// Result type alias for site-markdown operations.
pub type Result<T> = std::result::Result<T, Error>;
