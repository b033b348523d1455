//! User-defined inline rules.
//!
//! This module defines the trait that lets consumers plug extra inline
//! syntax into the [`Engine`](crate::Engine). An extension is wired in
//! through three hooks: a start hint, a tokenizer anchored at the current
//! scan position, and a renderer for the tokens it produced.

use std::borrow::Cow;
use std::sync::Arc;

use crate::{Error, Result};

/// A token produced by an inline extension.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    /// Name of the extension that produced the token.
    pub kind: Cow<'static, str>,
    /// Source text consumed by the token.
    pub raw: String,
    /// Payload handed to the renderer.
    pub text: String,
}

impl Token {
    /// Create a token whose payload is its raw source text.
    pub fn new(kind: impl Into<Cow<'static, str>>, raw: impl Into<String>) -> Self {
        let raw = raw.into();
        Token {
            kind: kind.into(),
            text: raw.clone(),
            raw,
        }
    }

    /// Replace the renderer payload.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }
}

/// Trait describing a user-defined inline rule.
///
/// The engine calls [`start`](InlineExtension::start) on the remaining
/// input to find the next candidate position, then calls
/// [`tokenize`](InlineExtension::tokenize) with input that begins exactly
/// there. Implementors must only match at the start of `src`.
pub trait InlineExtension: std::fmt::Debug + Send + Sync {
    /// Unique name of the rule. Also used as the kind of its tokens.
    fn name(&self) -> &str;

    /// Byte index of the next position in `src` where this rule may match.
    fn start(&self, src: &str) -> Option<usize>;

    /// Try to match at the very start of `src`.
    ///
    /// `tokens` holds the tokens extensions already produced in the current
    /// inline container, in source order.
    fn tokenize(&self, src: &str, tokens: &[Token]) -> Option<Token>;

    /// Render a token previously returned by `tokenize`.
    fn render(&self, token: &Token) -> String;
}

/// Ordered set of inline extensions. Earlier entries take precedence when
/// several match at the same position.
#[derive(Clone, Debug, Default)]
pub struct Extensions {
    entries: Vec<Arc<dyn InlineExtension>>,
}

impl Extensions {
    pub fn new() -> Self {
        Extensions {
            entries: Vec::new(),
        }
    }

    /// Register an extension. An extension with the same name is replaced
    /// in place and keeps its priority.
    pub fn register(&mut self, extension: Arc<dyn InlineExtension>) -> &mut Self {
        match self
            .entries
            .iter_mut()
            .find(|e| e.name() == extension.name())
        {
            Some(slot) => *slot = extension,
            None => self.entries.push(extension),
        }
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn InlineExtension>> {
        self.entries.iter().find(|e| e.name() == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn InlineExtension>> {
        self.entries.iter()
    }

    /// Smallest start hint over all registered extensions.
    pub fn next_start(&self, src: &str) -> Option<usize> {
        self.entries.iter().filter_map(|e| e.start(src)).min()
    }

    /// Try every extension, in priority order, at the start of `src`.
    ///
    /// A token that consumes nothing, or whose raw text is not a prefix of
    /// `src`, is rejected with [`Error::Render`].
    pub(crate) fn tokenize(
        &self,
        src: &str,
        tokens: &[Token],
    ) -> Result<Option<(Arc<dyn InlineExtension>, Token)>> {
        for extension in &self.entries {
            let Some(token) = extension.tokenize(src, tokens) else {
                continue;
            };
            if token.raw.is_empty() {
                return Err(Error::Render {
                    extension: extension.name().to_string(),
                    message: "token consumed no input".to_string(),
                });
            }
            if !src.starts_with(&token.raw) {
                return Err(Error::Render {
                    extension: extension.name().to_string(),
                    message: format!(
                        "token {:?} does not start the remaining input",
                        token.raw
                    ),
                });
            }
            return Ok(Some((Arc::clone(extension), token)));
        }
        Ok(None)
    }
}
