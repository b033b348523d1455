use std::borrow::Cow;

use glob::{MatchOptions, Pattern};
use rayon::prelude::*;

use crate::plugin::{File, Files};
use crate::{Error, Result};

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: true,
};

/// Selects the files a plugin operates on by glob pattern.
#[derive(Clone, Debug)]
pub struct Matcher {
    patterns: Vec<Pattern>,
}

impl Matcher {
    /// Default pattern: every markdown file, at any depth.
    pub const MARKDOWN: &'static str = "**/*.md";

    pub fn new<I, S>(patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .map(|p| {
                let p = p.as_ref();
                Pattern::new(p).map_err(|source| Error::Pattern {
                    pattern: p.to_string(),
                    source,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Matcher { patterns })
    }

    pub fn is_match(&self, path: &str) -> bool {
        let path = if path.contains('\\') {
            Cow::Owned(path.replace('\\', "/"))
        } else {
            Cow::Borrowed(path)
        };
        self.patterns
            .iter()
            .any(|p| p.matches_with(&path, MATCH_OPTIONS))
    }

    /// Apply `f` to every matching file in collection order, stopping at the
    /// first error.
    pub(crate) fn each<F>(&self, files: &mut Files, mut f: F) -> Result<()>
    where
        F: FnMut(&str, &mut File) -> Result<()>,
    {
        for (path, file) in files.iter_mut() {
            if self.is_match(path) {
                f(path.as_str(), file)?;
            }
        }
        Ok(())
    }

    /// Like [`each`](Self::each) but spread over the rayon pool. Each file is
    /// handled by exactly one task; which error wins when several files fail
    /// is unspecified.
    pub(crate) fn par_each<F>(&self, files: &mut Files, f: F) -> Result<()>
    where
        F: Fn(&str, &mut File) -> Result<()> + Send + Sync,
    {
        files
            .par_iter_mut()
            .filter(|(path, _)| self.is_match(path.as_str()))
            .try_for_each(|(path, file)| f(path.as_str(), file))
    }
}
