//! Batch markdown conversion.
//!
//! [`Markdown`] replaces the contents of every matching file with rendered
//! HTML and re-renders selected metadata fields through the same engine.
//! Paths are left as they are; renaming `.md` to `.html` is up to a later
//! plugin.

use std::borrow::Cow;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::engine::{Engine, EngineOptions};
use crate::handlebars::HandlebarsTag;
use crate::plugin::{File, Files, Matcher, Plugin};
use crate::{Error, Result};

/// Options for the markdown plugin.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct RenderOptions {
    /// Metadata keys whose values are rendered as markdown too
    pub keys: Vec<String>,
    /// Glob patterns selecting the files to convert
    pub pattern: Vec<String>,
    /// Convert files on the rayon thread pool
    pub parallel: bool,
    /// Options forwarded to the markdown engine
    pub engine: EngineOptions,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            keys: Vec::new(),
            pattern: vec![Matcher::MARKDOWN.to_string()],
            parallel: false,
            engine: EngineOptions::default(),
        }
    }
}

impl RenderOptions {
    /// Parse options from TOML. Unknown fields are ignored with a warning.
    pub fn from_toml(content: &str) -> Result<Self> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let options: Self =
            serde_ignored::deserialize(deserializer, |path: serde_ignored::Path<'_>| {
                ignored.push(path.to_string());
            })?;
        for field in &ignored {
            warn!(plugin = Markdown::NAME, field = %field, "ignoring unknown option");
        }
        Ok(options)
    }

    pub fn with_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keys = keys.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_pattern<I, S>(mut self, pattern: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.pattern = pattern.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_engine(mut self, engine: EngineOptions) -> Self {
        self.engine = engine;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}

/// Plugin converting markdown files to HTML in place.
#[derive(Clone, Debug)]
pub struct Markdown {
    engine: Arc<Engine>,
    options: RenderOptions,
    matcher: Matcher,
}

impl Markdown {
    pub const NAME: &'static str = "site-markdown/plugins/markdown";

    /// Build the plugin with an engine that passes handlebars tags through.
    pub fn new(options: RenderOptions) -> Result<Self> {
        let engine = Engine::builder()
            .extension(HandlebarsTag)
            .options(options.engine.clone())
            .build();
        Self::with_engine(Arc::new(engine), options)
    }

    /// Build the plugin around an already configured engine.
    pub fn with_engine(engine: Arc<Engine>, options: RenderOptions) -> Result<Self> {
        let matcher = Matcher::new(&options.pattern)?;
        Ok(Markdown {
            engine,
            options,
            matcher,
        })
    }

    pub fn engine(&self) -> &Arc<Engine> {
        &self.engine
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Convert a single file, regardless of whether its path matches.
    pub fn convert(&self, path: &str, file: &mut File) -> Result<()> {
        debug!(plugin = Self::NAME, file = path, "converting file");

        let text = std::str::from_utf8(&file.contents).map_err(|source| Error::Decode {
            path: path.to_string(),
            source,
        })?;
        let html = self.engine.render_with(text, &self.options.engine)?;
        file.contents = html.into_bytes();

        for key in &self.options.keys {
            let rendered = match file.metadata.get(key).and_then(markdown_source) {
                Some(source) => self.engine.render_with(&source, &self.options.engine)?,
                None => continue,
            };
            file.metadata.insert(key.clone(), Value::String(rendered));
        }
        Ok(())
    }
}

impl Plugin for Markdown {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn run(&self, files: &mut Files) -> Result<()> {
        if self.options.parallel {
            self.matcher
                .par_each(files, |path, file| self.convert(path, file))
        } else {
            self.matcher.each(files, |path, file| self.convert(path, file))
        }
    }
}

/// Text to render for a metadata value, if it is set and has a string form.
/// Empty strings, zero, `false`, null and objects are skipped. Arrays are
/// always rendered, as their elements joined with `,`.
fn markdown_source(value: &Value) -> Option<Cow<'_, str>> {
    match value {
        Value::String(s) if !s.is_empty() => Some(Cow::Borrowed(s.as_str())),
        Value::Number(n) if n.as_f64().is_some_and(|f| f != 0.0) => {
            Some(Cow::Owned(n.to_string()))
        }
        Value::Bool(true) => Some(Cow::Borrowed("true")),
        Value::Array(items) => Some(Cow::Owned(join_items(items))),
        _ => None,
    }
}

// Nested arrays flatten; null and objects contribute an empty item.
fn join_items(items: &[Value]) -> String {
    items
        .iter()
        .map(|item| match item {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Array(inner) => join_items(inner),
            Value::Null | Value::Object(_) => String::new(),
        })
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn default_options() {
        let options = RenderOptions::default();
        assert!(options.keys.is_empty());
        assert_eq!(options.pattern, ["**/*.md"]);
        assert!(!options.parallel);
        assert!(options.engine.gfm);
    }

    #[test]
    fn options_from_toml() {
        let options = RenderOptions::from_toml(
            r#"
keys = ["title", "summary"]
parallel = true

[engine]
breaks = true
gfm = false
"#,
        )
        .unwrap();
        assert_eq!(options.keys, ["title", "summary"]);
        assert_eq!(options.pattern, ["**/*.md"]);
        assert!(options.parallel);
        assert!(options.engine.breaks);
        assert!(!options.engine.gfm);
    }

    #[test]
    fn options_ignore_unknown_fields() {
        let options = RenderOptions::from_toml("keys = [\"title\"]\nsmartypants = true\n").unwrap();
        assert_eq!(options.keys, ["title"]);
    }

    #[test]
    fn options_reject_malformed_toml() {
        let err = RenderOptions::from_toml("keys = title").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn invalid_pattern_fails_construction() {
        let err = Markdown::new(RenderOptions::default().with_pattern(["[md"])).unwrap_err();
        assert!(matches!(err, Error::Pattern { .. }));
    }

    #[test]
    fn metadata_source_truthiness() {
        assert_eq!(markdown_source(&json!("*x*")).as_deref(), Some("*x*"));
        assert_eq!(markdown_source(&json!(42)).as_deref(), Some("42"));
        assert_eq!(markdown_source(&json!(true)).as_deref(), Some("true"));
        assert_eq!(markdown_source(&json!("")), None);
        assert_eq!(markdown_source(&json!(0)), None);
        assert_eq!(markdown_source(&json!(false)), None);
        assert_eq!(markdown_source(&json!(null)), None);
        assert_eq!(markdown_source(&json!({"a": 1})), None);
    }

    #[test]
    fn metadata_arrays_join_with_commas() {
        assert_eq!(markdown_source(&json!(["a", "b"])).as_deref(), Some("a,b"));
        assert_eq!(markdown_source(&json!([])).as_deref(), Some(""));
        assert_eq!(
            markdown_source(&json!([1, true, null, ["x", "y"]])).as_deref(),
            Some("1,true,,x,y")
        );
    }

    #[test]
    fn convert_renders_listed_keys_only() {
        let plugin = Markdown::new(RenderOptions::default().with_keys(["title", "missing"])).unwrap();
        let mut file = File::new("*hi*")
            .with_meta("title", "_t_")
            .with_meta("summary", "_s_");
        plugin.convert("x.txt", &mut file).unwrap();
        assert_eq!(file.contents, b"<p><em>hi</em></p>\n");
        assert_eq!(file.metadata["title"], "<p><em>t</em></p>\n");
        assert_eq!(file.metadata["summary"], "_s_");
        assert!(!file.metadata.contains_key("missing"));
    }
}
