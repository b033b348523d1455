//! Build pipeline plumbing: file records and the plugin contract.

pub mod markdown;
mod matcher;

pub use matcher::Matcher;

use indexmap::IndexMap;
use serde_json::Value;

use crate::Result;

/// Open-ended metadata attached to a file.
pub type Metadata = serde_json::Map<String, Value>;

/// An in-memory file record owned by the host pipeline.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct File {
    pub contents: Vec<u8>,
    pub metadata: Metadata,
}

impl File {
    pub fn new(contents: impl Into<Vec<u8>>) -> Self {
        File {
            contents: contents.into(),
            metadata: Metadata::new(),
        }
    }

    /// Set a metadata field
    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn meta(&self, key: &str) -> Option<&Value> {
        self.metadata.get(key)
    }
}

/// Working collection: relative path to file record.
pub type Files = IndexMap<String, File>;

/// A transformation applied to the working collection during a build pass.
pub trait Plugin: Send + Sync {
    fn name(&self) -> &str;

    /// Mutate `files` in place. The first error aborts the pass.
    fn run(&self, files: &mut Files) -> Result<()>;
}
