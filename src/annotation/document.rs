//! Documents flowing through the annotators.

use serde::{Deserialize, Serialize};

use crate::annotation::store::AnnotationStore;

/// A document: its text plus whatever has been annotated on it so far.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub annotations: AnnotationStore,
}

impl Document {
    pub fn new<I: Into<String>, T: Into<String>>(id: I, text: T) -> Self {
        Document {
            id: id.into(),
            text: text.into(),
            annotations: AnnotationStore::new(),
        }
    }

    /// Parse a document from one JSON line.
    pub fn from_json(line: &str) -> crate::error::Result<Self> {
        Ok(serde_json::from_str(line)?)
    }
}
