//! Per-document annotation store.
//!
//! Upstream components (sentence splitters, species taggers, ...) and the
//! gazetteer annotators all record their findings here. The store belongs to
//! exactly one document and is never shared across documents.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::span::Span;

/// One emitted match: a span, an entity id and how confident the match is.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OutputRecord {
    pub span: Span,
    pub id: String,
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, String>,
}

impl OutputRecord {
    pub fn new<S: Into<String>>(span: Span, id: S, confidence: f64) -> Self {
        OutputRecord {
            span,
            id: id.into(),
            confidence,
            properties: BTreeMap::new(),
        }
    }

    pub fn with_property<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }
}

/// A record filed under a namespace (the producing component or vocabulary).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub namespace: String,
    #[serde(flatten)]
    pub record: OutputRecord,
}

/// Ordered collection of a document's annotations.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnnotationStore {
    annotations: Vec<Annotation>,
}

impl AnnotationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an annotation.
    pub fn add<N: Into<String>, I: Into<String>>(
        &mut self,
        span: Span,
        namespace: N,
        id: I,
        confidence: f64,
        properties: BTreeMap<String, String>,
    ) {
        let mut record = OutputRecord::new(span, id, confidence);
        record.properties = properties;
        self.push(namespace, record);
    }

    /// File an existing record under `namespace`.
    pub fn push<N: Into<String>>(&mut self, namespace: N, record: OutputRecord) {
        self.annotations.push(Annotation {
            namespace: namespace.into(),
            record,
        });
    }

    /// Annotations of `namespace`, optionally only those lying inside `within`.
    pub fn query_by_namespace<'a>(
        &'a self,
        namespace: &'a str,
        within: Option<Span>,
    ) -> impl Iterator<Item = &'a Annotation> + 'a {
        self.annotations.iter().filter(move |annotation| {
            annotation.namespace == namespace
                && within.is_none_or(|span| span.contains(&annotation.record.span))
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Annotation> {
        self.annotations.iter()
    }

    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }
}
