//! Annotation entries

use annometa_types::{AnnotationName, AttributeValue, AttributeValues};
use serde::{Deserialize, Serialize};

/// How an entry reached the element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    /// Declared directly on the element
    Declared,
    /// Contributed through a meta-annotation chain
    Meta,
}

/// One annotation on an element together with its attribute values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationEntry {
    name: AnnotationName,
    values: AttributeValues,
    origin: Origin,
    /// Identities from the element's declared annotation down to this one
    path: Vec<AnnotationName>,
}

impl AnnotationEntry {
    /// Entry declared directly on the element
    pub(crate) fn declared(name: AnnotationName, values: AttributeValues) -> Self {
        Self {
            path: vec![name.clone()],
            name,
            values,
            origin: Origin::Declared,
        }
    }

    /// Entry reached through `path` (which ends with `name`)
    pub(crate) fn meta(
        name: AnnotationName,
        values: AttributeValues,
        path: Vec<AnnotationName>,
    ) -> Self {
        Self {
            name,
            values,
            origin: Origin::Meta,
            path,
        }
    }

    /// Annotation identity
    pub fn name(&self) -> &AnnotationName {
        &self.name
    }

    /// Explicitly stored attribute values (defaults are not included)
    pub fn values(&self) -> &AttributeValues {
        &self.values
    }

    /// Stored value of one attribute
    pub fn get(&self, attribute: &str) -> Option<&AttributeValue> {
        self.values.get(attribute)
    }

    /// Check whether the attribute is explicitly stored
    pub fn contains(&self, attribute: &str) -> bool {
        self.values.contains_key(attribute)
    }

    /// How the entry reached the element
    pub fn origin(&self) -> Origin {
        self.origin
    }

    /// Check whether the entry was declared directly
    pub fn is_declared(&self) -> bool {
        self.origin == Origin::Declared
    }

    /// Resolution chain from the element to this annotation
    pub fn path(&self) -> &[AnnotationName] {
        &self.path
    }

    /// Number of meta-annotation hops from the element (0 for declared entries)
    pub fn depth(&self) -> usize {
        self.path.len().saturating_sub(1)
    }

    /// Add values for attributes not stored yet; stored values win
    pub(crate) fn fill_missing(&mut self, values: AttributeValues) {
        for (attribute, value) in values {
            self.values.entry(attribute).or_insert(value);
        }
    }
}
