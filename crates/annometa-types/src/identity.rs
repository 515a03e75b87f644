//! Annotation identities

use std::borrow::Borrow;
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Fully-qualified name of an annotation type
///
/// Cloning is a reference-count bump. Maps keyed by `AnnotationName` can be
/// queried with a plain `&str`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AnnotationName(Arc<str>);

impl AnnotationName {
    /// Create a new annotation name
    pub fn new(name: impl AsRef<str>) -> Self {
        AnnotationName(Arc::from(name.as_ref()))
    }

    /// The name as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The simple (unqualified) part of the name: `com.acme.Named` -> `Named`
    pub fn simple_name(&self) -> &str {
        self.0.rsplit('.').next().unwrap_or(&self.0)
    }
}

impl fmt::Display for AnnotationName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Deref for AnnotationName {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for AnnotationName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for AnnotationName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for AnnotationName {
    fn from(name: &str) -> Self {
        AnnotationName::new(name)
    }
}

impl From<String> for AnnotationName {
    fn from(name: String) -> Self {
        AnnotationName(Arc::from(name))
    }
}

impl From<&AnnotationName> for AnnotationName {
    fn from(name: &AnnotationName) -> Self {
        name.clone()
    }
}

impl PartialEq<str> for AnnotationName {
    fn eq(&self, other: &str) -> bool {
        &*self.0 == other
    }
}

impl PartialEq<&str> for AnnotationName {
    fn eq(&self, other: &&str) -> bool {
        &*self.0 == *other
    }
}

impl Serialize for AnnotationName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for AnnotationName {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(AnnotationName::from)
    }
}
