//! Synthesized annotation instances

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use annometa_types::{value::write_annotation, AnnotationName, AttributeValue, NestedAnnotation};

/// A value object behaving like a live annotation instance
///
/// Every contract attribute is populated, either from the stored value
/// (coerced to the declared type) or from the contract default. Cloning is a
/// reference-count bump; instances handed out by the engine cache share one
/// allocation, which [`SynthesizedAnnotation::ptr_eq`] exposes.
#[derive(Clone)]
pub struct SynthesizedAnnotation(Arc<Inner>);

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct Inner {
    name: AnnotationName,
    values: BTreeMap<String, AttributeValue>,
}

impl SynthesizedAnnotation {
    pub(crate) fn new(name: AnnotationName, values: BTreeMap<String, AttributeValue>) -> Self {
        SynthesizedAnnotation(Arc::new(Inner { name, values }))
    }

    /// Annotation type identity
    pub fn annotation_type(&self) -> &AnnotationName {
        &self.0.name
    }

    /// All attribute values, sorted by attribute name
    pub fn values(&self) -> &BTreeMap<String, AttributeValue> {
        &self.0.values
    }

    /// Value of one attribute
    pub fn attribute(&self, name: &str) -> Option<&AttributeValue> {
        self.0.values.get(name)
    }

    /// Check whether two handles share the same instance
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Arc::ptr_eq(&a.0, &b.0)
    }

    /// String attribute
    pub fn string(&self, name: &str) -> Option<&str> {
        self.attribute(name).and_then(AttributeValue::as_str)
    }

    /// Integral attribute
    pub fn long(&self, name: &str) -> Option<i64> {
        self.attribute(name).and_then(AttributeValue::as_i64)
    }

    /// Integral attribute within 32-bit range
    pub fn int(&self, name: &str) -> Option<i32> {
        self.long(name).and_then(|i| i32::try_from(i).ok())
    }

    /// Floating point attribute
    pub fn double(&self, name: &str) -> Option<f64> {
        self.attribute(name).and_then(AttributeValue::as_f64)
    }

    /// Boolean attribute
    pub fn bool(&self, name: &str) -> Option<bool> {
        self.attribute(name).and_then(AttributeValue::as_bool)
    }

    /// Constant name of an enum attribute
    pub fn enum_constant(&self, name: &str) -> Option<&str> {
        self.attribute(name)
            .and_then(AttributeValue::as_enum)
            .map(|e| e.constant.as_str())
    }

    /// Type name of a class attribute
    pub fn class(&self, name: &str) -> Option<&str> {
        self.attribute(name).and_then(AttributeValue::as_class)
    }

    /// Items of a string array attribute
    pub fn strings(&self, name: &str) -> Vec<&str> {
        self.attribute(name)
            .and_then(AttributeValue::as_array)
            .map(|items| items.iter().filter_map(AttributeValue::as_str).collect())
            .unwrap_or_default()
    }

    /// Nested annotation held by an annotation-typed attribute
    pub fn annotation(&self, name: &str) -> Option<SynthesizedAnnotation> {
        self.attribute(name)
            .and_then(AttributeValue::as_annotation)
            .map(SynthesizedAnnotation::from_nested)
    }

    /// Nested annotations held by an annotation-array attribute
    pub fn annotations(&self, name: &str) -> Vec<SynthesizedAnnotation> {
        self.attribute(name)
            .and_then(AttributeValue::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(AttributeValue::as_annotation)
                    .map(SynthesizedAnnotation::from_nested)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Nested values are completed during synthesis, so wrapping them
    /// only changes the container.
    fn from_nested(nested: &NestedAnnotation) -> Self {
        let values = nested
            .values
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        SynthesizedAnnotation::new(nested.name.clone(), values)
    }

    pub(crate) fn into_nested(self) -> NestedAnnotation {
        let Inner { name, values } = Arc::unwrap_or_clone(self.0);
        NestedAnnotation {
            name,
            values: values.into_iter().collect(),
        }
    }
}

impl PartialEq for SynthesizedAnnotation {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || self.0 == other.0
    }
}

impl Eq for SynthesizedAnnotation {}

impl std::hash::Hash for SynthesizedAnnotation {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl fmt::Display for SynthesizedAnnotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_annotation(f, &self.0.name, self.0.values.iter())
    }
}

impl fmt::Debug for SynthesizedAnnotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SynthesizedAnnotation")
            .field("name", &self.0.name)
            .field("values", &self.0.values)
            .finish()
    }
}
