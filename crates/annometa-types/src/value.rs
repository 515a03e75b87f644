//! Attribute values stored in annotation entries

use std::fmt;
use std::hash::{Hash, Hasher};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::identity::AnnotationName;

/// Ordered attribute name -> value mapping
pub type AttributeValues = IndexMap<String, AttributeValue>;

/// A constant of an enum type, e.g. `Scope.SINGLETON`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnumConstant {
    /// Fully-qualified name of the enum type
    pub enum_type: String,
    /// Constant name
    pub constant: String,
}

impl EnumConstant {
    /// Create a new enum constant
    pub fn new(enum_type: impl Into<String>, constant: impl Into<String>) -> Self {
        Self {
            enum_type: enum_type.into(),
            constant: constant.into(),
        }
    }
}

/// An annotation used as an attribute value of another annotation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NestedAnnotation {
    /// Annotation identity
    pub name: AnnotationName,
    /// Attribute values set on the nested annotation
    #[serde(default)]
    pub values: AttributeValues,
}

impl NestedAnnotation {
    /// Create a nested annotation with no attribute values
    pub fn new(name: impl Into<AnnotationName>) -> Self {
        Self {
            name: name.into(),
            values: AttributeValues::new(),
        }
    }

    /// Builder-style attribute setter
    pub fn with(mut self, attribute: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.values.insert(attribute.into(), value.into());
        self
    }
}

impl Eq for NestedAnnotation {}

impl Hash for NestedAnnotation {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        // IndexMap equality ignores order, so hashing must too
        let mut entries: Vec<_> = self.values.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries.len().hash(state);
        for (key, value) in entries {
            key.hash(state);
            value.hash(state);
        }
    }
}

/// Value of a single annotation attribute
///
/// Floats compare and hash by bit pattern so that `Eq` and `Hash` are total.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum AttributeValue {
    /// String value
    String(String),
    /// Integral value (all integral widths are stored as i64)
    Int(i64),
    /// Floating point value (all float widths are stored as f64)
    Float(f64),
    /// Boolean value
    Bool(bool),
    /// Enum constant
    Enum(EnumConstant),
    /// Nested annotation
    Annotation(NestedAnnotation),
    /// Ordered sequence of values
    Array(Vec<AttributeValue>),
    /// Reference to a type by name
    Class(String),
}

impl AttributeValue {
    /// Short name of the value's kind, used in diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            AttributeValue::String(_) => "string",
            AttributeValue::Int(_) => "int",
            AttributeValue::Float(_) => "float",
            AttributeValue::Bool(_) => "bool",
            AttributeValue::Enum(_) => "enum",
            AttributeValue::Annotation(_) => "annotation",
            AttributeValue::Array(_) => "array",
            AttributeValue::Class(_) => "class",
        }
    }

    /// Create an enum constant value
    pub fn enum_constant(enum_type: impl Into<String>, constant: impl Into<String>) -> Self {
        AttributeValue::Enum(EnumConstant::new(enum_type, constant))
    }

    /// Create a class reference value
    pub fn class(type_name: impl Into<String>) -> Self {
        AttributeValue::Class(type_name.into())
    }

    /// Create an array of strings
    pub fn strings<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        AttributeValue::Array(items.into_iter().map(|s| AttributeValue::String(s.into())).collect())
    }

    /// String contents, if this is a string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Integral value, if this is an int
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            AttributeValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric value as f64 (ints are widened)
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttributeValue::Float(f) => Some(*f),
            AttributeValue::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Boolean value, if this is a bool
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttributeValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Enum constant, if this is an enum
    pub fn as_enum(&self) -> Option<&EnumConstant> {
        match self {
            AttributeValue::Enum(e) => Some(e),
            _ => None,
        }
    }

    /// Nested annotation, if this is an annotation
    pub fn as_annotation(&self) -> Option<&NestedAnnotation> {
        match self {
            AttributeValue::Annotation(a) => Some(a),
            _ => None,
        }
    }

    /// Elements, if this is an array
    pub fn as_array(&self) -> Option<&[AttributeValue]> {
        match self {
            AttributeValue::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Type name, if this is a class reference
    pub fn as_class(&self) -> Option<&str> {
        match self {
            AttributeValue::Class(c) => Some(c),
            _ => None,
        }
    }
}

impl PartialEq for AttributeValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (AttributeValue::String(a), AttributeValue::String(b)) => a == b,
            (AttributeValue::Int(a), AttributeValue::Int(b)) => a == b,
            (AttributeValue::Float(a), AttributeValue::Float(b)) => a.to_bits() == b.to_bits(),
            (AttributeValue::Bool(a), AttributeValue::Bool(b)) => a == b,
            (AttributeValue::Enum(a), AttributeValue::Enum(b)) => a == b,
            (AttributeValue::Annotation(a), AttributeValue::Annotation(b)) => a == b,
            (AttributeValue::Array(a), AttributeValue::Array(b)) => a == b,
            (AttributeValue::Class(a), AttributeValue::Class(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for AttributeValue {}

impl Hash for AttributeValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            AttributeValue::String(s) => s.hash(state),
            AttributeValue::Int(i) => i.hash(state),
            AttributeValue::Float(f) => f.to_bits().hash(state),
            AttributeValue::Bool(b) => b.hash(state),
            AttributeValue::Enum(e) => e.hash(state),
            AttributeValue::Annotation(a) => a.hash(state),
            AttributeValue::Array(items) => items.hash(state),
            AttributeValue::Class(c) => c.hash(state),
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::String(s) => write!(f, "{:?}", s),
            AttributeValue::Int(i) => write!(f, "{}", i),
            AttributeValue::Float(x) => write!(f, "{:?}", x),
            AttributeValue::Bool(b) => write!(f, "{}", b),
            AttributeValue::Enum(e) => write!(f, "{}.{}", e.enum_type, e.constant),
            AttributeValue::Annotation(a) => write!(f, "{}", a),
            AttributeValue::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            AttributeValue::Class(c) => write!(f, "type {}", c),
        }
    }
}

impl fmt::Display for NestedAnnotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_annotation(f, &self.name, self.values.iter())
    }
}

/// Render `@name(a=1, b="x")` with attributes sorted by name
pub fn write_annotation<'a>(
    f: &mut fmt::Formatter<'_>,
    name: &AnnotationName,
    values: impl Iterator<Item = (&'a String, &'a AttributeValue)>,
) -> fmt::Result {
    let mut sorted: Vec<_> = values.collect();
    sorted.sort_by(|a, b| a.0.cmp(b.0));
    write!(f, "@{}", name)?;
    if sorted.is_empty() {
        return Ok(());
    }
    f.write_str("(")?;
    for (i, (key, value)) in sorted.into_iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}={}", key, value)?;
    }
    f.write_str(")")
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::String(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        AttributeValue::String(value)
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        AttributeValue::Int(value)
    }
}

impl From<i32> for AttributeValue {
    fn from(value: i32) -> Self {
        AttributeValue::Int(value as i64)
    }
}

impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        AttributeValue::Float(value)
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        AttributeValue::Bool(value)
    }
}

impl From<EnumConstant> for AttributeValue {
    fn from(value: EnumConstant) -> Self {
        AttributeValue::Enum(value)
    }
}

impl From<NestedAnnotation> for AttributeValue {
    fn from(value: NestedAnnotation) -> Self {
        AttributeValue::Annotation(value)
    }
}

impl From<Vec<AttributeValue>> for AttributeValue {
    fn from(value: Vec<AttributeValue>) -> Self {
        AttributeValue::Array(value)
    }
}
