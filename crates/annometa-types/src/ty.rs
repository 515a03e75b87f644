//! Declared attribute types

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::identity::AnnotationName;

/// An enum type with its constants
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnumType {
    /// Fully-qualified enum type name
    pub name: String,
    /// Declared constants, in declaration order
    pub constants: Vec<String>,
}

impl EnumType {
    /// Create an enum type
    pub fn new<I, S>(name: impl Into<String>, constants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            constants: constants.into_iter().map(Into::into).collect(),
        }
    }

    /// Check whether `constant` is one of this enum's constants
    pub fn has_constant(&self, constant: &str) -> bool {
        self.constants.iter().any(|c| c == constant)
    }
}

/// Declared type of an annotation attribute
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "of", rename_all = "snake_case")]
pub enum AttributeType {
    /// Boolean
    Bool,
    /// 32-bit signed integer
    Int,
    /// 64-bit signed integer
    Long,
    /// 32-bit float
    Float,
    /// 64-bit float
    Double,
    /// String
    String,
    /// Type reference
    Class,
    /// Enum of the given type
    Enum(EnumType),
    /// Nested annotation of the given type
    Annotation(AnnotationName),
    /// Sequence of the element type
    Array(Box<AttributeType>),
}

impl AttributeType {
    /// Array of the given element type
    pub fn array(element: AttributeType) -> Self {
        AttributeType::Array(Box::new(element))
    }

    /// Check if this is an array type
    pub fn is_array(&self) -> bool {
        matches!(self, AttributeType::Array(_))
    }

    /// Innermost non-array type
    pub fn element(&self) -> &AttributeType {
        match self {
            AttributeType::Array(inner) => inner.element(),
            other => other,
        }
    }
}

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeType::Bool => write!(f, "bool"),
            AttributeType::Int => write!(f, "int"),
            AttributeType::Long => write!(f, "long"),
            AttributeType::Float => write!(f, "float"),
            AttributeType::Double => write!(f, "double"),
            AttributeType::String => write!(f, "string"),
            AttributeType::Class => write!(f, "class"),
            AttributeType::Enum(e) => write!(f, "enum {}", e.name),
            AttributeType::Annotation(name) => write!(f, "@{}", name),
            AttributeType::Array(inner) => write!(f, "{}[]", inner),
        }
    }
}
