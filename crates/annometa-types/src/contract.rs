//! Annotation contracts
//!
//! A contract describes one annotation type: its attributes (name, declared
//! type, default), the meta-annotations declared on the annotation type
//! itself, and whether it is repeatable.

use serde::{Deserialize, Serialize};

use crate::identity::AnnotationName;
use crate::ty::AttributeType;
use crate::value::{AttributeValue, AttributeValues};

/// Attribute of a meta-annotation that another attribute forwards its value to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasTarget {
    /// Meta-annotation receiving the value
    pub annotation: AnnotationName,
    /// Attribute on the meta-annotation
    pub attribute: String,
}

/// Declared attribute of an annotation type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeSpec {
    /// Attribute name
    pub name: String,
    /// Declared type
    pub ty: AttributeType,
    /// Default value used when an entry omits the attribute
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<AttributeValue>,
    /// Meta-annotation attribute overridden by this attribute when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias_for: Option<AliasTarget>,
}

impl AttributeSpec {
    /// Create an attribute with no default
    pub fn new(name: impl Into<String>, ty: AttributeType) -> Self {
        Self {
            name: name.into(),
            ty,
            default: None,
            alias_for: None,
        }
    }

    /// Set the default value
    pub fn with_default(mut self, default: impl Into<AttributeValue>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Forward explicitly set values to `attribute` of `annotation`
    pub fn alias_for(
        mut self,
        annotation: impl Into<AnnotationName>,
        attribute: impl Into<String>,
    ) -> Self {
        self.alias_for = Some(AliasTarget {
            annotation: annotation.into(),
            attribute: attribute.into(),
        });
        self
    }
}

/// An annotation declared on an annotation type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetaAnnotation {
    /// Meta-annotation identity
    pub name: AnnotationName,
    /// Values set on the meta-annotation
    #[serde(default)]
    pub values: AttributeValues,
}

/// Attribute contract of one annotation type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationContract {
    /// Annotation identity
    pub name: AnnotationName,
    /// Declared attributes, in declaration order
    #[serde(default)]
    pub attributes: Vec<AttributeSpec>,
    /// Annotations declared on this annotation type, in declaration order
    #[serde(default)]
    pub meta_annotations: Vec<MetaAnnotation>,
    /// Container annotation collecting repeated occurrences
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repeatable: Option<AnnotationName>,
}

impl AnnotationContract {
    /// Create a contract with no attributes
    pub fn new(name: impl Into<AnnotationName>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            meta_annotations: Vec::new(),
            repeatable: None,
        }
    }

    /// Add an attribute
    pub fn attribute(mut self, spec: AttributeSpec) -> Self {
        self.attributes.push(spec);
        self
    }

    /// Declare a meta-annotation without values
    pub fn annotated_with(self, name: impl Into<AnnotationName>) -> Self {
        self.annotated_with_values(name, AttributeValues::new())
    }

    /// Declare a meta-annotation with values
    pub fn annotated_with_values(
        mut self,
        name: impl Into<AnnotationName>,
        values: AttributeValues,
    ) -> Self {
        self.meta_annotations.push(MetaAnnotation {
            name: name.into(),
            values,
        });
        self
    }

    /// Mark the annotation as repeatable inside `container`
    pub fn repeatable_in(mut self, container: impl Into<AnnotationName>) -> Self {
        self.repeatable = Some(container.into());
        self
    }

    /// Look up an attribute by name
    pub fn get_attribute(&self, name: &str) -> Option<&AttributeSpec> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Default value of an attribute, if declared
    pub fn default_value(&self, name: &str) -> Option<&AttributeValue> {
        self.get_attribute(name).and_then(|a| a.default.as_ref())
    }

    /// All declared defaults, in declaration order
    pub fn default_values(&self) -> AttributeValues {
        self.attributes
            .iter()
            .filter_map(|a| a.default.as_ref().map(|d| (a.name.clone(), d.clone())))
            .collect()
    }

    /// Check whether the annotation type is directly annotated with `name`
    pub fn is_annotated_with(&self, name: &str) -> bool {
        self.meta_annotations.iter().any(|m| m.name == name)
    }

    /// Attributes aliased onto `meta`, as (own attribute, target attribute)
    pub fn aliases_for<'a>(
        &'a self,
        meta: &'a str,
    ) -> impl Iterator<Item = (&'a str, &'a str)> + 'a {
        self.attributes.iter().filter_map(move |a| match &a.alias_for {
            Some(target) if target.annotation == meta => {
                Some((a.name.as_str(), target.attribute.as_str()))
            }
            _ => None,
        })
    }
}
