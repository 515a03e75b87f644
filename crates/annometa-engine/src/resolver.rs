//! Metadata Resolver
//!
//! Read-only queries over [`ElementMetadata`]:
//! - presence tests (hash lookups, never a scan)
//! - value retrieval with coercion and contract-default fallback
//! - stereotype queries
//! - repeatable-annotation aggregation
//!
//! Presence and enumeration queries never fail. Value retrieval returns
//! `Ok(None)` for an absent annotation or attribute and
//! [`EngineError::TypeMismatch`] when the stored value cannot be coerced.

use annometa_types::{
    coerce, AnnotationName, AttributeType, AttributeValue, AttributeValues, EnumType,
    VALUE_ATTRIBUTE,
};

use crate::annotation_value::AnnotationValue;
use crate::error::{EngineError, EngineResult};
use crate::store::{ElementMetadata, Scope};

impl ElementMetadata {
    // ========================================================================
    // Presence
    // ========================================================================

    /// Check whether `name` is present in the given partition
    pub fn is_present(&self, name: &str, scope: Scope) -> bool {
        self.contains(name, scope)
    }

    /// Check whether `name` is declared or reached through meta-annotations
    pub fn is_annotation_present(&self, name: &str) -> bool {
        self.contains(name, Scope::All)
    }

    /// Check whether `name` is declared directly on the element
    pub fn is_declared_annotation_present(&self, name: &str) -> bool {
        self.contains(name, Scope::Declared)
    }

    /// Check whether `stereotype` is present, or annotates something present
    pub fn has_stereotype(&self, stereotype: &str) -> bool {
        self.contains(stereotype, Scope::All) || !self.stereotype_members(stereotype).is_empty()
    }

    /// Check whether `stereotype` is declared, or annotates something declared
    pub fn has_declared_stereotype(&self, stereotype: &str) -> bool {
        self.contains(stereotype, Scope::Declared)
            || self
                .stereotype_members(stereotype)
                .iter()
                .any(|name| self.contains(name, Scope::Declared))
    }

    // ========================================================================
    // Enumeration
    // ========================================================================

    /// Names in `all`, in resolution order
    pub fn get_annotation_names(&self) -> Vec<AnnotationName> {
        self.entries().map(|e| e.name().clone()).collect()
    }

    /// Names in `declared`, in declaration order
    pub fn get_declared_annotation_names(&self) -> Vec<AnnotationName> {
        self.declared_entries().map(|e| e.name().clone()).collect()
    }

    /// Annotations whose meta-annotation closure contains `stereotype`
    pub fn get_annotations_by_stereotype(&self, stereotype: &str) -> Vec<AnnotationName> {
        self.stereotype_members(stereotype).to_vec()
    }

    /// Declared annotations whose meta-annotation closure contains `stereotype`
    pub fn get_declared_annotations_by_stereotype(&self, stereotype: &str) -> Vec<AnnotationName> {
        self.stereotype_members(stereotype)
            .iter()
            .filter(|name| self.contains(name, Scope::Declared))
            .cloned()
            .collect()
    }

    // ========================================================================
    // Values
    // ========================================================================

    /// Value of `annotation.attribute` in `all`, coerced to `ty`
    pub fn get_value(
        &self,
        annotation: &str,
        attribute: &str,
        ty: &AttributeType,
    ) -> EngineResult<Option<AttributeValue>> {
        self.get_value_in(Scope::All, annotation, attribute, ty)
    }

    /// Value of `annotation.attribute` as declared on the element
    pub fn get_declared_value(
        &self,
        annotation: &str,
        attribute: &str,
        ty: &AttributeType,
    ) -> EngineResult<Option<AttributeValue>> {
        self.get_value_in(Scope::Declared, annotation, attribute, ty)
    }

    /// Value lookup in the given partition
    ///
    /// Falls back to the contract default when the entry omits the attribute.
    pub fn get_value_in(
        &self,
        scope: Scope,
        annotation: &str,
        attribute: &str,
        ty: &AttributeType,
    ) -> EngineResult<Option<AttributeValue>> {
        let Some(entry) = self.entry_in(scope, annotation) else {
            return Ok(None);
        };
        let stored = entry
            .get(attribute)
            .or_else(|| self.contract(annotation)?.default_value(attribute));
        let Some(stored) = stored else {
            return Ok(None);
        };
        coerce(stored, ty)
            .map(Some)
            .map_err(|source| EngineError::TypeMismatch {
                annotation: annotation.to_string(),
                attribute: attribute.to_string(),
                source,
            })
    }

    /// String value
    pub fn string_value(&self, annotation: &str, attribute: &str) -> EngineResult<Option<String>> {
        Ok(self
            .get_value(annotation, attribute, &AttributeType::String)?
            .and_then(|v| match v {
                AttributeValue::String(s) => Some(s),
                _ => None,
            }))
    }

    /// 32-bit integer value
    pub fn int_value(&self, annotation: &str, attribute: &str) -> EngineResult<Option<i32>> {
        Ok(self
            .get_value(annotation, attribute, &AttributeType::Int)?
            .and_then(|v| v.as_i64())
            .and_then(|i| i32::try_from(i).ok()))
    }

    /// 64-bit integer value
    pub fn long_value(&self, annotation: &str, attribute: &str) -> EngineResult<Option<i64>> {
        Ok(self
            .get_value(annotation, attribute, &AttributeType::Long)?
            .and_then(|v| v.as_i64()))
    }

    /// Double value (ints are widened)
    pub fn double_value(&self, annotation: &str, attribute: &str) -> EngineResult<Option<f64>> {
        Ok(self
            .get_value(annotation, attribute, &AttributeType::Double)?
            .and_then(|v| v.as_f64()))
    }

    /// Boolean value
    pub fn bool_value(&self, annotation: &str, attribute: &str) -> EngineResult<Option<bool>> {
        Ok(self
            .get_value(annotation, attribute, &AttributeType::Bool)?
            .and_then(|v| v.as_bool()))
    }

    /// True only when the attribute resolves to `true`
    pub fn is_true(&self, annotation: &str, attribute: &str) -> bool {
        matches!(self.bool_value(annotation, attribute), Ok(Some(true)))
    }

    /// True only when the attribute resolves to `false`
    pub fn is_false(&self, annotation: &str, attribute: &str) -> bool {
        matches!(self.bool_value(annotation, attribute), Ok(Some(false)))
    }

    /// Enum constant name, validated against `enum_type`
    pub fn enum_value(
        &self,
        annotation: &str,
        attribute: &str,
        enum_type: &EnumType,
    ) -> EngineResult<Option<String>> {
        let ty = AttributeType::Enum(enum_type.clone());
        Ok(self
            .get_value(annotation, attribute, &ty)?
            .and_then(|v| match v {
                AttributeValue::Enum(e) => Some(e.constant),
                _ => None,
            }))
    }

    /// Referenced type name
    pub fn class_value(&self, annotation: &str, attribute: &str) -> EngineResult<Option<String>> {
        Ok(self
            .get_value(annotation, attribute, &AttributeType::Class)?
            .and_then(|v| match v {
                AttributeValue::Class(c) => Some(c),
                _ => None,
            }))
    }

    /// String sequence; a single string is wrapped, absence is empty
    pub fn string_values(&self, annotation: &str, attribute: &str) -> EngineResult<Vec<String>> {
        let ty = AttributeType::array(AttributeType::String);
        let Some(AttributeValue::Array(items)) = self.get_value(annotation, attribute, &ty)? else {
            return Ok(Vec::new());
        };
        Ok(items
            .into_iter()
            .filter_map(|item| match item {
                AttributeValue::String(s) => Some(s),
                _ => None,
            })
            .collect())
    }

    /// Declared defaults of an annotation type
    pub fn default_values(&self, annotation: &str) -> AttributeValues {
        self.contract(annotation)
            .map(|c| c.default_values())
            .unwrap_or_default()
    }

    // ========================================================================
    // Annotation views
    // ========================================================================

    /// Merged occurrence of `name` in `all`
    pub fn find_annotation(&self, name: &str) -> Option<AnnotationValue> {
        self.find_annotation_in(Scope::All, name)
    }

    /// Occurrence of `name` as declared on the element
    pub fn find_declared_annotation(&self, name: &str) -> Option<AnnotationValue> {
        self.find_annotation_in(Scope::Declared, name)
    }

    /// Occurrence of `name` in the given partition
    pub fn find_annotation_in(&self, scope: Scope, name: &str) -> Option<AnnotationValue> {
        let entry = self.entry_in(scope, name)?;
        Some(AnnotationValue::new(
            entry.name().clone(),
            entry.values().clone(),
            self.contract(name).cloned(),
        ))
    }

    /// Every occurrence of a repeatable annotation in `all`
    pub fn get_annotation_values_by_type(&self, name: &str) -> Vec<AnnotationValue> {
        self.annotation_values_by_type_in(Scope::All, name)
    }

    /// Every occurrence of a repeatable annotation declared on the element
    pub fn get_declared_annotation_values_by_type(&self, name: &str) -> Vec<AnnotationValue> {
        self.annotation_values_by_type_in(Scope::Declared, name)
    }

    /// Every occurrence of `name` in the given partition, whether held as a
    /// plain entry or inside its repeatable container
    pub fn annotation_values_by_type_in(&self, scope: Scope, name: &str) -> Vec<AnnotationValue> {
        let mut found: Vec<AnnotationValue> =
            self.find_annotation_in(scope, name).into_iter().collect();

        let contract = self.contract(name).cloned();
        let Some(container) = contract.as_ref().and_then(|c| c.repeatable.as_ref()) else {
            return found;
        };
        let Some(held) = self
            .entry_in(scope, container)
            .and_then(|entry| entry.get(VALUE_ATTRIBUTE))
        else {
            return found;
        };

        let items = match held {
            AttributeValue::Array(items) => items.as_slice(),
            single => std::slice::from_ref(single),
        };
        for item in items {
            if let AttributeValue::Annotation(nested) = item {
                if nested.name == name {
                    found.push(AnnotationValue::new(
                        nested.name.clone(),
                        nested.values.clone(),
                        contract.clone(),
                    ));
                }
            }
        }
        found
    }
}
