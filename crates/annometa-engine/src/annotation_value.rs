//! Read-only view of one annotation occurrence

use std::sync::Arc;

use annometa_types::{
    coerce, AnnotationContract, AnnotationName, AttributeType, AttributeValue, AttributeValues,
    TypeError,
};

/// Stored values of one annotation occurrence, with contract defaults as
/// fallback
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationValue {
    name: AnnotationName,
    values: AttributeValues,
    contract: Option<Arc<AnnotationContract>>,
}

impl AnnotationValue {
    pub(crate) fn new(
        name: AnnotationName,
        values: AttributeValues,
        contract: Option<Arc<AnnotationContract>>,
    ) -> Self {
        Self {
            name,
            values,
            contract,
        }
    }

    /// Annotation identity
    pub fn name(&self) -> &AnnotationName {
        &self.name
    }

    /// Explicitly stored values
    pub fn values(&self) -> &AttributeValues {
        &self.values
    }

    /// Contract of the annotation type, if registered
    pub fn contract(&self) -> Option<&Arc<AnnotationContract>> {
        self.contract.as_ref()
    }

    /// Stored value, or the contract default when the attribute was omitted
    pub fn get(&self, attribute: &str) -> Option<&AttributeValue> {
        self.values
            .get(attribute)
            .or_else(|| self.contract.as_ref()?.default_value(attribute))
    }

    /// Value coerced to `ty`
    pub fn get_as(
        &self,
        attribute: &str,
        ty: &AttributeType,
    ) -> Result<Option<AttributeValue>, TypeError> {
        self.get(attribute).map(|v| coerce(v, ty)).transpose()
    }

    /// Check whether the attribute was explicitly stored
    pub fn is_explicit(&self, attribute: &str) -> bool {
        self.values.contains_key(attribute)
    }

    /// Declared defaults of the annotation type
    pub fn default_values(&self) -> AttributeValues {
        self.contract
            .as_ref()
            .map(|c| c.default_values())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use annometa_types::AttributeSpec;

    #[test]
    fn test_default_fallback() {
        let contract = AnnotationContract::new("com.acme.Retry")
            .attribute(AttributeSpec::new("attempts", AttributeType::Int).with_default(3))
            .attribute(AttributeSpec::new("delay", AttributeType::Long));
        let mut values = AttributeValues::new();
        values.insert("delay".to_string(), AttributeValue::Int(100));

        let value = AnnotationValue::new(
            AnnotationName::new("com.acme.Retry"),
            values,
            Some(Arc::new(contract)),
        );
        assert_eq!(value.get("attempts"), Some(&AttributeValue::Int(3)));
        assert!(!value.is_explicit("attempts"));
        assert!(value.is_explicit("delay"));
        assert_eq!(value.get("missing"), None);
        assert_eq!(
            value.get_as("delay", &AttributeType::Double).unwrap(),
            Some(AttributeValue::Float(100.0))
        );
        assert_eq!(value.default_values().len(), 1);
    }

    #[test]
    fn test_without_contract() {
        let value = AnnotationValue::new(AnnotationName::new("X"), AttributeValues::new(), None);
        assert_eq!(value.get("value"), None);
        assert!(value.default_values().is_empty());
    }
}
