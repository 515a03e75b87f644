//! Metadata construction
//!
//! The discovery collaborator declares the annotations found on an element
//! and calls [`MetadataBuilder::build`] once. Meta-annotation flattening,
//! repeatable folding and stereotype indexing all happen here, before the
//! metadata is published.

use std::sync::Arc;

use annometa_types::{
    AnnotationName, AttributeValue, AttributeValues, ContractRegistry, NestedAnnotation,
    VALUE_ATTRIBUTE,
};
use indexmap::IndexMap;
use tracing::debug;

use super::entry::AnnotationEntry;
use super::merge;
use super::metadata::ElementMetadata;
use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};

/// Collects declared annotations for one element
#[derive(Debug, Default)]
pub struct MetadataBuilder {
    declared: Vec<(AnnotationName, AttributeValues)>,
}

impl MetadataBuilder {
    /// Create new empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare an annotation without attribute values
    pub fn declare(self, name: impl Into<AnnotationName>) -> Self {
        self.declare_values(name, AttributeValues::new())
    }

    /// Declare an annotation with attribute values
    pub fn declare_with<I, K, V>(self, name: impl Into<AnnotationName>, values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<AttributeValue>,
    {
        let values = values
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self.declare_values(name, values)
    }

    /// Declare an annotation with an already built value map
    pub fn declare_values(
        mut self,
        name: impl Into<AnnotationName>,
        values: AttributeValues,
    ) -> Self {
        self.declared.push((name.into(), values));
        self
    }

    /// Number of declarations so far
    pub fn len(&self) -> usize {
        self.declared.len()
    }

    /// Check if nothing was declared
    pub fn is_empty(&self) -> bool {
        self.declared.is_empty()
    }

    /// Build with the default configuration
    pub fn build(self, registry: Arc<ContractRegistry>) -> EngineResult<ElementMetadata> {
        self.build_with(registry, &EngineConfig::default())
    }

    /// Fold repeatables, flatten meta-annotations and index stereotypes
    pub fn build_with(
        self,
        registry: Arc<ContractRegistry>,
        config: &EngineConfig,
    ) -> EngineResult<ElementMetadata> {
        let folded = fold_repeatables(self.declared, &registry)?;
        let declared: IndexMap<AnnotationName, AnnotationEntry> = folded
            .into_iter()
            .map(|(name, values)| (name.clone(), AnnotationEntry::declared(name, values)))
            .collect();

        let resolution = merge::resolve(&declared, &registry, config);
        let stereotypes = merge::stereotype_index(&resolution.all, &registry);

        debug!(
            declared = declared.len(),
            all = resolution.all.len(),
            diagnostics = resolution.diagnostics.len(),
            "built element metadata"
        );

        Ok(ElementMetadata::from_parts(
            declared,
            resolution.all,
            stereotypes,
            resolution.diagnostics,
            registry,
        ))
    }
}

/// Group declarations by identity. Repeated occurrences of a repeatable
/// annotation move into its container's `value` array; repeating anything
/// else is an error.
fn fold_repeatables(
    declared: Vec<(AnnotationName, AttributeValues)>,
    registry: &ContractRegistry,
) -> EngineResult<IndexMap<AnnotationName, AttributeValues>> {
    let mut grouped: IndexMap<AnnotationName, Vec<AttributeValues>> = IndexMap::new();
    for (name, values) in declared {
        grouped.entry(name).or_default().push(values);
    }

    let mut folded: IndexMap<AnnotationName, AttributeValues> = IndexMap::new();
    for (name, mut occurrences) in grouped {
        if occurrences.len() == 1 {
            let values = occurrences.pop().unwrap_or_default();
            if folded.contains_key(&name) {
                // Explicit container next to folded occurrences
                merge_container(&mut folded, name, values);
            } else {
                folded.insert(name, values);
            }
            continue;
        }

        let container = registry
            .get(&name)
            .and_then(|contract| contract.repeatable.clone())
            .ok_or_else(|| EngineError::DuplicateAnnotation {
                name: name.to_string(),
            })?;

        let items = occurrences
            .into_iter()
            .map(|values| {
                AttributeValue::Annotation(NestedAnnotation {
                    name: name.clone(),
                    values,
                })
            })
            .collect::<Vec<_>>();
        let mut container_values = AttributeValues::new();
        container_values.insert(VALUE_ATTRIBUTE.to_string(), AttributeValue::Array(items));
        merge_container(&mut folded, container, container_values);
    }
    Ok(folded)
}

/// Merge `values` into the container entry, concatenating `value` arrays
fn merge_container(
    folded: &mut IndexMap<AnnotationName, AttributeValues>,
    container: AnnotationName,
    values: AttributeValues,
) {
    let existing = folded.entry(container).or_default();
    for (attribute, value) in values {
        match existing.get_mut(&attribute) {
            Some(slot) => {
                let previous = std::mem::replace(slot, AttributeValue::Array(Vec::new()));
                *slot = concat(previous, value);
            }
            None => {
                existing.insert(attribute, value);
            }
        }
    }
}

fn concat(head: AttributeValue, tail: AttributeValue) -> AttributeValue {
    match (head, tail) {
        (AttributeValue::Array(mut head), AttributeValue::Array(tail)) => {
            head.extend(tail);
            AttributeValue::Array(head)
        }
        (AttributeValue::Array(mut head), single) => {
            head.push(single);
            AttributeValue::Array(head)
        }
        (single, AttributeValue::Array(tail)) => {
            let mut items = vec![single];
            items.extend(tail);
            AttributeValue::Array(items)
        }
        (_, value) => value,
    }
}
