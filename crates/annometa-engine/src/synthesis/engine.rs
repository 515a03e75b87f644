//! Synthesis engine and instance cache

use std::collections::BTreeMap;

use annometa_types::{coerce, AnnotationName, AttributeValue, AttributeValues, ContractRegistry};
use dashmap::DashMap;
use once_cell::sync::Lazy;
use tracing::{debug, trace};

use super::instance::SynthesizedAnnotation;
use super::AnnotationType;
use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::store::{ElementMetadata, MetadataId, Scope};

static GLOBAL: Lazy<SynthesisEngine> = Lazy::new(SynthesisEngine::default);

type CacheKey = (MetadataId, AnnotationName, Scope);

/// Builds [`SynthesizedAnnotation`]s from element metadata and memoizes them
///
/// The cache is keyed by metadata identity, annotation name and partition.
/// Instances are computed outside the shard lock; when two threads race on
/// the same key the first insert wins and both receive the cached instance.
#[derive(Debug, Default)]
pub struct SynthesisEngine {
    cache: DashMap<CacheKey, SynthesizedAnnotation>,
    config: EngineConfig,
}

impl SynthesisEngine {
    /// Create an engine with its own cache
    pub fn new(config: EngineConfig) -> Self {
        Self {
            cache: DashMap::new(),
            config,
        }
    }

    /// Process-wide engine with the default configuration
    pub fn global() -> &'static SynthesisEngine {
        &GLOBAL
    }

    /// Engine configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Synthesize `name` from the `all` partition
    pub fn synthesize(
        &self,
        metadata: &ElementMetadata,
        name: &str,
    ) -> EngineResult<Option<SynthesizedAnnotation>> {
        self.synthesize_in(metadata, Scope::All, name)
    }

    /// Synthesize `name` from the annotations declared on the element
    pub fn synthesize_declared_annotation(
        &self,
        metadata: &ElementMetadata,
        name: &str,
    ) -> EngineResult<Option<SynthesizedAnnotation>> {
        self.synthesize_in(metadata, Scope::Declared, name)
    }

    /// Synthesize `name` from the given partition
    ///
    /// Absence is checked before the contract, so elements without the
    /// annotation never fail.
    pub fn synthesize_in(
        &self,
        metadata: &ElementMetadata,
        scope: Scope,
        name: &str,
    ) -> EngineResult<Option<SynthesizedAnnotation>> {
        let Some(entry) = metadata.entry_in(scope, name) else {
            return Ok(None);
        };
        if !self.config.cache_synthesis {
            return self
                .build(metadata.registry(), entry.name(), entry.values())
                .map(Some);
        }

        let key = (metadata.id(), entry.name().clone(), scope);
        if let Some(hit) = self.cache.get(&key) {
            trace!(annotation = name, metadata = metadata.id().as_u64(), "synthesis cache hit");
            return Ok(Some(hit.value().clone()));
        }

        let built = self.build(metadata.registry(), entry.name(), entry.values())?;
        let winner = self.cache.entry(key).or_insert(built).value().clone();
        debug!(
            annotation = name,
            metadata = metadata.id().as_u64(),
            "synthesized annotation"
        );
        Ok(Some(winner))
    }

    /// One instance per annotation in `all`, in resolution order
    pub fn synthesize_all(
        &self,
        metadata: &ElementMetadata,
    ) -> EngineResult<Vec<SynthesizedAnnotation>> {
        self.synthesize_scope(metadata, Scope::All)
    }

    /// One instance per declared annotation, in declaration order
    pub fn synthesize_declared(
        &self,
        metadata: &ElementMetadata,
    ) -> EngineResult<Vec<SynthesizedAnnotation>> {
        self.synthesize_scope(metadata, Scope::Declared)
    }

    fn synthesize_scope(
        &self,
        metadata: &ElementMetadata,
        scope: Scope,
    ) -> EngineResult<Vec<SynthesizedAnnotation>> {
        let mut instances = Vec::with_capacity(metadata.len(scope));
        for entry in metadata.entries_in(scope) {
            if let Some(instance) = self.synthesize_in(metadata, scope, entry.name())? {
                instances.push(instance);
            }
        }
        Ok(instances)
    }

    /// One instance per occurrence of a repeatable annotation in `all`
    ///
    /// Occurrences held inside the container are not cached individually.
    pub fn synthesize_annotations_by_type(
        &self,
        metadata: &ElementMetadata,
        name: &str,
    ) -> EngineResult<Vec<SynthesizedAnnotation>> {
        metadata
            .get_annotation_values_by_type(name)
            .iter()
            .map(|occurrence| {
                self.build(metadata.registry(), occurrence.name(), occurrence.values())
            })
            .collect()
    }

    /// Synthesize a statically-known annotation type
    pub fn synthesize_as<T: AnnotationType>(
        &self,
        metadata: &ElementMetadata,
    ) -> EngineResult<Option<T>> {
        self.synthesize(metadata, T::NAME)?
            .map(|instance| T::from_annotation(&instance))
            .transpose()
    }

    /// Number of cached instances
    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    /// Drop every cached instance
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    fn build(
        &self,
        registry: &ContractRegistry,
        name: &AnnotationName,
        values: &AttributeValues,
    ) -> EngineResult<SynthesizedAnnotation> {
        let contract = registry
            .get(name)
            .ok_or_else(|| EngineError::UnknownAnnotationType {
                name: name.to_string(),
            })?;

        if self.config.reject_unknown_attributes {
            if let Some(unknown) = values.keys().find(|k| contract.get_attribute(k).is_none()) {
                return Err(synthesis_error(
                    name,
                    unknown,
                    "is not declared by the annotation type",
                ));
            }
        }

        let mut resolved = BTreeMap::new();
        for spec in &contract.attributes {
            let stored = values
                .get(&spec.name)
                .or(spec.default.as_ref())
                .ok_or_else(|| synthesis_error(name, &spec.name, "has no value and no default"))?;
            let coerced = coerce(stored, &spec.ty)
                .map_err(|source| synthesis_error(name, &spec.name, source.to_string()))?;
            resolved.insert(spec.name.clone(), self.complete_nested(registry, coerced)?);
        }
        Ok(SynthesizedAnnotation::new(name.clone(), resolved))
    }

    /// Fill defaults of nested annotation values
    fn complete_nested(
        &self,
        registry: &ContractRegistry,
        value: AttributeValue,
    ) -> EngineResult<AttributeValue> {
        match value {
            AttributeValue::Annotation(nested) => {
                let instance = self.build(registry, &nested.name, &nested.values)?;
                Ok(AttributeValue::Annotation(instance.into_nested()))
            }
            AttributeValue::Array(items) => items
                .into_iter()
                .map(|item| self.complete_nested(registry, item))
                .collect::<EngineResult<Vec<_>>>()
                .map(AttributeValue::Array),
            other => Ok(other),
        }
    }
}

fn synthesis_error(
    annotation: &AnnotationName,
    attribute: &str,
    reason: impl Into<String>,
) -> EngineError {
    EngineError::Synthesis {
        annotation: annotation.to_string(),
        attribute: attribute.to_string(),
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MetadataBuilder;
    use annometa_types::{AnnotationContract, AttributeSpec, AttributeType, NestedAnnotation};
    use std::sync::Arc;

    const NAMED: &str = "com.acme.Named";
    const QUALIFIER: &str = "com.acme.Qualifier";
    const INJECT: &str = "com.acme.Inject";
    const TIMEOUT: &str = "com.acme.Timeout";

    fn registry() -> Arc<ContractRegistry> {
        let qualifier = AttributeType::Annotation(AnnotationName::new(QUALIFIER));
        Arc::new(
            ContractRegistry::new()
                .with(
                    AnnotationContract::new(QUALIFIER).attribute(
                        AttributeSpec::new("name", AttributeType::String).with_default("default"),
                    ),
                )
                .unwrap()
                .with(
                    AnnotationContract::new(NAMED)
                        .attribute(
                            AttributeSpec::new("value", AttributeType::String)
                                .alias_for(QUALIFIER, "name"),
                        )
                        .attribute(
                            AttributeSpec::new("order", AttributeType::Int).with_default(0),
                        )
                        .annotated_with(QUALIFIER),
                )
                .unwrap()
                .with(
                    AnnotationContract::new(INJECT)
                        .attribute(AttributeSpec::new("qualifier", qualifier.clone()))
                        .attribute(
                            AttributeSpec::new("fallbacks", AttributeType::array(qualifier))
                                .with_default(Vec::<AttributeValue>::new()),
                        ),
                )
                .unwrap()
                .with(
                    AnnotationContract::new(TIMEOUT)
                        .attribute(AttributeSpec::new("seconds", AttributeType::Double)),
                )
                .unwrap(),
        )
    }

    fn named(value: &str) -> ElementMetadata {
        MetadataBuilder::new()
            .declare_with(NAMED, [("value", value)])
            .build(registry())
            .unwrap()
    }

    #[test]
    fn test_synthesize_fills_defaults() {
        let engine = SynthesisEngine::default();
        let metadata = named("primary");
        let instance = engine.synthesize(&metadata, NAMED).unwrap().unwrap();
        assert_eq!(instance.string("value"), Some("primary"));
        assert_eq!(instance.int("order"), Some(0));

        let qualifier = engine.synthesize(&metadata, QUALIFIER).unwrap().unwrap();
        assert_eq!(qualifier.string("name"), Some("primary"));
        assert!(engine.synthesize_declared_annotation(&metadata, QUALIFIER).unwrap().is_none());
    }

    #[test]
    fn test_absent_is_none() {
        let engine = SynthesisEngine::default();
        let metadata = named("x");
        assert!(engine.synthesize(&metadata, TIMEOUT).unwrap().is_none());
        assert!(engine.synthesize(ElementMetadata::empty(), NAMED).unwrap().is_none());
        assert!(engine.synthesize_all(ElementMetadata::empty()).unwrap().is_empty());
    }

    #[test]
    fn test_cached_instances_are_shared() {
        let engine = SynthesisEngine::default();
        let metadata = named("x");
        let a = engine.synthesize(&metadata, NAMED).unwrap().unwrap();
        let b = engine.synthesize(&metadata, NAMED).unwrap().unwrap();
        assert!(SynthesizedAnnotation::ptr_eq(&a, &b));
        assert_eq!(engine.cache_len(), 1);

        // Declared and all are cached separately
        engine.synthesize_declared_annotation(&metadata, NAMED).unwrap();
        assert_eq!(engine.cache_len(), 2);

        engine.clear_cache();
        assert_eq!(engine.cache_len(), 0);
    }

    #[test]
    fn test_cache_disabled() {
        let engine = SynthesisEngine::new(EngineConfig::default().with_cache_synthesis(false));
        let metadata = named("x");
        let a = engine.synthesize(&metadata, NAMED).unwrap().unwrap();
        let b = engine.synthesize(&metadata, NAMED).unwrap().unwrap();
        assert_eq!(a, b);
        assert!(!SynthesizedAnnotation::ptr_eq(&a, &b));
        assert_eq!(engine.cache_len(), 0);
    }

    #[test]
    fn test_distinct_metadata_do_not_share_cache() {
        let engine = SynthesisEngine::default();
        let a = engine.synthesize(&named("a"), NAMED).unwrap().unwrap();
        let b = engine.synthesize(&named("b"), NAMED).unwrap().unwrap();
        assert_eq!(a.string("value"), Some("a"));
        assert_eq!(b.string("value"), Some("b"));
    }

    #[test]
    fn test_synthesize_all_in_order() {
        let engine = SynthesisEngine::default();
        let metadata = named("x");
        let names: Vec<_> = engine
            .synthesize_all(&metadata)
            .unwrap()
            .iter()
            .map(|a| a.annotation_type().to_string())
            .collect();
        assert_eq!(names, vec![NAMED, QUALIFIER]);
        assert_eq!(engine.synthesize_declared(&metadata).unwrap().len(), 1);
    }

    #[test]
    fn test_missing_required_attribute() {
        let metadata = MetadataBuilder::new().declare(TIMEOUT).build(registry()).unwrap();
        let err = SynthesisEngine::default().synthesize(&metadata, TIMEOUT).unwrap_err();
        assert!(matches!(
            err,
            EngineError::Synthesis { ref attribute, .. } if attribute == "seconds"
        ));
    }

    #[test]
    fn test_uncoercible_value() {
        let metadata = MetadataBuilder::new()
            .declare_with(TIMEOUT, [("seconds", "soon")])
            .build(registry())
            .unwrap();
        let err = SynthesisEngine::default().synthesize(&metadata, TIMEOUT).unwrap_err();
        assert!(matches!(err, EngineError::Synthesis { .. }));
        assert!(err.to_string().contains("seconds"));
    }

    #[test]
    fn test_int_widened_to_double() {
        let metadata = MetadataBuilder::new()
            .declare_with(TIMEOUT, [("seconds", 30)])
            .build(registry())
            .unwrap();
        let instance = SynthesisEngine::default().synthesize(&metadata, TIMEOUT).unwrap().unwrap();
        assert_eq!(instance.double("seconds"), Some(30.0));
    }

    #[test]
    fn test_unknown_annotation_type() {
        let metadata = MetadataBuilder::new()
            .declare("com.acme.Unregistered")
            .build(registry())
            .unwrap();
        let err = SynthesisEngine::default()
            .synthesize(&metadata, "com.acme.Unregistered")
            .unwrap_err();
        assert!(matches!(err, EngineError::UnknownAnnotationType { .. }));
    }

    #[test]
    fn test_unknown_attributes() {
        let metadata = MetadataBuilder::new()
            .declare_with(TIMEOUT, [("seconds", AttributeValue::Float(1.5)), ("unit", "s".into())])
            .build(registry())
            .unwrap();

        let lenient = SynthesisEngine::default();
        let instance = lenient.synthesize(&metadata, TIMEOUT).unwrap().unwrap();
        assert!(instance.attribute("unit").is_none());

        let strict =
            SynthesisEngine::new(EngineConfig::default().with_reject_unknown_attributes(true));
        let err = strict.synthesize(&metadata, TIMEOUT).unwrap_err();
        assert!(matches!(err, EngineError::Synthesis { ref attribute, .. } if attribute == "unit"));
    }

    #[test]
    fn test_nested_annotations_are_completed() {
        let metadata = MetadataBuilder::new()
            .declare_with(
                INJECT,
                [(
                    "qualifier",
                    AttributeValue::Annotation(NestedAnnotation::new(QUALIFIER)),
                )],
            )
            .build(registry())
            .unwrap();
        let instance = SynthesisEngine::default().synthesize(&metadata, INJECT).unwrap().unwrap();
        let qualifier = instance.annotation("qualifier").unwrap();
        assert_eq!(qualifier.string("name"), Some("default"));
        assert!(instance.annotations("fallbacks").is_empty());
    }

    #[test]
    fn test_global_engine() {
        let metadata = named("global");
        let a = SynthesisEngine::global().synthesize(&metadata, NAMED).unwrap().unwrap();
        let b = SynthesisEngine::global().synthesize(&metadata, NAMED).unwrap().unwrap();
        assert!(SynthesizedAnnotation::ptr_eq(&a, &b));
    }
}
