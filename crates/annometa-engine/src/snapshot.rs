//! Metadata persistence
//!
//! A [`MetadataSnapshot`] captures both partitions, the stereotype index and
//! the diagnostics of one [`ElementMetadata`] so that discovery results can
//! be stored and reloaded without re-resolving meta-annotations. Contracts
//! are not part of the snapshot; the caller supplies the registry on
//! restore.

use std::sync::Arc;

use annometa_types::{AnnotationName, ContractRegistry};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{EngineError, EngineResult};
use crate::store::{AnnotationEntry, ElementMetadata, MetaDiagnostic, Scope};

/// Serializable form of [`ElementMetadata`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataSnapshot {
    /// Declared entries in declaration order
    pub declared: Vec<AnnotationEntry>,
    /// Resolved entries in resolution order
    pub all: Vec<AnnotationEntry>,
    /// Stereotype index
    #[serde(default)]
    pub stereotypes: IndexMap<AnnotationName, Vec<AnnotationName>>,
    /// Diagnostics recorded while resolving
    #[serde(default)]
    pub diagnostics: Vec<MetaDiagnostic>,
}

impl MetadataSnapshot {
    /// Capture the state of `metadata`
    pub fn capture(metadata: &ElementMetadata) -> Self {
        Self {
            declared: metadata.entries_in(Scope::Declared).cloned().collect(),
            all: metadata.entries_in(Scope::All).cloned().collect(),
            stereotypes: metadata.stereotypes().clone(),
            diagnostics: metadata.diagnostics().to_vec(),
        }
    }

    /// Rebuild metadata; the result gets a fresh identity
    pub fn restore(self, registry: Arc<ContractRegistry>) -> EngineResult<ElementMetadata> {
        let declared = index_entries(self.declared, "declared")?;
        let all = index_entries(self.all, "all")?;

        if let Some(missing) = declared.keys().find(|name| !all.contains_key(*name)) {
            return Err(EngineError::InvalidSnapshot(format!(
                "declared annotation {} is missing from all",
                missing
            )));
        }
        if let Some(entry) = declared.values().find(|entry| !entry.is_declared()) {
            return Err(EngineError::InvalidSnapshot(format!(
                "declared annotation {} has a meta-annotation origin",
                entry.name()
            )));
        }
        for (stereotype, members) in &self.stereotypes {
            if let Some(member) = members.iter().find(|name| !all.contains_key(*name)) {
                return Err(EngineError::InvalidSnapshot(format!(
                    "stereotype {} lists unknown annotation {}",
                    stereotype, member
                )));
            }
        }

        debug!(
            declared = declared.len(),
            all = all.len(),
            "restored metadata snapshot"
        );
        Ok(ElementMetadata::from_parts(
            declared,
            all,
            self.stereotypes,
            self.diagnostics,
            registry,
        ))
    }
}

fn index_entries(
    entries: Vec<AnnotationEntry>,
    partition: &str,
) -> EngineResult<IndexMap<AnnotationName, AnnotationEntry>> {
    let mut indexed = IndexMap::with_capacity(entries.len());
    for entry in entries {
        let name = entry.name().clone();
        if indexed.insert(name.clone(), entry).is_some() {
            return Err(EngineError::InvalidSnapshot(format!(
                "annotation {} appears twice in {}",
                name, partition
            )));
        }
    }
    Ok(indexed)
}

impl ElementMetadata {
    /// Snapshot of this metadata
    pub fn snapshot(&self) -> MetadataSnapshot {
        MetadataSnapshot::capture(self)
    }

    /// Serialize to pretty-printed JSON
    pub fn to_json(&self) -> EngineResult<String> {
        Ok(serde_json::to_string_pretty(&self.snapshot())?)
    }

    /// Restore metadata serialized with [`ElementMetadata::to_json`]
    pub fn from_json(json: &str, registry: Arc<ContractRegistry>) -> EngineResult<ElementMetadata> {
        let snapshot: MetadataSnapshot = serde_json::from_str(json)?;
        snapshot.restore(registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MetadataBuilder;
    use annometa_types::{AnnotationContract, AttributeValue};

    fn registry() -> Arc<ContractRegistry> {
        Arc::new(
            ContractRegistry::new()
                .with(AnnotationContract::new("A").annotated_with("B"))
                .unwrap()
                .with(AnnotationContract::new("B").annotated_with("A"))
                .unwrap(),
        )
    }

    #[test]
    fn test_json_roundtrip() {
        let metadata = MetadataBuilder::new()
            .declare_with("A", [("x", AttributeValue::Int(1))])
            .build(registry())
            .unwrap();
        let json = metadata.to_json().unwrap();
        let restored = ElementMetadata::from_json(&json, registry()).unwrap();

        assert_ne!(restored.id(), metadata.id());
        assert_eq!(restored.snapshot(), metadata.snapshot());
        assert_eq!(restored.get_annotation_names(), metadata.get_annotation_names());
        assert_eq!(restored.diagnostics().len(), 1);
        assert!(restored.has_stereotype("B"));
    }

    #[test]
    fn test_declared_must_be_in_all() {
        let metadata = MetadataBuilder::new().declare("A").build(registry()).unwrap();
        let mut snapshot = metadata.snapshot();
        snapshot.all.retain(|entry| entry.name() != "A");
        let err = snapshot.restore(registry()).unwrap_err();
        assert!(matches!(err, EngineError::InvalidSnapshot(_)));
    }

    #[test]
    fn test_duplicate_entries_rejected() {
        let metadata = MetadataBuilder::new().declare("A").build(registry()).unwrap();
        let mut snapshot = metadata.snapshot();
        let first = snapshot.all[0].clone();
        snapshot.all.push(first);
        assert!(matches!(
            snapshot.restore(registry()),
            Err(EngineError::InvalidSnapshot(_))
        ));
    }

    #[test]
    fn test_declared_entry_with_meta_origin_rejected() {
        let metadata = MetadataBuilder::new().declare("A").build(registry()).unwrap();
        let mut snapshot = metadata.snapshot();
        let declared = snapshot.declared[0].clone();
        let path = vec![AnnotationName::new("B"), declared.name().clone()];
        snapshot.declared[0] =
            AnnotationEntry::meta(declared.name().clone(), declared.values().clone(), path);

        match snapshot.restore(registry()) {
            Err(EngineError::InvalidSnapshot(msg)) => {
                assert!(msg.contains("meta-annotation origin"), "{}", msg)
            }
            other => panic!("expected InvalidSnapshot, got {:?}", other),
        }
    }

    #[test]
    fn test_malformed_json() {
        let err = ElementMetadata::from_json("{\"declared\": 3}", registry()).unwrap_err();
        assert!(matches!(err, EngineError::Snapshot(_)));
    }
}
