//! Per-element metadata
//!
//! `ElementMetadata` is created once by [`MetadataBuilder`] and never
//! mutated afterwards, so it can be shared across threads without locking.
//!
//! [`MetadataBuilder`]: super::MetadataBuilder

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use annometa_types::{AnnotationContract, AnnotationName, ContractRegistry};
use indexmap::IndexMap;
use once_cell::sync::Lazy;

use super::entry::AnnotationEntry;
use super::merge::MetaDiagnostic;

static NEXT_METADATA_ID: AtomicU64 = AtomicU64::new(1);

static EMPTY: Lazy<Arc<ElementMetadata>> = Lazy::new(|| {
    Arc::new(ElementMetadata {
        id: MetadataId::EMPTY,
        declared: IndexMap::new(),
        all: IndexMap::new(),
        stereotypes: IndexMap::new(),
        diagnostics: Vec::new(),
        registry: Arc::new(ContractRegistry::new()),
    })
});

/// Process-unique identity of an `ElementMetadata` instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MetadataId(u64);

impl MetadataId {
    /// Identity of the shared empty metadata
    pub const EMPTY: MetadataId = MetadataId(0);

    fn next() -> Self {
        MetadataId(NEXT_METADATA_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

/// Which partition of the metadata a query runs against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    /// Annotations declared directly on the element
    Declared,
    /// Declared annotations plus everything reached through meta-annotations
    All,
}

/// Annotation metadata of one program element
#[derive(Debug)]
pub struct ElementMetadata {
    id: MetadataId,
    declared: IndexMap<AnnotationName, AnnotationEntry>,
    all: IndexMap<AnnotationName, AnnotationEntry>,
    /// Stereotype -> annotations in `all` whose meta-annotation closure contains it
    stereotypes: IndexMap<AnnotationName, Vec<AnnotationName>>,
    diagnostics: Vec<MetaDiagnostic>,
    registry: Arc<ContractRegistry>,
}

impl ElementMetadata {
    pub(crate) fn from_parts(
        declared: IndexMap<AnnotationName, AnnotationEntry>,
        all: IndexMap<AnnotationName, AnnotationEntry>,
        stereotypes: IndexMap<AnnotationName, Vec<AnnotationName>>,
        diagnostics: Vec<MetaDiagnostic>,
        registry: Arc<ContractRegistry>,
    ) -> Self {
        Self {
            id: MetadataId::next(),
            declared,
            all,
            stereotypes,
            diagnostics,
            registry,
        }
    }

    /// The shared metadata of elements without annotations
    pub fn empty() -> &'static ElementMetadata {
        &EMPTY
    }

    /// The shared empty metadata as an `Arc`
    pub fn empty_shared() -> Arc<ElementMetadata> {
        Arc::clone(&EMPTY)
    }

    /// Identity used to key synthesized instances
    pub fn id(&self) -> MetadataId {
        self.id
    }

    /// Check whether the element carries no annotations at all
    pub fn is_empty(&self) -> bool {
        self.all.is_empty()
    }

    /// Contracts the metadata was resolved against
    pub fn registry(&self) -> &Arc<ContractRegistry> {
        &self.registry
    }

    /// Contract of an annotation type
    pub fn contract(&self, name: &str) -> Option<&Arc<AnnotationContract>> {
        self.registry.get(name)
    }

    /// Cycles and truncated chains found while flattening meta-annotations
    pub fn diagnostics(&self) -> &[MetaDiagnostic] {
        &self.diagnostics
    }

    /// Merged entry in `all`
    pub fn entry(&self, name: &str) -> Option<&AnnotationEntry> {
        self.all.get(name)
    }

    /// Entry as declared directly on the element
    pub fn declared_entry(&self, name: &str) -> Option<&AnnotationEntry> {
        self.declared.get(name)
    }

    /// Entry in the given partition
    pub fn entry_in(&self, scope: Scope, name: &str) -> Option<&AnnotationEntry> {
        self.partition(scope).get(name)
    }

    /// Check whether the partition contains `name`
    pub fn contains(&self, name: &str, scope: Scope) -> bool {
        self.partition(scope).contains_key(name)
    }

    /// Entries of `all`, in resolution order
    pub fn entries(&self) -> impl Iterator<Item = &AnnotationEntry> + '_ {
        self.all.values()
    }

    /// Entries of `declared`, in declaration order
    pub fn declared_entries(&self) -> impl Iterator<Item = &AnnotationEntry> + '_ {
        self.declared.values()
    }

    /// Entries of the given partition, in order
    pub fn entries_in(&self, scope: Scope) -> impl Iterator<Item = &AnnotationEntry> + '_ {
        self.partition(scope).values()
    }

    /// Number of entries in the given partition
    pub fn len(&self, scope: Scope) -> usize {
        self.partition(scope).len()
    }

    pub(crate) fn stereotype_members(&self, stereotype: &str) -> &[AnnotationName] {
        self.stereotypes
            .get(stereotype)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub(crate) fn stereotypes(&self) -> &IndexMap<AnnotationName, Vec<AnnotationName>> {
        &self.stereotypes
    }

    fn partition(&self, scope: Scope) -> &IndexMap<AnnotationName, AnnotationEntry> {
        match scope {
            Scope::Declared => &self.declared,
            Scope::All => &self.all,
        }
    }
}
