//! Metadata Provider façade
//!
//! Anything that can carry annotations implements
//! [`AnnotationMetadataProvider`]. The only required piece is
//! [`annotation_metadata`](AnnotationMetadataProvider::annotation_metadata),
//! which defaults to the shared empty metadata; everything else forwards to
//! the resolver and the global [`SynthesisEngine`].
//!
//! [`AnnotationSource`] bundles a metadata reference with an engine for
//! callers that want a specific engine or the wider query surface.

use std::fmt;
use std::sync::Arc;

use annometa_types::{AnnotationName, AttributeType, AttributeValue};
use serde::{Deserialize, Serialize};

use crate::error::EngineResult;
use crate::store::ElementMetadata;
use crate::synthesis::{AnnotationType, SynthesisEngine, SynthesizedAnnotation};

/// A program element that exposes annotation metadata
pub trait AnnotationMetadataProvider {
    /// Metadata of the element; never absent
    fn annotation_metadata(&self) -> &ElementMetadata {
        ElementMetadata::empty()
    }

    /// Check whether `name` is declared or reached through meta-annotations
    fn is_annotation_present(&self, name: &str) -> bool {
        self.annotation_metadata().is_annotation_present(name)
    }

    /// Check whether `name` is declared directly
    fn is_declared_annotation_present(&self, name: &str) -> bool {
        self.annotation_metadata().is_declared_annotation_present(name)
    }

    /// Synthesize `name` with the global engine
    fn synthesize(&self, name: &str) -> EngineResult<Option<SynthesizedAnnotation>> {
        SynthesisEngine::global().synthesize(self.annotation_metadata(), name)
    }

    /// Synthesize a directly declared `name` with the global engine
    fn synthesize_declared_annotation(
        &self,
        name: &str,
    ) -> EngineResult<Option<SynthesizedAnnotation>> {
        SynthesisEngine::global().synthesize_declared_annotation(self.annotation_metadata(), name)
    }

    /// Synthesize every annotation in `all`
    fn synthesize_all(&self) -> EngineResult<Vec<SynthesizedAnnotation>> {
        SynthesisEngine::global().synthesize_all(self.annotation_metadata())
    }

    /// Synthesize every declared annotation
    fn synthesize_declared(&self) -> EngineResult<Vec<SynthesizedAnnotation>> {
        SynthesisEngine::global().synthesize_declared(self.annotation_metadata())
    }

    /// Query façade over this element's metadata and the global engine
    fn annotations(&self) -> AnnotationSource<'_> {
        AnnotationSource::new(self.annotation_metadata())
    }
}

impl AnnotationMetadataProvider for ElementMetadata {
    fn annotation_metadata(&self) -> &ElementMetadata {
        self
    }
}

impl<T: AnnotationMetadataProvider + ?Sized> AnnotationMetadataProvider for Arc<T> {
    fn annotation_metadata(&self) -> &ElementMetadata {
        (**self).annotation_metadata()
    }
}

/// Metadata and synthesis engine of one element
#[derive(Debug, Clone, Copy)]
pub struct AnnotationSource<'a> {
    metadata: &'a ElementMetadata,
    engine: &'a SynthesisEngine,
}

impl<'a> AnnotationSource<'a> {
    /// Source backed by the global engine
    pub fn new(metadata: &'a ElementMetadata) -> Self {
        Self::with_engine(metadata, SynthesisEngine::global())
    }

    /// Source backed by a specific engine
    pub fn with_engine(metadata: &'a ElementMetadata, engine: &'a SynthesisEngine) -> Self {
        Self { metadata, engine }
    }

    /// Metadata this source reads from
    pub fn metadata(&self) -> &'a ElementMetadata {
        self.metadata
    }

    /// Engine used for synthesis
    pub fn engine(&self) -> &'a SynthesisEngine {
        self.engine
    }

    /// Check whether `name` is declared or reached through meta-annotations
    pub fn is_annotation_present(&self, name: &str) -> bool {
        self.metadata.is_annotation_present(name)
    }

    /// Check whether `name` is declared directly
    pub fn is_declared_annotation_present(&self, name: &str) -> bool {
        self.metadata.is_declared_annotation_present(name)
    }

    /// Check whether any annotation in `all` carries `stereotype`
    pub fn has_stereotype(&self, stereotype: &str) -> bool {
        self.metadata.has_stereotype(stereotype)
    }

    /// Check whether a declared annotation carries `stereotype`
    pub fn has_declared_stereotype(&self, stereotype: &str) -> bool {
        self.metadata.has_declared_stereotype(stereotype)
    }

    /// Names in `all`, in resolution order
    pub fn annotation_names(&self) -> Vec<AnnotationName> {
        self.metadata.get_annotation_names()
    }

    /// Names declared on the element, in declaration order
    pub fn declared_annotation_names(&self) -> Vec<AnnotationName> {
        self.metadata.get_declared_annotation_names()
    }

    /// Annotations that carry `stereotype`, in resolution order
    pub fn annotations_by_stereotype(&self, stereotype: &str) -> Vec<AnnotationName> {
        self.metadata.get_annotations_by_stereotype(stereotype)
    }

    /// Attribute value with default fallback, coerced to `ty`
    pub fn get_value(
        &self,
        annotation: &str,
        attribute: &str,
        ty: &AttributeType,
    ) -> EngineResult<Option<AttributeValue>> {
        self.metadata.get_value(annotation, attribute, ty)
    }

    /// Declared attribute value with default fallback, coerced to `ty`
    pub fn get_declared_value(
        &self,
        annotation: &str,
        attribute: &str,
        ty: &AttributeType,
    ) -> EngineResult<Option<AttributeValue>> {
        self.metadata.get_declared_value(annotation, attribute, ty)
    }

    /// Synthesize `name` with this source's engine
    pub fn synthesize(&self, name: &str) -> EngineResult<Option<SynthesizedAnnotation>> {
        self.engine.synthesize(self.metadata, name)
    }

    /// Synthesize a directly declared `name`
    pub fn synthesize_declared_annotation(
        &self,
        name: &str,
    ) -> EngineResult<Option<SynthesizedAnnotation>> {
        self.engine.synthesize_declared_annotation(self.metadata, name)
    }

    /// Synthesize every annotation in `all`
    pub fn synthesize_all(&self) -> EngineResult<Vec<SynthesizedAnnotation>> {
        self.engine.synthesize_all(self.metadata)
    }

    /// Synthesize every declared annotation
    pub fn synthesize_declared(&self) -> EngineResult<Vec<SynthesizedAnnotation>> {
        self.engine.synthesize_declared(self.metadata)
    }

    /// Synthesize each occurrence of a repeatable `name`
    pub fn synthesize_annotations_by_type(
        &self,
        name: &str,
    ) -> EngineResult<Vec<SynthesizedAnnotation>> {
        self.engine.synthesize_annotations_by_type(self.metadata, name)
    }

    /// Synthesize `T` and convert it into its Rust type
    pub fn synthesize_as<T: AnnotationType>(&self) -> EngineResult<Option<T>> {
        self.engine.synthesize_as::<T>(self.metadata)
    }
}

impl AnnotationMetadataProvider for AnnotationSource<'_> {
    fn annotation_metadata(&self) -> &ElementMetadata {
        self.metadata
    }

    fn synthesize(&self, name: &str) -> EngineResult<Option<SynthesizedAnnotation>> {
        self.engine.synthesize(self.metadata, name)
    }

    fn synthesize_declared_annotation(
        &self,
        name: &str,
    ) -> EngineResult<Option<SynthesizedAnnotation>> {
        self.engine.synthesize_declared_annotation(self.metadata, name)
    }

    fn synthesize_all(&self) -> EngineResult<Vec<SynthesizedAnnotation>> {
        self.engine.synthesize_all(self.metadata)
    }

    fn synthesize_declared(&self) -> EngineResult<Vec<SynthesizedAnnotation>> {
        self.engine.synthesize_declared(self.metadata)
    }

    fn annotations(&self) -> AnnotationSource<'_> {
        *self
    }
}

/// Kind of annotated program element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    Class,
    Method,
    Field,
    Parameter,
    Constructor,
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ElementKind::Class => "class",
            ElementKind::Method => "method",
            ElementKind::Field => "field",
            ElementKind::Parameter => "parameter",
            ElementKind::Constructor => "constructor",
        };
        f.write_str(name)
    }
}

/// A named program element with optional metadata
///
/// Elements without metadata answer every query as if unannotated.
#[derive(Debug, Clone)]
pub struct ProgramElement {
    /// Element kind
    pub kind: ElementKind,
    /// Element name
    pub name: String,
    metadata: Option<Arc<ElementMetadata>>,
}

impl ProgramElement {
    /// Create an element without annotations
    pub fn new(kind: ElementKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            metadata: None,
        }
    }

    /// Attach metadata
    pub fn with_metadata(mut self, metadata: Arc<ElementMetadata>) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Attached metadata, if any
    pub fn metadata(&self) -> Option<&Arc<ElementMetadata>> {
        self.metadata.as_ref()
    }
}

impl AnnotationMetadataProvider for ProgramElement {
    fn annotation_metadata(&self) -> &ElementMetadata {
        self.metadata.as_deref().unwrap_or(ElementMetadata::empty())
    }
}

impl fmt::Display for ProgramElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.name)
    }
}
