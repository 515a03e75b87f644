//! Annometa Engine
//!
//! Annotation metadata for program elements:
//! - **Store**: immutable per-element tables of declared and resolved
//!   annotations (`store` module)
//! - **Resolver**: presence, value, stereotype and repeatable queries
//!   (inherent methods on [`ElementMetadata`])
//! - **Synthesis**: annotation instances with defaults filled in, cached
//!   per element (`synthesis` module)
//! - **Provider**: the façade program elements expose (`provider` module)
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use annometa_engine::{AnnotationMetadataProvider, MetadataBuilder, ProgramElement, ElementKind};
//! use annometa_types::{AnnotationContract, AttributeSpec, AttributeType, ContractRegistry};
//!
//! let registry = ContractRegistry::new()
//!     .with(AnnotationContract::new("com.acme.Component"))?
//!     .with(
//!         AnnotationContract::new("com.acme.Service")
//!             .attribute(AttributeSpec::new("value", AttributeType::String).with_default(""))
//!             .annotated_with("com.acme.Component"),
//!     )?;
//!
//! let metadata = MetadataBuilder::new()
//!     .declare_with("com.acme.Service", [("value", "users")])
//!     .build(Arc::new(registry))?;
//!
//! let class = ProgramElement::new(ElementKind::Class, "UserService")
//!     .with_metadata(Arc::new(metadata));
//! assert!(class.is_annotation_present("com.acme.Component"));
//! let service = class.synthesize("com.acme.Service")?.unwrap();
//! assert_eq!(service.string("value"), Some("users"));
//! ```

#![warn(rust_2018_idioms)]

// ============================================================================
// Modules
// ============================================================================

pub mod annotation_value;
pub mod config;
pub mod error;
pub mod provider;
mod resolver;
pub mod snapshot;
pub mod store;
pub mod synthesis;

// ============================================================================
// Re-exports
// ============================================================================

pub use annotation_value::AnnotationValue;
pub use config::EngineConfig;
pub use error::{EngineError, EngineResult};
pub use provider::{AnnotationMetadataProvider, AnnotationSource, ElementKind, ProgramElement};
pub use snapshot::MetadataSnapshot;
pub use store::{
    AnnotationEntry, DiagnosticKind, ElementMetadata, MetaDiagnostic, MetadataBuilder, MetadataId,
    Origin, Scope,
};
pub use synthesis::{AnnotationType, SynthesisEngine, SynthesizedAnnotation};
