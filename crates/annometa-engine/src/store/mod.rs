//! Attribute Store
//!
//! Immutable per-element annotation tables with two partitions:
//! - `declared`: annotations present directly on the element
//! - `all`: declared annotations plus everything contributed through
//!   meta-annotations, after precedence merging
//!
//! Both partitions iterate in a stable order (declaration order, then
//! breadth-first discovery order). Population only happens through
//! [`MetadataBuilder`].

mod builder;
mod entry;
mod merge;
mod metadata;

pub use builder::MetadataBuilder;
pub use entry::{AnnotationEntry, Origin};
pub use merge::{DiagnosticKind, MetaDiagnostic};
pub use metadata::{ElementMetadata, MetadataId, Scope};
