//! Annometa Type Model
//!
//! Attribute values, attribute types, coercion rules and annotation
//! contracts shared by the metadata engine and by discovery tooling that
//! produces declared attribute tables.

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod coerce;
pub mod contract;
pub mod error;
pub mod identity;
pub mod registry;
pub mod ty;
pub mod value;

pub use coerce::coerce;
pub use contract::{AliasTarget, AnnotationContract, AttributeSpec, MetaAnnotation};
pub use error::{ContractError, TypeError};
pub use identity::AnnotationName;
pub use registry::ContractRegistry;
pub use ty::{AttributeType, EnumType};
pub use value::{AttributeValue, AttributeValues, EnumConstant, NestedAnnotation};

/// Name of the attribute used when an annotation carries a single unnamed value
pub const VALUE_ATTRIBUTE: &str = "value";
