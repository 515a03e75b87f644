//! Engine error types

use annometa_types::TypeError;

/// Errors surfaced by value retrieval, synthesis, metadata construction,
/// persistence and configuration loading.
///
/// Presence and enumeration queries never fail; an absent annotation or
/// attribute is an empty `Option`, not an error.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// A stored value cannot be coerced to the requested type
    #[error("Type mismatch for {annotation}.{attribute}: {source}")]
    TypeMismatch {
        /// Annotation name
        annotation: String,
        /// Attribute name
        attribute: String,
        /// Coercion failure
        source: TypeError,
    },

    /// No contract is registered for the annotation
    #[error("Unknown annotation type: {name}")]
    UnknownAnnotationType {
        /// Annotation name
        name: String,
    },

    /// A stored value violates the attribute contract during synthesis
    #[error("Cannot synthesize {annotation}: attribute {attribute} {reason}")]
    Synthesis {
        /// Annotation name
        annotation: String,
        /// Offending attribute
        attribute: String,
        /// What went wrong
        reason: String,
    },

    /// A non-repeatable annotation was declared more than once
    #[error("Annotation {name} declared more than once and is not repeatable")]
    DuplicateAnnotation {
        /// Annotation name
        name: String,
    },

    /// Metadata snapshot could not be (de)serialized
    #[error("Snapshot error: {0}")]
    Snapshot(#[from] serde_json::Error),

    /// Metadata snapshot is structurally inconsistent
    #[error("Invalid snapshot: {0}")]
    InvalidSnapshot(String),

    /// Engine configuration could not be parsed
    #[error("Failed to parse engine configuration: {0}")]
    Config(#[from] toml::de::Error),

    /// Configuration file I/O error
    #[error("{0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for engine operations
pub type EngineResult<T> = Result<T, EngineError>;
