//! Type model errors

use thiserror::Error;

/// Errors raised when a stored value cannot be coerced to a declared type
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TypeError {
    /// The value's kind cannot be converted to the expected type
    #[error("Type mismatch: expected {expected}, got {actual}")]
    Mismatch {
        /// Expected type
        expected: String,
        /// Actual value kind
        actual: String,
    },

    /// A numeric value does not fit the expected type without loss
    #[error("Value {value} is out of range for {expected}")]
    OutOfRange {
        /// Expected type
        expected: String,
        /// Offending value
        value: String,
    },

    /// An enum constant name that the enum type does not declare
    #[error("Unknown constant {constant} for enum {enum_type}")]
    UnknownEnumConstant {
        /// Enum type name
        enum_type: String,
        /// Constant name
        constant: String,
    },
}

/// Errors raised while registering annotation contracts
#[derive(Debug, Error)]
pub enum ContractError {
    /// Two attributes with the same name on one contract
    #[error("Duplicate attribute {attribute} on annotation {annotation}")]
    DuplicateAttribute {
        /// Annotation name
        annotation: String,
        /// Attribute name
        attribute: String,
    },

    /// A default value that does not satisfy the attribute's declared type
    #[error("Invalid default for {annotation}.{attribute}: {source}")]
    InvalidDefault {
        /// Annotation name
        annotation: String,
        /// Attribute name
        attribute: String,
        /// Underlying coercion failure
        source: TypeError,
    },

    /// Contract descriptor JSON could not be parsed
    #[error("Failed to parse contracts: {0}")]
    Json(#[from] serde_json::Error),
}
