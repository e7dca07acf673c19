//! Error types for schema handling and resolution.

use thiserror::Error;

/// Errors raised for structurally invalid schema input.
///
/// Schema *mismatches* between a writer and a reader are never reported
/// through this type: resolution embeds them as error actions inside the
/// resolution plan so that a decoder only fails if real data reaches the
/// mismatched part. `SchemaError` is reserved for input that cannot be
/// worked with at all.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// Invalid schema structure
    #[error("Invalid schema: {0}")]
    InvalidSchema(String),
    /// Schema JSON parsing error
    #[error("Parse error: {0}")]
    ParseError(String),
    /// A named type reference with no matching definition
    #[error("Unresolved named type reference: '{0}'")]
    UnresolvedReference(String),
    /// A declared field default that cannot be materialized
    #[error("Invalid default value: {0}")]
    InvalidDefault(String),
}
