//! Error types for the serialization engine.

use apiscribe_types::ValueError;
use thiserror::Error;

/// Errors surfaced by encode, decode and normalization.
///
/// Every variant is fatal to the top-level call that produced it: no partial
/// document and no partially decoded model is handed back.
#[derive(Debug, Error)]
pub enum ScribeError {
    /// Input bytes could not produce a keyed container.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// A container key could not be synthesized from a field key.
    #[error("invalid field key: {key:?}")]
    InvalidFieldKey { key: String },

    /// A present value could not be converted to the field's type.
    #[error("type mismatch for field '{key}': {source}")]
    TypeMismatch {
        key: String,
        #[source]
        source: ValueError,
    },

    /// A document collection has no registered serializer.
    #[error("no serializer registered for store key '{0}'")]
    UnknownStoreKey(String),

    /// A normalized document does not have the expected shape.
    #[error("malformed document: {0}")]
    MalformedDocument(String),

    /// Traversal discovered more distinct resources than allowed.
    #[error("resource limit exceeded: more than {limit} resources")]
    ResourceLimitExceeded { limit: usize },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Result type for engine operations.
pub type ScribeResult<T> = Result<T, ScribeError>;
