//! Value and identity types for apiscribe.
//!
//! This crate defines the leaf types every other part of the engine depends on:
//! - The closed tagged value a field encodes to or decodes from ([`FieldValue`])
//! - Typed conversions at the field boundary ([`IntoFieldValue`], [`FromFieldValue`])
//! - The `(store key, store id)` pair that deduplicates resources in normalized
//!   documents ([`StoreId`], [`ResourceIdentity`])
//!
//! Nothing here knows about serializers or traversal; JSON is bridged through
//! `serde_json::Value` conversions only.

mod convert;
mod ids;
mod value;

pub use convert::{FromFieldValue, IntoFieldValue, from_nullable};
pub use ids::{ResourceIdentity, StoreId};
pub use value::{FieldMap, FieldValue};

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, ValueError>;

/// Errors that can occur while converting a [`FieldValue`] into a typed value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValueError {
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("value {value} out of range for {target}")]
    OutOfRange { target: &'static str, value: String },

    #[error("invalid date: {0}")]
    InvalidDate(String),

    #[error("invalid {target} variant: {value}")]
    InvalidVariant { target: &'static str, value: String },
}

impl ValueError {
    /// Shorthand for a mismatch against the kind of `found`.
    pub fn mismatch(expected: &'static str, found: &FieldValue) -> Self {
        Self::TypeMismatch {
            expected,
            found: found.kind(),
        }
    }
}
