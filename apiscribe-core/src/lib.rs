//! Field-level serializers with side-loaded resource normalization.
//!
//! A [`Serializer`] declares its fields through a [`FieldBuilder`], each with its
//! own encode and decode policy, and may declare related resources through a
//! [`SideLoadedResourceBuilder`]. Encoding walks those declarations
//! breadth-first and flattens them into a [`NormalizedDocument`]:
//!
//! ```text
//! {
//!   "_primary": ["pet", "4"],
//!   "pet": { "4": { "name": "Rover", ... } },
//!   "kid": { "1": { ... }, "2": { ... } }
//! }
//! ```
//!
//! where every `(store key, store id)` pair appears exactly once, however many
//! times and however cyclically it is referenced. Decoding applies an input
//! object field by field onto an existing or fresh model: absent keys leave
//! fields untouched, explicit null clears them.
//!
//! - Per-field encode/decode policy ([`Field`], [`FieldBuilder`])
//! - Request-scoped flags inherited by nested serializers ([`Context`], [`SharedContext`])
//! - The contract a resource type implements ([`Serializer`], [`Serializable`])
//! - Normalization ([`encode`], [`encode_many`])
//! - Field-wise decoding ([`decode_into`], [`decode_serializer`], [`decode`])
//! - Decoding a whole normalized document back into models ([`SerializerRegistry`])

mod builder;
mod config;
mod container;
mod context;
mod decode;
mod error;
mod field;
mod normalize;
mod registry;
mod serializer;
mod sideload;

pub use builder::FieldBuilder;
pub use config::{ScribeConfig, UnknownStoreKeyPolicy};
pub use container::{DecodingContainer, DynamicKey, EncodingContainer};
pub use context::{Context, SharedContext};
pub use decode::{decode, decode_into, decode_serializer, decode_slice_into};
pub use error::{ScribeError, ScribeResult};
pub use field::Field;
pub use normalize::{
    Collection, NormalizedDocument, encode, encode_fields, encode_fields_into, encode_many,
    encode_many_with_config, encode_models, encode_with_config,
};
pub use registry::{DecodedDocument, SerializerRegistry};
pub use serializer::{Serializable, Serializer, SerializerExt};
pub use sideload::SideLoadedResourceBuilder;

pub use apiscribe_types::{
    FieldMap, FieldValue, FromFieldValue, IntoFieldValue, ResourceIdentity, StoreId, ValueError,
};
