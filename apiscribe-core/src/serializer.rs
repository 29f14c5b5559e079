//! The serializer contract.
//!
//! A serializer binds one model value to a field list, a store key shared by
//! every instance of the type, and a store id for the instance. It has no
//! state across calls: each encode or decode builds its fields again from the
//! current model.

use crate::builder::FieldBuilder;
use crate::context::SharedContext;
use crate::decode::{decode_into, decode_slice_into};
use crate::error::ScribeResult;
use crate::normalize::{NormalizedDocument, encode, encode_fields};
use crate::sideload::SideLoadedResourceBuilder;
use apiscribe_types::{FieldMap, ResourceIdentity, StoreId};

/// Binds a model type to its fields, store key and side loads.
///
/// `STORE_KEY` names the top-level collection the resource lands in and must
/// be a valid key distinct from the configured primary key.
pub trait Serializer: Sized + 'static {
    type Model: 'static;

    /// Collection name of this resource type in a normalized document.
    const STORE_KEY: &'static str;

    /// Binds a serializer to an existing model, for encoding or for decoding
    /// into that model.
    fn from_model(model: Self::Model, context: Option<SharedContext>) -> Self;

    fn model(&self) -> &Self::Model;

    fn model_mut(&mut self) -> &mut Self::Model;

    fn into_model(self) -> Self::Model;

    fn context(&self) -> Option<&SharedContext>;

    fn set_context(&mut self, context: Option<SharedContext>);

    /// Identity of the bound model, unique within [`Self::STORE_KEY`].
    fn store_id(&self) -> StoreId;

    /// Declares the fields of this resource.
    fn make_fields(&self, b: &mut FieldBuilder<Self>) -> ScribeResult<()>;

    /// Declares related resources flattened into the document next to this one.
    fn side_load_resources(&self, b: &mut SideLoadedResourceBuilder) -> ScribeResult<()> {
        let _ = b;
        Ok(())
    }

    fn identity(&self) -> ResourceIdentity {
        ResourceIdentity::new(Self::STORE_KEY, self.store_id())
    }
}

/// Models that know which serializer represents them.
pub trait Serializable: Sized + 'static {
    type Serializer: Serializer<Model = Self>;

    /// Builds the serializer for this model.
    ///
    /// Override to derive serializer flags from the context.
    fn make_serializer(self, context: Option<SharedContext>) -> Self::Serializer {
        Self::Serializer::from_model(self, context)
    }
}

/// Method-call forms of the free encode and decode functions.
pub trait SerializerExt: Serializer {
    /// Normalizes this resource and everything it side-loads.
    fn encode(&self) -> ScribeResult<NormalizedDocument> {
        encode(self)
    }

    fn encode_to_value(&self) -> ScribeResult<serde_json::Value> {
        encode(self).map(|document| document.to_value())
    }

    /// Encodes and renders the document as JSON bytes.
    fn encode_to_vec(&self) -> ScribeResult<Vec<u8>> {
        encode(self)?.to_vec()
    }

    /// Encodes just this resource's fields, without side loads.
    fn encode_fields(&self) -> ScribeResult<FieldMap> {
        encode_fields(self)
    }

    /// Decodes `bytes` into the bound model and returns the serializer.
    fn decode_slice(mut self, bytes: &[u8]) -> ScribeResult<Self> {
        decode_slice_into(&mut self, bytes)?;
        Ok(self)
    }

    /// Decodes `bytes` into the bound model and returns the model.
    fn decode_model(self, bytes: &[u8]) -> ScribeResult<Self::Model> {
        self.decode_slice(bytes).map(Serializer::into_model)
    }

    /// Decodes an already-parsed container into the bound model.
    fn decode_fields(&mut self, fields: &FieldMap) -> ScribeResult<()> {
        decode_into(self, fields)
    }
}

impl<S: Serializer> SerializerExt for S {}
