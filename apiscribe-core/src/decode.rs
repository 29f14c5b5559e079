//! Decoding input into serializers.
//!
//! Decoding runs in two phases. Every active field whose key is present is
//! converted first; only when all of them succeeded are the staged setters
//! applied, in declaration order. A failed decode therefore leaves the model
//! exactly as it was.

use crate::builder::FieldBuilder;
use crate::container::DecodingContainer;
use crate::context::SharedContext;
use crate::error::{ScribeError, ScribeResult};
use crate::serializer::Serializer;
use apiscribe_types::{FieldMap, FieldValue};
use tracing::trace;

/// Decodes `container` into the model bound to `serializer`.
///
/// Keys absent from the container leave their fields untouched; an explicit
/// null clears optional targets.
pub fn decode_into<S, C>(serializer: &mut S, container: &C) -> ScribeResult<()>
where
    S: Serializer,
    C: DecodingContainer + ?Sized,
{
    let mut b = FieldBuilder::new(serializer.context().cloned());
    serializer.make_fields(&mut b)?;

    let mut staged = Vec::new();
    for field in b.into_fields() {
        let Some((key, decode)) = field.into_decoder() else {
            continue;
        };
        let Some(value) = container.decode_value(&key) else {
            trace!(key = %key, "absent from input");
            continue;
        };
        if let Some(apply) = decode(value)? {
            staged.push(apply);
        }
    }

    for apply in staged {
        apply(serializer);
    }
    Ok(())
}

/// Parses `bytes` as a JSON object and decodes it into `serializer`.
pub fn decode_slice_into<S: Serializer>(serializer: &mut S, bytes: &[u8]) -> ScribeResult<()> {
    let fields = parse_object(bytes)?;
    decode_into(serializer, &fields)
}

/// Decodes `bytes` into a fresh default model and returns the serializer.
///
/// Side-channel properties set by write-only fields stay readable on the
/// returned serializer.
pub fn decode_serializer<S>(bytes: &[u8], context: Option<SharedContext>) -> ScribeResult<S>
where
    S: Serializer,
    S::Model: Default,
{
    let mut serializer = S::from_model(S::Model::default(), context);
    decode_slice_into(&mut serializer, bytes)?;
    Ok(serializer)
}

/// Decodes `bytes` into a fresh default model.
pub fn decode<S>(bytes: &[u8], context: Option<SharedContext>) -> ScribeResult<S::Model>
where
    S: Serializer,
    S::Model: Default,
{
    decode_serializer::<S>(bytes, context).map(Serializer::into_model)
}

/// Parses bytes into the keyed container decoding runs on.
pub(crate) fn parse_object(bytes: &[u8]) -> ScribeResult<FieldMap> {
    let value: serde_json::Value =
        serde_json::from_slice(bytes).map_err(|e| ScribeError::MalformedInput(e.to_string()))?;
    match FieldValue::from(value) {
        FieldValue::Object(fields) => Ok(fields),
        other => Err(ScribeError::MalformedInput(format!(
            "expected an object, found {}",
            other.kind()
        ))),
    }
}
