//! A single named encode/decode unit.

use crate::container::DynamicKey;
use crate::error::ScribeResult;
use apiscribe_types::FieldValue;
use tracing::trace;

/// Produces the encoded value of a field.
pub(crate) type EncodeFn = Box<dyn FnOnce() -> ScribeResult<FieldValue>>;

/// Mutation staged by a successful decode, applied once every field decoded.
pub(crate) type ApplyFn<S> = Box<dyn FnOnce(&mut S)>;

/// Converts a present input value into a staged mutation.
///
/// `Ok(None)` means the value was an explicit null for a target with no
/// cleared state, so nothing is applied.
pub(crate) type DecodeFn<S> = Box<dyn FnOnce(FieldValue) -> ScribeResult<Option<ApplyFn<S>>>>;

/// One field of a serializer, built fresh for every encode or decode pass.
///
/// A field without an encoder is write-only, one without a decoder is
/// read-only. The `when` flags gate whether the field is touched at all: a
/// field gated off is never written on encode and its key is never read on
/// decode.
pub struct Field<S> {
    key: DynamicKey,
    encode: Option<EncodeFn>,
    decode: Option<DecodeFn<S>>,
    encode_when: bool,
    decode_when: bool,
    references_embedded_model: bool,
}

impl<S> Field<S> {
    pub(crate) fn new(
        key: DynamicKey,
        encode: Option<EncodeFn>,
        decode: Option<DecodeFn<S>>,
        references_embedded_model: bool,
    ) -> Self {
        Self {
            key,
            encode,
            decode,
            encode_when: true,
            decode_when: true,
            references_embedded_model,
        }
    }

    /// Gates encoding of this field.
    pub fn encode_when(&mut self, condition: bool) -> &mut Self {
        self.encode_when = condition;
        self
    }

    /// Gates decoding of this field.
    pub fn decode_when(&mut self, condition: bool) -> &mut Self {
        self.decode_when = condition;
        self
    }

    #[must_use]
    pub fn key(&self) -> &DynamicKey {
        &self.key
    }

    #[must_use]
    pub fn is_read_only(&self) -> bool {
        self.decode.is_none()
    }

    #[must_use]
    pub fn is_write_only(&self) -> bool {
        self.encode.is_none()
    }

    /// True for embedded-resource fields, whose value is a nested serializer.
    #[must_use]
    pub fn references_embedded_model(&self) -> bool {
        self.references_embedded_model
    }

    /// Whether an encode pass writes this field.
    #[must_use]
    pub fn encodes(&self) -> bool {
        self.encode_when && self.encode.is_some()
    }

    /// Whether a decode pass reads this field.
    #[must_use]
    pub fn decodes(&self) -> bool {
        self.decode_when && self.decode.is_some()
    }

    /// Runs the encoder if the field is active for encoding.
    pub(crate) fn encode(self) -> ScribeResult<Option<(DynamicKey, FieldValue)>> {
        match self.encode {
            Some(encode) if self.encode_when => Ok(Some((self.key, encode()?))),
            Some(_) => {
                trace!(key = %self.key, "encode gated off");
                Ok(None)
            }
            None => Ok(None),
        }
    }

    /// Splits out the decoder if the field is active for decoding.
    pub(crate) fn into_decoder(self) -> Option<(DynamicKey, DecodeFn<S>)> {
        match self.decode {
            Some(decode) if self.decode_when => Some((self.key, decode)),
            Some(_) => {
                trace!(key = %self.key, "decode gated off");
                None
            }
            None => None,
        }
    }
}

impl<S> std::fmt::Debug for Field<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Field")
            .field("key", &self.key)
            .field("encodes", &self.encodes())
            .field("decodes", &self.decodes())
            .field("references_embedded_model", &self.references_embedded_model)
            .finish()
    }
}
