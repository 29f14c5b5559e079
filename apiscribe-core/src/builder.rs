//! Accumulates the fields one serializer declares for one pass.

use crate::container::DynamicKey;
use crate::context::SharedContext;
use crate::decode::decode_into;
use crate::error::{ScribeError, ScribeResult};
use crate::field::{ApplyFn, DecodeFn, EncodeFn, Field};
use crate::normalize::encode_fields;
use crate::serializer::{Serializable, Serializer};
use apiscribe_types::{FieldValue, FromFieldValue, IntoFieldValue, ValueError, from_nullable};

/// Per-instance accumulator handed to [`Serializer::make_fields`].
///
/// Each constructor validates its key, records the encode and decode halves
/// of the field, and returns the new [`Field`] so the caller can gate it:
///
/// ```ignore
/// b.field("age", self.model.age, |s, v| s.model.age = v)?
///     .encode_when(self.model.age > 10)
///     .decode_when(self.should_decode_age);
/// ```
///
/// Setters receive the serializer itself, so they can write either the model
/// or a side-channel property of the serializer. They run only after every
/// active field decoded successfully.
pub struct FieldBuilder<S> {
    context: Option<SharedContext>,
    fields: Vec<Field<S>>,
}

impl<S: 'static> FieldBuilder<S> {
    /// Creates an empty builder whose nested serializers inherit `context`.
    ///
    /// The engine creates one per pass; building one by hand is only useful to
    /// inspect what a serializer declares.
    pub fn new(context: Option<SharedContext>) -> Self {
        Self {
            context,
            fields: Vec::new(),
        }
    }

    /// The context nested serializers built by this builder inherit.
    #[must_use]
    pub fn context(&self) -> Option<&SharedContext> {
        self.context.as_ref()
    }

    #[must_use]
    pub fn fields(&self) -> &[Field<S>] {
        &self.fields
    }

    /// Returns the most recently declared field named `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Field<S>> {
        self.fields.iter().rev().find(|f| f.key().as_str() == key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub(crate) fn into_fields(self) -> Vec<Field<S>> {
        self.fields
    }

    /// Read-write field: encodes `value`, decodes through `setter`.
    pub fn field<V, F>(&mut self, key: &str, value: V, setter: F) -> ScribeResult<&mut Field<S>>
    where
        V: IntoFieldValue + FromFieldValue + 'static,
        F: FnOnce(&mut S, V) + 'static,
    {
        let key = DynamicKey::new(key)?;
        let decode = value_decoder(&key, setter);
        Ok(self.push(Field::new(key, Some(value_encoder(value)), Some(decode), false)))
    }

    /// Encode-only field; input under this key is ignored.
    pub fn read_only<V>(&mut self, key: &str, value: V) -> ScribeResult<&mut Field<S>>
    where
        V: IntoFieldValue + 'static,
    {
        let key = DynamicKey::new(key)?;
        Ok(self.push(Field::new(key, Some(value_encoder(value)), None, false)))
    }

    /// Decode-only field; never appears in encoded output.
    pub fn write_only<V, F>(&mut self, key: &str, setter: F) -> ScribeResult<&mut Field<S>>
    where
        V: FromFieldValue + 'static,
        F: FnOnce(&mut S, V) + 'static,
    {
        let key = DynamicKey::new(key)?;
        let decode = value_decoder(&key, setter);
        Ok(self.push(Field::new(key, None, Some(decode), false)))
    }

    /// Related model nested inline under `key`.
    ///
    /// Encodes `related` with its own serializer in this builder's context
    /// (null when absent). Decodes a nested object with a fresh serializer for
    /// `M`, also in this builder's context, and hands the model to `setter`;
    /// an explicit null hands `None`.
    pub fn embedded_resource<M, F>(
        &mut self,
        key: &str,
        related: Option<M>,
        setter: F,
    ) -> ScribeResult<&mut Field<S>>
    where
        M: Serializable + Default,
        F: FnOnce(&mut S, Option<M>) + 'static,
    {
        let key = DynamicKey::new(key)?;
        let context = self.context.clone();
        let encode: EncodeFn = Box::new(move || match related {
            Some(model) => encode_fields(&model.make_serializer(context)).map(FieldValue::Object),
            None => Ok(FieldValue::Null),
        });
        let decode = embedded_decoder(
            &key,
            self.context.clone(),
            |context| M::default().make_serializer(context),
            setter,
        );
        Ok(self.push(Field::new(key, Some(encode), Some(decode), true)))
    }

    /// Decode-only embedded resource decoded with serializer `R`.
    ///
    /// Nothing is written under `key` on encode.
    pub fn write_only_embedded_resource<R, F>(
        &mut self,
        key: &str,
        setter: F,
    ) -> ScribeResult<&mut Field<S>>
    where
        R: Serializer,
        R::Model: Default,
        F: FnOnce(&mut S, Option<R::Model>) + 'static,
    {
        let key = DynamicKey::new(key)?;
        let decode = embedded_decoder(
            &key,
            self.context.clone(),
            |context| R::from_model(R::Model::default(), context),
            setter,
        );
        Ok(self.push(Field::new(key, None, Some(decode), true)))
    }

    fn push(&mut self, field: Field<S>) -> &mut Field<S> {
        let index = self.fields.len();
        self.fields.push(field);
        &mut self.fields[index]
    }
}

fn value_encoder<V>(value: V) -> EncodeFn
where
    V: IntoFieldValue + 'static,
{
    Box::new(move || Ok(value.into_field_value()))
}

fn value_decoder<S, V, F>(key: &DynamicKey, setter: F) -> DecodeFn<S>
where
    S: 'static,
    V: FromFieldValue + 'static,
    F: FnOnce(&mut S, V) + 'static,
{
    let key = key.as_str().to_string();
    Box::new(move |value: FieldValue| -> ScribeResult<Option<ApplyFn<S>>> {
        let decoded = from_nullable::<V>(value)
            .map_err(|source| ScribeError::TypeMismatch { key, source })?;
        Ok(decoded.map(|v| Box::new(move |s: &mut S| setter(s, v)) as ApplyFn<S>))
    })
}

fn embedded_decoder<S, R, G, F>(
    key: &DynamicKey,
    context: Option<SharedContext>,
    make: G,
    setter: F,
) -> DecodeFn<S>
where
    S: 'static,
    R: Serializer,
    G: FnOnce(Option<SharedContext>) -> R + 'static,
    F: FnOnce(&mut S, Option<R::Model>) + 'static,
{
    let key = key.as_str().to_string();
    Box::new(move |value: FieldValue| -> ScribeResult<Option<ApplyFn<S>>> {
        let related = match value {
            FieldValue::Null => None,
            FieldValue::Object(map) => {
                let mut child = make(context);
                decode_into(&mut child, &map)?;
                Some(child.into_model())
            }
            other => {
                return Err(ScribeError::TypeMismatch {
                    key,
                    source: ValueError::mismatch("object", &other),
                });
            }
        };
        Ok(Some(Box::new(move |s: &mut S| setter(s, related)) as ApplyFn<S>))
    })
}
