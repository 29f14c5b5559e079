//! Explicit store-key registry for decoding normalized documents.
//!
//! Registration is per registry value, never process-wide: callers build the
//! registry they need and pass it to the decode call.

use crate::config::{ScribeConfig, UnknownStoreKeyPolicy};
use crate::context::SharedContext;
use crate::decode::{decode_into, parse_object};
use crate::error::{ScribeError, ScribeResult};
use crate::serializer::Serializer;
use apiscribe_types::{FieldMap, FieldValue, ResourceIdentity, StoreId};
use std::any::Any;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, warn};

type DecodedModel = Box<dyn Any + Send>;

type DecodeFactory =
    Box<dyn Fn(&FieldMap, Option<SharedContext>) -> ScribeResult<DecodedModel> + Send + Sync>;

/// Maps store keys to the serializers that decode their collections.
#[derive(Default)]
pub struct SerializerRegistry {
    factories: HashMap<&'static str, DecodeFactory>,
}

impl SerializerRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `S` as the decoder for `S::STORE_KEY`, replacing any
    /// earlier registration for that key.
    pub fn register<S>(&mut self) -> &mut Self
    where
        S: Serializer,
        S::Model: Default + Send,
    {
        let factory: DecodeFactory = Box::new(
            |fields: &FieldMap, context: Option<SharedContext>| -> ScribeResult<DecodedModel> {
                let mut serializer = S::from_model(S::Model::default(), context);
                decode_into(&mut serializer, fields)?;
                let model: DecodedModel = Box::new(serializer.into_model());
                Ok(model)
            },
        );
        self.factories.insert(S::STORE_KEY, factory);
        self
    }

    #[must_use]
    pub fn contains(&self, store_key: &str) -> bool {
        self.factories.contains_key(store_key)
    }

    /// Decodes every resource of a normalized document.
    pub fn decode_document(
        &self,
        bytes: &[u8],
        context: Option<SharedContext>,
    ) -> ScribeResult<DecodedDocument> {
        self.decode_document_with_config(bytes, context, &ScribeConfig::default())
    }

    pub fn decode_document_with_config(
        &self,
        bytes: &[u8],
        context: Option<SharedContext>,
        config: &ScribeConfig,
    ) -> ScribeResult<DecodedDocument> {
        config.validate()?;
        let mut root = parse_object(bytes)?;

        let primary = match root.remove(&config.primary_key) {
            Some(pointer) => Some(parse_primary(pointer)?),
            None => None,
        };

        let mut models = BTreeMap::new();
        for (store_key, collection) in root {
            let Some(factory) = self.factories.get(store_key.as_str()) else {
                match config.unknown_store_keys {
                    UnknownStoreKeyPolicy::Reject => {
                        return Err(ScribeError::UnknownStoreKey(store_key));
                    }
                    UnknownStoreKeyPolicy::Ignore => {
                        warn!(store_key = %store_key, "ignoring unregistered collection");
                        continue;
                    }
                }
            };
            let FieldValue::Object(collection) = collection else {
                return Err(ScribeError::MalformedDocument(format!(
                    "collection '{store_key}' is a {}, expected an object",
                    collection.kind()
                )));
            };
            for (store_id, fields) in collection {
                let FieldValue::Object(fields) = fields else {
                    return Err(ScribeError::MalformedDocument(format!(
                        "resource '{store_key}:{store_id}' is a {}, expected an object",
                        fields.kind()
                    )));
                };
                let model = factory(&fields, context.clone())?;
                models.insert(ResourceIdentity::new(store_key.clone(), store_id), model);
            }
            debug!(store_key = %store_key, "decoded collection");
        }

        if let Some(primary) = &primary {
            if !models.contains_key(primary) {
                return Err(ScribeError::MalformedDocument(format!(
                    "primary resource {primary} is not in the document"
                )));
            }
        }

        Ok(DecodedDocument { primary, models })
    }
}

impl std::fmt::Debug for SerializerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut keys: Vec<_> = self.factories.keys().collect();
        keys.sort();
        f.debug_struct("SerializerRegistry")
            .field("store_keys", &keys)
            .finish()
    }
}

fn parse_primary(pointer: FieldValue) -> ScribeResult<ResourceIdentity> {
    match pointer {
        FieldValue::Array(parts) => match <[FieldValue; 2]>::try_from(parts) {
            Ok([FieldValue::String(store_key), FieldValue::String(store_id)]) => {
                Ok(ResourceIdentity::new(store_key, store_id))
            }
            _ => Err(ScribeError::MalformedDocument(
                "primary pointer must be [store key, store id] strings".to_string(),
            )),
        },
        other => Err(ScribeError::MalformedDocument(format!(
            "primary pointer is a {}, expected an array",
            other.kind()
        ))),
    }
}

/// Models decoded from a normalized document, by identity.
pub struct DecodedDocument {
    primary: Option<ResourceIdentity>,
    models: BTreeMap<ResourceIdentity, DecodedModel>,
}

impl DecodedDocument {
    #[must_use]
    pub fn primary_identity(&self) -> Option<&ResourceIdentity> {
        self.primary.as_ref()
    }

    /// The primary model, if the document has one of type `M`.
    #[must_use]
    pub fn primary<M: 'static>(&self) -> Option<&M> {
        let primary = self.primary.as_ref()?;
        self.models.get(primary)?.downcast_ref::<M>()
    }

    #[must_use]
    pub fn get<M: 'static>(&self, store_key: &str, store_id: impl Into<StoreId>) -> Option<&M> {
        self.models
            .get(&ResourceIdentity::new(store_key, store_id))?
            .downcast_ref::<M>()
    }

    /// Removes and returns a model; a type mismatch leaves it in place.
    pub fn take<M: 'static>(&mut self, store_key: &str, store_id: impl Into<StoreId>) -> Option<M> {
        let identity = ResourceIdentity::new(store_key, store_id);
        if !self.models.get(&identity)?.is::<M>() {
            return None;
        }
        let model = self.models.remove(&identity)?;
        model.downcast::<M>().ok().map(|model| *model)
    }

    /// Every model of type `M` in collection `store_key`, by store id.
    pub fn collection<'a, M: 'static>(
        &'a self,
        store_key: &'a str,
    ) -> impl Iterator<Item = (&'a StoreId, &'a M)> + 'a {
        self.models
            .iter()
            .filter(move |(identity, _)| identity.store_key() == store_key)
            .filter_map(|(identity, model)| {
                model
                    .downcast_ref::<M>()
                    .map(|model| (identity.store_id(), model))
            })
    }

    pub fn identities(&self) -> impl Iterator<Item = &ResourceIdentity> {
        self.models.keys()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.models.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

impl std::fmt::Debug for DecodedDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecodedDocument")
            .field("primary", &self.primary)
            .field("identities", &self.models.keys().collect::<Vec<_>>())
            .finish()
    }
}
