//! Flattening a serializer tree into a normalized document.
//!
//! Traversal is breadth-first over side-loaded resources with an explicit
//! visited set keyed by [`ResourceIdentity`]. Membership is checked before a
//! resource's fields or side loads are built, so an identity is encoded at most
//! once and the pass terminates after exactly as many encodes as there are
//! distinct reachable identities, whatever the shape of the graph. The first
//! instance of an identity to be dequeued wins.

use crate::builder::FieldBuilder;
use crate::config::ScribeConfig;
use crate::container::{DynamicKey, EncodingContainer};
use crate::context::SharedContext;
use crate::error::{ScribeError, ScribeResult};
use crate::serializer::{Serializable, Serializer};
use crate::sideload::Resource;
use apiscribe_types::{FieldMap, ResourceIdentity, StoreId};
use std::collections::{BTreeMap, HashSet, VecDeque};
use tracing::debug;

/// Resources of one store key, by store id.
pub type Collection = BTreeMap<StoreId, FieldMap>;

/// A primary pointer plus every resource reached from it, by store key.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedDocument {
    primary_key: String,
    primary: Option<ResourceIdentity>,
    resources: BTreeMap<String, Collection>,
}

impl NormalizedDocument {
    /// The root resource; `None` for documents encoded from many roots.
    #[must_use]
    pub fn primary(&self) -> Option<&ResourceIdentity> {
        self.primary.as_ref()
    }

    #[must_use]
    pub fn resources(&self) -> &BTreeMap<String, Collection> {
        &self.resources
    }

    #[must_use]
    pub fn collection(&self, store_key: &str) -> Option<&Collection> {
        self.resources.get(store_key)
    }

    #[must_use]
    pub fn resource(&self, store_key: &str, store_id: &str) -> Option<&FieldMap> {
        self.collection(store_key)
            .and_then(|collection| collection.get(store_id))
    }

    #[must_use]
    pub fn contains(&self, identity: &ResourceIdentity) -> bool {
        self.resource(identity.store_key(), identity.store_id().as_str())
            .is_some()
    }

    /// Number of resources across all collections.
    #[must_use]
    pub fn len(&self) -> usize {
        self.resources.values().map(BTreeMap::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Renders the document as a JSON object.
    #[must_use]
    pub fn to_value(&self) -> serde_json::Value {
        let mut root = serde_json::Map::new();
        if let Some(primary) = &self.primary {
            root.insert(
                self.primary_key.clone(),
                serde_json::json!([primary.store_key(), primary.store_id().as_str()]),
            );
        }
        for (store_key, collection) in &self.resources {
            let entries = collection
                .iter()
                .map(|(store_id, fields)| {
                    let fields = fields
                        .iter()
                        .map(|(key, value)| (key.clone(), serde_json::Value::from(value.clone())))
                        .collect();
                    (store_id.to_string(), serde_json::Value::Object(fields))
                })
                .collect();
            root.insert(store_key.clone(), serde_json::Value::Object(entries));
        }
        serde_json::Value::Object(root)
    }

    pub fn to_vec(&self) -> ScribeResult<Vec<u8>> {
        Ok(serde_json::to_vec(&self.to_value())?)
    }

    pub fn to_string_pretty(&self) -> ScribeResult<String> {
        Ok(serde_json::to_string_pretty(&self.to_value())?)
    }
}

/// Encodes the fields of a single serializer, without side loads.
pub fn encode_fields<S: Serializer>(serializer: &S) -> ScribeResult<FieldMap> {
    let mut fields = FieldMap::new();
    encode_fields_into(serializer, &mut fields)?;
    Ok(fields)
}

/// Encodes the active fields of `serializer` into any encoding container.
pub fn encode_fields_into<S, C>(serializer: &S, container: &mut C) -> ScribeResult<()>
where
    S: Serializer,
    C: EncodingContainer + ?Sized,
{
    let mut b = FieldBuilder::new(serializer.context().cloned());
    serializer.make_fields(&mut b)?;
    for field in b.into_fields() {
        if let Some((key, value)) = field.encode()? {
            container.encode_value(&key, value);
        }
    }
    Ok(())
}

/// Normalizes `serializer` and everything it side-loads.
pub fn encode<S: Serializer>(serializer: &S) -> ScribeResult<NormalizedDocument> {
    encode_with_config(serializer, &ScribeConfig::default())
}

pub fn encode_with_config<S: Serializer>(
    serializer: &S,
    config: &ScribeConfig,
) -> ScribeResult<NormalizedDocument> {
    config.validate()?;
    let root: &dyn Resource = serializer;
    let primary = root.identity();
    let mut pass = Normalizer::new(config);
    pass.push(Pending::Borrowed(root));
    let resources = pass.run()?;
    Ok(NormalizedDocument {
        primary_key: config.primary_key.clone(),
        primary: Some(primary),
        resources,
    })
}

/// Normalizes several roots into one document without a primary pointer.
///
/// All roots are queued before any side load, so a root's own fields win over
/// a side-loaded copy of the same identity.
pub fn encode_many<S, I>(serializers: I) -> ScribeResult<NormalizedDocument>
where
    S: Serializer,
    I: IntoIterator<Item = S>,
{
    encode_many_with_config(serializers, &ScribeConfig::default())
}

pub fn encode_many_with_config<S, I>(
    serializers: I,
    config: &ScribeConfig,
) -> ScribeResult<NormalizedDocument>
where
    S: Serializer,
    I: IntoIterator<Item = S>,
{
    config.validate()?;
    let mut pass = Normalizer::new(config);
    for serializer in serializers {
        pass.push(Pending::Owned(Box::new(serializer)));
    }
    let resources = pass.run()?;
    Ok(NormalizedDocument {
        primary_key: config.primary_key.clone(),
        primary: None,
        resources,
    })
}

/// Builds default serializers for `models` and normalizes them together.
pub fn encode_models<M, I>(
    models: I,
    context: Option<SharedContext>,
) -> ScribeResult<NormalizedDocument>
where
    M: Serializable,
    I: IntoIterator<Item = M>,
{
    encode_many(
        models
            .into_iter()
            .map(|model| model.make_serializer(context.clone())),
    )
}

enum Pending<'a> {
    Borrowed(&'a dyn Resource),
    Owned(Box<dyn Resource>),
}

impl Pending<'_> {
    fn resource(&self) -> &dyn Resource {
        match self {
            Pending::Borrowed(resource) => *resource,
            Pending::Owned(resource) => resource.as_ref(),
        }
    }
}

struct Normalizer<'a> {
    config: &'a ScribeConfig,
    queue: VecDeque<Pending<'a>>,
    visited: HashSet<ResourceIdentity>,
    resources: BTreeMap<String, Collection>,
}

impl<'a> Normalizer<'a> {
    fn new(config: &'a ScribeConfig) -> Self {
        Self {
            config,
            queue: VecDeque::new(),
            visited: HashSet::new(),
            resources: BTreeMap::new(),
        }
    }

    fn push(&mut self, pending: Pending<'a>) {
        self.queue.push_back(pending);
    }

    fn run(mut self) -> ScribeResult<BTreeMap<String, Collection>> {
        while let Some(pending) = self.queue.pop_front() {
            let resource = pending.resource();
            let identity = resource.identity();

            if self.visited.contains(&identity) {
                debug!(resource = %identity, "already visited, skipping");
                continue;
            }
            if let Some(limit) = self.config.max_resources {
                if self.visited.len() >= limit {
                    return Err(ScribeError::ResourceLimitExceeded { limit });
                }
            }
            self.check_store_key(identity.store_key())?;
            self.visited.insert(identity.clone());

            let fields = resource.encode_fields()?;
            let side_loads = resource.side_loads()?;
            debug!(
                resource = %identity,
                fields = fields.len(),
                side_loads = side_loads.len(),
                "encoded resource"
            );
            self.queue.extend(side_loads.into_iter().map(Pending::Owned));

            let (store_key, store_id) = identity.into_parts();
            self.resources
                .entry(store_key)
                .or_default()
                .insert(store_id, fields);
        }
        Ok(self.resources)
    }

    /// A store key becomes a top-level document key, so it must be a usable
    /// key and must not shadow the primary pointer.
    fn check_store_key(&self, store_key: &str) -> ScribeResult<()> {
        if store_key == self.config.primary_key {
            return Err(ScribeError::MalformedDocument(format!(
                "store key {store_key:?} collides with the primary key"
            )));
        }
        DynamicKey::new(store_key).map_err(|_| {
            ScribeError::MalformedDocument(format!("invalid store key {store_key:?}"))
        })?;
        Ok(())
    }
}
