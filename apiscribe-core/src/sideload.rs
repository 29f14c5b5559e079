//! Declaration of side-loaded resources.

use crate::context::SharedContext;
use crate::error::ScribeResult;
use crate::normalize::encode_fields;
use crate::serializer::{Serializable, Serializer};
use apiscribe_types::{FieldMap, ResourceIdentity};

/// A serializer with its type erased, as the normalization queue holds it.
pub(crate) trait Resource {
    fn identity(&self) -> ResourceIdentity;

    fn encode_fields(&self) -> ScribeResult<FieldMap>;

    fn side_loads(&self) -> ScribeResult<Vec<Box<dyn Resource>>>;
}

impl<S: Serializer> Resource for S {
    fn identity(&self) -> ResourceIdentity {
        Serializer::identity(self)
    }

    fn encode_fields(&self) -> ScribeResult<FieldMap> {
        encode_fields(self)
    }

    fn side_loads(&self) -> ScribeResult<Vec<Box<dyn Resource>>> {
        let mut b = SideLoadedResourceBuilder::new(self.context().cloned());
        self.side_load_resources(&mut b)?;
        Ok(b.into_resources())
    }
}

/// Collects the related resources a serializer wants flattened next to it.
///
/// Models added here get their serializer built in the declaring
/// serializer's context.
pub struct SideLoadedResourceBuilder {
    context: Option<SharedContext>,
    resources: Vec<Box<dyn Resource>>,
}

impl SideLoadedResourceBuilder {
    pub(crate) fn new(context: Option<SharedContext>) -> Self {
        Self {
            context,
            resources: Vec::new(),
        }
    }

    #[must_use]
    pub fn context(&self) -> Option<&SharedContext> {
        self.context.as_ref()
    }

    /// Side-loads a model with its default serializer.
    pub fn add<M: Serializable>(&mut self, model: M) -> &mut Self {
        let serializer = model.make_serializer(self.context.clone());
        self.resources.push(Box::new(serializer));
        self
    }

    /// Side-loads every model of an iterator, in order.
    pub fn add_all<M, I>(&mut self, models: I) -> &mut Self
    where
        M: Serializable,
        I: IntoIterator<Item = M>,
    {
        for model in models {
            self.add(model);
        }
        self
    }

    /// Side-loads a configured serializer.
    ///
    /// A serializer without its own context inherits this builder's.
    pub fn add_serializer<S: Serializer>(&mut self, mut serializer: S) -> &mut Self {
        if serializer.context().is_none() {
            serializer.set_context(self.context.clone());
        }
        self.resources.push(Box::new(serializer));
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    pub(crate) fn into_resources(self) -> Vec<Box<dyn Resource>> {
        self.resources
    }
}
