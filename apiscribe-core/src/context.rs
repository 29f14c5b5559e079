//! Request-scoped context propagated through a serializer tree.
//!
//! A context is any `Send + Sync` value tagged with [`Context`]. The engine
//! only ever clones the [`SharedContext`] handle; serializers that care about
//! a particular context type recover it with [`SharedContext::downcast_ref`].

use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Marker for values that can travel as serializer context.
pub trait Context: Any + Send + Sync + fmt::Debug {}

/// Shared, read-only handle to a [`Context`].
///
/// Cloning shares the same value; every nested, embedded or side-loaded
/// serializer built from a parent sees the parent's context unless it is
/// given another one explicitly.
#[derive(Clone)]
pub struct SharedContext(Arc<dyn Context>);

impl SharedContext {
    pub fn new<C: Context>(context: C) -> Self {
        Self(Arc::new(context))
    }

    /// Returns the context as `C` if that is its concrete type.
    #[must_use]
    pub fn downcast_ref<C: Context>(&self) -> Option<&C> {
        let any: &dyn Any = self.0.as_ref();
        any.downcast_ref::<C>()
    }

    #[must_use]
    pub fn is<C: Context>(&self) -> bool {
        self.downcast_ref::<C>().is_some()
    }

    /// True when both handles share one context value.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for SharedContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SharedContext").field(&self.0).finish()
    }
}
