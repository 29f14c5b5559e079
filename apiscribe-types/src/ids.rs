//! Identity types for resources in a normalized document.
//!
//! A resource is identified by its serializer's store key (the collection it
//! lands in) and a store id that is unique within that collection.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Per-instance identity of a resource, unique within its store key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StoreId(String);

impl StoreId {
    /// Creates a store id from anything string-like.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the id, returning the owned string.
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for StoreId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for StoreId {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl AsRef<str> for StoreId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for StoreId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<String> for StoreId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for StoreId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<Uuid> for StoreId {
    fn from(id: Uuid) -> Self {
        Self(id.to_string())
    }
}

macro_rules! store_id_from_integer {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for StoreId {
                fn from(id: $ty) -> Self {
                    Self(id.to_string())
                }
            }
        )*
    };
}

store_id_from_integer!(i32, i64, u32, u64, usize);

/// The `(store key, store id)` pair that deduplicates resources.
///
/// Serializes as a two-element array, which is also the shape of the
/// primary pointer in a normalized document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "(String, StoreId)", into = "(String, StoreId)")]
pub struct ResourceIdentity {
    store_key: String,
    store_id: StoreId,
}

impl ResourceIdentity {
    #[must_use]
    pub fn new(store_key: impl Into<String>, store_id: impl Into<StoreId>) -> Self {
        Self {
            store_key: store_key.into(),
            store_id: store_id.into(),
        }
    }

    #[must_use]
    pub fn store_key(&self) -> &str {
        &self.store_key
    }

    #[must_use]
    pub fn store_id(&self) -> &StoreId {
        &self.store_id
    }

    /// Splits the identity into its parts.
    #[must_use]
    pub fn into_parts(self) -> (String, StoreId) {
        (self.store_key, self.store_id)
    }
}

impl fmt::Display for ResourceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.store_key, self.store_id)
    }
}

impl From<(String, StoreId)> for ResourceIdentity {
    fn from((store_key, store_id): (String, StoreId)) -> Self {
        Self {
            store_key,
            store_id,
        }
    }
}

impl From<ResourceIdentity> for (String, StoreId) {
    fn from(identity: ResourceIdentity) -> Self {
        identity.into_parts()
    }
}
