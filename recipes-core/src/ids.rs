//! Type-safe document identifiers built on TypeIDs
//!
//! Document ids combine the uniqueness of UUIDs with a readable, per-collection
//! prefix, so an id can never be used against the wrong collection by accident:
//!
//! ```rust
//! use recipes_core::ids::RecipeId;
//!
//! let id = RecipeId::new();
//! println!("Recipe ID: {}", id); // e.g., "rcp_01h455vb4pex5vsknk084sn02q"
//! ```
//!
//! Ids use UUIDv7, so they sort by creation time.
//!
//! On the wire and in storage an id is its string form.

use mti::prelude::*;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::hash::Hash;
use std::marker::PhantomData;
use std::str::FromStr;

/// Marker for one family of ids, fixing its prefix
pub trait IdKind:
    fmt::Debug + Clone + Copy + PartialEq + Eq + PartialOrd + Ord + Hash + Default + Send + Sync + 'static
{
    /// The TypeID prefix, e.g. `rcp`
    const PREFIX: &'static str;
}

/// Marker for recipe ids (`rcp_…`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct RecipeKind;

impl IdKind for RecipeKind {
    const PREFIX: &'static str = "rcp";
}

/// Marker for user ids (`usr_…`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct UserKind;

impl IdKind for UserKind {
    const PREFIX: &'static str = "usr";
}

/// Marker for role ids (`rol_…`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct RoleKind;

impl IdKind for RoleKind {
    const PREFIX: &'static str = "rol";
}

/// Identifier of a recipe document
pub type RecipeId = TypedId<RecipeKind>;

/// Identifier of a user document
pub type UserId = TypedId<UserKind>;

/// Identifier of a role document
pub type RoleId = TypedId<RoleKind>;

/// A prefixed, time-sortable document identifier
///
/// # Format
///
/// `<prefix>_<base32-encoded-uuidv7>`, e.g. `rcp_01h455vb4pex5vsknk084sn02q`
///
/// # Example
///
/// ```rust
/// use recipes_core::ids::UserId;
/// use std::str::FromStr;
///
/// let id = UserId::new();
/// assert!(id.as_str().starts_with("usr_"));
///
/// let parsed = UserId::from_str("usr_01h455vb4pex5vsknk084sn02q").unwrap();
/// assert_eq!(parsed.prefix(), "usr");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TypedId<K: IdKind> {
    id: MagicTypeId,
    kind: PhantomData<K>,
}

impl<K: IdKind> TypedId<K> {
    /// Creates a new id with a UUIDv7 (time-sortable).
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: K::PREFIX.create_type_id::<V7>(),
            kind: PhantomData,
        }
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.id.as_str()
    }

    /// Returns the prefix portion of the id.
    #[must_use]
    pub fn prefix(&self) -> &str {
        self.id.prefix().as_str()
    }
}

impl<K: IdKind> Default for TypedId<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: IdKind> fmt::Display for TypedId<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

impl<K: IdKind> FromStr for TypedId<K> {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id = MagicTypeId::from_str(s).map_err(IdError::Parse)?;

        if id.prefix().as_str() != K::PREFIX {
            return Err(IdError::InvalidPrefix {
                expected: K::PREFIX.to_string(),
                actual: id.prefix().as_str().to_string(),
            });
        }

        Ok(Self {
            id,
            kind: PhantomData,
        })
    }
}

impl<K: IdKind> AsRef<str> for TypedId<K> {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl<K: IdKind> From<TypedId<K>> for String {
    fn from(id: TypedId<K>) -> Self {
        id.id.to_string()
    }
}

impl<K: IdKind> Serialize for TypedId<K> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de, K: IdKind> Deserialize<'de> for TypedId<K> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::from_str(&raw).map_err(serde::de::Error::custom)
    }
}

/// Error type for id parsing.
#[derive(Debug, thiserror::Error)]
pub enum IdError {
    /// The id could not be parsed as a valid TypeID.
    #[error("failed to parse id: {0}")]
    Parse(#[from] MagicTypeIdError),

    /// The prefix was not the expected value.
    #[error("invalid prefix: expected '{expected}', got '{actual}'")]
    InvalidPrefix {
        /// The expected prefix.
        expected: String,
        /// The actual prefix found.
        actual: String,
    },
}
