//! Merged id space over a primary collection and an optional migrated one.
//!
//! Entries of both collections are addressed by a single signed
//! [`UniversalId`]. Non-negative ids are native local ids of the primary
//! collection; negative ids belong to the secondary ("migrated") collection
//! and are shifted down by [`SERVER_MAX_LOCAL_ID`], so every secondary entry
//! sorts strictly before every primary entry.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Signed, totally ordered address of an entry in the merged space.
pub type UniversalId = i64;

/// Native id of an entry inside its own collection.
pub type LocalId = i64;

/// Upper bound (exclusive) for local ids handed out by the server.
pub const SERVER_MAX_LOCAL_ID: LocalId = 1 << 56;

/// Focal id meaning "unset": the window is anchored at the newest entry.
pub const DEFAULT_AROUND_ID: UniversalId = SERVER_MAX_LOCAL_ID - 1;

/// Identifier of an ordered collection (a conversation).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CollectionId(pub u64);

impl fmt::Display for CollectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "collection#{}", self.0)
    }
}

/// Globally unique entry address: collection plus local id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FullId {
    pub collection: CollectionId,
    pub local: LocalId,
}

impl FullId {
    pub fn new(collection: CollectionId, local: LocalId) -> Self {
        Self { collection, local }
    }
}

/// Key the data source uses to center and serve a slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SliceKey {
    pub primary: CollectionId,
    pub secondary: Option<CollectionId>,
    pub universal_id: UniversalId,
}

/// Maps between universal ids and `(collection, local id)` pairs.
///
/// The mapping is pure arithmetic, so it can be reversed without consulting
/// any loaded data.
///
/// # Example
///
/// ```
/// use media_viewer_core::{CollectionId, FullId, IdSpace, SERVER_MAX_LOCAL_ID};
///
/// let space = IdSpace::new(CollectionId(10), Some(CollectionId(7)));
///
/// let migrated = FullId::new(CollectionId(7), 42);
/// let universal = space.to_universal(migrated).unwrap();
/// assert_eq!(universal, 42 - SERVER_MAX_LOCAL_ID);
/// assert_eq!(space.to_full_id(universal), migrated);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdSpace {
    primary: CollectionId,
    secondary: Option<CollectionId>,
}

impl IdSpace {
    /// Create a space for `primary`, optionally merged with a migrated
    /// predecessor collection.
    pub fn new(primary: CollectionId, secondary: Option<CollectionId>) -> Self {
        Self { primary, secondary }
    }

    pub fn primary(&self) -> CollectionId {
        self.primary
    }

    pub fn secondary(&self) -> Option<CollectionId> {
        self.secondary
    }

    /// Resolve a universal id into its collection and local id.
    ///
    /// Without a secondary collection a negative id is treated as a wrapped
    /// primary id.
    ///
    /// # Panics
    ///
    /// Panics if `universal_id` is zero. Zero is never a valid entry and
    /// callers must not pass the unset sentinel into id resolution.
    pub fn to_full_id(&self, universal_id: UniversalId) -> FullId {
        assert!(universal_id != 0, "universal id 0 does not address an entry");

        if universal_id > 0 {
            FullId::new(self.primary, universal_id)
        } else {
            FullId::new(
                self.secondary.unwrap_or(self.primary),
                SERVER_MAX_LOCAL_ID + universal_id,
            )
        }
    }

    /// Universal id of an entry, or `None` if it belongs to a collection
    /// outside this space.
    pub fn to_universal(&self, id: FullId) -> Option<UniversalId> {
        if id.collection == self.primary {
            Some(id.local)
        } else if Some(id.collection) == self.secondary {
            Some(id.local - SERVER_MAX_LOCAL_ID)
        } else {
            None
        }
    }

    /// Slice key centered on `universal_id`.
    pub fn slice_key(&self, universal_id: UniversalId) -> SliceKey {
        let universal_id = match self.secondary {
            None if universal_id < 0 => universal_id + SERVER_MAX_LOCAL_ID,
            _ => universal_id,
        };
        SliceKey {
            primary: self.primary,
            secondary: self.secondary,
            universal_id,
        }
    }

    pub fn is_my_collection(&self, collection: CollectionId) -> bool {
        collection == self.primary || Some(collection) == self.secondary
    }

    pub fn is_my_item(&self, id: FullId) -> bool {
        self.is_my_collection(id.collection)
    }

    /// Whether `a` is ordered before `b` in the merged sequence.
    ///
    /// Items outside the space are never "after" anything.
    pub fn is_after(&self, a: FullId, b: FullId) -> bool {
        match (self.to_universal(a), self.to_universal(b)) {
            (Some(a), Some(b)) => a < b,
            _ => false,
        }
    }
}
