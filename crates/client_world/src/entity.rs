//! Entity identity, kind, and the lifecycle state machine.
//!
//! An [`EntityId`] is a server-assigned integer, unique among currently
//! alive entities. The client never allocates ids; it only mirrors what the
//! server announces. `-1` is the uninitialized/destroyed sentinel and is
//! never a valid live identity.

use serde::{Deserialize, Serialize};

use crate::grid::GridIndex;
use crate::visual::EntityVisual;

/// A server-assigned entity identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub i64);

impl EntityId {
    /// The "no entity" sentinel. Marks a record as uninitialized or fully
    /// destroyed; never present as a registry key.
    pub const NONE: EntityId = EntityId(-1);

    /// Create an id from a raw `i64`.
    #[must_use]
    pub const fn from_raw(id: i64) -> Self {
        Self(id)
    }

    /// Returns the raw `i64` identifier.
    #[must_use]
    pub const fn raw(self) -> i64 {
        self.0
    }

    /// Returns `true` if this id refers to an actual entity.
    #[must_use]
    pub const fn is_some(self) -> bool {
        self.0 != Self::NONE.0
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "EntityId({})", self.0)
    }
}

/// Closed set of entity subtypes the server can announce.
///
/// The discriminant values are part of the wire contract and must match the
/// server's game data tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Player,
    Resource,
    Structure,
}

impl EntityKind {
    /// Decode a wire discriminant into a kind. Unknown values are rejected
    /// rather than mapped to a default, so a schema drift shows up as a
    /// malformed payload instead of a mislabelled entity.
    #[must_use]
    pub const fn from_raw(raw: u64) -> Option<Self> {
        match raw {
            0 => Some(Self::Player),
            1 => Some(Self::Resource),
            2 => Some(Self::Structure),
            _ => None,
        }
    }

    /// The wire discriminant for this kind.
    #[must_use]
    pub const fn raw(self) -> u64 {
        match self {
            Self::Player => 0,
            Self::Resource => 1,
            Self::Structure => 2,
        }
    }
}

/// The stage of an entity's existence, from creation to removal.
///
/// ```text
/// PendingCreation ──init──▶ Alive ──destroy(animated)──▶ DestroyingAnimated
///                             │                                  │
///                             └──destroy(immediate)──┐     finish_destroy
///                                                    ▼           ▼
///                                              PendingDestroy ──sweep──▶ Destroyed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    /// Record allocated, init data not yet applied.
    PendingCreation,
    /// Init data applied; the entity is visible and updatable.
    Alive,
    /// Destruction requested with animation; waiting for the explicit
    /// completion signal.
    DestroyingAnimated,
    /// Destruction finalized; the record is awaiting the registry sweep.
    PendingDestroy,
    /// Removed from the registry. Terminal.
    Destroyed,
}

/// Creation data for a newly appeared entity, as announced by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityInit {
    pub id: EntityId,
    pub kind: EntityKind,
    pub index: GridIndex,
}

/// Positional update for an already-known entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityUpdate {
    pub id: EntityId,
    pub index: GridIndex,
}

/// One entity known to the client.
///
/// The record owns the lifecycle state and the per-entity visual hook; the
/// visual object itself lives with the rendering layer and is only driven
/// through [`EntityVisual`] callbacks.
pub struct EntityRecord {
    id: EntityId,
    kind: EntityKind,
    index: GridIndex,
    lifecycle: Lifecycle,
    /// When set, positional updates re-project the visual automatically.
    auto_reposition: bool,
    pub(crate) visual: Box<dyn EntityVisual>,
}

impl EntityRecord {
    /// Allocate a record in `PendingCreation`. Kind and visual are fixed at
    /// allocation; identity and index are applied by `init`.
    #[must_use]
    pub fn allocate(kind: EntityKind, visual: Box<dyn EntityVisual>) -> Self {
        Self {
            id: EntityId::NONE,
            kind,
            index: GridIndex::new(0, 0),
            lifecycle: Lifecycle::PendingCreation,
            auto_reposition: true,
            visual,
        }
    }

    #[must_use]
    pub fn id(&self) -> EntityId {
        self.id
    }

    #[must_use]
    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    #[must_use]
    pub fn index(&self) -> GridIndex {
        self.index
    }

    #[must_use]
    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    #[must_use]
    pub fn auto_reposition(&self) -> bool {
        self.auto_reposition
    }

    /// Disable or re-enable automatic visual repositioning on update. Kinds
    /// that animate their own movement turn this off.
    pub fn set_auto_reposition(&mut self, enabled: bool) {
        self.auto_reposition = enabled;
    }

    pub(crate) fn set_id(&mut self, id: EntityId) {
        self.id = id;
    }

    pub(crate) fn set_index(&mut self, index: GridIndex) {
        self.index = index;
    }

    pub(crate) fn set_lifecycle(&mut self, lifecycle: Lifecycle) {
        self.lifecycle = lifecycle;
    }
}

impl std::fmt::Debug for EntityRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityRecord")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("index", &self.index)
            .field("lifecycle", &self.lifecycle)
            .field("auto_reposition", &self.auto_reposition)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::visual::NullVisual;

    #[test]
    fn test_entity_id_sentinel() {
        assert!(!EntityId::NONE.is_some());
        assert_eq!(EntityId::NONE.raw(), -1);
        assert!(EntityId::from_raw(0).is_some());
    }

    #[test]
    fn test_entity_kind_raw_roundtrip() {
        for kind in [EntityKind::Player, EntityKind::Resource, EntityKind::Structure] {
            assert_eq!(EntityKind::from_raw(kind.raw()), Some(kind));
        }
        assert_eq!(EntityKind::from_raw(99), None);
    }

    #[test]
    fn test_allocated_record_is_pending_creation() {
        let record = EntityRecord::allocate(EntityKind::Resource, Box::new(NullVisual));
        assert_eq!(record.lifecycle(), Lifecycle::PendingCreation);
        assert_eq!(record.id(), EntityId::NONE);
        assert!(record.auto_reposition());
    }

    #[test]
    fn test_entity_id_serialization_roundtrip() {
        let id = EntityId::from_raw(42);
        let bytes = rmp_serde::to_vec(&id).unwrap();
        let restored: EntityId = rmp_serde::from_slice(&bytes).unwrap();
        assert_eq!(id, restored);
    }
}
