//! World-layer contract violations.

use crate::entity::{EntityId, Lifecycle};

/// A lifecycle contract violation.
///
/// These indicate a bug in the synchronization layer, not a network
/// condition: the registry reports them loudly (panic in debug builds,
/// error log in release) and then recovers as best it can.
#[derive(Debug, thiserror::Error)]
pub enum LifecycleViolation {
    /// An entity was created with the `-1` sentinel as its identity.
    #[error("entity created with the sentinel identity")]
    SentinelIdentity,

    /// A second record was created for an identity already alive.
    #[error("duplicate entity identity {id}")]
    DuplicateIdentity { id: EntityId },

    /// An update was applied to a record that is not `Alive`.
    #[error("update applied to entity {id} in state {state:?}")]
    UpdateNotAlive { id: EntityId, state: Lifecycle },

    /// A destroy was requested before init data was applied.
    #[error("destroy requested for uninitialized entity {id}")]
    DestroyBeforeInit { id: EntityId },

    /// An animation-completion signal arrived for an entity that is not
    /// waiting on one.
    #[error("destroy completion for entity {id} in state {state:?}")]
    UnexpectedCompletion { id: EntityId, state: Lifecycle },

    /// An animation-completion signal arrived for an unknown entity.
    #[error("destroy completion for unknown entity {id}")]
    CompletionForUnknown { id: EntityId },
}
