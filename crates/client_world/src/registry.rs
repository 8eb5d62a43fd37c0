//! The entity registry: the single owner of all live entity records.
//!
//! Every mutation funnels through the operations here so the lifecycle
//! invariants hold: at most one record per identity, `kind` immutable after
//! creation, and the `-1` sentinel never used as a key. Stale references
//! from the server (updates or removals for ids the client has not seen)
//! are expected ordering slack and are tolerated as no-ops; everything else
//! that breaks the contract is a [`LifecycleViolation`] and points at a bug
//! in the synchronization layer.

use std::collections::HashMap;

use tracing::{debug, error, trace};

use crate::entity::{EntityId, EntityInit, EntityRecord, EntityUpdate, Lifecycle};
use crate::error::LifecycleViolation;
use crate::grid::Projection;
use crate::visual::VisualFactory;

/// Owns the set of currently known entities, keyed by identity.
#[derive(Default)]
pub struct EntityRegistry {
    entities: HashMap<EntityId, EntityRecord>,
    /// Finalized records awaiting the end-of-tick sweep.
    reap: Vec<EntityRecord>,
}

impl EntityRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live records (including those still animating destruction).
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&EntityRecord> {
        self.entities.get(&id)
    }

    /// Iterate over all live records.
    pub fn iter(&self) -> impl Iterator<Item = &EntityRecord> {
        self.entities.values()
    }

    /// Create a record from server init data and bring it `Alive`.
    ///
    /// Allocates the record in `PendingCreation`, applies identity and grid
    /// index, spawns the visual at the projected position, then transitions
    /// to `Alive`. A duplicate identity is a contract violation; in release
    /// builds the stale record is force-finalized and replaced so the
    /// one-record-per-identity invariant still holds afterwards.
    pub fn add(
        &mut self,
        init: EntityInit,
        projection: &dyn Projection,
        visuals: &dyn VisualFactory,
    ) {
        if !init.id.is_some() {
            report(LifecycleViolation::SentinelIdentity);
            return;
        }
        if self.entities.contains_key(&init.id) {
            report(LifecycleViolation::DuplicateIdentity { id: init.id });
            self.finalize(init.id);
        }

        let mut record = EntityRecord::allocate(init.kind, visuals.create(init.kind));
        record.set_id(init.id);
        record.set_index(init.index);
        let x = projection.visual_x(init.index);
        let y = projection.visual_y(init.index);
        record.visual.spawn(init.id, init.kind, x, y);
        record.set_lifecycle(Lifecycle::Alive);

        debug!(id = %init.id, kind = ?init.kind, index = %init.index, "entity appeared");
        self.entities.insert(init.id, record);
    }

    /// Apply a positional update to an `Alive` record.
    ///
    /// An unknown identity is tolerated silently: the server may reference
    /// an entity this client has not observed yet. Identical repeated
    /// updates are idempotent and skip the visual reposition.
    pub fn apply_update(&mut self, update: EntityUpdate, projection: &dyn Projection) {
        let Some(record) = self.entities.get_mut(&update.id) else {
            trace!(id = %update.id, "update for unknown entity, skipping");
            return;
        };
        if record.lifecycle() != Lifecycle::Alive {
            report(LifecycleViolation::UpdateNotAlive {
                id: update.id,
                state: record.lifecycle(),
            });
            return;
        }
        if record.index() == update.index {
            return;
        }

        record.set_index(update.index);
        if record.auto_reposition() {
            let x = projection.visual_x(update.index);
            let y = projection.visual_y(update.index);
            record.visual.reposition(update.id, x, y);
        }
        trace!(id = %update.id, index = %update.index, "entity moved");
    }

    /// Remove an entity, optionally letting its visual animate out.
    ///
    /// With `animated`, the visual's `begin_destroy` hook may claim the
    /// destruction; the record then stays in `DestroyingAnimated` until
    /// [`finish_destroy`](Self::finish_destroy) arrives. Otherwise the
    /// record is finalized on the spot. Unknown ids are a tolerated no-op.
    pub fn remove(&mut self, id: EntityId, animated: bool) {
        let Some(record) = self.entities.get_mut(&id) else {
            trace!(%id, "removal for unknown entity, skipping");
            return;
        };
        match record.lifecycle() {
            Lifecycle::Alive => {
                let index = record.index();
                let claimed = animated && record.visual.begin_destroy(id, index);
                if claimed {
                    record.set_lifecycle(Lifecycle::DestroyingAnimated);
                    debug!(%id, "entity destruction animating");
                } else {
                    self.finalize(id);
                }
            }
            Lifecycle::DestroyingAnimated => {
                // A hard destroy can overtake an in-flight animation; an
                // animated one is already covered.
                if !animated {
                    self.finalize(id);
                }
            }
            Lifecycle::PendingCreation => {
                report(LifecycleViolation::DestroyBeforeInit { id });
            }
            // Finalized records are no longer registry keys.
            Lifecycle::PendingDestroy | Lifecycle::Destroyed => unreachable!(),
        }
    }

    /// Enable or disable automatic visual repositioning for an entity.
    /// Kinds that animate their own movement turn this off and read the
    /// grid index from the record instead. Unknown ids are ignored.
    pub fn set_auto_reposition(&mut self, id: EntityId, enabled: bool) {
        if let Some(record) = self.entities.get_mut(&id) {
            record.set_auto_reposition(enabled);
        }
    }

    /// The explicit animation-completion signal.
    ///
    /// Called by the rendering layer (through whatever event path it uses)
    /// once a claimed destruction animation has played out. Finalizes the
    /// record; any other state is a contract violation.
    pub fn finish_destroy(&mut self, id: EntityId) {
        match self.entities.get(&id).map(EntityRecord::lifecycle) {
            Some(Lifecycle::DestroyingAnimated) => self.finalize(id),
            Some(state) => report(LifecycleViolation::UnexpectedCompletion { id, state }),
            None => report(LifecycleViolation::CompletionForUnknown { id }),
        }
    }

    /// Drop the visual, clear the identity to the sentinel, and move the
    /// record to the reap list. The identity is free for reuse from here on.
    fn finalize(&mut self, id: EntityId) {
        let Some(mut record) = self.entities.remove(&id) else {
            return;
        };
        record.visual.despawn(id);
        record.set_id(EntityId::NONE);
        record.set_lifecycle(Lifecycle::PendingDestroy);
        debug!(%id, "entity destroyed");
        self.reap.push(record);
    }

    /// Reap finalized records. Call once per tick; returns how many records
    /// reached `Destroyed`.
    pub fn sweep(&mut self) -> usize {
        let reaped = self.reap.len();
        for mut record in self.reap.drain(..) {
            record.set_lifecycle(Lifecycle::Destroyed);
        }
        reaped
    }

    /// Drive the per-tick visual hook on every live record.
    pub fn tick(&mut self, dt: f32) {
        for record in self.entities.values_mut() {
            let id = record.id();
            record.visual.tick(id, dt);
        }
    }
}

/// Surface a contract violation: fatal in debug builds, logged and ignored
/// in release.
fn report(violation: LifecycleViolation) {
    error!(%violation, "entity lifecycle contract violated");
    debug_assert!(false, "{violation}");
}
