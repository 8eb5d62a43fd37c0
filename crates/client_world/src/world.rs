//! World state: the registry plus session-scoped metadata.
//!
//! The world is the handle the synchronization layer mutates. There is no
//! ambient global; whoever drives the session owns a `World` and passes it
//! explicitly into each operation.

use tracing::debug;

use crate::entity::{EntityId, EntityInit, EntityRecord, EntityUpdate};
use crate::grid::{GridIndex, Projection, TileProjection};
use crate::registry::EntityRegistry;
use crate::visual::{NullVisualFactory, VisualFactory};

/// The client's view of the game world.
///
/// Owns the entity registry, the current map metadata, and the identities
/// the local session cares about (the controlled player and the camera
/// focus). Rendering collaborators plug in through [`Projection`] and
/// [`VisualFactory`]; the defaults are headless no-ops.
pub struct World {
    registry: EntityRegistry,
    map_size: u64,
    main_player: EntityId,
    spectate_target: EntityId,
    projection: Box<dyn Projection>,
    visuals: Box<dyn VisualFactory>,
}

impl World {
    /// Create a headless world with the default tile projection.
    #[must_use]
    pub fn new() -> Self {
        Self {
            registry: EntityRegistry::new(),
            map_size: 0,
            main_player: EntityId::NONE,
            spectate_target: EntityId::NONE,
            projection: Box::new(TileProjection::default()),
            visuals: Box::new(NullVisualFactory),
        }
    }

    /// Replace the grid-to-screen projection.
    #[must_use]
    pub fn with_projection(mut self, projection: impl Projection + 'static) -> Self {
        self.projection = Box::new(projection);
        self
    }

    /// Replace the visual factory the registry spawns entities through.
    #[must_use]
    pub fn with_visuals(mut self, visuals: impl VisualFactory + 'static) -> Self {
        self.visuals = Box::new(visuals);
        self
    }

    #[must_use]
    pub fn registry(&self) -> &EntityRegistry {
        &self.registry
    }

    #[must_use]
    pub fn map_size(&self) -> u64 {
        self.map_size
    }

    #[must_use]
    pub fn main_player(&self) -> EntityId {
        self.main_player
    }

    #[must_use]
    pub fn spectate_target(&self) -> EntityId {
        self.spectate_target
    }

    /// Replace the map-size metadata wholesale. Every server update carries
    /// the full value; nothing is merged.
    pub fn set_map_size(&mut self, size: u64) {
        self.map_size = size;
    }

    /// Record which entity identity is the locally controlled player.
    ///
    /// This only establishes the identity; the entity record itself arrives
    /// in a later update message.
    pub fn set_main_player(&mut self, id: EntityId) {
        debug!(%id, "main player assigned");
        self.main_player = id;
    }

    /// Point the camera/view at an entity identity.
    pub fn set_spectate_target(&mut self, id: EntityId) {
        self.spectate_target = id;
    }

    /// Create an entity from server init data. See [`EntityRegistry::add`].
    pub fn add_entity(&mut self, init: EntityInit) {
        self.registry
            .add(init, self.projection.as_ref(), self.visuals.as_ref());
    }

    /// Apply a positional update. See [`EntityRegistry::apply_update`].
    pub fn update_entity(&mut self, update: EntityUpdate) {
        self.registry.apply_update(update, self.projection.as_ref());
    }

    /// Remove an entity, animated or immediate. See [`EntityRegistry::remove`].
    pub fn remove_entity(&mut self, id: EntityId, animated: bool) {
        self.registry.remove(id, animated);
    }

    /// Enable or disable automatic visual repositioning for an entity.
    pub fn set_auto_reposition(&mut self, id: EntityId, enabled: bool) {
        self.registry.set_auto_reposition(id, enabled);
    }

    /// Signal that an entity's destruction animation has completed.
    pub fn finish_destroy(&mut self, id: EntityId) {
        self.registry.finish_destroy(id);
    }

    /// The visual x coordinate for a grid index, via the active projection.
    #[must_use]
    pub fn visual_x(&self, index: GridIndex) -> f32 {
        self.projection.visual_x(index)
    }

    /// The visual y coordinate for a grid index, via the active projection.
    #[must_use]
    pub fn visual_y(&self, index: GridIndex) -> f32 {
        self.projection.visual_y(index)
    }

    /// Look up an entity record by identity.
    #[must_use]
    pub fn entity(&self, id: EntityId) -> Option<&EntityRecord> {
        self.registry.get(id)
    }

    /// Per-tick maintenance: drive visual hooks and reap finalized records.
    pub fn tick(&mut self, dt: f32) {
        self.registry.tick(dt);
        self.registry.sweep();
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}
