//! Hooks into the rendering layer.
//!
//! The world never owns scene objects. Each [`EntityRecord`](crate::entity::EntityRecord)
//! carries a boxed [`EntityVisual`] supplied by the rendering layer's
//! [`VisualFactory`]; lifecycle transitions drive the hooks and the renderer
//! does whatever it likes with them. The default implementations are no-ops
//! so headless use (tests, bots) needs no rendering at all.

use crate::entity::{EntityId, EntityKind};
use crate::grid::GridIndex;

/// Per-entity rendering callbacks, invoked on lifecycle transitions.
pub trait EntityVisual {
    /// The entity became alive at the given visual position.
    fn spawn(&mut self, _id: EntityId, _kind: EntityKind, _x: f32, _y: f32) {}

    /// The entity moved; called only when auto-reposition is enabled.
    fn reposition(&mut self, _id: EntityId, _x: f32, _y: f32) {}

    /// Per-tick hook for continuous visual behaviour. No-op by default.
    fn tick(&mut self, _id: EntityId, _dt: f32) {}

    /// Destruction was requested with animation.
    ///
    /// Return `true` to claim the destruction: the visual is now responsible
    /// for eventually signalling completion by calling
    /// [`finish_destroy`](crate::registry::EntityRegistry::finish_destroy)
    /// on the registry (typically routed through whatever event channel the
    /// renderer uses). Return `false` to finalize immediately.
    fn begin_destroy(&mut self, _id: EntityId, _index: GridIndex) -> bool {
        false
    }

    /// The entity is gone; release the scene object.
    fn despawn(&mut self, _id: EntityId) {}
}

/// A visual that renders nothing. Used headless and as the factory default.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullVisual;

impl EntityVisual for NullVisual {}

/// Creates the visual hook object for a newly appeared entity.
///
/// Dispatch on [`EntityKind`] here to give each subtype its own sprite,
/// animation set, or sound handling.
pub trait VisualFactory {
    fn create(&self, kind: EntityKind) -> Box<dyn EntityVisual>;
}

/// Factory producing [`NullVisual`] for every kind.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullVisualFactory;

impl VisualFactory for NullVisualFactory {
    fn create(&self, _kind: EntityKind) -> Box<dyn EntityVisual> {
        Box::new(NullVisual)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_visual_declines_animated_destroy() {
        let mut visual = NullVisual;
        assert!(!visual.begin_destroy(EntityId::from_raw(1), GridIndex::new(0, 0)));
    }
}
