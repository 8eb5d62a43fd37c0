//! # client_world
//!
//! Entity registry, lifecycle state machine, and world state for the game
//! client.
//!
//! This crate provides:
//!
//! - [`grid`] — Logical map coordinates and the grid-to-screen projection seam.
//! - [`entity`] — Entity identity, kind, and the lifecycle state machine.
//! - [`registry`] — The single owner of all live entity records.
//! - [`world`] — Registry plus session-scoped metadata (map size, main
//!   player, spectate target).
//! - [`visual`] — Hook traits the rendering layer implements.
//! - [`error`] — Lifecycle contract violations.

pub mod entity;
pub mod error;
pub mod grid;
pub mod registry;
pub mod visual;
pub mod world;

pub use entity::{EntityId, EntityInit, EntityKind, EntityRecord, EntityUpdate, Lifecycle};
pub use error::LifecycleViolation;
pub use grid::{GridIndex, Projection, TileProjection};
pub use registry::EntityRegistry;
pub use visual::{EntityVisual, NullVisual, NullVisualFactory, VisualFactory};
pub use world::World;
