//! The synchronization controller.
//!
//! Sits between the transport session and the world: inbound envelopes are
//! dispatched by message type onto registry operations, outbound intents
//! are encoded and handed to the session. All of it runs sequentially on
//! the thread that pumps transport events, so the world needs no locking.

use tracing::{info, warn};

use client_net::protocol::{ClientMessage, ServerMessage, WorldUpdate};
use client_net::session::{FrameSink, Session, SessionEvent, TransportEvent};
use client_net::NetError;
use client_world::{GridIndex, World};

/// Tuning knobs for the sync layer.
#[derive(Debug, Clone, Copy)]
pub struct SyncConfig {
    /// Whether a "disappeared" removal plays the destruction animation.
    /// "Destroyed" removals are always immediate. The server does not
    /// distinguish the two beyond the list an id arrives in, so this stays
    /// configurable until the intended presentation is settled.
    pub animate_disappearance: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            animate_disappearance: true,
        }
    }
}

/// Applies server messages to a [`World`] and emits player intents.
pub struct SyncController<S: FrameSink> {
    session: Session<S>,
    config: SyncConfig,
}

impl<S: FrameSink> SyncController<S> {
    #[must_use]
    pub fn new(session: Session<S>) -> Self {
        Self::with_config(session, SyncConfig::default())
    }

    #[must_use]
    pub fn with_config(session: Session<S>, config: SyncConfig) -> Self {
        Self { session, config }
    }

    #[must_use]
    pub fn session(&self) -> &Session<S> {
        &self.session
    }

    /// Pump one transport event through the session and apply any decoded
    /// message to the world.
    ///
    /// Envelope events are consumed here; `Opened`/`Closed` transitions are
    /// passed back so the embedding loop can react (send the join intent,
    /// tear down, ...). Unknown message types and malformed payloads are
    /// logged and dropped without disturbing the session.
    pub fn handle_transport_event(
        &mut self,
        world: &mut World,
        event: TransportEvent,
    ) -> Option<SessionEvent> {
        match self.session.handle_transport_event(event)? {
            SessionEvent::Envelope(envelope) => {
                match ServerMessage::from_envelope(&envelope) {
                    Ok(message) => self.apply(world, message),
                    Err(NetError::UnknownMessageType(kind)) => {
                        warn!(kind, "ignoring message of unknown type");
                    }
                    Err(err) => warn!(%err, kind = envelope.kind, "dropping bad message"),
                }
                None
            }
            other => Some(other),
        }
    }

    /// Apply one decoded server message to the world.
    pub fn apply(&mut self, world: &mut World, message: ServerMessage) {
        match message {
            ServerMessage::Join(id) => {
                // Only establishes which future entity is ours; the record
                // itself arrives in a later update.
                info!(%id, "joined as player");
                world.set_main_player(id);
                world.set_spectate_target(id);
            }
            ServerMessage::Update(update) => self.apply_update(world, update),
        }
    }

    /// Apply a world delta in the fixed protocol order: map size, appeared,
    /// updated, disappeared, destroyed.
    fn apply_update(&mut self, world: &mut World, update: WorldUpdate) {
        world.set_map_size(update.map_size);
        for init in update.appeared {
            world.add_entity(init);
        }
        for entity_update in update.updated {
            // Ids we have not observed yet are tolerated inside.
            world.update_entity(entity_update);
        }
        for id in update.disappeared {
            world.remove_entity(id, self.config.animate_disappearance);
        }
        for id in update.destroyed {
            world.remove_entity(id, false);
        }
    }

    /// Ask the server to join the game under `username`. Fire-and-forget;
    /// dropped silently if the session is not open.
    pub fn send_join(&mut self, username: &str) {
        let envelope = ClientMessage::Join(username.to_string()).to_envelope();
        self.session.send(&envelope);
    }

    /// Announce the intent to move the player to `index`. Fire-and-forget.
    pub fn send_move(&mut self, index: GridIndex) {
        let envelope = ClientMessage::Move(index).to_envelope();
        self.session.send(&envelope);
    }
}
