//! # client_app — loopback demo
//!
//! Drives the synchronization core against a scripted server session over
//! an in-memory transport. There is no real socket here: the outbound half
//! is a tokio channel whose receiver plays the server, and inbound frames
//! are fed in as transport events, the same way a socket task would.
//!
//! The script exercises the whole surface: join handshake, entity
//! appearance, movement, a malformed frame that must be survived, and both
//! removal flavours.

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use client_net::codec;
use client_net::protocol::{ClientMessage, ServerMessage, WorldUpdate};
use client_net::session::{ChannelSink, Session, SessionEvent, TransportEvent};
use client_sync::SyncController;
use client_world::{
    EntityId, EntityInit, EntityKind, EntityUpdate, EntityVisual, GridIndex, TileProjection,
    VisualFactory, World,
};

/// A visual that logs every hook instead of rendering.
struct LoggingVisual;

impl EntityVisual for LoggingVisual {
    fn spawn(&mut self, id: EntityId, kind: EntityKind, x: f32, y: f32) {
        info!(%id, ?kind, x, y, "visual spawned");
    }

    fn reposition(&mut self, id: EntityId, x: f32, y: f32) {
        info!(%id, x, y, "visual moved");
    }

    fn despawn(&mut self, id: EntityId) {
        info!(%id, "visual released");
    }
}

struct LoggingVisuals;

impl VisualFactory for LoggingVisuals {
    fn create(&self, _kind: EntityKind) -> Box<dyn EntityVisual> {
        Box::new(LoggingVisual)
    }
}

/// The frames a server would send over one short session.
fn server_script() -> Vec<TransportEvent> {
    let join = ServerMessage::Join(EntityId::from_raw(3));
    let first_delta = ServerMessage::Update(WorldUpdate {
        map_size: 50,
        appeared: vec![
            EntityInit {
                id: EntityId::from_raw(3),
                kind: EntityKind::Player,
                index: GridIndex::new(2, 3),
            },
            EntityInit {
                id: EntityId::from_raw(8),
                kind: EntityKind::Resource,
                index: GridIndex::new(5, 5),
            },
        ],
        ..WorldUpdate::default()
    });
    let second_delta = ServerMessage::Update(WorldUpdate {
        map_size: 50,
        updated: vec![EntityUpdate {
            id: EntityId::from_raw(3),
            index: GridIndex::new(3, 3),
        }],
        disappeared: vec![EntityId::from_raw(8)],
        ..WorldUpdate::default()
    });

    vec![
        TransportEvent::Opened,
        frame(&join),
        frame(&first_delta),
        // A corrupted frame; the session must log it and keep going.
        TransportEvent::Frame(vec![0xc1, 0xde, 0xad]),
        frame(&second_delta),
        TransportEvent::Closed {
            reason: "script finished".to_string(),
        },
    ]
}

fn frame(message: &ServerMessage) -> TransportEvent {
    let bytes = codec::encode(&message.to_envelope()).expect("script frames encode");
    TransportEvent::Frame(bytes)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialise structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();

    info!("loopback demo starting");

    let (tx, mut rx) = mpsc::unbounded_channel();
    let session = Session::new(ChannelSink(tx));
    let mut controller = SyncController::new(session);
    let mut world = World::new()
        .with_projection(TileProjection::new(32.0))
        .with_visuals(LoggingVisuals);

    for event in server_script() {
        if let Some(session_event) = controller.handle_transport_event(&mut world, event) {
            info!(?session_event, "session transition");
            if matches!(session_event, SessionEvent::Opened) {
                controller.send_join("ferris");
                controller.send_move(GridIndex::new(4, 9));
            }
        }
        world.tick(0.016);
    }

    // Play the server's side: decode what the client put on the wire.
    while let Ok(bytes) = rx.try_recv() {
        match codec::decode(&bytes).and_then(|env| ClientMessage::from_envelope(&env)) {
            Ok(intent) => info!(?intent, "server received intent"),
            Err(err) => warn!(%err, "server received garbage"),
        }
    }

    info!(
        map_size = world.map_size(),
        main_player = %world.main_player(),
        live_entities = world.registry().len(),
        "session replay complete"
    );
    for record in world.registry().iter() {
        info!(record = ?record, "surviving entity");
    }

    Ok(())
}
