//! End-to-end pipeline tests: raw transport bytes in, registry state out.

use std::cell::RefCell;
use std::rc::Rc;

use rmpv::Value;

use client_net::codec;
use client_net::protocol::{ServerMessage, WorldUpdate};
use client_net::session::{FrameSink, Session, SessionEvent, TransportEvent};
use client_sync::SyncController;
use client_world::{EntityId, EntityInit, EntityKind, EntityUpdate, GridIndex, World};

#[derive(Clone, Default)]
struct RecordingSink(Rc<RefCell<Vec<Vec<u8>>>>);

impl FrameSink for RecordingSink {
    fn send(&mut self, frame: Vec<u8>) {
        self.0.borrow_mut().push(frame);
    }
}

fn open_controller() -> (SyncController<RecordingSink>, Rc<RefCell<Vec<Vec<u8>>>>) {
    let sink = RecordingSink::default();
    let frames = sink.0.clone();
    let mut session = Session::new(sink);
    session.handle_transport_event(TransportEvent::Opened);
    (SyncController::new(session), frames)
}

fn server_frame(message: &ServerMessage) -> TransportEvent {
    TransportEvent::Frame(codec::encode(&message.to_envelope()).unwrap())
}

#[test]
fn full_session_replay() {
    let (mut controller, frames) = open_controller();
    let mut world = World::new();

    // The client announces itself.
    controller.send_join("ferris");
    assert_eq!(frames.borrow().len(), 1);

    // Server assigns us identity 3.
    controller.handle_transport_event(
        &mut world,
        server_frame(&ServerMessage::Join(EntityId::from_raw(3))),
    );
    assert_eq!(world.main_player(), EntityId::from_raw(3));

    // First delta: the map, our player, and a resource appear.
    controller.handle_transport_event(
        &mut world,
        server_frame(&ServerMessage::Update(WorldUpdate {
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
        })),
    );
    assert_eq!(world.map_size(), 50);
    assert_eq!(world.registry().len(), 2);

    // A malformed frame arrives mid-session and must be survived.
    controller.handle_transport_event(&mut world, TransportEvent::Frame(vec![0xc1, 0x00]));
    assert!(controller.session().is_open());
    assert_eq!(world.registry().len(), 2);

    // Second delta: the player moves, the resource is destroyed, and an id
    // we have never seen is referenced (forward reference, tolerated).
    controller.handle_transport_event(
        &mut world,
        server_frame(&ServerMessage::Update(WorldUpdate {
            map_size: 50,
            updated: vec![
                EntityUpdate {
                    id: EntityId::from_raw(3),
                    index: GridIndex::new(3, 3),
                },
                EntityUpdate {
                    id: EntityId::from_raw(777),
                    index: GridIndex::new(0, 0),
                },
            ],
            destroyed: vec![EntityId::from_raw(8)],
            ..WorldUpdate::default()
        })),
    );
    world.tick(0.016);

    assert_eq!(world.registry().len(), 1);
    let player = world.entity(EntityId::from_raw(3)).unwrap();
    assert_eq!(player.index(), GridIndex::new(3, 3));
    assert!(world.entity(EntityId::from_raw(8)).is_none());

    // The player reacts by moving; the intent must hit the wire as [1, [4, 9]].
    controller.send_move(GridIndex::new(4, 9));
    let frames = frames.borrow();
    let envelope = codec::decode(frames.last().unwrap()).unwrap();
    assert_eq!(envelope.kind, 1);
    assert_eq!(
        envelope.payload,
        Value::Array(vec![Value::from(4), Value::from(9)])
    );
}

#[test]
fn connection_loss_silences_outbound_intents() {
    let (mut controller, frames) = open_controller();
    let mut world = World::new();

    let event = controller.handle_transport_event(
        &mut world,
        TransportEvent::Closed {
            reason: "idle timeout".to_string(),
        },
    );
    assert_eq!(event, Some(SessionEvent::Closed));

    controller.send_move(GridIndex::new(1, 1));
    controller.send_join("ghost");
    assert!(frames.borrow().is_empty());
}

#[test]
fn disappeared_and_destroyed_both_free_the_identity() {
    let (mut controller, _) = open_controller();
    let mut world = World::new();

    for id in [1, 2] {
        controller.handle_transport_event(
            &mut world,
            server_frame(&ServerMessage::Update(WorldUpdate {
                map_size: 20,
                appeared: vec![EntityInit {
                    id: EntityId::from_raw(id),
                    kind: EntityKind::Structure,
                    index: GridIndex::new(id, id),
                }],
                ..WorldUpdate::default()
            })),
        );
    }

    // One leaves the view, one is removed from the simulation. With the
    // headless null visual both finalize immediately.
    controller.handle_transport_event(
        &mut world,
        server_frame(&ServerMessage::Update(WorldUpdate {
            map_size: 20,
            disappeared: vec![EntityId::from_raw(1)],
            destroyed: vec![EntityId::from_raw(2)],
            ..WorldUpdate::default()
        })),
    );
    world.tick(0.016);

    assert!(world.registry().is_empty());
}
