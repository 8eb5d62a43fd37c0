//! Typed messages over the envelope codec.
//!
//! The codec treats payloads as opaque [`Value`] trees; this module pins
//! down the shape each message type actually carries and converts between
//! trees and typed messages. Shapes are part of the wire contract with the
//! server:
//!
//! | direction | type | name   | payload |
//! |-----------|------|--------|---------|
//! | in        | 0    | Join   | integer: assigned player identity |
//! | in        | 1    | Update | `[mapSize, appeared[], updated[], disappeared[], destroyed[]]` |
//! | out       | 0    | Join   | string: requested username |
//! | out       | 1    | Move   | `[x, y]` |
//!
//! An appeared entry is `[id, kind, [x, y]]`; an updated entry is
//! `[id, [x, y]]`.

use rmpv::Value;

use client_world::{EntityId, EntityInit, EntityKind, EntityUpdate, GridIndex};

use crate::codec::Envelope;
use crate::error::NetError;

/// Wire discriminants for server → client messages.
pub mod server_kind {
    /// The server assigned this client a player identity.
    pub const JOIN: u64 = 0;
    /// A world state delta.
    pub const UPDATE: u64 = 1;
}

/// Wire discriminants for client → server messages.
pub mod client_kind {
    /// Request to join the game under a username.
    pub const JOIN: u64 = 0;
    /// Intent to move the player to a grid index.
    pub const MOVE: u64 = 1;
}

/// One world state delta from the server.
///
/// Fields are applied in declaration order: map size first, then appeared,
/// updated, disappeared, destroyed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WorldUpdate {
    /// Current map size; replaces the previous value wholesale.
    pub map_size: u64,
    /// Entities that entered this client's view.
    pub appeared: Vec<EntityInit>,
    /// Positional updates for entities already in view.
    pub updated: Vec<EntityUpdate>,
    /// Entities that left the view; removal may animate.
    pub disappeared: Vec<EntityId>,
    /// Entities removed from the simulation; removal is immediate.
    pub destroyed: Vec<EntityId>,
}

/// A decoded server → client message.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerMessage {
    /// The identity of the locally controlled player.
    Join(EntityId),
    /// A world state delta.
    Update(WorldUpdate),
}

impl ServerMessage {
    /// Interpret a decoded envelope.
    ///
    /// # Errors
    ///
    /// [`NetError::UnknownMessageType`] for an unrecognized discriminant,
    /// [`NetError::BadPayload`] when the payload shape does not match the
    /// type. Both are recoverable: log and drop the frame.
    pub fn from_envelope(envelope: &Envelope) -> Result<Self, NetError> {
        match envelope.kind {
            server_kind::JOIN => {
                let id = as_i64(&envelope.payload, "join payload must be an integer id")?;
                Ok(Self::Join(EntityId::from_raw(id)))
            }
            server_kind::UPDATE => Ok(Self::Update(parse_update(&envelope.payload)?)),
            other => Err(NetError::UnknownMessageType(other)),
        }
    }

    /// Build the envelope for this message. The inverse of
    /// [`from_envelope`](Self::from_envelope); mainly useful for test and
    /// replay harnesses that have to speak the server's side.
    #[must_use]
    pub fn to_envelope(&self) -> Envelope {
        match self {
            Self::Join(id) => Envelope::new(server_kind::JOIN, Value::from(id.raw())),
            Self::Update(update) => Envelope::new(server_kind::UPDATE, update.to_value()),
        }
    }
}

/// An outgoing client → server intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientMessage {
    /// Join the game under a username.
    Join(String),
    /// Move the player to a grid index.
    Move(GridIndex),
}

impl ClientMessage {
    /// Build the envelope for this intent.
    #[must_use]
    pub fn to_envelope(&self) -> Envelope {
        match self {
            Self::Join(username) => {
                Envelope::new(client_kind::JOIN, Value::from(username.as_str()))
            }
            Self::Move(index) => Envelope::new(
                client_kind::MOVE,
                Value::Array(vec![Value::from(index.x), Value::from(index.y)]),
            ),
        }
    }

    /// Interpret a decoded envelope as a client intent. This is the server's
    /// side of the contract; the client core uses it only in loopback tests.
    ///
    /// # Errors
    ///
    /// Same taxonomy as [`ServerMessage::from_envelope`].
    pub fn from_envelope(envelope: &Envelope) -> Result<Self, NetError> {
        match envelope.kind {
            client_kind::JOIN => {
                let username = envelope
                    .payload
                    .as_str()
                    .ok_or(NetError::BadPayload("join payload must be a string"))?;
                Ok(Self::Join(username.to_string()))
            }
            client_kind::MOVE => Ok(Self::Move(parse_index(&envelope.payload)?)),
            other => Err(NetError::UnknownMessageType(other)),
        }
    }
}

impl WorldUpdate {
    /// Serialise to the 5-element payload array.
    #[must_use]
    pub fn to_value(&self) -> Value {
        Value::Array(vec![
            Value::from(self.map_size),
            Value::Array(self.appeared.iter().map(init_to_value).collect()),
            Value::Array(self.updated.iter().map(update_to_value).collect()),
            Value::Array(self.disappeared.iter().map(|id| Value::from(id.raw())).collect()),
            Value::Array(self.destroyed.iter().map(|id| Value::from(id.raw())).collect()),
        ])
    }
}

fn parse_update(payload: &Value) -> Result<WorldUpdate, NetError> {
    let parts = as_array(payload, "update payload must be an array")?;
    if parts.len() != 5 {
        return Err(NetError::BadPayload("update payload must have 5 elements"));
    }

    Ok(WorldUpdate {
        map_size: as_u64(&parts[0], "map size must be an unsigned integer")?,
        appeared: as_array(&parts[1], "appeared list must be an array")?
            .iter()
            .map(parse_init)
            .collect::<Result<_, _>>()?,
        updated: as_array(&parts[2], "updated list must be an array")?
            .iter()
            .map(parse_entity_update)
            .collect::<Result<_, _>>()?,
        disappeared: parse_ids(&parts[3], "disappeared list must be integer ids")?,
        destroyed: parse_ids(&parts[4], "destroyed list must be integer ids")?,
    })
}

fn parse_init(value: &Value) -> Result<EntityInit, NetError> {
    let fields = as_array(value, "appeared entry must be an array")?;
    if fields.len() != 3 {
        return Err(NetError::BadPayload("appeared entry must be [id, kind, index]"));
    }
    let raw_kind = as_u64(&fields[1], "entity kind must be an unsigned integer")?;
    let kind = EntityKind::from_raw(raw_kind)
        .ok_or(NetError::BadPayload("unknown entity kind discriminant"))?;
    Ok(EntityInit {
        id: EntityId::from_raw(as_i64(&fields[0], "entity id must be an integer")?),
        kind,
        index: parse_index(&fields[2])?,
    })
}

fn parse_entity_update(value: &Value) -> Result<EntityUpdate, NetError> {
    let fields = as_array(value, "updated entry must be an array")?;
    if fields.len() != 2 {
        return Err(NetError::BadPayload("updated entry must be [id, index]"));
    }
    Ok(EntityUpdate {
        id: EntityId::from_raw(as_i64(&fields[0], "entity id must be an integer")?),
        index: parse_index(&fields[1])?,
    })
}

fn parse_index(value: &Value) -> Result<GridIndex, NetError> {
    let pair = as_array(value, "grid index must be an array")?;
    if pair.len() != 2 {
        return Err(NetError::BadPayload("grid index must be [x, y]"));
    }
    Ok(GridIndex::new(
        as_i64(&pair[0], "grid x must be an integer")?,
        as_i64(&pair[1], "grid y must be an integer")?,
    ))
}

fn parse_ids(value: &Value, context: &'static str) -> Result<Vec<EntityId>, NetError> {
    as_array(value, context)?
        .iter()
        .map(|v| Ok(EntityId::from_raw(as_i64(v, context)?)))
        .collect()
}

fn init_to_value(init: &EntityInit) -> Value {
    Value::Array(vec![
        Value::from(init.id.raw()),
        Value::from(init.kind.raw()),
        index_to_value(init.index),
    ])
}

fn update_to_value(update: &EntityUpdate) -> Value {
    Value::Array(vec![Value::from(update.id.raw()), index_to_value(update.index)])
}

fn index_to_value(index: GridIndex) -> Value {
    Value::Array(vec![Value::from(index.x), Value::from(index.y)])
}

fn as_array<'a>(value: &'a Value, context: &'static str) -> Result<&'a Vec<Value>, NetError> {
    value.as_array().ok_or(NetError::BadPayload(context))
}

fn as_i64(value: &Value, context: &'static str) -> Result<i64, NetError> {
    value.as_i64().ok_or(NetError::BadPayload(context))
}

fn as_u64(value: &Value, context: &'static str) -> Result<u64, NetError> {
    value.as_u64().ok_or(NetError::BadPayload(context))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec;

    #[test]
    fn test_server_join_roundtrip() {
        let msg = ServerMessage::Join(EntityId::from_raw(12));
        let restored = ServerMessage::from_envelope(&msg.to_envelope()).unwrap();
        assert_eq!(msg, restored);
    }

    #[test]
    fn test_server_update_roundtrip() {
        let msg = ServerMessage::Update(WorldUpdate {
            map_size: 50,
            appeared: vec![EntityInit {
                id: EntityId::from_raw(1),
                kind: EntityKind::Player,
                index: GridIndex::new(2, 3),
            }],
            updated: vec![EntityUpdate {
                id: EntityId::from_raw(4),
                index: GridIndex::new(-1, 7),
            }],
            disappeared: vec![EntityId::from_raw(5)],
            destroyed: vec![EntityId::from_raw(6)],
        });
        let envelope = msg.to_envelope();
        let bytes = codec::encode(&envelope).unwrap();
        let restored = ServerMessage::from_envelope(&codec::decode(&bytes).unwrap()).unwrap();
        assert_eq!(msg, restored);
    }

    #[test]
    fn test_move_intent_wire_shape() {
        let envelope = ClientMessage::Move(GridIndex::new(4, 9)).to_envelope();
        assert_eq!(envelope.kind, client_kind::MOVE);
        assert_eq!(
            envelope.payload,
            Value::Array(vec![Value::from(4), Value::from(9)])
        );
    }

    #[test]
    fn test_join_intent_carries_username() {
        let envelope = ClientMessage::Join("ferris".to_string()).to_envelope();
        assert_eq!(envelope.kind, client_kind::JOIN);
        assert_eq!(envelope.payload.as_str(), Some("ferris"));
    }

    #[test]
    fn test_unknown_message_type_is_rejected() {
        let envelope = Envelope::new(9, Value::Nil);
        let result = ServerMessage::from_envelope(&envelope);
        assert!(matches!(result, Err(NetError::UnknownMessageType(9))));
    }

    #[test]
    fn test_update_with_wrong_arity_is_bad_payload() {
        let envelope = Envelope::new(
            server_kind::UPDATE,
            Value::Array(vec![Value::from(50u64)]),
        );
        let result = ServerMessage::from_envelope(&envelope);
        assert!(matches!(result, Err(NetError::BadPayload(_))));
    }

    #[test]
    fn test_unknown_entity_kind_is_bad_payload() {
        let envelope = Envelope::new(
            server_kind::UPDATE,
            Value::Array(vec![
                Value::from(50u64),
                Value::Array(vec![Value::Array(vec![
                    Value::from(1),
                    Value::from(99u64),
                    Value::Array(vec![Value::from(0), Value::from(0)]),
                ])]),
                Value::Array(vec![]),
                Value::Array(vec![]),
                Value::Array(vec![]),
            ]),
        );
        assert!(matches!(
            ServerMessage::from_envelope(&envelope),
            Err(NetError::BadPayload(_))
        ));
    }
}
