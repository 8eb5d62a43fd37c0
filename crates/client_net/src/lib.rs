//! # client_net
//!
//! Wire codec, protocol messages, and transport session for the game
//! client.
//!
//! This crate provides:
//!
//! - [`codec`] — The `[type, payload]` MessagePack envelope codec.
//! - [`protocol`] — Typed server/client messages and payload shapes.
//! - [`session`] — The transport session state machine.
//! - [`error`] — Network-layer error types.

pub mod codec;
pub mod error;
pub mod protocol;
pub mod session;

pub use codec::{Envelope, decode, encode};
pub use error::NetError;
pub use protocol::{ClientMessage, ServerMessage, WorldUpdate};
pub use session::{ChannelSink, FrameSink, Session, SessionEvent, SessionState, TransportEvent};
