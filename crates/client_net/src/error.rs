//! Network-layer error types.

/// Errors that can occur while encoding, decoding, or interpreting frames.
///
/// None of these are fatal to the session: malformed frames and unknown
/// message types are logged and dropped by the caller while the connection
/// stays open.
#[derive(Debug, thiserror::Error)]
pub enum NetError {
    /// Failed to encode an envelope to MessagePack.
    #[error("failed to encode frame: {0}")]
    Encode(#[from] rmp_serde::encode::Error),

    /// Inbound bytes are not a well-formed envelope.
    #[error("malformed frame: {0}")]
    MalformedFrame(#[from] rmp_serde::decode::Error),

    /// The envelope decoded, but its payload does not have the shape the
    /// message type requires.
    #[error("malformed payload: {0}")]
    BadPayload(&'static str),

    /// The envelope carries a message type this client does not know.
    #[error("unknown message type {0}")]
    UnknownMessageType(u64),
}
