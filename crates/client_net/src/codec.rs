//! MessagePack envelope codec.
//!
//! Every frame on the wire is exactly one [`Envelope`]: a 2-element
//! MessagePack array `[type, payload]`. The codec is type-agnostic — the
//! payload is carried as an arbitrary [`rmpv::Value`] tree and interpreted
//! by the [`protocol`](crate::protocol) layer.

use rmpv::Value;
use serde::{Deserialize, Serialize};

use crate::error::NetError;

/// The `[type, payload]` pair that is the unit of wire communication.
///
/// Serialises positionally, so the wire form is the MessagePack array
/// `[kind, payload]` — one envelope per frame, never split or batched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Message type discriminant. Payload shape is fixed per type.
    pub kind: u64,
    /// Arbitrary nested map/array/scalar tree.
    pub payload: Value,
}

impl Envelope {
    #[must_use]
    pub fn new(kind: u64, payload: Value) -> Self {
        Self { kind, payload }
    }
}

/// Encode an envelope to MessagePack bytes.
///
/// # Errors
///
/// Returns [`NetError::Encode`] if serialisation fails.
pub fn encode(envelope: &Envelope) -> Result<Vec<u8>, NetError> {
    rmp_serde::to_vec(envelope).map_err(NetError::Encode)
}

/// Decode one frame into an envelope.
///
/// # Errors
///
/// Returns [`NetError::MalformedFrame`] on truncated or ill-formed bytes.
/// Never panics; the caller logs, drops the frame, and keeps going.
pub fn decode(bytes: &[u8]) -> Result<Envelope, NetError> {
    rmp_serde::from_slice(bytes).map_err(NetError::MalformedFrame)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_decode_roundtrip() {
        let envelope = Envelope::new(
            1,
            Value::Array(vec![
                Value::from(50u64),
                Value::Array(vec![Value::from(4), Value::from(9)]),
            ]),
        );
        let bytes = encode(&envelope).unwrap();
        let restored = decode(&bytes).unwrap();
        assert_eq!(envelope, restored);
    }

    #[test]
    fn test_roundtrip_string_payload() {
        let envelope = Envelope::new(0, Value::from("player-one"));
        let restored = decode(&encode(&envelope).unwrap()).unwrap();
        assert_eq!(envelope, restored);
    }

    #[test]
    fn test_decode_garbage_is_malformed() {
        let result = decode(&[0xc1, 0xc1, 0xc1]);
        assert!(matches!(result, Err(NetError::MalformedFrame(_))));
    }

    #[test]
    fn test_decode_truncated_is_malformed() {
        let envelope = Envelope::new(1, Value::Array(vec![Value::from(1), Value::from(2)]));
        let bytes = encode(&envelope).unwrap();
        let result = decode(&bytes[..bytes.len() - 1]);
        assert!(matches!(result, Err(NetError::MalformedFrame(_))));
    }

    #[test]
    fn test_decode_non_envelope_is_malformed() {
        // A bare integer is valid MessagePack but not a 2-element envelope.
        let result = decode(&rmp_serde::to_vec(&7u64).unwrap());
        assert!(result.is_err());
    }
}
