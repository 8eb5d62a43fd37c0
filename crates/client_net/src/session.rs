//! Transport session: one logical connection to the server.
//!
//! The actual socket (and any reconnect policy) lives outside this crate.
//! Whatever that layer is, it provides the outbound half as a [`FrameSink`]
//! and feeds inbound [`TransportEvent`]s in arrival order. The session
//! reduces those to a small internal event set and enforces the
//! fire-and-forget send contract: sending while not open drops the frame,
//! it never queues.

use tracing::{debug, warn};

use crate::codec::{self, Envelope};

/// Outbound half of the transport: accepts one encoded frame per call.
pub trait FrameSink {
    fn send(&mut self, frame: Vec<u8>);
}

/// A [`FrameSink`] over an unbounded tokio channel. The transport task on
/// the other end owns the socket write half.
#[derive(Debug, Clone)]
pub struct ChannelSink(pub tokio::sync::mpsc::UnboundedSender<Vec<u8>>);

impl FrameSink for ChannelSink {
    fn send(&mut self, frame: Vec<u8>) {
        // A dropped receiver means the transport task is gone; the session
        // will observe Closed shortly, so the frame is simply lost.
        let _ = self.0.send(frame);
    }
}

/// Connection state of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Constructed, transport not yet open.
    Connecting,
    /// Transport open; frames flow both ways.
    Open,
    /// Transport closed or errored. Terminal; build a new session to
    /// reconnect.
    Closed,
}

/// Raw events from the external transport layer, in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportEvent {
    Opened,
    Closed { reason: String },
    Errored { detail: String },
    Frame(Vec<u8>),
}

/// Events the session surfaces to the synchronization layer.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Opened,
    Closed,
    Envelope(Envelope),
}

/// One logical connection.
pub struct Session<S: FrameSink> {
    sink: S,
    state: SessionState,
}

impl<S: FrameSink> Session<S> {
    #[must_use]
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            state: SessionState::Connecting,
        }
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.state == SessionState::Open
    }

    /// Translate one transport event into at most one session event.
    ///
    /// Malformed frames are logged and swallowed — the connection stays
    /// open and later frames are unaffected. Transport close and error both
    /// land in the terminal `Closed` state; only the first transition is
    /// surfaced.
    pub fn handle_transport_event(&mut self, event: TransportEvent) -> Option<SessionEvent> {
        match event {
            TransportEvent::Opened => {
                self.state = SessionState::Open;
                debug!("session opened");
                Some(SessionEvent::Opened)
            }
            TransportEvent::Closed { reason } => {
                debug!(%reason, "session closed");
                self.close()
            }
            TransportEvent::Errored { detail } => {
                warn!(%detail, "transport error");
                self.close()
            }
            TransportEvent::Frame(bytes) => {
                if self.state != SessionState::Open {
                    debug!(len = bytes.len(), "frame received while not open, dropping");
                    return None;
                }
                match codec::decode(&bytes) {
                    Ok(envelope) => Some(SessionEvent::Envelope(envelope)),
                    Err(err) => {
                        warn!(%err, len = bytes.len(), "dropping malformed frame");
                        None
                    }
                }
            }
        }
    }

    /// Move to the terminal `Closed` state, surfacing the transition only
    /// the first time.
    fn close(&mut self) -> Option<SessionEvent> {
        if self.state == SessionState::Closed {
            return None;
        }
        self.state = SessionState::Closed;
        Some(SessionEvent::Closed)
    }

    /// Encode and send one envelope.
    ///
    /// Fire-and-forget: while the session is not open this is a no-op and
    /// the message is dropped, not deferred. Encoding failures are likewise
    /// logged and dropped.
    pub fn send(&mut self, envelope: &Envelope) {
        if self.state != SessionState::Open {
            debug!(kind = envelope.kind, "send while not open, dropping");
            return;
        }
        match codec::encode(envelope) {
            Ok(frame) => self.sink.send(frame),
            Err(err) => warn!(%err, kind = envelope.kind, "failed to encode outbound frame"),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use rmpv::Value;

    use super::*;

    /// Sink sharing its frame log with the test body.
    #[derive(Clone, Default)]
    struct RecordingSink(Rc<RefCell<Vec<Vec<u8>>>>);

    impl FrameSink for RecordingSink {
        fn send(&mut self, frame: Vec<u8>) {
            self.0.borrow_mut().push(frame);
        }
    }

    fn open_session() -> (Session<RecordingSink>, Rc<RefCell<Vec<Vec<u8>>>>) {
        let sink = RecordingSink::default();
        let frames = sink.0.clone();
        let mut session = Session::new(sink);
        session.handle_transport_event(TransportEvent::Opened);
        (session, frames)
    }

    #[test]
    fn test_send_before_open_is_dropped() {
        let sink = RecordingSink::default();
        let frames = sink.0.clone();
        let mut session = Session::new(sink);

        session.send(&Envelope::new(0, Value::from("nope")));
        assert!(frames.borrow().is_empty());
        assert_eq!(session.state(), SessionState::Connecting);
    }

    #[test]
    fn test_send_while_open_reaches_sink() {
        let (mut session, frames) = open_session();
        let envelope = Envelope::new(1, Value::Array(vec![Value::from(4), Value::from(9)]));
        session.send(&envelope);

        let frames = frames.borrow();
        assert_eq!(frames.len(), 1);
        assert_eq!(codec::decode(&frames[0]).unwrap(), envelope);
    }

    #[test]
    fn test_frame_decodes_to_envelope_event() {
        let (mut session, _) = open_session();
        let envelope = Envelope::new(0, Value::from(3));
        let event = session
            .handle_transport_event(TransportEvent::Frame(codec::encode(&envelope).unwrap()));
        assert_eq!(event, Some(SessionEvent::Envelope(envelope)));
    }

    #[test]
    fn test_malformed_frame_is_skipped_and_session_stays_open() {
        let (mut session, _) = open_session();
        let event = session.handle_transport_event(TransportEvent::Frame(vec![0xc1]));
        assert_eq!(event, None);
        assert!(session.is_open());

        // The next well-formed frame still gets through.
        let envelope = Envelope::new(0, Value::from(1));
        let event = session
            .handle_transport_event(TransportEvent::Frame(codec::encode(&envelope).unwrap()));
        assert!(matches!(event, Some(SessionEvent::Envelope(_))));
    }

    #[test]
    fn test_close_is_terminal_and_surfaced_once() {
        let (mut session, frames) = open_session();
        let event = session.handle_transport_event(TransportEvent::Closed {
            reason: "server going away".to_string(),
        });
        assert_eq!(event, Some(SessionEvent::Closed));
        assert_eq!(session.state(), SessionState::Closed);

        // Repeated close/error events are absorbed.
        let event = session.handle_transport_event(TransportEvent::Errored {
            detail: "socket reset".to_string(),
        });
        assert_eq!(event, None);

        // Sends after close are dropped.
        session.send(&Envelope::new(0, Value::from("late")));
        assert!(frames.borrow().is_empty());
    }

    #[test]
    fn test_frame_before_open_is_dropped() {
        let sink = RecordingSink::default();
        let mut session = Session::new(sink);
        let envelope = Envelope::new(0, Value::from(1));
        let event = session
            .handle_transport_event(TransportEvent::Frame(codec::encode(&envelope).unwrap()));
        assert_eq!(event, None);
    }
}
