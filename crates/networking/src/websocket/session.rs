//! The single owned connection session
//!
//! Holds the transport handle, the lifecycle state and the pending latency
//! measurement. Everything else reaches the socket through `send`.

use crate::clock::Clock;
use crate::codec;
use crate::latency::LatencyProbe;
use chrono::{DateTime, Utc};
use fms_core::{ConnectionId, ConnectionState, LatencyMs, OutboundCommand, Result, StateSnapshot};
use tracing::{debug, info, warn};

use super::manager::{ConnectionManager, RECONNECT_DELAY};
use super::transport::Transport;
use super::SocketEvent;

/// What a handled event means for the view
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionUpdate {
    Connected,
    Disconnected { status: String },
    Snapshot {
        snapshot: StateSnapshot,
        /// Set only when this message completed a latency measurement
        latency: Option<LatencyMs>,
    },
    /// Stale or out-of-state event; nothing changed
    Ignored,
}

/// Result of handing a command to the socket.
///
/// There is no acknowledgement protocol, so `Sent` only means the frame was
/// queued on an open connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    Sent,
    /// Not connected; the frame was dropped
    NotConnected,
    /// The write failed and the connection is now treated as lost
    ConnectionLost,
}

pub struct ConnectionSession<T, C> {
    endpoint: String,
    transport: T,
    clock: C,
    manager: ConnectionManager,
    probe: LatencyProbe,
}

impl<T: Transport, C: Clock> ConnectionSession<T, C> {
    pub fn new(endpoint: impl Into<String>, transport: T, clock: C) -> Self {
        Self {
            endpoint: endpoint.into(),
            transport,
            clock,
            manager: ConnectionManager::new(RECONNECT_DELAY),
            probe: LatencyProbe::new(),
        }
    }

    pub fn with_reconnect_delay(mut self, delay: std::time::Duration) -> Self {
        self.manager = ConnectionManager::new(delay);
        self
    }

    /// Open a brand-new connection to the backend
    pub fn connect(&mut self) -> ConnectionId {
        let id = self.manager.connect();
        self.probe.reset();
        info!("Connecting to {} ({})", self.endpoint, id);
        self.transport.open(id, &self.endpoint);
        id
    }

    /// Single entry point for socket events
    pub fn handle(&mut self, id: ConnectionId, event: SocketEvent) -> SessionUpdate {
        let now = self.clock.now();
        match event {
            SocketEvent::Opened => {
                if self.manager.opened(id) {
                    SessionUpdate::Connected
                } else {
                    SessionUpdate::Ignored
                }
            }
            SocketEvent::Errored(reason) => match self.manager.errored(id, reason) {
                Some(id) => {
                    self.transport.close(id);
                    self.probe.reset();
                    self.disconnected()
                }
                None => SessionUpdate::Ignored,
            },
            SocketEvent::Closed(reason) => {
                if self.manager.closed(id, reason, now) {
                    self.probe.reset();
                    self.disconnected()
                } else {
                    SessionUpdate::Ignored
                }
            }
            SocketEvent::Message(snapshot) => {
                if self.manager.current() != Some(id) || !self.manager.state().is_connected() {
                    debug!("Dropping message from inactive {}", id);
                    return SessionUpdate::Ignored;
                }
                let latency = self.probe.message_received(now);
                SessionUpdate::Snapshot { snapshot, latency }
            }
        }
    }

    /// Fire the reconnect timer if it is due. Returns the new connection id.
    pub fn poll_timers(&mut self) -> Option<ConnectionId> {
        let now = self.clock.now();
        if self.manager.take_due_reconnect(now) {
            Some(self.connect())
        } else {
            None
        }
    }

    /// Latency tick: send a ping and start a measurement
    pub fn ping(&mut self) -> SendOutcome {
        let now = self.clock.now();
        match self.send(&OutboundCommand::Ping) {
            Ok(SendOutcome::Sent) => {
                self.probe.ping_sent(now);
                SendOutcome::Sent
            }
            Ok(outcome) => outcome,
            // A ping always encodes
            Err(_) => SendOutcome::NotConnected,
        }
    }

    /// Encode and send a command on the live connection.
    ///
    /// Errors only for commands that fail validation; socket trouble is
    /// reported through the outcome and handled as a lost connection.
    pub fn send(&mut self, command: &OutboundCommand) -> Result<SendOutcome> {
        let text = codec::encode(command)?;

        let id = match self.manager.current() {
            Some(id) if self.manager.state().is_connected() => id,
            _ => {
                debug!("Not connected, dropping {}", command.wire_name());
                return Ok(SendOutcome::NotConnected);
            }
        };

        match self.transport.send(id, text) {
            Ok(()) => {
                if !matches!(command, OutboundCommand::Ping) {
                    info!("Sent {} ({})", command.wire_name(), id);
                }
                Ok(SendOutcome::Sent)
            }
            Err(e) => {
                warn!("Send of {} failed: {}", command.wire_name(), e);
                let now = self.clock.now();
                self.manager.send_failed(id, e.to_string(), now);
                self.transport.close(id);
                self.probe.reset();
                Ok(SendOutcome::ConnectionLost)
            }
        }
    }

    /// Stop reconnecting and close the live connection
    pub fn shutdown(&mut self) {
        self.manager.cancel_reconnect();
        if let Some(id) = self.manager.current() {
            info!("Closing {}", id);
            self.transport.close(id);
        }
    }

    fn disconnected(&self) -> SessionUpdate {
        SessionUpdate::Disconnected {
            status: self.manager.status().to_string(),
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.manager.state()
    }

    pub fn status(&self) -> &str {
        self.manager.status()
    }

    /// Latest latency; `None` while disconnected or before the first sample
    pub fn latency(&self) -> Option<LatencyMs> {
        if self.manager.state().is_connected() {
            self.probe.current()
        } else {
            None
        }
    }

    pub fn next_deadline(&self) -> Option<DateTime<Utc>> {
        self.manager.next_deadline()
    }

    pub fn current(&self) -> Option<ConnectionId> {
        self.manager.current()
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use fms_core::{Error, MatchPhase};

    #[derive(Default)]
    struct FakeTransport {
        opened: Vec<ConnectionId>,
        sent: Vec<(ConnectionId, String)>,
        closed: Vec<ConnectionId>,
        fail_sends: bool,
    }

    impl Transport for FakeTransport {
        fn open(&mut self, id: ConnectionId, _endpoint: &str) {
            self.opened.push(id);
        }

        fn send(&mut self, id: ConnectionId, text: String) -> Result<()> {
            if self.fail_sends {
                return Err(Error::SendFailed("socket closed".to_string()));
            }
            self.sent.push((id, text));
            Ok(())
        }

        fn close(&mut self, id: ConnectionId) {
            self.closed.push(id);
        }
    }

    fn session() -> (ConnectionSession<FakeTransport, ManualClock>, ManualClock) {
        let clock = ManualClock::default();
        let session =
            ConnectionSession::new("ws://fms.local/ws", FakeTransport::default(), clock.clone());
        (session, clock)
    }

    fn idle() -> StateSnapshot {
        StateSnapshot::new(MatchPhase::Idle, "10s", "2m20s", "30s")
    }

    #[test]
    fn test_connect_opens_transport() {
        let (mut session, _) = session();
        let id = session.connect();

        assert_eq!(session.transport().opened, vec![id]);
        assert_eq!(session.state(), ConnectionState::Connecting);
        assert_eq!(session.handle(id, SocketEvent::Opened), SessionUpdate::Connected);
        assert_eq!(session.state(), ConnectionState::Connected);
    }

    #[test]
    fn test_close_reconnects_after_one_second() {
        let (mut session, clock) = session();
        let first = session.connect();
        session.handle(first, SocketEvent::Opened);

        let update = session.handle(first, SocketEvent::Closed(Some("bye".to_string())));
        assert_eq!(
            update,
            SessionUpdate::Disconnected {
                status: "FMS backend connection lost: bye".to_string()
            }
        );

        clock.advance_ms(999);
        assert_eq!(session.poll_timers(), None);

        clock.advance_ms(1);
        let second = session.poll_timers().expect("reconnect should fire at 1000ms");
        assert_ne!(first, second);
        assert_eq!(session.transport().opened, vec![first, second]);
    }

    #[test]
    fn test_error_closes_socket_and_waits_for_close() {
        let (mut session, _) = session();
        let id = session.connect();

        let update = session.handle(id, SocketEvent::Errored(Some("refused".to_string())));
        assert!(matches!(update, SessionUpdate::Disconnected { .. }));
        assert_eq!(session.transport().closed, vec![id]);
        assert_eq!(session.next_deadline(), None);

        session.handle(id, SocketEvent::Closed(None));
        assert!(session.next_deadline().is_some());
    }

    #[test]
    fn test_latency_measures_ping_to_next_message() {
        let (mut session, clock) = session();
        let id = session.connect();
        session.handle(id, SocketEvent::Opened);

        assert_eq!(session.ping(), SendOutcome::Sent);
        assert_eq!(session.transport().sent[0].1, r#"{"message":"ping"}"#);

        clock.advance_ms(23);
        match session.handle(id, SocketEvent::Message(idle())) {
            SessionUpdate::Snapshot { latency, .. } => assert_eq!(latency, Some(LatencyMs(23))),
            other => panic!("unexpected update: {:?}", other),
        }

        clock.advance_ms(400);
        match session.handle(id, SocketEvent::Message(idle())) {
            SessionUpdate::Snapshot { latency, .. } => assert_eq!(latency, None),
            other => panic!("unexpected update: {:?}", other),
        }
        assert_eq!(session.latency(), Some(LatencyMs(23)));
    }

    #[test]
    fn test_ping_while_disconnected_is_dropped() {
        let (mut session, _) = session();
        session.connect();

        assert_eq!(session.ping(), SendOutcome::NotConnected);
        assert!(session.transport().sent.is_empty());
        assert_eq!(session.latency(), None);
    }

    #[test]
    fn test_send_failure_counts_as_connection_loss() {
        let (mut session, clock) = session();
        let id = session.connect();
        session.handle(id, SocketEvent::Opened);
        session.transport.fail_sends = true;

        let outcome = session.send(&OutboundCommand::Start).unwrap();

        assert_eq!(outcome, SendOutcome::ConnectionLost);
        assert_eq!(session.state(), ConnectionState::Disconnected);
        assert_eq!(session.transport().closed, vec![id]);
        // The socket's own close event is stale now
        assert_eq!(session.handle(id, SocketEvent::Closed(None)), SessionUpdate::Ignored);

        clock.advance_ms(1000);
        assert!(session.poll_timers().is_some());
    }

    #[test]
    fn test_invalid_command_is_an_error() {
        let (mut session, _) = session();
        let id = session.connect();
        session.handle(id, SocketEvent::Opened);

        assert!(session.send(&OutboundCommand::estop("")).is_err());
        assert!(session.transport().sent.is_empty());
    }

    #[test]
    fn test_messages_from_replaced_connection_are_ignored() {
        let (mut session, clock) = session();
        let old = session.connect();
        session.handle(old, SocketEvent::Opened);
        session.handle(old, SocketEvent::Closed(None));
        clock.advance_ms(1000);
        let new = session.poll_timers().unwrap();
        session.handle(new, SocketEvent::Opened);

        assert_eq!(session.handle(old, SocketEvent::Message(idle())), SessionUpdate::Ignored);
        assert!(matches!(
            session.handle(new, SocketEvent::Message(idle())),
            SessionUpdate::Snapshot { .. }
        ));
    }

    #[test]
    fn test_shutdown_cancels_reconnect() {
        let (mut session, clock) = session();
        let id = session.connect();
        session.handle(id, SocketEvent::Closed(None));

        session.shutdown();
        clock.advance_ms(5000);

        assert_eq!(session.poll_timers(), None);
    }
}
