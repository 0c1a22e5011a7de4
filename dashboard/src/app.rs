//! Dashboard state: the session plus the composed view
//!
//! Socket events go through the session, snapshots through the match
//! projection, and the result lands in one `DashboardView` for the renderer.

use fms_core::{AllianceStation, LatencyMs, MatchView, TEAM_PLACEHOLDER};
use fms_engine::{project, DispatchOutcome};
use fms_networking::clock::Clock;
use fms_networking::websocket::{
    ConnectionId, ConnectionSession, SendOutcome, SessionUpdate, SocketEvent, Transport,
};
use std::time::Duration;
use tracing::debug;

/// Everything the rendering layer draws
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardView {
    pub banner: String,
    pub connected: bool,
    /// `None` renders as the placeholder
    pub latency: Option<LatencyMs>,
    /// Last projected snapshot; kept across reconnects
    pub match_view: Option<MatchView>,
    pub match_clock: Option<String>,
    pub teams: Vec<(AllianceStation, String)>,
}

impl DashboardView {
    pub fn new(banner: impl Into<String>) -> Self {
        Self {
            banner: banner.into(),
            connected: false,
            latency: None,
            match_view: None,
            match_clock: None,
            teams: AllianceStation::ALL
                .iter()
                .map(|station| (*station, TEAM_PLACEHOLDER.to_string()))
                .collect(),
        }
    }

    pub fn latency_text(&self) -> String {
        match self.latency {
            Some(latency) => latency.to_string(),
            None => "- ms".to_string(),
        }
    }
}

pub struct Dashboard<T, C> {
    session: ConnectionSession<T, C>,
    view: DashboardView,
}

impl<T: Transport, C: Clock> Dashboard<T, C> {
    pub fn new(session: ConnectionSession<T, C>) -> Self {
        let view = DashboardView::new(session.status());
        Self { session, view }
    }

    /// Open the first connection
    pub fn start(&mut self) {
        self.session.connect();
        self.refresh_connection();
    }

    /// Apply one socket event. Returns true when the view changed.
    pub fn handle_event(&mut self, id: ConnectionId, event: SocketEvent) -> bool {
        let update = self.session.handle(id, event);
        self.apply(update)
    }

    fn apply(&mut self, update: SessionUpdate) -> bool {
        match update {
            SessionUpdate::Connected => {
                self.view.banner = self.session.status().to_string();
            }
            SessionUpdate::Disconnected { status } => {
                self.view.banner = status;
            }
            SessionUpdate::Snapshot { snapshot, .. } => {
                let match_view = project(&snapshot);
                self.view.banner = match_view.banner.clone();
                self.view.match_clock = snapshot.current_timer;
                self.view.match_view = Some(match_view);
            }
            SessionUpdate::Ignored => return false,
        }
        self.refresh_connection();
        true
    }

    /// Ping tick
    pub fn tick_ping(&mut self) -> bool {
        match self.session.ping() {
            SendOutcome::ConnectionLost => {
                self.connection_lost();
                true
            }
            SendOutcome::Sent | SendOutcome::NotConnected => false,
        }
    }

    /// Fire the reconnect timer if due
    pub fn poll_timers(&mut self) -> bool {
        match self.session.poll_timers() {
            Some(id) => {
                debug!("Reconnect timer fired, opened {}", id);
                self.refresh_connection();
                true
            }
            None => false,
        }
    }

    /// Reflect a dispatched command's fate in the view
    pub fn after_dispatch(&mut self, outcome: DispatchOutcome) -> bool {
        match outcome {
            DispatchOutcome::Sent(SendOutcome::ConnectionLost) => {
                self.connection_lost();
                true
            }
            _ => false,
        }
    }

    /// Time left until the reconnect timer is due
    pub fn until_next_deadline(&self) -> Option<Duration> {
        self.session
            .next_deadline()
            .map(|due| (due - self.session.now()).to_std().unwrap_or(Duration::ZERO))
    }

    pub fn shutdown(&mut self) {
        self.session.shutdown();
    }

    fn connection_lost(&mut self) {
        self.view.banner = self.session.status().to_string();
        self.refresh_connection();
    }

    fn refresh_connection(&mut self) {
        self.view.connected = self.session.state().is_connected();
        self.view.latency = self.session.latency();
    }

    pub fn view(&self) -> &DashboardView {
        &self.view
    }

    pub fn session(&self) -> &ConnectionSession<T, C> {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut ConnectionSession<T, C> {
        &mut self.session
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fms_core::{Error, MatchPhase, Result, StateSnapshot, StepperSegment};
    use fms_engine::{CommandDispatcher, OperatorPrompt};
    use fms_networking::clock::ManualClock;

    #[derive(Default)]
    struct FakeTransport {
        opened: Vec<ConnectionId>,
        sent: Vec<String>,
        fail_sends: bool,
    }

    impl Transport for FakeTransport {
        fn open(&mut self, id: ConnectionId, _endpoint: &str) {
            self.opened.push(id);
        }

        fn send(&mut self, _id: ConnectionId, text: String) -> Result<()> {
            if self.fail_sends {
                return Err(Error::SendFailed("broken pipe".to_string()));
            }
            self.sent.push(text);
            Ok(())
        }

        fn close(&mut self, _id: ConnectionId) {}
    }

    struct AlwaysYes;

    impl OperatorPrompt for AlwaysYes {
        async fn confirm(&mut self, _question: &str) -> bool {
            true
        }

        fn notify(&mut self, _message: &str) {}
    }

    fn dashboard() -> (Dashboard<FakeTransport, ManualClock>, ManualClock) {
        let clock = ManualClock::default();
        let session = ConnectionSession::new("ws://fms/ws", FakeTransport::default(), clock.clone());
        let mut dashboard = Dashboard::new(session);
        dashboard.start();
        (dashboard, clock)
    }

    fn connected() -> (Dashboard<FakeTransport, ManualClock>, ManualClock, ConnectionId) {
        let (mut dashboard, clock) = dashboard();
        let id = dashboard.session().current().unwrap();
        dashboard.handle_event(id, SocketEvent::Opened);
        (dashboard, clock, id)
    }

    #[test]
    fn test_initial_view() {
        let (dashboard, _) = dashboard();
        let view = dashboard.view();

        assert!(!view.connected);
        assert_eq!(view.latency_text(), "- ms");
        assert_eq!(view.teams.len(), 6);
        assert!(view.teams.iter().all(|(_, team)| team == "0000"));
        assert!(view.match_view.is_none());
    }

    #[test]
    fn test_open_then_snapshot_updates_view() {
        let (mut dashboard, clock, id) = connected();
        assert!(dashboard.view().connected);
        assert_eq!(dashboard.view().banner, "FMS connection established");

        dashboard.tick_ping();
        clock.advance_ms(31);
        let mut snapshot = StateSnapshot::new(MatchPhase::Auto, "9s", "2m20s", "30s");
        snapshot.current_timer = Some("0:09".to_string());
        assert!(dashboard.handle_event(id, SocketEvent::Message(snapshot)));

        let view = dashboard.view();
        assert_eq!(view.banner, "Running: Auto");
        assert_eq!(view.latency_text(), "31 ms");
        assert_eq!(view.match_clock.as_deref(), Some("0:09"));
        let match_view = view.match_view.as_ref().unwrap();
        assert!(match_view.is_active(StepperSegment::Auto));
        assert!(match_view.shows_stop());
    }

    #[test]
    fn test_drop_shows_placeholder_and_reconnects() {
        let (mut dashboard, clock, id) = connected();
        dashboard.tick_ping();
        clock.advance_ms(10);
        dashboard.handle_event(
            id,
            SocketEvent::Message(StateSnapshot::new(MatchPhase::Idle, "", "", "")),
        );

        dashboard.handle_event(id, SocketEvent::Closed(Some("going away".to_string())));
        let view = dashboard.view();
        assert!(!view.connected);
        assert_eq!(view.latency_text(), "- ms");
        assert_eq!(view.banner, "FMS backend connection lost: going away");
        // Last match state stays on screen
        assert!(view.match_view.is_some());

        assert_eq!(dashboard.until_next_deadline(), Some(Duration::from_secs(1)));
        clock.advance_ms(1000);
        assert!(dashboard.poll_timers());
        assert_eq!(dashboard.session().transport().opened.len(), 2);
    }

    #[test]
    fn test_stale_event_leaves_view_alone() {
        let (mut dashboard, _, id) = connected();
        let before = dashboard.view().clone();

        assert!(!dashboard.handle_event(ConnectionId(id.0 + 10), SocketEvent::Closed(None)));
        assert_eq!(dashboard.view(), &before);
    }

    #[tokio::test]
    async fn test_failed_command_send_marks_connection_lost() {
        let (mut dashboard, _, _) = connected();
        let mut prompt = AlwaysYes;

        let outcome = CommandDispatcher::new(dashboard.session_mut(), &mut prompt)
            .estop("B2")
            .await
            .unwrap();
        assert_eq!(outcome, DispatchOutcome::Sent(SendOutcome::Sent));
        assert_eq!(
            dashboard.session().transport().sent,
            vec![r#"{"message":"estop","arg":"B2"}"#.to_string()]
        );

        dashboard.session_mut().transport_mut().fail_sends = true;
        let outcome = CommandDispatcher::new(dashboard.session_mut(), &mut prompt)
            .start()
            .unwrap();
        assert!(dashboard.after_dispatch(outcome));
        assert!(!dashboard.view().connected);
        assert_eq!(
            dashboard.view().banner,
            "FMS backend connection lost: Send failed: broken pipe"
        );
    }
}
