//! Connection lifecycle and reconnect policy
//!
//! Pure state machine: the session feeds it socket events and the current
//! time, and asks it whether the reconnect timer has fired.

use chrono::{DateTime, Duration, Utc};
use fms_core::{ConnectionId, ConnectionState};
use tracing::{debug, info, warn};

/// Fixed delay between a drop and the next connect attempt
pub const RECONNECT_DELAY: std::time::Duration = std::time::Duration::from_secs(1);

const STATUS_CONNECTING: &str = "Connecting to FMS backend";
const STATUS_ESTABLISHED: &str = "FMS connection established";
const STATUS_LOST: &str = "FMS backend connection lost";

/// Handle for a pending timer. Stored so a teardown can cancel it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledTask {
    pub due_at: DateTime<Utc>,
}

impl ScheduledTask {
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        now >= self.due_at
    }
}

#[derive(Debug)]
pub struct ConnectionManager {
    state: ConnectionState,
    current: Option<ConnectionId>,
    next_id: u64,
    /// Whether the current connection ever reached Connected
    opened: bool,
    reconnect: Option<ScheduledTask>,
    reconnect_delay: Duration,
    status: String,
    consecutive_failures: u32,
}

impl ConnectionManager {
    pub fn new(reconnect_delay: std::time::Duration) -> Self {
        Self {
            state: ConnectionState::Disconnected,
            current: None,
            next_id: 0,
            opened: false,
            reconnect: None,
            reconnect_delay: Duration::from_std(reconnect_delay)
                .unwrap_or_else(|_| Duration::seconds(1)),
            status: STATUS_CONNECTING.to_string(),
            consecutive_failures: 0,
        }
    }

    /// Start a new connection attempt and return its id.
    ///
    /// Any previous connection is forgotten: its late events become stale.
    pub fn connect(&mut self) -> ConnectionId {
        self.next_id += 1;
        let id = ConnectionId(self.next_id);
        self.current = Some(id);
        self.opened = false;
        self.reconnect = None;
        self.state = ConnectionState::Connecting;
        debug!("Connecting ({})", id);
        id
    }

    /// Socket opened. Returns false for stale ids.
    pub fn opened(&mut self, id: ConnectionId) -> bool {
        if !self.is_current(id) {
            debug!("Ignoring open from stale {}", id);
            return false;
        }
        self.state = ConnectionState::Connected;
        self.opened = true;
        self.consecutive_failures = 0;
        self.status = STATUS_ESTABLISHED.to_string();
        info!("FMS connection established ({})", id);
        true
    }

    /// Socket errored.
    ///
    /// Returns the id the caller must close. No reconnect is scheduled here:
    /// the close that follows schedules it, so one failure is counted once.
    pub fn errored(&mut self, id: ConnectionId, reason: Option<String>) -> Option<ConnectionId> {
        if !self.is_current(id) {
            debug!("Ignoring error from stale {}", id);
            return None;
        }
        let reason = normalize(reason);
        warn!(
            "FMS connection error ({}): {}",
            id,
            reason.as_deref().unwrap_or("no reason given")
        );
        self.state = ConnectionState::Disconnected;
        self.status = lost_status(reason.as_deref());
        Some(id)
    }

    /// Socket closed. Returns false for stale ids.
    pub fn closed(&mut self, id: ConnectionId, reason: Option<String>, now: DateTime<Utc>) -> bool {
        if !self.is_current(id) {
            debug!("Ignoring close from stale {}", id);
            return false;
        }
        self.connection_lost(reason, now);
        true
    }

    /// A send on the current connection failed; treated like a close.
    ///
    /// The connection is detached, so its own close event arrives stale.
    pub fn send_failed(&mut self, id: ConnectionId, reason: String, now: DateTime<Utc>) -> bool {
        if !self.is_current(id) {
            return false;
        }
        self.connection_lost(Some(reason), now);
        true
    }

    fn connection_lost(&mut self, reason: Option<String>, now: DateTime<Utc>) {
        let reason = normalize(reason);
        if !self.opened {
            self.consecutive_failures += 1;
        }
        self.state = ConnectionState::Disconnected;
        self.current = None;
        self.opened = false;
        self.status = lost_status(reason.as_deref());

        if self.reconnect.is_none() {
            let task = ScheduledTask {
                due_at: now + self.reconnect_delay,
            };
            self.reconnect = Some(task);
            info!(
                "FMS connection lost{}; reconnecting in {}ms (failed attempts: {})",
                reason.map(|r| format!(" ({})", r)).unwrap_or_default(),
                self.reconnect_delay.num_milliseconds(),
                self.consecutive_failures
            );
        }
    }

    /// Consume the reconnect timer if it has fired
    pub fn take_due_reconnect(&mut self, now: DateTime<Utc>) -> bool {
        match self.reconnect {
            Some(task) if task.is_due(now) => {
                self.reconnect = None;
                true
            }
            _ => false,
        }
    }

    /// Cancel the pending reconnect, if any
    pub fn cancel_reconnect(&mut self) -> Option<ScheduledTask> {
        self.reconnect.take()
    }

    pub fn next_deadline(&self) -> Option<DateTime<Utc>> {
        self.reconnect.map(|task| task.due_at)
    }

    pub fn pending_reconnect(&self) -> Option<ScheduledTask> {
        self.reconnect
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn current(&self) -> Option<ConnectionId> {
        self.current
    }

    /// Operator-visible status line
    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    fn is_current(&self, id: ConnectionId) -> bool {
        self.current == Some(id)
    }
}

impl Default for ConnectionManager {
    fn default() -> Self {
        Self::new(RECONNECT_DELAY)
    }
}

fn normalize(reason: Option<String>) -> Option<String> {
    reason.filter(|r| !r.trim().is_empty())
}

fn lost_status(reason: Option<&str>) -> String {
    match reason {
        Some(reason) => format!("{}: {}", STATUS_LOST, reason),
        None => STATUS_LOST.to_string(),
    }
}
