//! Latency probe
//!
//! The protocol has no correlation IDs, so this measures the time from the
//! last ping to the *next inbound message of any kind*. The backend answers
//! every ping with a snapshot, which keeps the approximation close to the
//! real round trip.

use chrono::{DateTime, Utc};
use fms_core::LatencyMs;
use tracing::debug;

/// Ping awaiting the next inbound message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LatencyMeasurement {
    pub sent_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub struct LatencyProbe {
    pending: Option<LatencyMeasurement>,
    current: Option<LatencyMs>,
}

impl LatencyProbe {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a ping send. Overwrites any measurement still pending.
    pub fn ping_sent(&mut self, now: DateTime<Utc>) {
        self.pending = Some(LatencyMeasurement { sent_at: now });
    }

    /// Account for an inbound message.
    ///
    /// Returns the new latency when a measurement was pending; otherwise the
    /// reported latency is left alone.
    pub fn message_received(&mut self, now: DateTime<Utc>) -> Option<LatencyMs> {
        let measurement = self.pending.take()?;
        let latency = LatencyMs::from_elapsed(now - measurement.sent_at);
        debug!("Latency sample: {}", latency);
        self.current = Some(latency);
        Some(latency)
    }

    /// Last reported latency
    pub fn current(&self) -> Option<LatencyMs> {
        self.current
    }

    pub fn pending(&self) -> Option<LatencyMeasurement> {
        self.pending
    }

    /// Forget everything; called when the connection is replaced
    pub fn reset(&mut self) {
        self.pending = None;
        self.current = None;
    }
}
