//! Inbound state snapshot pushed by the backend

use super::MatchPhase;
use serde::{Deserialize, Serialize};

/// One state message from the FMS backend.
///
/// Snapshots are never mutated once received; every consumer derives its
/// own view from them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateSnapshot {
    #[serde(rename = "state")]
    pub phase: MatchPhase,
    pub auto_timer: String,
    pub teleop_timer: String,
    pub endgame_timer: String,
    /// Clock of the running period ("0:00" while idle). Older backends omit it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_timer: Option<String>,
}

impl StateSnapshot {
    pub fn new(
        phase: MatchPhase,
        auto_timer: impl Into<String>,
        teleop_timer: impl Into<String>,
        endgame_timer: impl Into<String>,
    ) -> Self {
        Self {
            phase,
            auto_timer: auto_timer.into(),
            teleop_timer: teleop_timer.into(),
            endgame_timer: endgame_timer.into(),
            current_timer: None,
        }
    }
}
