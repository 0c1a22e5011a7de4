//! Outbound commands sent to the FMS backend

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// A command for the backend.
///
/// The protocol is fire-and-forget: there is no correlation ID and no
/// acknowledgement, so a command is built fresh for every send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "message", rename_all = "snake_case")]
pub enum OutboundCommand {
    /// Latency probe; the backend answers with a state snapshot
    Ping,
    /// Start a match
    Start,
    /// Abort the running match
    Stop,
    /// Emergency-stop a single team's robot
    Estop {
        #[serde(rename = "arg")]
        team: String,
    },
    /// Force every driver station to reconnect
    DsReconnect,
    /// Play all game sounds to check audio levels
    TestSounds,
    /// Set the match name shown on the field displays
    MatchName { name: String },
}

impl OutboundCommand {
    pub fn estop(team: impl Into<String>) -> Self {
        OutboundCommand::Estop { team: team.into() }
    }

    pub fn match_name(name: impl Into<String>) -> Self {
        OutboundCommand::MatchName { name: name.into() }
    }

    /// The `message` value on the wire
    pub fn wire_name(&self) -> &'static str {
        match self {
            OutboundCommand::Ping => "ping",
            OutboundCommand::Start => "start",
            OutboundCommand::Stop => "stop",
            OutboundCommand::Estop { .. } => "estop",
            OutboundCommand::DsReconnect => "ds_reconnect",
            OutboundCommand::TestSounds => "test_sounds",
            OutboundCommand::MatchName { .. } => "match_name",
        }
    }

    /// Irreversible commands need an explicit operator confirmation
    pub fn requires_confirmation(&self) -> bool {
        matches!(
            self,
            OutboundCommand::Estop { .. } | OutboundCommand::DsReconnect
        )
    }

    /// Check that required arguments are present
    pub fn validate(&self) -> Result<()> {
        match self {
            OutboundCommand::Estop { team } if team.trim().is_empty() => Err(
                Error::InvalidCommand("estop requires a team identifier".to_string()),
            ),
            OutboundCommand::MatchName { name } if name.trim().is_empty() => Err(
                Error::InvalidCommand("match_name requires a name".to_string()),
            ),
            _ => Ok(()),
        }
    }
}
