//! Shared type definitions and newtypes

use serde::{Deserialize, Serialize};
use std::fmt;

/// Placeholder shown in a team slot until a team number is assigned
pub const TEAM_PLACEHOLDER: &str = "0000";

/// Latency in whole milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LatencyMs(pub i64);

impl LatencyMs {
    pub fn new(millis: i64) -> Self {
        LatencyMs(millis)
    }

    /// Convert an elapsed duration, clamping clock skew below zero
    pub fn from_elapsed(elapsed: chrono::Duration) -> Self {
        LatencyMs(elapsed.num_milliseconds().max(0))
    }

    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for LatencyMs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ms", self.0)
    }
}

/// One of the six driver station positions on the field
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AllianceStation {
    R1,
    R2,
    R3,
    B1,
    B2,
    B3,
}

impl AllianceStation {
    pub const ALL: [AllianceStation; 6] = [
        AllianceStation::R1,
        AllianceStation::R2,
        AllianceStation::R3,
        AllianceStation::B1,
        AllianceStation::B2,
        AllianceStation::B3,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            AllianceStation::R1 => "R1",
            AllianceStation::R2 => "R2",
            AllianceStation::R3 => "R3",
            AllianceStation::B1 => "B1",
            AllianceStation::B2 => "B2",
            AllianceStation::B3 => "B3",
        }
    }

    pub fn is_red(&self) -> bool {
        matches!(
            self,
            AllianceStation::R1 | AllianceStation::R2 | AllianceStation::R3
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latency_clamps_negative() {
        let skewed = chrono::Duration::milliseconds(-4);
        assert_eq!(LatencyMs::from_elapsed(skewed), LatencyMs(0));
        assert_eq!(
            LatencyMs::from_elapsed(chrono::Duration::milliseconds(37)).to_string(),
            "37 ms"
        );
    }
}
