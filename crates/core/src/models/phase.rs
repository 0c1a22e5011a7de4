//! Match phase reported by the backend

use serde::{Deserialize, Serialize};
use std::fmt;

/// Current segment of a match.
///
/// Labels the backend sends that we don't recognize are kept verbatim in
/// `Other` so newer backends still display something sensible.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MatchPhase {
    Idle,
    Auto,
    Teleop,
    Endgame,
    Other(String),
}

impl MatchPhase {
    /// Parse a wire label. Matching is exact, like the backend's constants.
    pub fn from_label(label: &str) -> Self {
        match label {
            "Idle" => MatchPhase::Idle,
            "Auto" => MatchPhase::Auto,
            "Teleop" => MatchPhase::Teleop,
            "Endgame" => MatchPhase::Endgame,
            other => MatchPhase::Other(other.to_string()),
        }
    }

    /// The label as the backend spells it
    pub fn label(&self) -> &str {
        match self {
            MatchPhase::Idle => "Idle",
            MatchPhase::Auto => "Auto",
            MatchPhase::Teleop => "Teleop",
            MatchPhase::Endgame => "Endgame",
            MatchPhase::Other(label) => label,
        }
    }

    /// Whether a match is considered running (anything but Idle)
    pub fn is_running(&self) -> bool {
        !matches!(self, MatchPhase::Idle)
    }
}

impl From<String> for MatchPhase {
    fn from(label: String) -> Self {
        match MatchPhase::from_label(&label) {
            MatchPhase::Other(_) => MatchPhase::Other(label),
            known => known,
        }
    }
}

impl From<MatchPhase> for String {
    fn from(phase: MatchPhase) -> Self {
        match phase {
            MatchPhase::Other(label) => label,
            known => known.label().to_string(),
        }
    }
}

impl fmt::Display for MatchPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_labels() {
        assert_eq!(MatchPhase::from_label("Idle"), MatchPhase::Idle);
        assert_eq!(MatchPhase::from_label("Endgame"), MatchPhase::Endgame);
        assert!(!MatchPhase::Idle.is_running());
        assert!(MatchPhase::Teleop.is_running());
    }

    #[test]
    fn test_unknown_label_is_preserved() {
        let phase = MatchPhase::from_label("Overtime");
        assert_eq!(phase, MatchPhase::Other("Overtime".to_string()));
        assert_eq!(phase.label(), "Overtime");
        assert!(phase.is_running());

        // Case matters: the backend only ever sends the capitalized form
        assert_eq!(
            MatchPhase::from_label("idle"),
            MatchPhase::Other("idle".to_string())
        );
    }
}
