//! View model derived from a state snapshot

use std::collections::BTreeSet;

/// Segments of the four-step match progress indicator, in match order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StepperSegment {
    Idle,
    Auto,
    Teleop,
    Endgame,
}

impl StepperSegment {
    pub const ALL: [StepperSegment; 4] = [
        StepperSegment::Idle,
        StepperSegment::Auto,
        StepperSegment::Teleop,
        StepperSegment::Endgame,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            StepperSegment::Idle => "Idle",
            StepperSegment::Auto => "Auto",
            StepperSegment::Teleop => "Teleop",
            StepperSegment::Endgame => "Endgame",
        }
    }
}

/// The three timer readouts
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TimerKind {
    Auto,
    Teleop,
    Endgame,
}

impl TimerKind {
    pub const ALL: [TimerKind; 3] = [TimerKind::Auto, TimerKind::Teleop, TimerKind::Endgame];

    pub fn label(&self) -> &'static str {
        match self {
            TimerKind::Auto => "Auto",
            TimerKind::Teleop => "Teleop",
            TimerKind::Endgame => "Endgame",
        }
    }
}

/// Which half of the start/stop toggle is shown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimaryAction {
    StartMatch,
    StopMatch,
}

/// What the dashboard should show for one snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchView {
    pub banner: String,
    pub stepper: BTreeSet<StepperSegment>,
    /// Visible timers and their readouts; hidden timers are absent
    pub timers: Vec<(TimerKind, String)>,
    pub primary_action: PrimaryAction,
}

impl MatchView {
    pub fn is_active(&self, segment: StepperSegment) -> bool {
        self.stepper.contains(&segment)
    }

    pub fn timer(&self, kind: TimerKind) -> Option<&str> {
        self.timers
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, value)| value.as_str())
    }

    pub fn visible_timers(&self) -> BTreeSet<TimerKind> {
        self.timers.iter().map(|(kind, _)| *kind).collect()
    }

    pub fn shows_start(&self) -> bool {
        self.primary_action == PrimaryAction::StartMatch
    }

    pub fn shows_stop(&self) -> bool {
        self.primary_action == PrimaryAction::StopMatch
    }
}
