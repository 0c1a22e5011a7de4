//! Match State Machine - snapshot to view model projection
//!
//! Stateless: each inbound snapshot is projected on its own. Stepper
//! progress is cumulative in match order, and only the timers relevant to
//! the current phase are visible.

use fms_core::{MatchPhase, MatchView, PrimaryAction, StateSnapshot, StepperSegment, TimerKind};

const BANNER_READY: &str = "Ready to start match";

/// Project a snapshot into what the dashboard shows
pub fn project(snapshot: &StateSnapshot) -> MatchView {
    let phase = &snapshot.phase;

    let banner = if phase.is_running() {
        format!("Running: {}", phase.label())
    } else {
        BANNER_READY.to_string()
    };

    let primary_action = if phase.is_running() {
        PrimaryAction::StopMatch
    } else {
        PrimaryAction::StartMatch
    };

    let timers = visible_timers(phase)
        .iter()
        .map(|kind| (*kind, timer_value(snapshot, *kind).to_string()))
        .collect();

    MatchView {
        banner,
        stepper: StepperSegment::ALL[..=progress(phase)].iter().copied().collect(),
        timers,
        primary_action,
    }
}

/// Index of the furthest active stepper segment.
/// Unrecognized phases stay at Idle.
fn progress(phase: &MatchPhase) -> usize {
    match phase {
        MatchPhase::Idle | MatchPhase::Other(_) => 0,
        MatchPhase::Auto => 1,
        MatchPhase::Teleop => 2,
        MatchPhase::Endgame => 3,
    }
}

// Endgame keeps the teleop timer on screen next to the endgame one.
fn visible_timers(phase: &MatchPhase) -> &'static [TimerKind] {
    match phase {
        MatchPhase::Auto => &[TimerKind::Auto],
        MatchPhase::Teleop => &[TimerKind::Teleop],
        MatchPhase::Endgame => &[TimerKind::Teleop, TimerKind::Endgame],
        MatchPhase::Idle | MatchPhase::Other(_) => &[],
    }
}

fn timer_value(snapshot: &StateSnapshot, kind: TimerKind) -> &str {
    match kind {
        TimerKind::Auto => &snapshot.auto_timer,
        TimerKind::Teleop => &snapshot.teleop_timer,
        TimerKind::Endgame => &snapshot.endgame_timer,
    }
}
