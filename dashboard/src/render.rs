//! Terminal rendering of the dashboard view

use crate::app::DashboardView;
use fms_core::{PrimaryAction, Result, StepperSegment, TimerKind};
use std::fmt::Write as _;
use std::io::Write;

pub trait Renderer {
    fn render(&mut self, view: &DashboardView) -> Result<()>;
}

/// Redraws the whole dashboard as a text block on every change
pub struct TerminalRenderer<W> {
    out: W,
}

impl<W: Write> TerminalRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> Renderer for TerminalRenderer<W> {
    fn render(&mut self, view: &DashboardView) -> Result<()> {
        self.out.write_all(format_view(view).as_bytes())?;
        self.out.flush()?;
        Ok(())
    }
}

/// Lay the view out as text
pub fn format_view(view: &DashboardView) -> String {
    let mut text = String::new();
    let indicator = if view.connected { "[connected]" } else { "[DISCONNECTED]" };

    let _ = writeln!(text, "------------------------------------------------------------");
    let _ = writeln!(text, "{}", view.banner);
    let _ = writeln!(text, "FMS {}  latency: {}", indicator, view.latency_text());

    let match_view = view.match_view.as_ref();

    let stepper: Vec<String> = StepperSegment::ALL
        .iter()
        .map(|segment| {
            if match_view.is_some_and(|m| m.is_active(*segment)) {
                format!("[{}]", segment.label())
            } else {
                format!(" {} ", segment.label().to_lowercase())
            }
        })
        .collect();
    let _ = writeln!(text, "Progress: {}", stepper.join(" > "));

    let timers: Vec<String> = TimerKind::ALL
        .iter()
        .map(|kind| match match_view.and_then(|m| m.timer(*kind)) {
            Some(value) => format!("{}: {}", kind.label(), value),
            None => kind.label().to_string(),
        })
        .collect();
    let _ = write!(text, "Timers: {}", timers.join(" | "));
    match &view.match_clock {
        Some(clock) => {
            let _ = writeln!(text, "  (clock {})", clock);
        }
        None => {
            let _ = writeln!(text);
        }
    }

    let action = match match_view.map(|m| m.primary_action) {
        Some(PrimaryAction::StopMatch) => "stop",
        Some(PrimaryAction::StartMatch) | None => "start",
    };
    let _ = writeln!(text, "Match control: {}", action);

    let (red, blue): (Vec<_>, Vec<_>) = view.teams.iter().partition(|(station, _)| station.is_red());
    let slots = |teams: Vec<&(fms_core::AllianceStation, String)>| {
        teams
            .iter()
            .map(|(station, team)| format!("{} {}", station.label(), team))
            .collect::<Vec<_>>()
            .join("  ")
    };
    let _ = writeln!(text, "Red:  {}", slots(red));
    let _ = writeln!(text, "Blue: {}", slots(blue));

    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use fms_core::{LatencyMs, MatchPhase, StateSnapshot};
    use fms_engine::project;

    #[test]
    fn test_disconnected_placeholder_view() {
        let view = DashboardView::new("FMS backend connection lost");
        let text = format_view(&view);

        assert!(text.contains("FMS backend connection lost\n"));
        assert!(text.contains("[DISCONNECTED]  latency: - ms"));
        assert!(text.contains("Progress:  idle  >  auto  >  teleop  >  endgame "));
        assert!(text.contains("Match control: start"));
        assert!(text.contains("Red:  R1 0000  R2 0000  R3 0000"));
        assert!(text.contains("Blue: B1 0000  B2 0000  B3 0000"));
    }

    #[test]
    fn test_endgame_view() {
        let mut view = DashboardView::new("");
        let match_view = project(&StateSnapshot::new(MatchPhase::Endgame, "-", "25s", "25s"));
        view.banner = match_view.banner.clone();
        view.match_view = Some(match_view);
        view.connected = true;
        view.latency = Some(LatencyMs(12));

        let text = format_view(&view);

        assert!(text.contains("Running: Endgame"));
        assert!(text.contains("[connected]  latency: 12 ms"));
        assert!(text.contains("Progress: [Idle] > [Auto] > [Teleop] > [Endgame]"));
        assert!(text.contains("Timers: Auto | Teleop: 25s | Endgame: 25s\n"));
        assert!(text.contains("Match control: stop"));
    }

    #[test]
    fn test_renderer_writes_to_sink() {
        let mut out = Vec::new();
        TerminalRenderer::new(&mut out)
            .render(&DashboardView::new("Ready to start match"))
            .unwrap();
        assert!(String::from_utf8(out).unwrap().contains("Ready to start match"));
    }
}
