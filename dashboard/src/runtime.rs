//! The dashboard event loop
//!
//! One task, one `select!`: socket events, the ping tick, the reconnect
//! deadline and operator input are handled strictly one at a time.

use crate::app::Dashboard;
use crate::config::DashboardConfig;
use crate::operator::{self, OperatorCommand, TerminalPrompt, HELP};
use crate::render::{Renderer, TerminalRenderer};
use fms_engine::{CommandDispatcher, OperatorPrompt};
use fms_networking::clock::{Clock, SystemClock};
use fms_networking::websocket::{ConnectionSession, Transport, WsTransport};
use std::io::Write;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Run the dashboard until `shutdown` is cancelled
pub async fn run(config: DashboardConfig, shutdown: CancellationToken) -> anyhow::Result<()> {
    let (transport, mut events) = WsTransport::new();
    let session = ConnectionSession::new(config.endpoint.as_str(), transport, SystemClock)
        .with_reconnect_delay(config.reconnect_delay);
    let mut dashboard = Dashboard::new(session);
    let mut renderer = TerminalRenderer::new(std::io::stdout());
    let mut lines = operator::spawn_stdin_reader();
    let mut input_open = true;

    info!(
        "Dashboard started (ping every {}ms, reconnect after {}ms)",
        config.ping_interval.as_millis(),
        config.reconnect_delay.as_millis()
    );
    dashboard.start();
    renderer.render(dashboard.view())?;

    let mut ping = tokio::time::interval(config.ping_interval);
    ping.set_missed_tick_behavior(MissedTickBehavior::Skip);
    // The first tick completes immediately; the first ping goes out one period in
    ping.tick().await;

    loop {
        let reconnect_in = dashboard.until_next_deadline();

        let changed = tokio::select! {
            _ = shutdown.cancelled() => break,
            Some((id, event)) = events.recv() => dashboard.handle_event(id, event),
            _ = ping.tick() => dashboard.tick_ping(),
            _ = sleep_for(reconnect_in) => dashboard.poll_timers(),
            line = lines.recv(), if input_open => match line {
                Some(line) => handle_line(&mut dashboard, &line, &mut lines, &shutdown).await,
                None => {
                    info!("Operator input closed; running display-only");
                    input_open = false;
                    false
                }
            },
        };

        if changed {
            renderer.render(dashboard.view())?;
        }
    }

    info!("Dashboard shutting down");
    dashboard.shutdown();
    Ok(())
}

async fn sleep_for(duration: Option<Duration>) {
    match duration {
        Some(duration) => tokio::time::sleep(duration).await,
        None => std::future::pending().await,
    }
}

/// Handle one operator line. Returns true when the view changed.
async fn handle_line<T: Transport, C: Clock>(
    dashboard: &mut Dashboard<T, C>,
    line: &str,
    lines: &mut mpsc::UnboundedReceiver<String>,
    shutdown: &CancellationToken,
) -> bool {
    let mut stdout = std::io::stdout();

    match operator::parse_line(line) {
        Ok(None) => false,
        Ok(Some(OperatorCommand::Quit)) => {
            shutdown.cancel();
            false
        }
        Ok(Some(OperatorCommand::Help)) => {
            let _ = writeln!(stdout, "{}", HELP);
            false
        }
        Ok(Some(OperatorCommand::Intent(intent))) => {
            let mut prompt = TerminalPrompt::new(lines, stdout, shutdown.clone());
            let result = CommandDispatcher::new(dashboard.session_mut(), &mut prompt)
                .dispatch(intent)
                .await;
            match result {
                Ok(outcome) => dashboard.after_dispatch(outcome),
                Err(e) => {
                    warn!("Command rejected: {}", e);
                    prompt.notify(&e.to_string());
                    false
                }
            }
        }
        Err(e) => {
            let _ = writeln!(stdout, ">> {}", e);
            false
        }
    }
}
