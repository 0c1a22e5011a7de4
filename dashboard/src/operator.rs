//! Operator input on the terminal
//!
//! One intent per line. Confirmations read the next line from the same
//! stream, so no other intent can slip in while a prompt is open.

use fms_core::{Error, Result};
use fms_engine::{OperatorIntent, OperatorPrompt};
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

pub const HELP: &str = "\
Commands:
  start              start the match
  stop               stop the match
  estop <team>       emergency-stop a team (asks for confirmation)
  ds-reconnect       force all driver stations to reconnect (asks for confirmation)
  test-sounds        play all game sounds
  name <match name>  set the match name
  help               show this list
  quit               exit the dashboard";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperatorCommand {
    Intent(OperatorIntent),
    Help,
    Quit,
}

/// Parse one input line. Blank lines yield `None`.
pub fn parse_line(line: &str) -> Result<Option<OperatorCommand>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let command = match word.to_ascii_lowercase().as_str() {
        "start" => OperatorCommand::Intent(OperatorIntent::StartMatch),
        "stop" => OperatorCommand::Intent(OperatorIntent::StopMatch),
        "estop" if !rest.is_empty() => OperatorCommand::Intent(OperatorIntent::Estop {
            team: rest.to_string(),
        }),
        "estop" => {
            return Err(Error::InvalidCommand("usage: estop <team>".to_string()));
        }
        "ds-reconnect" | "ds_reconnect" => OperatorCommand::Intent(OperatorIntent::DsReconnect),
        "test-sounds" | "test_sounds" => OperatorCommand::Intent(OperatorIntent::TestSounds),
        "name" if !rest.is_empty() => OperatorCommand::Intent(OperatorIntent::MatchName {
            name: rest.to_string(),
        }),
        "name" => {
            return Err(Error::InvalidCommand("usage: name <match name>".to_string()));
        }
        "help" | "?" => OperatorCommand::Help,
        "quit" | "exit" => OperatorCommand::Quit,
        other => {
            return Err(Error::InvalidCommand(format!(
                "unknown command '{}' (type 'help')",
                other
            )));
        }
    };
    Ok(Some(command))
}

/// `y`/`yes` in any case; everything else declines
pub fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

/// Forward stdin lines into a channel. The channel closes at EOF.
pub fn spawn_stdin_reader() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    if tx.send(line).is_err() {
                        break;
                    }
                }
                Ok(None) => {
                    debug!("stdin reached EOF");
                    break;
                }
                Err(e) => {
                    info!("Stopped reading operator input: {}", e);
                    break;
                }
            }
        }
    });
    rx
}

/// Yes/no prompt on the terminal, answered by the next input line
pub struct TerminalPrompt<'a, W> {
    lines: &'a mut mpsc::UnboundedReceiver<String>,
    out: W,
    shutdown: CancellationToken,
}

impl<'a, W: Write> TerminalPrompt<'a, W> {
    pub fn new(
        lines: &'a mut mpsc::UnboundedReceiver<String>,
        out: W,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            lines,
            out,
            shutdown,
        }
    }
}

impl<W: Write> OperatorPrompt for TerminalPrompt<'_, W> {
    async fn confirm(&mut self, question: &str) -> bool {
        let _ = write!(self.out, "{} [y/N] ", question);
        let _ = self.out.flush();

        tokio::select! {
            _ = self.shutdown.cancelled() => false,
            answer = self.lines.recv() => answer.as_deref().is_some_and(is_yes),
        }
    }

    fn notify(&mut self, message: &str) {
        let _ = writeln!(self.out, ">> {}", message);
        let _ = self.out.flush();
    }
}
