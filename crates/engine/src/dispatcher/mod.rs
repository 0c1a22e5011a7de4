//! Command Dispatcher - operator intents to outbound commands
//!
//! Start/stop and the admin commands go out immediately. Estop and the
//! driver station reconnect are irreversible, so they wait for an explicit
//! yes from the operator first.

use fms_core::{OutboundCommand, Result};
use fms_networking::clock::Clock;
use fms_networking::websocket::{ConnectionSession, SendOutcome, Transport};
use tracing::{info, warn};

/// Something that can put a command on the wire
pub trait CommandSink {
    fn send_command(&mut self, command: &OutboundCommand) -> Result<SendOutcome>;
}

impl<T: Transport, C: Clock> CommandSink for ConnectionSession<T, C> {
    fn send_command(&mut self, command: &OutboundCommand) -> Result<SendOutcome> {
        self.send(command)
    }
}

impl<S: CommandSink + ?Sized> CommandSink for &mut S {
    fn send_command(&mut self, command: &OutboundCommand) -> Result<SendOutcome> {
        (**self).send_command(command)
    }
}

/// Operator-facing yes/no prompt and transient notifications.
///
/// `confirm` is awaited in-line: nothing else is dispatched until the
/// operator answers.
#[allow(async_fn_in_trait)]
pub trait OperatorPrompt {
    async fn confirm(&mut self, question: &str) -> bool;
    fn notify(&mut self, message: &str);
}

impl<P: OperatorPrompt + ?Sized> OperatorPrompt for &mut P {
    async fn confirm(&mut self, question: &str) -> bool {
        (**self).confirm(question).await
    }

    fn notify(&mut self, message: &str) {
        (**self).notify(message)
    }
}

/// What the operator asked for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperatorIntent {
    StartMatch,
    StopMatch,
    Estop { team: String },
    DsReconnect,
    TestSounds,
    MatchName { name: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Handed to the connection; see `SendOutcome` for what happened there
    Sent(SendOutcome),
    /// Operator declined the confirmation
    Cancelled,
}

pub struct CommandDispatcher<S, P> {
    sink: S,
    prompt: P,
}

impl<S: CommandSink, P: OperatorPrompt> CommandDispatcher<S, P> {
    pub fn new(sink: S, prompt: P) -> Self {
        Self { sink, prompt }
    }

    pub async fn dispatch(&mut self, intent: OperatorIntent) -> Result<DispatchOutcome> {
        match intent {
            OperatorIntent::StartMatch => self.start(),
            OperatorIntent::StopMatch => self.stop(),
            OperatorIntent::Estop { team } => self.estop(&team).await,
            OperatorIntent::DsReconnect => self.ds_reconnect().await,
            OperatorIntent::TestSounds => self.test_sounds(),
            OperatorIntent::MatchName { name } => self.match_name(&name),
        }
    }

    pub fn start(&mut self) -> Result<DispatchOutcome> {
        info!("Starting match");
        self.send(OutboundCommand::Start)
    }

    pub fn stop(&mut self) -> Result<DispatchOutcome> {
        info!("Stopping match");
        self.send(OutboundCommand::Stop)
    }

    pub fn test_sounds(&mut self) -> Result<DispatchOutcome> {
        self.send(OutboundCommand::TestSounds)
    }

    pub fn match_name(&mut self, name: &str) -> Result<DispatchOutcome> {
        self.send(OutboundCommand::match_name(name))
    }

    pub async fn estop(&mut self, team: &str) -> Result<DispatchOutcome> {
        self.send_confirmed(
            OutboundCommand::estop(team),
            &format!("Confirm ESTOP {}?", team),
            &format!("E-stopped {}", team),
            "ESTOP cancelled",
        )
        .await
    }

    pub async fn ds_reconnect(&mut self) -> Result<DispatchOutcome> {
        self.send_confirmed(
            OutboundCommand::DsReconnect,
            "Are you sure you want to force a DS reconnect?",
            "Sent DS reconnect",
            "DS reconnect cancelled",
        )
        .await
    }

    fn send(&mut self, command: OutboundCommand) -> Result<DispatchOutcome> {
        let outcome = self.sink.send_command(&command)?;
        if outcome != SendOutcome::Sent {
            warn!("{} was not delivered: {:?}", command.wire_name(), outcome);
        }
        Ok(DispatchOutcome::Sent(outcome))
    }

    async fn send_confirmed(
        &mut self,
        command: OutboundCommand,
        question: &str,
        sent_note: &str,
        cancelled_note: &str,
    ) -> Result<DispatchOutcome> {
        // Reject bad arguments before bothering the operator
        command.validate()?;

        if !self.prompt.confirm(question).await {
            info!("{} declined by operator", command.wire_name());
            self.prompt.notify(cancelled_note);
            return Ok(DispatchOutcome::Cancelled);
        }

        let outcome = self.send(command)?;
        // Only confirms the send was issued; the backend never acknowledges
        self.prompt.notify(sent_note);
        Ok(outcome)
    }
}
