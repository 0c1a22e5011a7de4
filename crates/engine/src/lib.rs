//! FMS Engine - match state projection and operator command dispatch

pub mod dispatcher;
pub mod state_machine;

pub use dispatcher::{CommandDispatcher, CommandSink, DispatchOutcome, OperatorIntent, OperatorPrompt};
pub use state_machine::project;
