//! JSON wire codec for the FMS WebSocket protocol
//!
//! Outbound: `{"message": "<command>", "arg"?: "<team>"}`.
//! Inbound: `{"state": "...", "auto_timer": "...", "teleop_timer": "...", "endgame_timer": "..."}`.

use fms_core::{Error, OutboundCommand, Result, StateSnapshot};

/// Encode a command into its wire text
pub fn encode(command: &OutboundCommand) -> Result<String> {
    command.validate()?;
    serde_json::to_string(command).map_err(|e| Error::Encode(e.to_string()))
}

/// Decode and validate an inbound state message
pub fn decode(text: &str) -> Result<StateSnapshot> {
    let value: serde_json::Value = serde_json::from_str(text)?;
    if !value.is_object() {
        return Err(Error::Decode(format!(
            "expected a JSON object, got {}",
            json_kind(&value)
        )));
    }
    Ok(serde_json::from_value(value)?)
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
