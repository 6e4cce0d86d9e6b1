//! Operator commands issued from the source platform.
//!
//! Only the leading token of a message body is significant; a body whose
//! first token is not a registered command relays as plain text.

/// Operator command recognized in an inbound message body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeCommand {
    /// Post a test message to the destination and confirm in-channel.
    Test,
    /// Report bridge connectivity in the monitored channel.
    Status,
}

/// Parse an operator command from a raw message body.
#[must_use]
pub fn parse(body: &str) -> Option<BridgeCommand> {
    match body.split_whitespace().next()? {
        "!test" => Some(BridgeCommand::Test),
        "!status" => Some(BridgeCommand::Status),
        _ => None,
    }
}
