//! GroupMe destination API: bot posting, group history, image relay.

pub mod client;
pub mod upload;
