//! Relay pipeline: routing, formatting, and router-owned state.

pub mod commands;
pub mod correlation;
pub mod formatter;
pub mod router;
pub mod window;
