#![forbid(unsafe_code)]

//! `groupme-bridge` — relays messages, images, and reactions from a
//! monitored Discord channel to a GroupMe group via the bot-posting API.
//!
//! Delivery is best-effort and synchronous per event: one attempt per
//! outbound call, no persistent retry queue, no durable log.

pub mod config;
pub mod discord;
pub mod emoji;
pub mod errors;
pub mod groupme;
pub mod health;
pub mod models;
pub mod relay;
pub mod reply;

pub use config::GlobalConfig;
pub use errors::{AppError, Result};
