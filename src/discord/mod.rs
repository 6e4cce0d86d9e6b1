//! Discord source platform: Gateway event feed and REST lookups.

pub mod gateway;
pub mod rest;
