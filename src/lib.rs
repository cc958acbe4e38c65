//! Toolshare - client core for a peer-to-peer tool rental marketplace
//!
//! Owners list tools with a location and a daily price; renters find tools
//! near them, reserve them for a date range and chat with the owner. This
//! crate holds everything short of the UI: the backend client, the local
//! session, distance math and catalog filtering.

pub mod api;
pub mod catalog;
pub mod config;
pub mod domain;
pub mod error;
pub mod geo;
pub mod market;
pub mod session;

pub use error::{Result, ToolshareError};
