//! Marketplace API client layer
//!
//! This module provides:
//! - MarketplaceApi trait for backend abstraction
//! - HttpApi implementation over reqwest
//! - MockApi in-memory implementation
//! - TokenSource hook for bearer authentication
//! - ApiError classification of failures

pub mod client;
pub mod error;
pub mod http;
pub mod mock;
pub mod types;

pub use client::{ApiResult, MarketplaceApi, NoToken, StaticToken, TokenSource};
pub use error::ApiError;
pub use http::{DEFAULT_BASE_URL, HttpApi};
pub use mock::MockApi;
pub use types::{CreatedTool, LoginResponse};
