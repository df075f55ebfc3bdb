//! OpenAI realtime session exchange.
//!
//! This module handles:
//! - Request/response shapes for session creation
//! - The upstream client holding the server key

pub mod client;
pub mod types;

pub use client::SessionClient;
pub use types::{ClientSecret, SessionFailure, SessionRequest, SessionSuccess};
