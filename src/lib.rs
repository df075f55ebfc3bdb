//! Ephemeral token broker for the OpenAI Realtime API.
//!
//! Browsers cannot hold the long-lived OpenAI key, so this service holds it
//! and trades it for a short-lived session token on request:
//!
//! ```text
//! browser ── GET /session ──▶ broker ── POST /v1/realtime/sessions ──▶ OpenAI
//!         ◀── client_secret ──        ◀──── { client_secret, ... } ────
//! ```
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from environment
//! - [`error`]: Unified error types
//! - [`realtime`]: Upstream session client and wire shapes
//! - [`api`]: HTTP routes, handlers and OpenAPI docs
//! - [`metrics`]: Prometheus metrics
//! - [`utils`]: Utility functions

pub mod api;
pub mod config;
pub mod error;
pub mod metrics;
pub mod realtime;
pub mod utils;

pub use config::Config;
pub use error::{BrokerError, Result};
