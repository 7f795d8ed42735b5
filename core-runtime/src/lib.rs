//! # Core Runtime Module
//!
//! Runtime infrastructure shared by the wallet bridge crates:
//! - Logging and tracing with card-data redaction
//! - Configuration of host bridges and per-provider settings
//! - Event bus for inbound messages and host-UI operations
//!
//! ## Overview
//!
//! Nothing in here knows about a specific wallet provider. Provider crates
//! read their [`config::ProviderSettings`] and publish onto the
//! [`events::EventBus`]; the service layer owns both.

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use error::{Error, Result};
