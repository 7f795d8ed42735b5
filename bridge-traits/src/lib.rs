//! # Host Bridge Traits
//!
//! Contracts between the wallet bridge core and the platform hosting it.
//!
//! ## Overview
//!
//! The core never talks to a screen, a network stack or a log pipeline
//! directly. Each capability it needs from the host is a trait here, and each
//! host (Android shim, desktop development harness, tests) supplies an
//! implementation.
//!
//! ## Traits
//!
//! - [`HostContainer`](host::HostContainer) - The UI container that launches
//!   provisioning flows for a result and can relaunch itself
//! - [`HttpClient`](http::HttpClient) - Transport for the Mock adapters' local
//!   test backend
//! - [`LoggerSink`](logging::LoggerSink) - Forward structured logs to host logging
//!
//! ## Platform Requirements
//!
//! | Platform | Implementation Crate | Status |
//! |----------|---------------------|--------|
//! | Desktop  | `bridge-desktop`    | ✅ Development harness |
//! | Android  | Host shim (JNI)     | 📋 Provided by the app |
//!
//! ## Error Handling
//!
//! All bridge traits use [`BridgeError`](error::BridgeError). Wallet adapters
//! remap it at their boundary; bridge errors never reach application code.
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync`: provider SDKs complete operations
//! on their own callback threads, and those completions may touch the host.

pub mod error;
pub mod host;
pub mod http;
pub mod logging;

pub use error::BridgeError;

// Re-export commonly used types
pub use host::{
    ActivityResult, Extras, HostContainer, HostIntent, InboundEnvelope, LaunchMode,
    ResultStatus, RESULT_CANCELED, RESULT_OK,
};
pub use http::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
pub use logging::{ConsoleLogger, LogEntry, LogLevel, LoggerSink};
