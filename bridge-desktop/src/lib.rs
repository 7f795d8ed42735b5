//! # Desktop Bridge Implementations
//!
//! Default implementations of bridge traits for desktop development builds
//! (macOS, Windows, Linux), where no wallet app and no Android activity exist.
//!
//! ## Overview
//!
//! - `HttpClient` using `reqwest`, pointed at the local mock backend
//! - `HostContainer` that records launches instead of showing UI
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::{RecordingHostContainer, ReqwestHttpClient};
//! use std::sync::Arc;
//!
//! let config = WalletConfig::builder()
//!     .host(Arc::new(RecordingHostContainer::new()))
//!     .http_client(Arc::new(ReqwestHttpClient::new()?))
//!     .build()?;
//! ```

mod host;
mod http;

pub use host::RecordingHostContainer;
pub use http::ReqwestHttpClient;
