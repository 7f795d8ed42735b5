//! # Samsung Pay Provider
//!
//! Samsung Pay push provisioning behind the
//! [`WalletAdapter`](core_wallet::WalletAdapter) contract.
//!
//! - [`SamsungPayAdapter`] - Real adapter. Drives the partner SDK through
//!   [`DynamicBridge`](core_invoke::DynamicBridge) and settles card
//!   operations from the SDK's own listener callbacks.
//! - [`MockSamsungPayAdapter`] - In-memory cards, optionally backed by a
//!   local mock server.
//!
//! The Real adapter needs the partner service id issued by Samsung
//! (`WalletConfig::samsung_service_id`).
//!
//! Identity verification requests arrive as app-to-app messages whose
//! action ends in `LAUNCH_A2A_IDV`; see [`classifier`].

pub mod classifier;
pub mod mock;
pub mod real;
pub mod sdk;

pub use classifier::{classifier, decode_idv_payload, mock_classifier};
pub use mock::MockSamsungPayAdapter;
pub use real::SamsungPayAdapter;
