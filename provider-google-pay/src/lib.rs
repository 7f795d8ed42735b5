//! # Google Pay Provider
//!
//! Google Pay (tap-and-pay) push provisioning behind the
//! [`WalletAdapter`](core_wallet::WalletAdapter) contract.
//!
//! ## Variants
//!
//! - [`GooglePayAdapter`] - Real adapter. Reaches the SDK only through
//!   [`DynamicBridge`](core_invoke::DynamicBridge), so this crate builds and
//!   runs on hosts where the SDK is absent.
//! - [`MockGooglePayAdapter`] - Canned, in-memory wallet optionally backed
//!   by a local mock server.
//!
//! The Stub variant is shared and lives in `core-wallet`.
//!
//! ## Inbound messages
//!
//! Token activation requests arrive as app-to-app messages whose action
//! ends in `ACTIVATE_TOKEN`; see [`classifier`].

pub mod classifier;
pub mod mock;
pub mod real;
pub mod sdk;

pub use classifier::{classifier, decode_activation_params, mock_classifier};
pub use mock::MockGooglePayAdapter;
pub use real::GooglePayAdapter;
