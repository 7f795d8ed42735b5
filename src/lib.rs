//! Workspace placeholder crate.
//!
//! This crate exists to expose shared feature flags that map to the individual
//! workspace crates (chiefly `core-service`). Host applications can depend on
//! `wallet-workspace` and enable the documented features without wiring each
//! crate individually:
//!
//! - `google-pay` / `samsung-pay` - compile the provider adapters in
//! - `mock-google-pay` / `mock-samsung-pay` - always use the Mock adapter
//! - `desktop-shims` - recording host container and reqwest HTTP client

#[cfg(any(
    feature = "desktop-shims",
    feature = "google-pay",
    feature = "samsung-pay",
    feature = "mock-google-pay",
    feature = "mock-samsung-pay"
))]
pub use core_service::{Result, ServiceError, WalletService};
