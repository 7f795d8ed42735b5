//! # Core Wallet
//!
//! Provider-independent half of the wallet bridge: the operation contract,
//! the error taxonomy, and the machinery shared by every provider adapter.
//!
//! ## Overview
//!
//! - [`WalletAdapter`] - uniform operation facade (Real/Mock/Stub variants)
//! - [`CapabilityProber`] - is a provider SDK linked into this process?
//! - [`ImplementationSelector`] - Real, Mock or Stub per provider
//! - [`OperationCorrelator`] - settles host-UI operations from activity results
//! - [`MessageRouter`] - classifies and buffers inbound app-to-app messages
//! - [`StubAdapter`] - contract-preserving rejection when a SDK is absent
//!
//! Provider crates implement the Real and Mock variants on top of this;
//! `core-service` wires everything to the host.

pub mod adapter;
pub mod constants;
pub mod correlator;
pub mod error;
pub mod mock_backend;
pub mod prober;
pub mod router;
pub mod selector;
pub mod stub;
pub mod types;

pub use adapter::{default_payment_intent, HostContext, WalletAdapter};
pub use constants::{ConstantSchema, ConstantSpec, ConstantValue, Constants, Fallback};
pub use correlator::{OperationCorrelator, PendingResult};
pub use error::{Result, WalletError};
pub use mock_backend::MockBackend;
pub use prober::CapabilityProber;
pub use router::{
    AllowListClassifier, InboundMessage, MessageClassifier, MessageRouter, PayloadDecoder,
    PendingState, RejectAllClassifier, RouteDecision, RouteOutcome,
};
pub use selector::ImplementationSelector;
pub use stub::StubAdapter;
pub use types::{
    operation_code, AdapterVariant, BillingAddress, CardNetwork, CardRecord, CredentialReference,
    CredentialState, CredentialStatus, IssuerFields, ProviderIdentity, ProvisionRequest,
    TokenRecord, WalletIdentity,
};
