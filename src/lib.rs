//! # bridge-finalizer
//!
//! Finalizes cross-chain messages on their destination chain.
//!
//! Two relay flows are supported:
//!
//! - **CCTP v1**: extract the `MessageSent` payload from a source transaction,
//!   wait for Circle's attestation service to sign it, and submit
//!   `receiveMessage` on the chain named in the message header.
//! - **OP Stack withdrawals**: wait for an L2 to L1 withdrawal to become
//!   provable, prove it, wait out the challenge period, then finalize it.
//!
//! ## Quick Start (CCTP)
//!
//! ```rust,no_run
//! use bridge_finalizer::providers::{AlloyConnector, IrisAttestationProvider, TokioClock};
//! use bridge_finalizer::{CctpFinalizer, FinalizerConfig, FinalizerError, NetworkRegistry};
//!
//! # async fn example() -> Result<(), FinalizerError> {
//! let config = FinalizerConfig::from_env()?;
//!
//! let finalizer = CctpFinalizer::builder()
//!     .registry(NetworkRegistry::mainnet(&config.rpc)?)
//!     .connector(AlloyConnector::new(config.signer()?))
//!     .attestation_provider(IrisAttestationProvider::new(config.iris_api_url.clone())?)
//!     .clock(TokioClock)
//!     .polling(config.attestation_polling)
//!     .build();
//!
//! let tx_hash = "0x4b5a3f0e6bd9a6a9b8b1b4d5a1b2c3d4e5f60718293a4b5c6d7e8f9a0b1c2d3e".parse()?;
//! let outcome = finalizer.finalize("ethereum", tx_hash).await?;
//! println!("relayed to {}", outcome.destination.name);
//! # Ok(())
//! # }
//! ```
//!
//! ## Quick Start (OP Stack)
//!
//! ```rust,no_run
//! use bridge_finalizer::providers::{OpStackMessenger, TokioClock};
//! use bridge_finalizer::{FinalizerConfig, FinalizerError, OpStackFinalizer};
//!
//! # async fn example() -> Result<(), FinalizerError> {
//! let config = FinalizerConfig::from_env()?;
//! let messenger = OpStackMessenger::connect(&config.op_stack, config.signer()?)?;
//!
//! let finalizer = OpStackFinalizer::builder()
//!     .oracle(messenger.clone())
//!     .submitter(messenger)
//!     .clock(TokioClock)
//!     .polling(config.status_polling)
//!     .build();
//!
//! let tx_hash = "0x4b5a3f0e6bd9a6a9b8b1b4d5a1b2c3d4e5f60718293a4b5c6d7e8f9a0b1c2d3e".parse()?;
//! finalizer.prove(tx_hash, 0).await?;
//! finalizer.finalize(tx_hash, 0).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Testing
//!
//! Every external dependency sits behind a trait in [`traits`], and
//! [`testing`] provides in-memory fakes for all of them, including a clock
//! that advances instantly on `sleep`.
//!
//! ## Public API
//!
//! - [`CctpFinalizer`] and [`OpStackFinalizer`] - the two relay flows
//! - [`AttestationPoller`] and [`MessageStatusTracker`] - their polling loops
//! - [`NetworkRegistry`] and [`ChainDescriptor`] - the chains a finalizer can reach
//! - [`FinalizerConfig`] - environment driven configuration
//! - [`FinalizerError`] and [`Result`] - error types for error handling

mod bridge;
mod chain;
mod config;
pub mod contracts;
mod error;
mod protocol;
pub mod providers;
pub mod testing;
pub mod traits;

pub use bridge::{
    AttestationPoller, CctpFinalizer, FinalizeOutcome, MessageStatusTracker, OpStackFinalizer,
    PollingConfig, StageOutcome, ATTESTATION_PATH_V1, IRIS_API, IRIS_API_SANDBOX,
};
pub use chain::{
    CctpV1, ChainDescriptor, NetworkRegistry, L2_TO_L1_MESSAGE_PASSER,
    OP_MAINNET_L1_CROSS_DOMAIN_MESSENGER, OP_MAINNET_OPTIMISM_PORTAL,
};
pub use config::{FinalizerConfig, OpStackConfig, RpcEndpoints};
pub use contracts::message_transmitter::MessageTransmitterContract;
pub use error::{FinalizerError, Result};
pub use protocol::{
    extract_message, resolve_destination, AttestationResponse, AttestationStatus, DomainId,
    InvalidDomainId, MessageHash, RawMessage, RelayStatus, SubmissionReceipt,
    MESSAGE_SENT_SIGNATURE,
};
pub use traits::{
    AttestationProvider, BlockchainProvider, ChainConnector, Clock, MessageSubmitter,
    StatusOracle, WithdrawalSubmitter,
};

// Public module for advanced users who need custom instrumentation
pub mod spans;
