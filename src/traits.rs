//! Core trait abstractions for the finalizer.
//!
//! Every collaborator the relay flows talk to sits behind one of these traits:
//! source chain reads, the attestation service, time, destination submissions,
//! the withdrawal status oracle and the prove/finalize actions. Production
//! implementations live in [`crate::providers`], in-memory fakes in
//! [`crate::testing`].
//!
//! # Example: Implementing a Test Fake
//!
//! ```rust,ignore
//! use bridge_finalizer::{BlockchainProvider, Result};
//! use std::collections::HashMap;
//!
//! struct StaticLogs {
//!     logs: HashMap<TxHash, Vec<Log>>,
//! }
//!
//! #[async_trait::async_trait]
//! impl BlockchainProvider for StaticLogs {
//!     async fn get_transaction_logs(&self, tx_hash: TxHash) -> Result<Option<Vec<Log>>> {
//!         Ok(self.logs.get(&tx_hash).cloned())
//!     }
//! }
//! ```

use alloy_primitives::{Bytes, TxHash};
use alloy_rpc_types::Log;
use async_trait::async_trait;
use std::time::{Duration, Instant};

use crate::chain::ChainDescriptor;
use crate::error::Result;
use crate::protocol::{
    AttestationResponse, MessageHash, RawMessage, RelayStatus, SubmissionReceipt,
};

/// Trait for source chain RPC reads.
///
/// # Test Scenarios
///
/// Implementing this trait with fakes enables testing:
/// - Transaction not yet mined
/// - Transactions without the expected event
/// - Several matching events in one transaction
#[async_trait]
pub trait BlockchainProvider: Send + Sync {
    /// Fetches the logs of a mined transaction.
    ///
    /// Returns `None` if the transaction is not found or not yet mined.
    ///
    /// # Errors
    ///
    /// Returns an error if the RPC call fails.
    async fn get_transaction_logs(&self, tx_hash: TxHash) -> Result<Option<Vec<Log>>>;
}

/// Trait for attestation retrieval from Circle's Iris API.
///
/// # Test Scenarios
///
/// Implementing this trait with fakes enables testing:
/// - Messages the service does not know about
/// - Rate limiting (429 responses)
/// - State transitions (Pending → PendingConfirmations → Complete)
/// - Failed attestations
#[async_trait]
pub trait AttestationProvider: Send + Sync {
    /// Fetches attestation status and data for a message hash.
    ///
    /// Returns `None` when the service has no record of the message.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The HTTP request fails
    /// - The response cannot be parsed
    /// - The API returns an error status code, 429 as
    ///   [`FinalizerError::RateLimitExceeded`](crate::FinalizerError::RateLimitExceeded)
    async fn get_attestation(
        &self,
        message_hash: MessageHash,
    ) -> Result<Option<AttestationResponse>>;
}

/// Trait for time-based operations.
///
/// Lets tests advance through polling loops and deadlines instantly.
#[async_trait]
pub trait Clock: Send + Sync {
    /// Asynchronously sleeps for the given duration.
    async fn sleep(&self, duration: Duration);

    /// Returns the current instant in time.
    ///
    /// Used for calculating deadlines.
    fn now(&self) -> Instant;
}

/// Trait for the destination side of the CCTP flow.
///
/// Submissions are fire-once: nothing here retries. A rejection is reported as
/// [`FinalizerError::SubmissionFailed`](crate::FinalizerError::SubmissionFailed)
/// carrying the chain's own error text.
#[async_trait]
pub trait MessageSubmitter: Send + Sync {
    /// Sends `receiveMessage(message, attestation)` to the destination's receiver
    /// contract and returns once the node acknowledged the transaction.
    async fn submit_receive(
        &self,
        destination: &ChainDescriptor,
        message: &RawMessage,
        attestation: &Bytes,
    ) -> Result<SubmissionReceipt>;

    /// Checks the receiver's replay protection for `message`.
    async fn is_message_received(
        &self,
        destination: &ChainDescriptor,
        message: &RawMessage,
    ) -> Result<bool>;
}

/// Builds per-chain collaborators from a [`ChainDescriptor`].
pub trait ChainConnector: Send + Sync {
    type Source: BlockchainProvider;
    type Submitter: MessageSubmitter;

    /// Read access to `chain`, for finding the source transaction.
    fn source(&self, chain: &ChainDescriptor) -> Result<Self::Source>;

    /// Write access to `chain`, for relaying onto it.
    fn submitter(&self, chain: &ChainDescriptor) -> Result<Self::Submitter>;
}

/// Reports where an OP Stack withdrawal is in its lifecycle.
///
/// `log_index` selects the withdrawal among the `MessagePassed` events of the
/// L2 transaction, counting from zero.
#[async_trait]
pub trait StatusOracle: Send + Sync {
    async fn message_status(&self, tx_hash: TxHash, log_index: u64) -> Result<RelayStatus>;
}

/// The L1 actions of the OP Stack withdrawal flow.
///
/// Same failure policy as [`MessageSubmitter`]: one transaction, no retry.
#[async_trait]
pub trait WithdrawalSubmitter: Send + Sync {
    async fn prove_message(&self, tx_hash: TxHash, log_index: u64) -> Result<SubmissionReceipt>;

    async fn finalize_message(&self, tx_hash: TxHash, log_index: u64)
        -> Result<SubmissionReceipt>;
}

#[async_trait]
impl<T: AttestationProvider + ?Sized> AttestationProvider for &T {
    async fn get_attestation(
        &self,
        message_hash: MessageHash,
    ) -> Result<Option<AttestationResponse>> {
        (**self).get_attestation(message_hash).await
    }
}

#[async_trait]
impl<T: Clock + ?Sized> Clock for &T {
    async fn sleep(&self, duration: Duration) {
        (**self).sleep(duration).await
    }

    fn now(&self) -> Instant {
        (**self).now()
    }
}

#[async_trait]
impl<T: StatusOracle + ?Sized> StatusOracle for &T {
    async fn message_status(&self, tx_hash: TxHash, log_index: u64) -> Result<RelayStatus> {
        (**self).message_status(tx_hash, log_index).await
    }
}
