//! Test utilities and fake implementations of the finalizer's traits
//!
//! Every trait seam in [`crate::traits`] has an in-memory fake here, so the
//! relay flows can be exercised without chains or HTTP services: attestation
//! state progressions, rate limiting, transactions that are not mined yet,
//! rejected submissions and withdrawal status sequences.
//!
//! Fakes are cheap to clone and clones share state, so a test can hand one
//! clone to the code under test and keep another to inspect afterwards.

use alloy_primitives::{keccak256, Bytes, TxHash};
use alloy_rpc_types::Log;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::chain::ChainDescriptor;
use crate::error::{FinalizerError, Result};
use crate::protocol::{
    AttestationResponse, MessageHash, RawMessage, RelayStatus, SubmissionReceipt,
};
use crate::traits::{
    AttestationProvider, BlockchainProvider, ChainConnector, Clock, MessageSubmitter,
    StatusOracle, WithdrawalSubmitter,
};

// ============================================================================
// Fake Blockchain Provider
// ============================================================================

#[derive(Clone, Debug, Default)]
struct ScriptedTransaction {
    pending_polls: usize,
    logs: Vec<Log>,
}

/// A fake source chain that returns pre-configured transaction logs.
///
/// This allows testing scenarios like:
/// - Transaction not found
/// - Transaction mined only after a few polls
/// - Transaction found but no MessageSent event
/// - RPC failures
#[derive(Clone, Debug, Default)]
pub struct FakeBlockchainProvider {
    transactions: Arc<Mutex<HashMap<TxHash, ScriptedTransaction>>>,
    failures: Arc<Mutex<Vec<TxHash>>>,
    calls: Arc<Mutex<usize>>,
}

impl FakeBlockchainProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the logs of a mined transaction
    pub fn add_logs(&self, tx_hash: TxHash, logs: Vec<Log>) {
        self.add_pending_then_logs(tx_hash, 0, logs);
    }

    /// Report the transaction as not found for `pending_polls` queries, then mined
    pub fn add_pending_then_logs(&self, tx_hash: TxHash, pending_polls: usize, logs: Vec<Log>) {
        self.transactions.lock().unwrap().insert(
            tx_hash,
            ScriptedTransaction {
                pending_polls,
                logs,
            },
        );
    }

    /// Configure a transaction hash to return an error
    pub fn add_failure(&self, tx_hash: TxHash) {
        self.failures.lock().unwrap().push(tx_hash);
    }

    pub fn call_count(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl BlockchainProvider for FakeBlockchainProvider {
    async fn get_transaction_logs(&self, tx_hash: TxHash) -> Result<Option<Vec<Log>>> {
        *self.calls.lock().unwrap() += 1;

        if self.failures.lock().unwrap().contains(&tx_hash) {
            return Err(FinalizerError::Provider("Simulated RPC error".to_string()));
        }

        let mut transactions = self.transactions.lock().unwrap();
        let Some(transaction) = transactions.get_mut(&tx_hash) else {
            return Ok(None);
        };

        if transaction.pending_polls > 0 {
            transaction.pending_polls -= 1;
            return Ok(None);
        }
        Ok(Some(transaction.logs.clone()))
    }
}

// ============================================================================
// Fake Attestation Provider
// ============================================================================

#[derive(Clone, Debug)]
enum ScriptedAttestation {
    Response(AttestationResponse),
    RateLimited(u64),
    Error(String),
}

/// A fake attestation service that replays a scripted sequence per message.
///
/// Once a sequence is exhausted its last entry repeats. Unknown hashes get
/// `Ok(None)`, the service's "not found".
#[derive(Clone, Debug, Default)]
pub struct FakeAttestationProvider {
    scripts: Arc<Mutex<HashMap<MessageHash, Vec<ScriptedAttestation>>>>,
    calls: Arc<Mutex<HashMap<MessageHash, usize>>>,
}

impl FakeAttestationProvider {
    pub fn new() -> Self {
        Self::default()
    }

    fn script(&self, message_hash: MessageHash, script: Vec<ScriptedAttestation>) {
        self.scripts.lock().unwrap().insert(message_hash, script);
    }

    /// Configure a sequence of responses for a message hash.
    ///
    /// Each call to get_attestation returns the next response in the sequence.
    pub fn add_response_sequence(
        &self,
        message_hash: MessageHash,
        responses: Vec<AttestationResponse>,
    ) {
        self.script(
            message_hash,
            responses
                .into_iter()
                .map(ScriptedAttestation::Response)
                .collect(),
        );
    }

    /// Configure an immediate complete response with attestation data
    pub fn add_complete_response(&self, message_hash: MessageHash, attestation: impl Into<Bytes>) {
        self.add_response_sequence(message_hash, vec![AttestationResponse::complete(attestation)]);
    }

    /// Configure one rate limit answer followed by `response`
    pub fn add_rate_limit_then(
        &self,
        message_hash: MessageHash,
        retry_after_seconds: u64,
        response: AttestationResponse,
    ) {
        self.script(
            message_hash,
            vec![
                ScriptedAttestation::RateLimited(retry_after_seconds),
                ScriptedAttestation::Response(response),
            ],
        );
    }

    /// Configure a provider error for every query
    pub fn add_error(&self, message_hash: MessageHash, reason: impl Into<String>) {
        self.script(message_hash, vec![ScriptedAttestation::Error(reason.into())]);
    }

    /// Number of queries made for a message hash
    pub fn call_count(&self, message_hash: MessageHash) -> usize {
        self.calls
            .lock()
            .unwrap()
            .get(&message_hash)
            .copied()
            .unwrap_or(0)
    }
}

#[async_trait]
impl AttestationProvider for FakeAttestationProvider {
    async fn get_attestation(
        &self,
        message_hash: MessageHash,
    ) -> Result<Option<AttestationResponse>> {
        let index = {
            let mut calls = self.calls.lock().unwrap();
            let count = calls.entry(message_hash).or_insert(0);
            *count += 1;
            *count - 1
        };

        let scripts = self.scripts.lock().unwrap();
        let Some(script) = scripts.get(&message_hash) else {
            return Ok(None);
        };
        let Some(entry) = script.get(index).or_else(|| script.last()) else {
            return Ok(None);
        };

        match entry.clone() {
            ScriptedAttestation::Response(response) => Ok(Some(response)),
            ScriptedAttestation::RateLimited(retry_after_seconds) => {
                Err(FinalizerError::RateLimitExceeded {
                    retry_after_seconds,
                })
            }
            ScriptedAttestation::Error(reason) => Err(FinalizerError::Provider(reason)),
        }
    }
}

// ============================================================================
// Fake Clock
// ============================================================================

/// A fake clock that allows fast-forwarding time in tests.
///
/// `sleep` returns immediately and advances the clock by the requested amount.
#[derive(Clone, Debug)]
pub struct FakeClock {
    started: Instant,
    current_time: Arc<Mutex<Instant>>,
    sleep_log: Arc<Mutex<Vec<Duration>>>,
}

impl Default for FakeClock {
    fn default() -> Self {
        let now = Instant::now();
        Self {
            started: now,
            current_time: Arc::new(Mutex::new(now)),
            sleep_log: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl FakeClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fast-forward the clock by the given duration
    pub fn advance(&self, duration: Duration) {
        let mut time = self.current_time.lock().unwrap();
        *time += duration;
    }

    /// Fake time elapsed since the clock was created
    pub fn elapsed(&self) -> Duration {
        self.now() - self.started
    }

    /// Get the number of times sleep was called
    pub fn sleep_count(&self) -> usize {
        self.sleep_log.lock().unwrap().len()
    }

    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleep_log.lock().unwrap().clone()
    }
}

#[async_trait]
impl Clock for FakeClock {
    async fn sleep(&self, duration: Duration) {
        self.sleep_log.lock().unwrap().push(duration);
        self.advance(duration);
    }

    fn now(&self) -> Instant {
        *self.current_time.lock().unwrap()
    }
}

// ============================================================================
// Fake Submitter and Connector
// ============================================================================

/// A `receiveMessage` call recorded by [`FakeSubmitter`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordedSubmission {
    pub destination: ChainDescriptor,
    pub message: RawMessage,
    pub attestation: Bytes,
}

/// A fake destination that accepts or rejects every submission.
///
/// Accepted submissions get a receipt whose transaction id is derived from the
/// message and attestation.
#[derive(Clone, Debug, Default)]
pub struct FakeSubmitter {
    rejection: Option<String>,
    already_received: Arc<Mutex<bool>>,
    submissions: Arc<Mutex<Vec<RecordedSubmission>>>,
}

impl FakeSubmitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// A submitter whose chain rejects every transaction with `reason`
    pub fn rejecting(reason: impl Into<String>) -> Self {
        Self {
            rejection: Some(reason.into()),
            ..Self::default()
        }
    }

    /// Make `is_message_received` report every message as received
    pub fn mark_received(&self) {
        *self.already_received.lock().unwrap() = true;
    }

    pub fn submissions(&self) -> Vec<RecordedSubmission> {
        self.submissions.lock().unwrap().clone()
    }
}

#[async_trait]
impl MessageSubmitter for FakeSubmitter {
    async fn submit_receive(
        &self,
        destination: &ChainDescriptor,
        message: &RawMessage,
        attestation: &Bytes,
    ) -> Result<SubmissionReceipt> {
        self.submissions.lock().unwrap().push(RecordedSubmission {
            destination: destination.clone(),
            message: message.clone(),
            attestation: attestation.clone(),
        });

        if let Some(reason) = &self.rejection {
            return Err(FinalizerError::SubmissionFailed {
                reason: reason.clone(),
            });
        }

        let mut preimage = message.as_bytes().to_vec();
        preimage.extend_from_slice(attestation);
        Ok(SubmissionReceipt::new(keccak256(preimage)))
    }

    async fn is_message_received(
        &self,
        _destination: &ChainDescriptor,
        _message: &RawMessage,
    ) -> Result<bool> {
        Ok(*self.already_received.lock().unwrap())
    }
}

/// A fake [`ChainConnector`] handing out one shared source and submitter.
///
/// Records which chains were asked for, so tests can check that the
/// destination named in the message was the one used.
#[derive(Clone, Debug, Default)]
pub struct FakeConnector {
    source: FakeBlockchainProvider,
    submitter: FakeSubmitter,
    source_chains: Arc<Mutex<Vec<String>>>,
    submitter_chains: Arc<Mutex<Vec<String>>>,
}

impl FakeConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_submitter(submitter: FakeSubmitter) -> Self {
        Self {
            submitter,
            ..Self::default()
        }
    }

    pub fn add_logs(&self, tx_hash: TxHash, logs: Vec<Log>) {
        self.source.add_logs(tx_hash, logs);
    }

    pub fn source_provider(&self) -> &FakeBlockchainProvider {
        &self.source
    }

    pub fn fake_submitter(&self) -> &FakeSubmitter {
        &self.submitter
    }

    pub fn source_calls(&self) -> usize {
        self.source_chains.lock().unwrap().len()
    }

    pub fn source_chains(&self) -> Vec<String> {
        self.source_chains.lock().unwrap().clone()
    }

    pub fn submitter_chains(&self) -> Vec<String> {
        self.submitter_chains.lock().unwrap().clone()
    }

    pub fn submissions(&self) -> Vec<RecordedSubmission> {
        self.submitter.submissions()
    }
}

impl ChainConnector for FakeConnector {
    type Source = FakeBlockchainProvider;
    type Submitter = FakeSubmitter;

    fn source(&self, chain: &ChainDescriptor) -> Result<Self::Source> {
        self.source_chains.lock().unwrap().push(chain.name.clone());
        Ok(self.source.clone())
    }

    fn submitter(&self, chain: &ChainDescriptor) -> Result<Self::Submitter> {
        self.submitter_chains.lock().unwrap().push(chain.name.clone());
        Ok(self.submitter.clone())
    }
}

// ============================================================================
// Fake Status Oracle and Withdrawal Submitter
// ============================================================================

/// A fake status oracle replaying a status sequence, repeating the last one.
#[derive(Clone, Debug, Default)]
pub struct FakeStatusOracle {
    statuses: Vec<RelayStatus>,
    failure: Option<String>,
    calls: Arc<Mutex<usize>>,
}

impl FakeStatusOracle {
    pub fn new(statuses: Vec<RelayStatus>) -> Self {
        Self {
            statuses,
            ..Self::default()
        }
    }

    /// An oracle that fails every query with a provider error
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            failure: Some(reason.into()),
            ..Self::default()
        }
    }

    pub fn call_count(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl StatusOracle for FakeStatusOracle {
    async fn message_status(&self, _tx_hash: TxHash, _log_index: u64) -> Result<RelayStatus> {
        let index = {
            let mut calls = self.calls.lock().unwrap();
            *calls += 1;
            *calls - 1
        };

        if let Some(reason) = &self.failure {
            return Err(FinalizerError::Provider(reason.clone()));
        }

        self.statuses
            .get(index)
            .or_else(|| self.statuses.last())
            .copied()
            .ok_or_else(|| FinalizerError::Provider("no status scripted".to_string()))
    }
}

/// The L1 action a [`FakeWithdrawalSubmitter`] was asked to perform
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WithdrawalAction {
    Prove,
    Finalize,
}

/// A fake withdrawal submitter that records every prove and finalize.
#[derive(Clone, Debug, Default)]
pub struct FakeWithdrawalSubmitter {
    rejection: Option<String>,
    actions: Arc<Mutex<Vec<(WithdrawalAction, TxHash, u64)>>>,
}

impl FakeWithdrawalSubmitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rejecting(reason: impl Into<String>) -> Self {
        Self {
            rejection: Some(reason.into()),
            ..Self::default()
        }
    }

    pub fn actions(&self) -> Vec<(WithdrawalAction, TxHash, u64)> {
        self.actions.lock().unwrap().clone()
    }

    fn record(
        &self,
        action: WithdrawalAction,
        tx_hash: TxHash,
        log_index: u64,
    ) -> Result<SubmissionReceipt> {
        let mut actions = self.actions.lock().unwrap();
        actions.push((action, tx_hash, log_index));

        if let Some(reason) = &self.rejection {
            return Err(FinalizerError::SubmissionFailed {
                reason: reason.clone(),
            });
        }

        let mut preimage = tx_hash.to_vec();
        preimage.extend_from_slice(&log_index.to_be_bytes());
        preimage.push(actions.len() as u8);
        Ok(SubmissionReceipt::new(keccak256(preimage)))
    }
}

#[async_trait]
impl WithdrawalSubmitter for FakeWithdrawalSubmitter {
    async fn prove_message(&self, tx_hash: TxHash, log_index: u64) -> Result<SubmissionReceipt> {
        self.record(WithdrawalAction::Prove, tx_hash, log_index)
    }

    async fn finalize_message(
        &self,
        tx_hash: TxHash,
        log_index: u64,
    ) -> Result<SubmissionReceipt> {
        self.record(WithdrawalAction::Finalize, tx_hash, log_index)
    }
}
