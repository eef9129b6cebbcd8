//! OpenTelemetry span helpers for finalizer operations
//!
//! Static span names under `bridge_finalizer.*`, structured attributes, and
//! error recording kept apart from the business logic that opens them.
//!
//! # Example
//!
//! ```rust,no_run
//! use bridge_finalizer::spans;
//! use alloy_primitives::FixedBytes;
//!
//! let message_hash = FixedBytes::from([0u8; 32]);
//! let span = spans::await_attestation(&message_hash, 5, None);
//! let _guard = span.enter();
//! // Your custom attestation logic here
//! ```

use alloy_primitives::TxHash;
use tracing::Span;

use crate::protocol::{MessageHash, RelayStatus};

/// Create span for one CCTP finalize invocation.
///
/// Parent: caller's span, if any
/// Children: every other `bridge_finalizer.*` span of the CCTP flow
#[inline]
pub fn finalize(source_network: &str, tx_hash: TxHash) -> Span {
    tracing::info_span!(
        "bridge_finalizer.finalize",
        source_network = source_network,
        tx_hash = %tx_hash,
        message_hash = tracing::field::Empty,
        destination = tracing::field::Empty,
        error.type = tracing::field::Empty,
        error.message = tracing::field::Empty,
        error.source = tracing::field::Empty,
        error.context = tracing::field::Empty,
        otel.status_code = "OK",
    )
}

/// Create span for waiting on the source transaction and decoding its message.
///
/// Parent: bridge_finalizer.finalize
/// Children: Provider RPC calls (from alloy instrumentation)
#[inline]
pub fn extract_message(tx_hash: TxHash, source_chain: &str) -> Span {
    tracing::info_span!(
        "bridge_finalizer.extract_message",
        tx_hash = %tx_hash,
        source_chain = source_chain,
        error.type = tracing::field::Empty,
        error.message = tracing::field::Empty,
        error.source = tracing::field::Empty,
        otel.status_code = "OK",
    )
}

/// Create span for polling the attestation service.
///
/// Parent: bridge_finalizer.finalize
/// Children: bridge_finalizer.get_attestation (one per attempt)
#[inline]
pub fn await_attestation(
    message_hash: &MessageHash,
    poll_interval_secs: u64,
    max_wait_secs: Option<u64>,
) -> Span {
    tracing::info_span!(
        "bridge_finalizer.await_attestation",
        message_hash = %message_hash,
        poll_interval_secs = poll_interval_secs,
        max_wait_secs = ?max_wait_secs,
        error.type = tracing::field::Empty,
        error.message = tracing::field::Empty,
        error.source = tracing::field::Empty,
        otel.status_code = "OK",
    )
}

/// Create span for a single attestation request.
///
/// Parent: bridge_finalizer.await_attestation
/// Children: HTTP client request spans (from reqwest instrumentation)
#[inline]
pub fn get_attestation(attempt: u32) -> Span {
    tracing::debug_span!("bridge_finalizer.get_attestation", attempt = attempt)
}

/// Create span for relaying a message onto its destination.
///
/// Parent: bridge_finalizer.finalize
/// Children: Contract call and transaction send spans
#[inline]
pub fn submit_receive(destination: &str, message_len: usize, attestation_len: usize) -> Span {
    tracing::info_span!(
        "bridge_finalizer.submit_receive",
        destination = destination,
        message_len = message_len,
        attestation_len = attestation_len,
        tx_hash = tracing::field::Empty,
        error.type = tracing::field::Empty,
        error.message = tracing::field::Empty,
        error.source = tracing::field::Empty,
        otel.status_code = "OK",
    )
}

/// Create span for waiting on a withdrawal status.
///
/// Parent: bridge_finalizer.withdrawal
/// Children: Status oracle RPC calls
#[inline]
pub fn advance_to(tx_hash: TxHash, log_index: u64, target: RelayStatus) -> Span {
    tracing::info_span!(
        "bridge_finalizer.advance_to",
        tx_hash = %tx_hash,
        log_index = log_index,
        target = %target,
        observed = tracing::field::Empty,
        error.type = tracing::field::Empty,
        error.message = tracing::field::Empty,
        otel.status_code = "OK",
    )
}

/// Create span for one OP Stack withdrawal action (`prove` or `finalize`).
///
/// Parent: caller's span, if any
/// Children: bridge_finalizer.advance_to, submission spans
#[inline]
pub fn withdrawal(action: &'static str, tx_hash: TxHash, log_index: u64) -> Span {
    tracing::info_span!(
        "bridge_finalizer.withdrawal",
        action = action,
        tx_hash = %tx_hash,
        log_index = log_index,
        submitted_tx = tracing::field::Empty,
        error.type = tracing::field::Empty,
        error.message = tracing::field::Empty,
        error.source = tracing::field::Empty,
        error.context = tracing::field::Empty,
        otel.status_code = "OK",
    )
}

/// Record error attributes on the current span.
///
/// Sets `error.type`, `error.message`, `otel.status_code` and, when the error
/// has one, `error.source`.
pub fn record_error<E: std::error::Error>(error: &E) {
    let current_span = tracing::Span::current();
    let message = error.to_string();
    current_span.record(
        "error.type",
        message.split(':').next().unwrap_or("Unknown"),
    );
    current_span.record("error.message", message.as_str());
    current_span.record("otel.status_code", "ERROR");

    if let Some(source) = error.source() {
        current_span.record("error.source", source.to_string());
    }
}

/// Record error attributes with custom context on the current span.
///
/// ```rust,no_run
/// use bridge_finalizer::spans;
///
/// let span = tracing::info_span!("bridge_finalizer.operation", error.context = tracing::field::Empty);
/// let _guard = span.enter();
///
/// spans::record_error_with_context(
///     "SubmissionFailed",
///     "execution reverted: Nonce already used",
///     Some("the message was probably relayed by someone else"),
/// );
/// ```
pub fn record_error_with_context(
    error_type: &str,
    error_message: &str,
    additional_context: Option<&str>,
) {
    let current_span = tracing::Span::current();
    current_span.record("error.type", error_type);
    current_span.record("error.message", error_message);
    current_span.record("otel.status_code", "ERROR");

    if let Some(context) = additional_context {
        current_span.record("error.context", context);
    }
}
