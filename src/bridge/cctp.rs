use alloy_primitives::{Bytes, TxHash};
use bon::Builder;
use tracing::{debug, error, info, Instrument, Span};

use super::config::PollingConfig;
use super::poller::AttestationPoller;
use crate::chain::{ChainDescriptor, NetworkRegistry};
use crate::error::{FinalizerError, Result};
use crate::protocol::{
    extract_message, resolve_destination, MessageHash, RawMessage, SubmissionReceipt,
    MESSAGE_SENT_SIGNATURE,
};
use crate::spans;
use crate::traits::{AttestationProvider, BlockchainProvider, ChainConnector, Clock, MessageSubmitter};

/// Relays CCTP v1 messages from their source transaction to their destination
///
/// # Example
///
/// ```rust,no_run
/// use bridge_finalizer::providers::{AlloyConnector, IrisAttestationProvider, TokioClock};
/// use bridge_finalizer::{CctpFinalizer, FinalizerConfig, FinalizerError, NetworkRegistry};
///
/// # async fn example() -> Result<(), FinalizerError> {
/// let config = FinalizerConfig::from_env()?;
///
/// let finalizer = CctpFinalizer::builder()
///     .registry(NetworkRegistry::mainnet(&config.rpc)?)
///     .connector(AlloyConnector::new(config.signer()?))
///     .attestation_provider(IrisAttestationProvider::new(config.iris_api_url.clone())?)
///     .clock(TokioClock)
///     .build();
///
/// let tx_hash = "0x4b5a3f0e6bd9a6a9b8b1b4d5a1b2c3d4e5f60718293a4b5c6d7e8f9a0b1c2d3e".parse()?;
/// let outcome = finalizer.finalize("base", tx_hash).await?;
/// assert!(outcome.receipt.is_some());
/// # Ok(())
/// # }
/// ```
#[derive(Builder, Clone, Debug)]
pub struct CctpFinalizer<K: ChainConnector, A: AttestationProvider, C: Clock> {
    registry: NetworkRegistry,
    connector: K,
    attestation_provider: A,
    clock: C,
    /// Attestation polling
    #[builder(default)]
    polling: PollingConfig,
    /// Waiting for the source transaction receipt
    #[builder(default = PollingConfig::status())]
    receipt_polling: PollingConfig,
    #[builder(default = MESSAGE_SENT_SIGNATURE.to_string(), into)]
    event_signature: String,
    /// Check the receiver's replay protection before submitting
    #[builder(default)]
    skip_if_received: bool,
}

/// Result of a successful [`CctpFinalizer::finalize`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalizeOutcome {
    pub message_hash: MessageHash,
    pub destination: ChainDescriptor,
    pub attestation: Bytes,
    /// `None` when the message had already been received and nothing was sent
    pub receipt: Option<SubmissionReceipt>,
    pub already_received: bool,
}

impl<K, A, C> CctpFinalizer<K, A, C>
where
    K: ChainConnector,
    A: AttestationProvider,
    C: Clock,
{
    pub fn registry(&self) -> &NetworkRegistry {
        &self.registry
    }

    /// Finalizes the message emitted by `tx_hash` on `source_network`
    ///
    /// Waits for the source receipt, extracts the first `MessageSent` event,
    /// waits for its attestation and submits it to the receiver of the chain
    /// named in the message header.
    ///
    /// # Errors
    ///
    /// Every failure aborts the operation. Header fields are only read once the
    /// attestation arrived, so a malformed header is reported after the
    /// attestation service was queried. Of note:
    /// - [`FinalizerError::UnknownNetwork`] for a `source_network` the registry lacks
    /// - [`FinalizerError::EventNotFound`] when the transaction emitted no message
    /// - [`FinalizerError::MessageNotFound`] when the attestation service has no record
    /// - [`FinalizerError::UnknownDomain`] when the header names an unregistered
    ///   domain, reported only after the attestation arrived
    /// - [`FinalizerError::SubmissionFailed`] when the destination rejects the
    ///   transaction; inspect before retrying
    pub async fn finalize(&self, source_network: &str, tx_hash: TxHash) -> Result<FinalizeOutcome> {
        let span = spans::finalize(source_network, tx_hash);

        async {
            let result = self.run(source_network, tx_hash).await;
            if let Err(ref e) = result {
                spans::record_error(e);
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn run(&self, source_network: &str, tx_hash: TxHash) -> Result<FinalizeOutcome> {
        let source = self.registry.resolve_chain(source_network)?;
        let message = self
            .message_from_source(source, tx_hash)
            .instrument(spans::extract_message(tx_hash, &source.name))
            .await?;

        let message_hash = message.hash();
        Span::current().record("message_hash", tracing::field::display(message_hash));

        info!(
            message_hash = %message_hash,
            message_length_bytes = message.len(),
            event = "message_extracted"
        );

        let attestation = AttestationPoller::builder()
            .attestation_provider(&self.attestation_provider)
            .clock(&self.clock)
            .polling(self.polling)
            .build()
            .await_attestation(message_hash)
            .await?;

        let destination_domain = resolve_destination(&message)?;
        let destination = self.registry.resolve_domain(destination_domain)?;
        Span::current().record("destination", destination.name.as_str());

        let submitter = self.connector.submitter(destination)?;

        if self.skip_if_received && submitter.is_message_received(destination, &message).await? {
            info!(
                destination = %destination.name,
                event = "message_already_received"
            );
            return Ok(FinalizeOutcome {
                message_hash,
                destination: destination.clone(),
                attestation,
                receipt: None,
                already_received: true,
            });
        }

        let submit_span =
            spans::submit_receive(&destination.name, message.len(), attestation.len());
        let receipt = submitter
            .submit_receive(destination, &message, &attestation)
            .instrument(submit_span.clone())
            .await
            .inspect_err(|e| {
                spans::record_error_with_context(
                    "SubmissionFailed",
                    &e.to_string(),
                    Some("Submissions are not retried, inspect the destination before trying again"),
                );
            })?;
        submit_span.record("tx_hash", tracing::field::display(receipt));

        info!(
            tx_hash = %receipt.transaction_id,
            destination = %destination.name,
            event = "message_finalized"
        );

        Ok(FinalizeOutcome {
            message_hash,
            destination: destination.clone(),
            attestation,
            receipt: Some(receipt),
            already_received: false,
        })
    }

    async fn message_from_source(
        &self,
        source: &ChainDescriptor,
        tx_hash: TxHash,
    ) -> Result<RawMessage> {
        let provider = self.connector.source(source)?;
        let started = self.clock.now();

        let logs = loop {
            if let Some(logs) = provider.get_transaction_logs(tx_hash).await? {
                break logs;
            }

            let elapsed = self.clock.now().saturating_duration_since(started);
            if self.receipt_polling.is_expired(elapsed) {
                error!(
                    waited_secs = elapsed.as_secs(),
                    event = "source_transaction_not_found"
                );
                return Err(FinalizerError::TransactionNotFound {
                    tx_hash: tx_hash.to_string(),
                });
            }

            debug!(
                poll_interval_secs = self.receipt_polling.poll_interval_secs,
                event = "source_transaction_pending"
            );
            self.clock.sleep(self.receipt_polling.poll_interval()).await;
        };

        extract_message(&logs, &self.event_signature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RpcEndpoints;
    use crate::protocol::message::tests::{message_sent_log, v1_message};
    use crate::protocol::AttestationResponse;
    use crate::testing::{FakeAttestationProvider, FakeClock, FakeConnector};
    use std::fmt;
    use std::sync::{Arc, Mutex};
    use tracing::field::{Field, Visit};
    use tracing::{span, Subscriber};
    use tracing_subscriber::layer::{Context, SubscriberExt};
    use tracing_subscriber::registry::LookupSpan;
    use tracing_subscriber::Layer;

    /// Collects the `tx_hash` values recorded on submit spans
    #[derive(Clone, Default)]
    struct SubmittedTxHashes(Arc<Mutex<Vec<String>>>);

    struct TxHashVisitor(Option<String>);

    impl Visit for TxHashVisitor {
        fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
            if field.name() == "tx_hash" {
                self.0 = Some(format!("{value:?}"));
            }
        }
    }

    impl<S> Layer<S> for SubmittedTxHashes
    where
        S: Subscriber + for<'a> LookupSpan<'a>,
    {
        fn on_record(&self, id: &span::Id, values: &span::Record<'_>, ctx: Context<'_, S>) {
            let is_submit = ctx
                .span(id)
                .is_some_and(|span| span.name() == "bridge_finalizer.submit_receive");
            if !is_submit {
                return;
            }
            let mut visitor = TxHashVisitor(None);
            values.record(&mut visitor);
            if let Some(tx_hash) = visitor.0 {
                self.0.lock().unwrap().push(tx_hash);
            }
        }
    }

    type TestFinalizer = CctpFinalizer<FakeConnector, FakeAttestationProvider, FakeClock>;

    fn finalizer(connector: &FakeConnector, attestations: &FakeAttestationProvider) -> TestFinalizer {
        CctpFinalizer::builder()
            .registry(NetworkRegistry::mainnet(&RpcEndpoints::default()).unwrap())
            .connector(connector.clone())
            .attestation_provider(attestations.clone())
            .clock(FakeClock::new())
            .build()
    }

    #[tokio::test]
    async fn test_unknown_source_network() {
        let connector = FakeConnector::new();
        let attestations = FakeAttestationProvider::new();

        let err = finalizer(&connector, &attestations)
            .finalize("solana", TxHash::ZERO)
            .await
            .unwrap_err();

        assert!(matches!(err, FinalizerError::UnknownNetwork { .. }));
        assert_eq!(connector.source_calls(), 0);
    }

    #[tokio::test]
    async fn test_unknown_destination_fails_after_attestation() {
        let message = v1_message(0, 0x4242, 1);
        let tx_hash = TxHash::repeat_byte(1);
        let connector = FakeConnector::new();
        connector.add_logs(tx_hash, vec![message_sent_log(&message)]);
        let attestations = FakeAttestationProvider::new();
        attestations.add_response_sequence(
            message.hash(),
            vec![AttestationResponse::complete(vec![9u8; 65])],
        );

        let err = finalizer(&connector, &attestations)
            .finalize("ethereum", tx_hash)
            .await
            .unwrap_err();

        assert!(matches!(err, FinalizerError::UnknownDomain { domain: 4242, .. }));
        assert_eq!(attestations.call_count(message.hash()), 1);
        assert!(connector.submissions().is_empty());
    }

    #[tokio::test]
    async fn test_custom_event_signature() {
        let message = v1_message(0, 6, 1);
        let tx_hash = TxHash::repeat_byte(2);
        let connector = FakeConnector::new();
        connector.add_logs(tx_hash, vec![message_sent_log(&message)]);
        let attestations = FakeAttestationProvider::new();

        let err = CctpFinalizer::builder()
            .registry(NetworkRegistry::mainnet(&RpcEndpoints::default()).unwrap())
            .connector(connector.clone())
            .attestation_provider(attestations.clone())
            .clock(FakeClock::new())
            .event_signature("SomethingElse(bytes)")
            .build()
            .finalize("ethereum", tx_hash)
            .await
            .unwrap_err();

        assert!(matches!(err, FinalizerError::EventNotFound { .. }));
        assert_eq!(attestations.call_count(message.hash()), 0);
    }

    #[tokio::test]
    async fn test_malformed_header_reported_after_attestation() {
        let message = RawMessage::new(vec![0u8; 8]);
        let tx_hash = TxHash::repeat_byte(3);
        let connector = FakeConnector::new();
        connector.add_logs(tx_hash, vec![message_sent_log(&message)]);
        let attestations = FakeAttestationProvider::new();
        attestations.add_complete_response(message.hash(), vec![9u8; 65]);

        let err = finalizer(&connector, &attestations)
            .finalize("ethereum", tx_hash)
            .await
            .unwrap_err();

        assert!(matches!(err, FinalizerError::MalformedMessage { .. }));
        assert_eq!(attestations.call_count(message.hash()), 1);
        assert!(connector.submitter_chains().is_empty());
    }

    #[tokio::test]
    async fn test_submission_tx_hash_recorded_on_span() {
        let message = v1_message(0, 6, 5);
        let tx_hash = TxHash::repeat_byte(4);
        let connector = FakeConnector::new();
        connector.add_logs(tx_hash, vec![message_sent_log(&message)]);
        let attestations = FakeAttestationProvider::new();
        attestations.add_complete_response(message.hash(), vec![9u8; 65]);

        let recorded = SubmittedTxHashes::default();
        let _guard = tracing::subscriber::set_default(
            tracing_subscriber::registry().with(recorded.clone()),
        );

        let outcome = finalizer(&connector, &attestations)
            .finalize("ethereum", tx_hash)
            .await
            .unwrap();

        let receipt = outcome.receipt.unwrap();
        assert_eq!(*recorded.0.lock().unwrap(), vec![receipt.to_string()]);
    }
}
