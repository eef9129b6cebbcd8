//! Integration tests for both relay flows using fake implementations
//!
//! The finalizers are driven end to end through their public API, with every
//! chain, the attestation service and the clock replaced by the fakes from
//! `bridge_finalizer::testing`.

use alloy_primitives::{Address, Bytes, TxHash};
use alloy_rpc_types::Log;
use alloy_sol_types::SolEvent;
use bridge_finalizer::contracts::message_transmitter::MessageTransmitter::MessageSent;
use bridge_finalizer::testing::{
    FakeAttestationProvider, FakeClock, FakeConnector, FakeStatusOracle, FakeSubmitter,
    FakeWithdrawalSubmitter, WithdrawalAction,
};
use bridge_finalizer::{
    AttestationResponse, AttestationStatus, CctpFinalizer, FinalizerError, NetworkRegistry,
    OpStackFinalizer, PollingConfig, RawMessage, RelayStatus, RpcEndpoints, StageOutcome,
};
use std::time::Duration;

/// A CCTP v1 message from `source` to `destination` with a short body
fn message(source: u32, destination: u32, nonce: u64) -> RawMessage {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&0u32.to_be_bytes());
    bytes.extend_from_slice(&source.to_be_bytes());
    bytes.extend_from_slice(&destination.to_be_bytes());
    bytes.extend_from_slice(&nonce.to_be_bytes());
    bytes.extend_from_slice(&[0x01; 32]);
    bytes.extend_from_slice(&[0x02; 32]);
    bytes.extend_from_slice(&[0x00; 32]);
    bytes.extend_from_slice(b"transfer");
    RawMessage::new(bytes)
}

fn message_sent_log(message: &RawMessage) -> Log {
    Log {
        inner: alloy_primitives::Log {
            address: Address::repeat_byte(0x0a),
            data: MessageSent {
                message: message.as_bytes().clone(),
            }
            .encode_log_data(),
        },
        ..Default::default()
    }
}

fn attestation() -> Bytes {
    Bytes::from(vec![0x5a; 65])
}

fn create_test_finalizer(
    connector: &FakeConnector,
    attestations: &FakeAttestationProvider,
    clock: &FakeClock,
) -> CctpFinalizer<FakeConnector, FakeAttestationProvider, FakeClock> {
    CctpFinalizer::builder()
        .registry(NetworkRegistry::mainnet(&RpcEndpoints::default()).unwrap())
        .connector(connector.clone())
        .attestation_provider(attestations.clone())
        .clock(clock.clone())
        .build()
}

#[tokio::test]
async fn test_finalize_to_base_after_two_pending_polls() {
    let message = message(0, 6, 42);
    let tx_hash = TxHash::repeat_byte(1);
    let connector = FakeConnector::new();
    connector.add_logs(tx_hash, vec![message_sent_log(&message)]);
    let attestations = FakeAttestationProvider::new();
    attestations.add_response_sequence(
        message.hash(),
        vec![
            AttestationResponse::pending(),
            AttestationResponse {
                status: AttestationStatus::PendingConfirmations,
                attestation: None,
            },
            AttestationResponse::complete(attestation()),
        ],
    );
    let clock = FakeClock::new();

    let outcome = create_test_finalizer(&connector, &attestations, &clock)
        .finalize("ethereum", tx_hash)
        .await
        .unwrap();

    assert_eq!(outcome.message_hash, message.hash());
    assert_eq!(outcome.destination.name, "base");
    assert_eq!(outcome.destination.domain_id, 6);
    assert_eq!(outcome.attestation, attestation());
    assert!(!outcome.already_received);
    assert!(outcome.receipt.is_some_and(|r| !r.transaction_id.is_zero()));

    assert_eq!(connector.source_chains(), vec!["ethereum".to_string()]);
    assert_eq!(connector.submitter_chains(), vec!["base".to_string()]);

    let submissions = connector.submissions();
    assert_eq!(submissions.len(), 1);
    assert_eq!(submissions[0].destination.domain_id, 6);
    assert_eq!(submissions[0].message, message);
    assert_eq!(submissions[0].attestation, attestation());

    assert_eq!(attestations.call_count(message.hash()), 3);
    assert_eq!(clock.sleeps(), vec![Duration::from_secs(5); 2]);
}

#[tokio::test]
async fn test_source_network_name_is_case_insensitive() {
    let message = message(3, 0, 7);
    let tx_hash = TxHash::repeat_byte(2);
    let connector = FakeConnector::new();
    connector.add_logs(tx_hash, vec![message_sent_log(&message)]);
    let attestations = FakeAttestationProvider::new();
    attestations.add_complete_response(message.hash(), attestation());

    let outcome = create_test_finalizer(&connector, &attestations, &FakeClock::new())
        .finalize("Arbitrum", tx_hash)
        .await
        .unwrap();

    assert_eq!(connector.source_chains(), vec!["arbitrum".to_string()]);
    assert_eq!(outcome.destination.name, "ethereum");
}

#[tokio::test]
async fn test_waits_for_source_transaction_to_be_mined() {
    let message = message(0, 2, 1);
    let tx_hash = TxHash::repeat_byte(3);
    let connector = FakeConnector::new();
    connector
        .source_provider()
        .add_pending_then_logs(tx_hash, 2, vec![message_sent_log(&message)]);
    let attestations = FakeAttestationProvider::new();
    attestations.add_complete_response(message.hash(), attestation());
    let clock = FakeClock::new();

    let outcome = create_test_finalizer(&connector, &attestations, &clock)
        .finalize("ethereum", tx_hash)
        .await
        .unwrap();

    assert_eq!(outcome.destination.name, "optimism");
    assert_eq!(connector.source_provider().call_count(), 3);
    assert_eq!(clock.sleeps(), vec![Duration::from_secs(4); 2]);
}

#[tokio::test]
async fn test_source_transaction_never_mined() {
    let tx_hash = TxHash::repeat_byte(4);
    let connector = FakeConnector::new();
    let attestations = FakeAttestationProvider::new();
    let clock = FakeClock::new();

    let err = CctpFinalizer::builder()
        .registry(NetworkRegistry::mainnet(&RpcEndpoints::default()).unwrap())
        .connector(connector.clone())
        .attestation_provider(attestations.clone())
        .clock(clock.clone())
        .receipt_polling(PollingConfig::status().with_max_wait_secs(8))
        .build()
        .finalize("ethereum", tx_hash)
        .await
        .unwrap_err();

    assert!(matches!(err, FinalizerError::TransactionNotFound { .. }));
    assert_eq!(connector.source_provider().call_count(), 3);
    assert_eq!(clock.elapsed(), Duration::from_secs(8));
    assert!(connector.submitter_chains().is_empty());
}

#[tokio::test]
async fn test_transaction_without_message_sent() {
    let tx_hash = TxHash::repeat_byte(5);
    let connector = FakeConnector::new();
    connector.add_logs(tx_hash, vec![]);
    let attestations = FakeAttestationProvider::new();

    let err = create_test_finalizer(&connector, &attestations, &FakeClock::new())
        .finalize("ethereum", tx_hash)
        .await
        .unwrap_err();

    insta::assert_snapshot!(err, @"Event MessageSent(bytes) not found among 0 transaction logs");
}

#[tokio::test]
async fn test_rejected_submission_is_reported_once() {
    let message = message(6, 3, 9);
    let tx_hash = TxHash::repeat_byte(6);
    let connector = FakeConnector::with_submitter(FakeSubmitter::rejecting("execution reverted"));
    connector.add_logs(tx_hash, vec![message_sent_log(&message)]);
    let attestations = FakeAttestationProvider::new();
    attestations.add_complete_response(message.hash(), attestation());

    let err = create_test_finalizer(&connector, &attestations, &FakeClock::new())
        .finalize("base", tx_hash)
        .await
        .unwrap_err();

    assert!(
        matches!(err, FinalizerError::SubmissionFailed { ref reason } if reason == "execution reverted")
    );
    assert_eq!(connector.submissions().len(), 1);
    assert_eq!(attestations.call_count(message.hash()), 1);
}

#[tokio::test]
async fn test_skip_if_received() {
    let message = message(0, 7, 11);
    let tx_hash = TxHash::repeat_byte(7);
    let connector = FakeConnector::new();
    connector.add_logs(tx_hash, vec![message_sent_log(&message)]);
    connector.fake_submitter().mark_received();
    let attestations = FakeAttestationProvider::new();
    attestations.add_complete_response(message.hash(), attestation());

    let outcome = CctpFinalizer::builder()
        .registry(NetworkRegistry::mainnet(&RpcEndpoints::default()).unwrap())
        .connector(connector.clone())
        .attestation_provider(attestations.clone())
        .clock(FakeClock::new())
        .skip_if_received(true)
        .build()
        .finalize("ethereum", tx_hash)
        .await
        .unwrap();

    assert!(outcome.already_received);
    assert!(outcome.receipt.is_none());
    assert_eq!(outcome.destination.name, "polygon");
    assert!(connector.submissions().is_empty());
}

#[tokio::test]
async fn test_received_message_is_resubmitted_without_skip() {
    let message = message(0, 1, 12);
    let tx_hash = TxHash::repeat_byte(8);
    let connector = FakeConnector::new();
    connector.add_logs(tx_hash, vec![message_sent_log(&message)]);
    connector.fake_submitter().mark_received();
    let attestations = FakeAttestationProvider::new();
    attestations.add_complete_response(message.hash(), attestation());

    let outcome = create_test_finalizer(&connector, &attestations, &FakeClock::new())
        .finalize("ethereum", tx_hash)
        .await
        .unwrap();

    assert!(outcome.receipt.is_some());
    assert_eq!(connector.submitter_chains(), vec!["avalanche".to_string()]);
    assert_eq!(connector.submissions().len(), 1);
}

#[tokio::test]
async fn test_attestation_deadline_stops_before_submission() {
    let message = message(0, 6, 13);
    let tx_hash = TxHash::repeat_byte(9);
    let connector = FakeConnector::new();
    connector.add_logs(tx_hash, vec![message_sent_log(&message)]);
    let attestations = FakeAttestationProvider::new();
    attestations.add_response_sequence(message.hash(), vec![AttestationResponse::pending()]);

    let err = CctpFinalizer::builder()
        .registry(NetworkRegistry::mainnet(&RpcEndpoints::default()).unwrap())
        .connector(connector.clone())
        .attestation_provider(attestations.clone())
        .clock(FakeClock::new())
        .polling(PollingConfig::default().with_max_wait_secs(20))
        .build()
        .finalize("ethereum", tx_hash)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        FinalizerError::PollingDeadlineExceeded {
            operation: "attestation",
            waited_secs: 20,
        }
    ));
    assert_eq!(attestations.call_count(message.hash()), 5);
    assert!(connector.submitter_chains().is_empty());
}

#[tokio::test]
async fn test_withdrawal_full_lifecycle() {
    let tx_hash = TxHash::repeat_byte(0x0b);
    let oracle = FakeStatusOracle::new(vec![
        RelayStatus::Submitted,
        RelayStatus::ReadyToProve,
        RelayStatus::Proven,
        RelayStatus::Proven,
        RelayStatus::ReadyForRelay,
        RelayStatus::Relayed,
    ]);
    let submitter = FakeWithdrawalSubmitter::new();
    let clock = FakeClock::new();

    let finalizer = OpStackFinalizer::builder()
        .oracle(oracle.clone())
        .submitter(submitter.clone())
        .clock(clock.clone())
        .build();

    let proven = finalizer.prove(tx_hash, 0).await.unwrap();
    let finalized = finalizer.finalize(tx_hash, 0).await.unwrap();

    assert!(matches!(proven, StageOutcome::Submitted(_)));
    assert!(matches!(finalized, StageOutcome::Submitted(_)));
    assert_ne!(proven.receipt(), finalized.receipt());
    assert_eq!(
        submitter.actions(),
        vec![
            (WithdrawalAction::Prove, tx_hash, 0),
            (WithdrawalAction::Finalize, tx_hash, 0),
        ]
    );
    // one sleep before ReadyToProve, two while proven, none once relayed
    assert_eq!(oracle.call_count(), 6);
    assert_eq!(clock.sleeps(), vec![Duration::from_secs(4); 3]);
}

#[tokio::test]
async fn test_withdrawal_already_finalized_is_skipped() {
    let oracle = FakeStatusOracle::new(vec![RelayStatus::Relayed]);
    let submitter = FakeWithdrawalSubmitter::new();

    let finalizer = OpStackFinalizer::builder()
        .oracle(oracle.clone())
        .submitter(submitter.clone())
        .clock(FakeClock::new())
        .skip_completed_stages(true)
        .build();

    let proven = finalizer.prove(TxHash::ZERO, 2).await.unwrap();
    let finalized = finalizer.finalize(TxHash::ZERO, 2).await.unwrap();

    assert_eq!(proven, StageOutcome::AlreadyDone(RelayStatus::Relayed));
    assert_eq!(finalized, StageOutcome::AlreadyDone(RelayStatus::Relayed));
    assert!(submitter.actions().is_empty());
}
