//! CCTP v1 message handling
//!
//! Extraction of the `MessageSent` payload from source chain logs, the message
//! hash used to query the attestation service, and the fixed-offset header
//! fields the finalizer reads.
//!
//! # Header format
//!
//! - version: uint32 (bytes 0..4)
//! - sourceDomain: uint32 (bytes 4..8)
//! - destinationDomain: uint32 (bytes 8..12)
//! - nonce: uint64 (bytes 12..20)
//! - sender: bytes32 (bytes 20..52)
//! - recipient: bytes32 (bytes 52..84)
//! - destinationCaller: bytes32 (bytes 84..116)
//! - messageBody: dynamic (bytes 116..)
//!
//! Reference: <https://developers.circle.com/stablecoins/message-format>

use alloy_primitives::{hex, keccak256, Bytes, FixedBytes};
use alloy_rpc_types::Log;
use alloy_sol_types::SolEvent;
use std::fmt;
use tracing::{debug, error};

use crate::contracts::message_transmitter::MessageTransmitter::MessageSent;
use crate::error::{FinalizerError, Result};

/// Signature of the event the CCTP v1 MessageTransmitter emits on burn
pub const MESSAGE_SENT_SIGNATURE: &str = "MessageSent(bytes)";

const SOURCE_DOMAIN_RANGE: std::ops::Range<usize> = 4..8;
const DESTINATION_DOMAIN_RANGE: std::ops::Range<usize> = 8..12;
const NONCE_RANGE: std::ops::Range<usize> = 12..20;

/// keccak256 digest of a [`RawMessage`], the correlation key with the attestation service
pub type MessageHash = FixedBytes<32>;

/// The opaque message bytes emitted by the source chain
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RawMessage(Bytes);

impl RawMessage {
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &Bytes {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the keccak256 hash of the message bytes
    ///
    /// ```rust
    /// use bridge_finalizer::RawMessage;
    ///
    /// let message = RawMessage::new(vec![1u8, 2, 3]);
    /// assert_eq!(message.hash(), message.hash());
    /// ```
    pub fn hash(&self) -> MessageHash {
        keccak256(&self.0)
    }

    /// Reads the destination domain field at bytes 8..12 of the header
    ///
    /// The field's eight hex digits are read as a decimal number, so `0x00000006`
    /// is domain 6 and `0x00000010` is domain 10. Every domain below 10 reads the
    /// same either way. A field holding a hex digit above 9 has no decimal
    /// reading and fails with [`FinalizerError::MalformedMessage`].
    ///
    /// The value is not checked against any registry. An id nobody knows about
    /// surfaces later as [`FinalizerError::UnknownDomain`].
    ///
    /// ```rust
    /// use bridge_finalizer::RawMessage;
    ///
    /// let mut header = vec![0u8; 116];
    /// header[11] = 0x10;
    /// assert_eq!(RawMessage::new(header).destination_domain().unwrap(), 10);
    /// ```
    pub fn destination_domain(&self) -> Result<u32> {
        let digits = hex::encode(self.field(DESTINATION_DOMAIN_RANGE, "destination domain")?);
        digits
            .parse::<u32>()
            .map_err(|_| FinalizerError::MalformedMessage {
                reason: format!("destination domain field {digits} is not a decimal number"),
            })
    }

    /// Reads the source domain field at bytes 4..8 of the header
    pub fn source_domain(&self) -> Result<u32> {
        self.read_u32(SOURCE_DOMAIN_RANGE, "source domain")
    }

    /// Reads the nonce field at bytes 12..20 of the header
    pub fn nonce(&self) -> Result<u64> {
        let bytes = self.field(NONCE_RANGE, "nonce")?;
        let mut buf = [0u8; 8];
        buf.copy_from_slice(bytes);
        Ok(u64::from_be_bytes(buf))
    }

    /// Key of the receiver's `usedNonces` mapping for this message:
    /// `keccak256(abi.encodePacked(sourceDomain, nonce))`
    pub fn used_nonce_key(&self) -> Result<FixedBytes<32>> {
        let mut packed = Vec::with_capacity(12);
        packed.extend_from_slice(&self.source_domain()?.to_be_bytes());
        packed.extend_from_slice(&self.nonce()?.to_be_bytes());
        Ok(keccak256(packed))
    }

    fn read_u32(&self, range: std::ops::Range<usize>, field: &str) -> Result<u32> {
        let bytes = self.field(range, field)?;
        Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    fn field(&self, range: std::ops::Range<usize>, field: &str) -> Result<&[u8]> {
        self.0
            .get(range.clone())
            .ok_or_else(|| FinalizerError::MalformedMessage {
                reason: format!(
                    "{field} needs bytes {}..{} but the message is {} bytes long",
                    range.start,
                    range.end,
                    self.0.len()
                ),
            })
    }
}

impl From<Vec<u8>> for RawMessage {
    fn from(bytes: Vec<u8>) -> Self {
        Self::new(bytes)
    }
}

impl AsRef<[u8]> for RawMessage {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for RawMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(&self.0))
    }
}

/// Finds the first log emitted for `event_signature` and decodes its data as a
/// single ABI `bytes` parameter
///
/// When a transaction emits several matching events only the first one is
/// returned.
///
/// # Errors
///
/// - [`FinalizerError::EventNotFound`] if no log carries the event topic
/// - [`FinalizerError::Abi`] if the matching log data is not an encoded `bytes`
pub fn extract_message(logs: &[Log], event_signature: &str) -> Result<RawMessage> {
    let event_topic = keccak256(event_signature.as_bytes());

    let log = logs
        .iter()
        .find(|log| {
            log.topics()
                .first()
                .is_some_and(|topic| *topic == event_topic)
        })
        .ok_or_else(|| {
            error!(
                signature = event_signature,
                available_logs = logs.len(),
                event = "message_event_not_found"
            );
            FinalizerError::EventNotFound {
                signature: event_signature.to_string(),
                available_logs: logs.len(),
            }
        })?;

    // The data layout is identical for any event with one `bytes` argument
    let decoded = MessageSent::abi_decode_data(&log.data().data)?;
    let message = RawMessage::new(decoded.0);

    debug!(
        signature = event_signature,
        message_length_bytes = message.len(),
        event = "message_event_decoded"
    );

    Ok(message)
}

/// Reads the destination domain id from the message header
///
/// Shorthand for [`RawMessage::destination_domain`].
pub fn resolve_destination(message: &RawMessage) -> Result<u32> {
    message.destination_domain()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use alloy_primitives::{Address, LogData, B256};
    use rstest::rstest;

    /// Builds a v1 message with the given domains and nonce and a short body
    pub(crate) fn v1_message(source: u32, destination: u32, nonce: u64) -> RawMessage {
        let mut bytes = Vec::with_capacity(120);
        bytes.extend_from_slice(&0u32.to_be_bytes());
        bytes.extend_from_slice(&source.to_be_bytes());
        bytes.extend_from_slice(&destination.to_be_bytes());
        bytes.extend_from_slice(&nonce.to_be_bytes());
        bytes.extend_from_slice(&[0x11; 32]);
        bytes.extend_from_slice(&[0x22; 32]);
        bytes.extend_from_slice(&[0x00; 32]);
        bytes.extend_from_slice(&[0xca, 0xfe]);
        RawMessage::new(bytes)
    }

    pub(crate) fn message_sent_log(message: &RawMessage) -> Log {
        let event = MessageSent {
            message: message.as_bytes().clone(),
        };
        Log {
            inner: alloy_primitives::Log {
                address: Address::repeat_byte(0x0a),
                data: event.encode_log_data(),
            },
            ..Default::default()
        }
    }

    fn unrelated_log() -> Log {
        Log {
            inner: alloy_primitives::Log {
                address: Address::repeat_byte(0x0b),
                data: LogData::new_unchecked(vec![B256::repeat_byte(0x01)], Bytes::new()),
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_signature_matches_generated_binding() {
        assert_eq!(
            keccak256(MESSAGE_SENT_SIGNATURE.as_bytes()),
            MessageSent::SIGNATURE_HASH
        );
    }

    #[test]
    fn test_extract_single_event() {
        let message = v1_message(0, 6, 42);
        let logs = vec![unrelated_log(), message_sent_log(&message)];

        let extracted = extract_message(&logs, MESSAGE_SENT_SIGNATURE).unwrap();
        assert_eq!(extracted, message);
    }

    #[test]
    fn test_extract_takes_first_of_two_events() {
        let first = v1_message(0, 6, 1);
        let second = v1_message(0, 3, 2);
        let logs = vec![message_sent_log(&first), message_sent_log(&second)];

        let extracted = extract_message(&logs, MESSAGE_SENT_SIGNATURE).unwrap();
        assert_eq!(extracted, first);
    }

    #[test]
    fn test_extract_without_matching_event() {
        let logs = vec![unrelated_log(), unrelated_log()];

        let err = extract_message(&logs, MESSAGE_SENT_SIGNATURE).unwrap_err();
        assert!(matches!(
            err,
            FinalizerError::EventNotFound {
                available_logs: 2,
                ..
            }
        ));
    }

    #[test]
    fn test_extract_with_other_signature_ignores_message_sent() {
        let message = v1_message(0, 6, 1);
        let logs = vec![message_sent_log(&message)];

        let err = extract_message(&logs, "DepositForBurn(uint64)").unwrap_err();
        assert!(matches!(err, FinalizerError::EventNotFound { .. }));
    }

    #[test]
    fn test_hash_is_deterministic_and_distinct() {
        let a = v1_message(0, 6, 1);
        let b = v1_message(0, 6, 2);

        assert_eq!(a.hash(), a.clone().hash());
        assert_ne!(a.hash(), b.hash());
        assert_eq!(a.hash(), keccak256(a.as_bytes()));
    }

    #[rstest]
    #[case(0)]
    #[case(1)]
    #[case(2)]
    #[case(3)]
    #[case(6)]
    #[case(7)]
    fn test_resolve_destination_per_domain(#[case] domain: u32) {
        let message = v1_message(5, domain, 99);
        assert_eq!(resolve_destination(&message).unwrap(), domain);
    }

    #[test]
    fn test_resolve_destination_does_not_validate() {
        let message = v1_message(0, 0x4242, 1);
        assert_eq!(resolve_destination(&message).unwrap(), 4242);
    }

    #[rstest]
    #[case(0x0000_0010, 10)]
    #[case(0x0000_0099, 99)]
    #[case(0x0001_0000, 10_000)]
    fn test_resolve_destination_reads_hex_digits_as_decimal(
        #[case] field: u32,
        #[case] expected: u32,
    ) {
        let message = v1_message(0, field, 1);
        assert_eq!(resolve_destination(&message).unwrap(), expected);
    }

    #[test]
    fn test_resolve_destination_non_decimal_digit() {
        let message = v1_message(0, 0x0000_000a, 1);

        let err = resolve_destination(&message).unwrap_err();
        insta::assert_snapshot!(err, @"Malformed message: destination domain field 0000000a is not a decimal number");
    }

    #[test]
    fn test_resolve_destination_short_message() {
        let message = RawMessage::new(vec![0u8; 10]);
        assert!(matches!(
            resolve_destination(&message).unwrap_err(),
            FinalizerError::MalformedMessage { .. }
        ));
    }

    #[test]
    fn test_header_fields() {
        let message = v1_message(3, 6, 0x0102_0304_0506_0708);

        assert_eq!(message.source_domain().unwrap(), 3);
        assert_eq!(message.nonce().unwrap(), 0x0102_0304_0506_0708);

        let mut packed = 3u32.to_be_bytes().to_vec();
        packed.extend_from_slice(&0x0102_0304_0506_0708u64.to_be_bytes());
        assert_eq!(message.used_nonce_key().unwrap(), keccak256(packed));
    }

    #[test]
    fn test_display_is_prefixed_hex() {
        let message = RawMessage::new(vec![0xde, 0xad]);
        assert_eq!(message.to_string(), "0xdead");
    }
}
