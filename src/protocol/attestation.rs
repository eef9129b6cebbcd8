use alloy_primitives::{hex::FromHex, Bytes};
use serde::{Deserialize, Deserializer};

/// Represents the response from the attestation service
///
/// It contains the status of the attestation and optionally the attestation data itself.
/// The attestation data is a hex-encoded string (with or without "0x" prefix) that is
/// automatically deserialized into bytes.
///
/// **API Quirk**: Circle's Iris API sometimes returns the string `"PENDING"` for the
/// attestation field instead of `null` when the attestation is not yet ready. This
/// deserializer handles that case gracefully by treating "PENDING" as `None`.
///
/// A message the service has no record of at all is not represented here: the
/// [`AttestationProvider`](crate::AttestationProvider) returns `None` instead.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AttestationResponse {
    pub status: AttestationStatus,
    #[serde(default, deserialize_with = "deserialize_optional_bytes_or_pending")]
    pub attestation: Option<Bytes>,
}

impl AttestationResponse {
    /// A response still waiting on the attestation service
    pub fn pending() -> Self {
        Self {
            status: AttestationStatus::Pending,
            attestation: None,
        }
    }

    /// A completed response carrying the signed attestation
    pub fn complete(attestation: impl Into<Bytes>) -> Self {
        Self {
            status: AttestationStatus::Complete,
            attestation: Some(attestation.into()),
        }
    }
}

/// Handles the Circle API quirk where the attestation field may be the string
/// "PENDING" instead of null
///
/// - Valid hex string (with or without "0x") → `Some(Bytes)`
/// - "PENDING" or "pending" → `None`
/// - null, missing or empty → `None`
/// - Invalid hex → error
fn deserialize_optional_bytes_or_pending<'de, D>(deserializer: D) -> Result<Option<Bytes>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;

    match opt {
        None => Ok(None),
        Some(s) if s.is_empty() => Ok(None),
        Some(s) if s.eq_ignore_ascii_case("pending") => Ok(None),
        Some(s) => {
            let bytes = Bytes::from_hex(s).map_err(serde::de::Error::custom)?;
            Ok(Some(bytes))
        }
    }
}

/// Represents the status of the attestation.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AttestationStatus {
    Complete,
    Pending,
    PendingConfirmations,
    Failed,
}
