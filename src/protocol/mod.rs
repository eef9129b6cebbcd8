//! Protocol level types and definitions
//!
//! This module contains the types shared by both relay flows: CCTP domain
//! identifiers, attestation responses, the raw message and its header fields,
//! and the OP Stack withdrawal lifecycle.

mod attestation;
mod domain_id;
pub(crate) mod message;
mod receipt;
mod relay_status;

pub use attestation::{AttestationResponse, AttestationStatus};
pub use domain_id::{DomainId, InvalidDomainId};
pub use message::{
    extract_message, resolve_destination, MessageHash, RawMessage, MESSAGE_SENT_SIGNATURE,
};
pub use receipt::SubmissionReceipt;
pub use relay_status::RelayStatus;
