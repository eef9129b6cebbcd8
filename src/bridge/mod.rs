//! Relay flows
//!
//! The polling building blocks, [`AttestationPoller`] and
//! [`MessageStatusTracker`], and the two orchestrators built on them:
//! [`CctpFinalizer`] for CCTP v1 messages and [`OpStackFinalizer`] for OP Stack
//! withdrawals.

mod cctp;
mod config;
mod op_stack;
mod poller;
mod tracker;

pub use cctp::{CctpFinalizer, FinalizeOutcome};
pub use config::{PollingConfig, ATTESTATION_PATH_V1, IRIS_API, IRIS_API_SANDBOX};
pub use op_stack::{OpStackFinalizer, StageOutcome};
pub use poller::AttestationPoller;
pub use tracker::MessageStatusTracker;
