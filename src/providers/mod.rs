//! Production implementations of the finalizer's trait abstractions.
//!
//! This module provides the "real" implementations of the traits defined in
//! [`crate::traits`] that interact with actual blockchain networks, Circle's
//! Iris API, and the system clock.

mod alloy;
mod clock;
mod iris;
mod op_stack;

pub use self::alloy::{AlloyConnector, AlloyProvider};
pub use self::clock::TokioClock;
pub use self::iris::IrisAttestationProvider;
pub use self::op_stack::{select_withdrawal, OpStackMessenger, Withdrawal};
