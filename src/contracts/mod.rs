//! Contract bindings
//!
//! Alloy-generated bindings for the contracts both relay flows talk to.
//!
//! - [`message_transmitter`]: CCTP v1 `MessageTransmitter`, with the
//!   [`MessageTransmitterContract`](message_transmitter::MessageTransmitterContract) wrapper
//! - [`optimism`]: OP Stack portal, dispute game factory, message passer and messenger

pub mod message_transmitter;
pub mod optimism;
