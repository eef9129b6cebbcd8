//! Chain configuration, contract addresses and the network registry
//!
//! This module contains the per-chain receiver addresses for CCTP v1, the
//! OP Mainnet withdrawal contracts and the [`NetworkRegistry`] that maps
//! network names and domain ids to [`ChainDescriptor`]s.

pub(crate) mod addresses;
mod config;
mod registry;

pub use addresses::*;
pub use config::CctpV1;
pub use registry::{ChainDescriptor, NetworkRegistry};
