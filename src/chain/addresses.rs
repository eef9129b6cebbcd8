// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
//! Contract addresses for both relay flows
//!
//! CCTP v1 MessageTransmitter receivers for every chain in the default
//! registry, and the L1 side of the OP Mainnet withdrawal path.

use alloy_primitives::{address, Address};

// CCTP v1 MessageTransmitter Addresses

/// <https://etherscan.io/address/0x0a992d191DEeC32aFe36203Ad87D7d289a738F81>
pub const ETHEREUM_MESSAGE_TRANSMITTER_ADDRESS: Address =
    address!("0a992d191DEeC32aFe36203Ad87D7d289a738F81");

/// <https://snowtrace.io/address/0x8186359af5f57fbb40c6b14a588d2a59c0c29880>
pub const AVALANCHE_MESSAGE_TRANSMITTER_ADDRESS: Address =
    address!("8186359af5f57fbb40c6b14a588d2a59c0c29880");

/// <https://optimistic.etherscan.io/address/0x4D41f22c5a0e5c74090899E5a8Fb597a8842b3e8>
pub const OPTIMISM_MESSAGE_TRANSMITTER_ADDRESS: Address =
    address!("4D41f22c5a0e5c74090899E5a8Fb597a8842b3e8");

/// <https://arbiscan.io/address/0xC30362313FBBA5cf9163F0bb16a0e01f01a896ca>
pub const ARBITRUM_MESSAGE_TRANSMITTER_ADDRESS: Address =
    address!("c30362313fbba5cf9163f0bb16a0e01f01a896ca");

/// <https://basescan.org/address/0xAD09780d193884d503182aD4588450C416D6F9D4>
pub const BASE_MESSAGE_TRANSMITTER_ADDRESS: Address =
    address!("ad09780d193884d503182ad4588450c416d6f9d4");

/// <https://polygonscan.com/address/0xF3be9355363857F3e001be68856A2f96b4C39Ba9>
pub const POLYGON_MESSAGE_TRANSMITTER_ADDRESS: Address =
    address!("F3be9355363857F3e001be68856A2f96b4C39Ba9");

// OP Mainnet withdrawal path
//
// Reference: <https://docs.optimism.io/superchain/addresses>

/// OptimismPortal proxy on Ethereum mainnet
pub const OP_MAINNET_OPTIMISM_PORTAL: Address =
    address!("bEb5Fc579115071764c7423A4f12eDde41f106Ed");

/// L1CrossDomainMessenger proxy on Ethereum mainnet
pub const OP_MAINNET_L1_CROSS_DOMAIN_MESSENGER: Address =
    address!("25ace71c97B33Cc4729CF772ae268934F7ab5fA1");

/// L2ToL1MessagePasser predeploy, identical on every OP Stack chain
pub const L2_TO_L1_MESSAGE_PASSER: Address =
    address!("4200000000000000000000000000000000000016");
