use alloy_chains::NamedChain;
use alloy_primitives::Address;

use super::addresses::{
    ARBITRUM_MESSAGE_TRANSMITTER_ADDRESS, AVALANCHE_MESSAGE_TRANSMITTER_ADDRESS,
    BASE_MESSAGE_TRANSMITTER_ADDRESS, ETHEREUM_MESSAGE_TRANSMITTER_ADDRESS,
    OPTIMISM_MESSAGE_TRANSMITTER_ADDRESS, POLYGON_MESSAGE_TRANSMITTER_ADDRESS,
};
use crate::error::{FinalizerError, Result};
use crate::protocol::DomainId;

/// Trait for chains that can receive CCTP v1 messages
pub trait CctpV1 {
    /// The domain ID of the chain - used to identify the chain in message headers: <https://developers.circle.com/stablecoins/evm-smart-contracts>
    fn cctp_domain_id(&self) -> Result<DomainId>;
    /// The address of the `MessageTransmitter` contract, the receiver finalized messages are submitted to
    fn message_transmitter_address(&self) -> Result<Address>;
}

impl CctpV1 for NamedChain {
    fn cctp_domain_id(&self) -> Result<DomainId> {
        use NamedChain::*;

        match self {
            Mainnet => Ok(DomainId::Ethereum),
            Avalanche => Ok(DomainId::Avalanche),
            Optimism => Ok(DomainId::Optimism),
            Arbitrum => Ok(DomainId::Arbitrum),
            Base => Ok(DomainId::Base),
            Polygon => Ok(DomainId::Polygon),
            _ => Err(unsupported(self)),
        }
    }

    fn message_transmitter_address(&self) -> Result<Address> {
        use NamedChain::*;

        match self {
            Mainnet => Ok(ETHEREUM_MESSAGE_TRANSMITTER_ADDRESS),
            Avalanche => Ok(AVALANCHE_MESSAGE_TRANSMITTER_ADDRESS),
            Optimism => Ok(OPTIMISM_MESSAGE_TRANSMITTER_ADDRESS),
            Arbitrum => Ok(ARBITRUM_MESSAGE_TRANSMITTER_ADDRESS),
            Base => Ok(BASE_MESSAGE_TRANSMITTER_ADDRESS),
            Polygon => Ok(POLYGON_MESSAGE_TRANSMITTER_ADDRESS),
            _ => Err(unsupported(self)),
        }
    }
}

impl From<DomainId> for NamedChain {
    fn from(domain: DomainId) -> Self {
        match domain {
            DomainId::Ethereum => NamedChain::Mainnet,
            DomainId::Avalanche => NamedChain::Avalanche,
            DomainId::Optimism => NamedChain::Optimism,
            DomainId::Arbitrum => NamedChain::Arbitrum,
            DomainId::Base => NamedChain::Base,
            DomainId::Polygon => NamedChain::Polygon,
        }
    }
}

fn unsupported(chain: &NamedChain) -> FinalizerError {
    FinalizerError::InvalidConfig(format!("Chain not supported for CCTP v1: {chain}"))
}
