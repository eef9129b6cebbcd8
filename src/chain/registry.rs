//! Network registry
//!
//! Immutable routing table from human-readable network names and CCTP domain
//! ids to the chain descriptors the finalizer connects to. Built once at
//! startup and shared read-only by every finalize invocation.

use alloy_chains::NamedChain;
use alloy_primitives::Address;
use std::collections::HashSet;
use tracing::debug;
use url::Url;

use super::config::CctpV1;
use crate::config::RpcEndpoints;
use crate::error::{FinalizerError, Result};
use crate::protocol::DomainId;

/// Everything needed to reach one chain and its receiver contract
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainDescriptor {
    /// Lowercase network name used on the command line, e.g. `base`
    pub name: String,
    /// CCTP domain id
    pub domain_id: u32,
    pub chain: NamedChain,
    /// RPC endpoint, `None` when the environment did not provide one
    pub rpc_url: Option<Url>,
    /// Contract finalized messages are submitted to
    pub receiver_contract: Address,
}

impl ChainDescriptor {
    /// Returns the RPC endpoint or [`FinalizerError::MissingRpcUrl`]
    pub fn rpc_url(&self) -> Result<&Url> {
        self.rpc_url
            .as_ref()
            .ok_or_else(|| FinalizerError::MissingRpcUrl {
                chain: self.name.clone(),
            })
    }

    /// Builds the descriptor of a CCTP v1 chain from its [`DomainId`]
    pub fn cctp_v1(domain: DomainId, rpc_url: Option<Url>) -> Result<Self> {
        let chain = NamedChain::from(domain);
        Ok(Self {
            name: domain.network_name().to_string(),
            domain_id: chain.cctp_domain_id()?.as_u32(),
            chain,
            rpc_url,
            receiver_contract: chain.message_transmitter_address()?,
        })
    }
}

/// Read-only lookup table of [`ChainDescriptor`]s
///
/// ```rust
/// use bridge_finalizer::{NetworkRegistry, RpcEndpoints};
///
/// let registry = NetworkRegistry::mainnet(&RpcEndpoints::default()).unwrap();
/// assert_eq!(registry.resolve_chain("Base").unwrap().domain_id, 6);
/// assert_eq!(registry.resolve_domain(3).unwrap().name, "arbitrum");
/// assert!(registry.resolve_chain("solana").is_err());
/// ```
#[derive(Debug, Clone)]
pub struct NetworkRegistry {
    chains: Vec<ChainDescriptor>,
}

impl NetworkRegistry {
    /// Creates a registry, rejecting duplicate names or domain ids
    pub fn new(chains: Vec<ChainDescriptor>) -> Result<Self> {
        let mut names = HashSet::new();
        let mut domains = HashSet::new();

        for chain in &chains {
            if !names.insert(chain.name.to_lowercase()) {
                return Err(FinalizerError::InvalidConfig(format!(
                    "Duplicate network name in registry: {}",
                    chain.name
                )));
            }
            if !domains.insert(chain.domain_id) {
                return Err(FinalizerError::InvalidConfig(format!(
                    "Duplicate domain id in registry: {}",
                    chain.domain_id
                )));
            }
        }

        debug!(
            networks = chains.len(),
            event = "network_registry_created"
        );

        Ok(Self { chains })
    }

    /// The CCTP v1 mainnet table, with RPC endpoints taken from `rpc`
    pub fn mainnet(rpc: &RpcEndpoints) -> Result<Self> {
        let chains = DomainId::ALL
            .into_iter()
            .map(|domain| ChainDescriptor::cctp_v1(domain, rpc.get(domain).cloned()))
            .collect::<Result<Vec<_>>>()?;
        Self::new(chains)
    }

    /// Looks a network up by name, ignoring case
    pub fn resolve_chain(&self, name: &str) -> Result<&ChainDescriptor> {
        self.chains
            .iter()
            .find(|chain| chain.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| FinalizerError::UnknownNetwork {
                name: name.to_string(),
                valid: self.names().map(str::to_string).collect(),
            })
    }

    /// Looks a network up by CCTP domain id
    pub fn resolve_domain(&self, domain_id: u32) -> Result<&ChainDescriptor> {
        self.chains
            .iter()
            .find(|chain| chain.domain_id == domain_id)
            .ok_or_else(|| FinalizerError::UnknownDomain {
                domain: domain_id,
                valid: self.domains().collect(),
            })
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.chains.iter().map(|chain| chain.name.as_str())
    }

    pub fn domains(&self) -> impl Iterator<Item = u32> + '_ {
        self.chains.iter().map(|chain| chain.domain_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChainDescriptor> {
        self.chains.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::addresses::BASE_MESSAGE_TRANSMITTER_ADDRESS;
    use rstest::rstest;

    fn registry() -> NetworkRegistry {
        NetworkRegistry::mainnet(&RpcEndpoints::default()).unwrap()
    }

    #[rstest]
    #[case("ethereum", 0)]
    #[case("avalanche", 1)]
    #[case("optimism", 2)]
    #[case("arbitrum", 3)]
    #[case("base", 6)]
    #[case("polygon", 7)]
    fn test_resolve_chain_matches_table(#[case] name: &str, #[case] domain: u32) {
        let registry = registry();
        let chain = registry.resolve_chain(name).unwrap();

        assert_eq!(chain.domain_id, domain);
        assert_eq!(registry.resolve_domain(domain).unwrap(), chain);
    }

    #[test]
    fn test_resolve_chain_ignores_case() {
        let registry = registry();
        let chain = registry.resolve_chain("BASE").unwrap();

        assert_eq!(chain.chain, NamedChain::Base);
        assert_eq!(chain.receiver_contract, BASE_MESSAGE_TRANSMITTER_ADDRESS);
    }

    #[test]
    fn test_unknown_network_lists_valid_names() {
        let err = registry().resolve_chain("solana").unwrap_err();

        insta::assert_snapshot!(err, @r#"Unknown network "solana", it should be one of: ethereum, avalanche, optimism, arbitrum, base, polygon"#);
    }

    #[test]
    fn test_unknown_domain_lists_valid_domains() {
        let err = registry().resolve_domain(4242).unwrap_err();

        match err {
            FinalizerError::UnknownDomain { domain, valid } => {
                assert_eq!(domain, 4242);
                assert_eq!(valid, vec![0, 1, 2, 3, 6, 7]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_rejects_duplicates() {
        let base = ChainDescriptor::cctp_v1(DomainId::Base, None).unwrap();

        let err = NetworkRegistry::new(vec![base.clone(), base.clone()]).unwrap_err();
        assert!(matches!(err, FinalizerError::InvalidConfig(_)));

        let renamed = ChainDescriptor {
            name: "base-again".to_string(),
            ..base.clone()
        };
        let err = NetworkRegistry::new(vec![base, renamed]).unwrap_err();
        assert!(matches!(err, FinalizerError::InvalidConfig(_)));
    }

    #[test]
    fn test_missing_rpc_url() {
        let chain = registry().resolve_chain("polygon").unwrap().clone();

        assert!(matches!(
            chain.rpc_url().unwrap_err(),
            FinalizerError::MissingRpcUrl { chain } if chain == "polygon"
        ));
    }

    #[test]
    fn test_rpc_urls_are_attached() {
        let rpc = RpcEndpoints {
            base: Some("https://base.example".parse().unwrap()),
            ..Default::default()
        };
        let registry = NetworkRegistry::mainnet(&rpc).unwrap();

        assert_eq!(
            registry.resolve_domain(6).unwrap().rpc_url().unwrap().as_str(),
            "https://base.example/"
        );
        assert!(registry.resolve_domain(0).unwrap().rpc_url.is_none());
    }
}
