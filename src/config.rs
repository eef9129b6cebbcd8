//! Environment driven configuration
//!
//! Variables are read from the process environment, with a `.env` file in the
//! working directory honoured through [`dotenvy`]:
//!
//! | Variable | Used for |
//! |---|---|
//! | `RPC_MAINNET` | Ethereum, and L1 of the OP Stack flow |
//! | `RPC_AVALANCHE`, `RPC_ARBITRUM`, `RPC_BASE`, `RPC_POLYGON` | CCTP chains |
//! | `RPC_OPTIMISM` | Optimism, and L2 of the OP Stack flow |
//! | `PRIVATE_KEY` | signer for every submission (optional until something is submitted) |
//! | `IRIS_API_URL` | attestation service base URL, defaults to [`IRIS_API`] |
//! | `ATTESTATION_POLL_INTERVAL_SECS`, `ATTESTATION_MAX_WAIT_SECS` | attestation polling |
//! | `STATUS_POLL_INTERVAL_SECS`, `STATUS_MAX_WAIT_SECS` | receipt and withdrawal status polling |

use alloy_primitives::Address;
use alloy_signer_local::PrivateKeySigner;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};
use url::Url;

use crate::bridge::{PollingConfig, IRIS_API};
use crate::chain::{
    L2_TO_L1_MESSAGE_PASSER, OP_MAINNET_L1_CROSS_DOMAIN_MESSENGER, OP_MAINNET_OPTIMISM_PORTAL,
};
use crate::error::{FinalizerError, Result};
use crate::protocol::DomainId;

/// RPC endpoint per CCTP chain, any of which may be absent
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RpcEndpoints {
    pub ethereum: Option<Url>,
    pub avalanche: Option<Url>,
    pub optimism: Option<Url>,
    pub arbitrum: Option<Url>,
    pub base: Option<Url>,
    pub polygon: Option<Url>,
}

impl RpcEndpoints {
    pub fn get(&self, domain: DomainId) -> Option<&Url> {
        match domain {
            DomainId::Ethereum => self.ethereum.as_ref(),
            DomainId::Avalanche => self.avalanche.as_ref(),
            DomainId::Optimism => self.optimism.as_ref(),
            DomainId::Arbitrum => self.arbitrum.as_ref(),
            DomainId::Base => self.base.as_ref(),
            DomainId::Polygon => self.polygon.as_ref(),
        }
    }

    fn from_lookup(lookup: &impl Fn(&str) -> Option<String>) -> Result<Self> {
        Ok(Self {
            ethereum: url_var(lookup, "RPC_MAINNET")?,
            avalanche: url_var(lookup, "RPC_AVALANCHE")?,
            optimism: url_var(lookup, "RPC_OPTIMISM")?,
            arbitrum: url_var(lookup, "RPC_ARBITRUM")?,
            base: url_var(lookup, "RPC_BASE")?,
            polygon: url_var(lookup, "RPC_POLYGON")?,
        })
    }
}

/// OP Stack withdrawal path: L2 source, L1 destination and the L1 contracts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpStackConfig {
    pub l1_rpc_url: Option<Url>,
    pub l2_rpc_url: Option<Url>,
    pub optimism_portal: Address,
    pub l1_cross_domain_messenger: Address,
    pub message_passer: Address,
}

impl OpStackConfig {
    /// OP Mainnet contracts with the given endpoints
    pub fn op_mainnet(l1_rpc_url: Option<Url>, l2_rpc_url: Option<Url>) -> Self {
        Self {
            l1_rpc_url,
            l2_rpc_url,
            optimism_portal: OP_MAINNET_OPTIMISM_PORTAL,
            l1_cross_domain_messenger: OP_MAINNET_L1_CROSS_DOMAIN_MESSENGER,
            message_passer: L2_TO_L1_MESSAGE_PASSER,
        }
    }
}

/// Everything the finalizers need from the environment
#[derive(Clone)]
pub struct FinalizerConfig {
    pub rpc: RpcEndpoints,
    pub op_stack: OpStackConfig,
    pub iris_api_url: Url,
    pub attestation_polling: PollingConfig,
    pub status_polling: PollingConfig,
    private_key: Option<String>,
}

/// Custom Debug that redacts the private key to prevent accidental log leakage.
impl fmt::Debug for FinalizerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FinalizerConfig")
            .field("rpc", &self.rpc)
            .field("op_stack", &self.op_stack)
            .field("iris_api_url", &self.iris_api_url)
            .field("attestation_polling", &self.attestation_polling)
            .field("status_polling", &self.status_polling)
            .field(
                "private_key",
                &self.private_key.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

impl FinalizerConfig {
    /// Loads `.env` if present, then reads the process environment
    pub fn from_env() -> Result<Self> {
        match dotenvy::dotenv() {
            Ok(path) => debug!(path = %path.display(), event = "dotenv_loaded"),
            Err(e) if e.not_found() => {}
            Err(e) => warn!(error = %e, event = "dotenv_load_failed"),
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let rpc = RpcEndpoints::from_lookup(&lookup)?;
        let op_stack = OpStackConfig::op_mainnet(rpc.ethereum.clone(), rpc.optimism.clone());

        let iris_api_url = match non_empty(&lookup, "IRIS_API_URL") {
            Some(raw) => parse_url("IRIS_API_URL", &raw)?,
            None => parse_url("IRIS_API_URL", IRIS_API)?,
        };

        let attestation_polling = polling_from(
            &lookup,
            PollingConfig::default(),
            "ATTESTATION_POLL_INTERVAL_SECS",
            "ATTESTATION_MAX_WAIT_SECS",
        )?;
        let status_polling = polling_from(
            &lookup,
            PollingConfig::status(),
            "STATUS_POLL_INTERVAL_SECS",
            "STATUS_MAX_WAIT_SECS",
        )?;

        Ok(Self {
            rpc,
            op_stack,
            iris_api_url,
            attestation_polling,
            status_polling,
            private_key: non_empty(&lookup, "PRIVATE_KEY"),
        })
    }

    /// Parses `PRIVATE_KEY`
    ///
    /// A missing key is not an error here: read-only operations work without
    /// one, submissions fail with [`FinalizerError::MissingCredential`].
    pub fn signer(&self) -> Result<Option<PrivateKeySigner>> {
        self.private_key
            .as_deref()
            .map(|key| {
                PrivateKeySigner::from_str(key)
                    .map_err(|e| FinalizerError::InvalidConfig(format!("PRIVATE_KEY: {e}")))
            })
            .transpose()
    }

    pub fn with_private_key(mut self, key: impl Into<String>) -> Self {
        self.private_key = Some(key.into());
        self
    }
}

fn non_empty(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    lookup(key)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_url(key: &str, raw: &str) -> Result<Url> {
    Url::parse(raw).map_err(|e| FinalizerError::InvalidUrl {
        reason: format!("{key}={raw}: {e}"),
    })
}

fn url_var(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<Url>> {
    non_empty(lookup, key)
        .map(|raw| parse_url(key, &raw))
        .transpose()
}

fn secs_var(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<u64>> {
    non_empty(lookup, key)
        .map(|raw| {
            raw.parse::<u64>()
                .map_err(|e| FinalizerError::InvalidConfig(format!("{key}={raw}: {e}")))
        })
        .transpose()
}

fn polling_from(
    lookup: &impl Fn(&str) -> Option<String>,
    defaults: PollingConfig,
    interval_key: &str,
    max_wait_key: &str,
) -> Result<PollingConfig> {
    let mut polling = defaults;
    if let Some(secs) = secs_var(lookup, interval_key)? {
        polling = polling.with_poll_interval_secs(secs);
    }
    if let Some(secs) = secs_var(lookup, max_wait_key)? {
        polling = polling.with_max_wait_secs(secs);
    }
    Ok(polling)
}
