//! Alloy-based chain access: source log reads and destination submissions.

use alloy_network::{Ethereum, EthereumWallet};
use alloy_primitives::{Address, Bytes, TxHash};
use alloy_provider::{DynProvider, Provider, ProviderBuilder};
use alloy_rpc_types::Log;
use alloy_signer_local::PrivateKeySigner;
use async_trait::async_trait;
use std::fmt;
use tracing::{debug, info, instrument, trace};
use url::Url;

use crate::chain::ChainDescriptor;
use crate::contracts::message_transmitter::MessageTransmitterContract;
use crate::error::{FinalizerError, Result};
use crate::protocol::{RawMessage, SubmissionReceipt};
use crate::traits::{BlockchainProvider, ChainConnector, MessageSubmitter};

/// Production chain access wrapping an Alloy [`Provider`].
///
/// Serves both sides of the CCTP flow: reading the source transaction's logs
/// and sending `receiveMessage` on the destination. Submissions need a
/// `sender`, the address of the wallet the provider signs with.
///
/// # Examples
///
/// ```rust,no_run
/// use bridge_finalizer::providers::AlloyProvider;
/// use alloy_provider::{Provider, ProviderBuilder};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let provider = ProviderBuilder::new()
///     .connect_http("https://mainnet.base.org".parse()?)
///     .erased();
///
/// let read_only = AlloyProvider::new(provider);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct AlloyProvider<P>
where
    P: Provider<Ethereum> + Clone,
{
    provider: P,
    sender: Option<Address>,
}

impl<P> AlloyProvider<P>
where
    P: Provider<Ethereum> + Clone,
{
    /// Creates a read-only [`AlloyProvider`].
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            sender: None,
        }
    }

    /// Returns a reference to the underlying Alloy provider.
    pub fn inner(&self) -> &P {
        &self.provider
    }
}

#[async_trait]
impl<P> BlockchainProvider for AlloyProvider<P>
where
    P: Provider<Ethereum> + Clone + Send + Sync,
{
    #[instrument(skip(self), fields(tx_hash = %tx_hash))]
    async fn get_transaction_logs(&self, tx_hash: TxHash) -> Result<Option<Vec<Log>>> {
        trace!("Fetching transaction receipt");
        let receipt = self
            .provider
            .get_transaction_receipt(tx_hash)
            .await
            .map_err(|e| FinalizerError::Provider(e.to_string()))?;

        let Some(receipt) = receipt else {
            debug!(event = "transaction_receipt_not_found");
            return Ok(None);
        };

        let logs = receipt.inner.logs().to_vec();
        debug!(
            log_count = logs.len(),
            block_number = ?receipt.block_number,
            event = "transaction_receipt_found"
        );
        Ok(Some(logs))
    }
}

#[async_trait]
impl<P> MessageSubmitter for AlloyProvider<P>
where
    P: Provider<Ethereum> + Clone + Send + Sync,
{
    #[instrument(skip_all, fields(destination = %destination.name, message_hash = %message.hash()))]
    async fn submit_receive(
        &self,
        destination: &ChainDescriptor,
        message: &RawMessage,
        attestation: &Bytes,
    ) -> Result<SubmissionReceipt> {
        let sender = self.sender.ok_or(FinalizerError::MissingCredential)?;
        let contract =
            MessageTransmitterContract::new(destination.receiver_contract, self.provider.clone());

        let tx = contract.receive_message_transaction(
            message.as_bytes().clone(),
            attestation.clone(),
            sender,
        );

        let pending = self
            .provider
            .send_transaction(tx)
            .await
            .map_err(|e| FinalizerError::SubmissionFailed {
                reason: e.to_string(),
            })?;

        let receipt = SubmissionReceipt::new(*pending.tx_hash());
        info!(
            tx_hash = %receipt.transaction_id,
            receiver = %destination.receiver_contract,
            event = "receive_message_submitted"
        );
        Ok(receipt)
    }

    async fn is_message_received(
        &self,
        destination: &ChainDescriptor,
        message: &RawMessage,
    ) -> Result<bool> {
        let contract =
            MessageTransmitterContract::new(destination.receiver_contract, self.provider.clone());
        contract
            .is_message_received(message.used_nonce_key()?)
            .await
            .map_err(|e| FinalizerError::Provider(e.to_string()))
    }
}

/// Opens HTTP providers for registry chains, signing with an optional local key.
#[derive(Clone, Default)]
pub struct AlloyConnector {
    wallet: Option<EthereumWallet>,
    sender: Option<Address>,
}

impl fmt::Debug for AlloyConnector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AlloyConnector")
            .field("sender", &self.sender)
            .finish_non_exhaustive()
    }
}

impl AlloyConnector {
    /// A connector that can read but not submit.
    pub fn read_only() -> Self {
        Self::default()
    }

    pub fn new(signer: Option<PrivateKeySigner>) -> Self {
        match signer {
            Some(signer) => Self {
                sender: Some(signer.address()),
                wallet: Some(EthereumWallet::from(signer)),
            },
            None => Self::read_only(),
        }
    }

    pub fn sender(&self) -> Option<Address> {
        self.sender
    }

    /// Opens an HTTP provider on `url`, with the wallet attached when there is one.
    pub fn connect(&self, url: &Url) -> DynProvider<Ethereum> {
        match &self.wallet {
            Some(wallet) => ProviderBuilder::new()
                .wallet(wallet.clone())
                .connect_http(url.clone())
                .erased(),
            None => ProviderBuilder::new().connect_http(url.clone()).erased(),
        }
    }
}

impl ChainConnector for AlloyConnector {
    type Source = AlloyProvider<DynProvider<Ethereum>>;
    type Submitter = AlloyProvider<DynProvider<Ethereum>>;

    fn source(&self, chain: &ChainDescriptor) -> Result<Self::Source> {
        Ok(AlloyProvider::new(self.connect(chain.rpc_url()?)))
    }

    fn submitter(&self, chain: &ChainDescriptor) -> Result<Self::Submitter> {
        let provider = self.connect(chain.rpc_url()?);
        Ok(AlloyProvider {
            provider,
            sender: self.sender,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::DomainId;

    #[test]
    fn test_connector_requires_rpc_url() {
        let chain = ChainDescriptor::cctp_v1(DomainId::Base, None).unwrap();
        let connector = AlloyConnector::read_only();

        assert!(matches!(
            connector.source(&chain).unwrap_err(),
            FinalizerError::MissingRpcUrl { .. }
        ));
        assert!(matches!(
            connector.submitter(&chain).unwrap_err(),
            FinalizerError::MissingRpcUrl { .. }
        ));
    }

    #[tokio::test]
    async fn test_submission_without_credential() {
        let chain = ChainDescriptor::cctp_v1(
            DomainId::Base,
            Some("http://127.0.0.1:1".parse().unwrap()),
        )
        .unwrap();
        let submitter = AlloyConnector::new(None).submitter(&chain).unwrap();
        let message = RawMessage::new(vec![0u8; 116]);

        let err = submitter
            .submit_receive(&chain, &message, &Bytes::from_static(&[1, 2, 3]))
            .await
            .unwrap_err();
        assert!(matches!(err, FinalizerError::MissingCredential));
    }

    #[test]
    fn test_connector_sender_from_signer() {
        let signer = PrivateKeySigner::random();
        let address = signer.address();

        assert_eq!(AlloyConnector::new(Some(signer)).sender(), Some(address));
        assert_eq!(AlloyConnector::read_only().sender(), None);
    }
}
