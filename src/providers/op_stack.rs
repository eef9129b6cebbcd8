//! OP Stack withdrawal status and actions over Alloy providers.
//!
//! Targets fault proof chains: `OptimismPortal2` with a `DisputeGameFactory`.
//! The L2 provider reads the withdrawal and builds storage proofs, the L1
//! provider reads portal state and carries the prove and finalize transactions.

use alloy_network::Ethereum;
use alloy_primitives::{keccak256, Address, TxHash, B256, U256};
use alloy_provider::{DynProvider, Provider};
use alloy_rpc_types::{BlockNumberOrTag, Log, TransactionRequest};
use alloy_json_rpc::RpcError;
use alloy_signer_local::PrivateKeySigner;
use alloy_sol_types::SolEvent;
use async_trait::async_trait;
use tracing::{debug, info, instrument, warn};

use super::AlloyConnector;
use crate::config::OpStackConfig;
use crate::contracts::optimism::{
    DisputeGameFactory, GameSearchResult, L1CrossDomainMessenger,
    L2ToL1MessagePasser::MessagePassed, OptimismPortal2, OutputRootProof, WithdrawalTransaction,
    OUTPUT_ROOT_VERSION,
};
use crate::error::{FinalizerError, Result};
use crate::protocol::{RelayStatus, SubmissionReceipt};
use crate::traits::{StatusOracle, WithdrawalSubmitter};

/// How many of the newest dispute games to search for one covering a withdrawal
const GAME_SEARCH_WINDOW: u64 = 64;

/// A withdrawal as recorded by the L2 message passer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Withdrawal {
    pub transaction: WithdrawalTransaction,
    pub hash: B256,
    /// L2 block the withdrawal was included in
    pub l2_block: u64,
}

/// Production [`StatusOracle`] and [`WithdrawalSubmitter`] for OP Stack chains.
///
/// Proofs in `OptimismPortal2` are keyed by the address that submitted them,
/// so status beyond `ReadyToProve` is only visible for `proof_submitter`,
/// which defaults to the signing key.
#[derive(Debug, Clone)]
pub struct OpStackMessenger<P>
where
    P: Provider<Ethereum> + Clone,
{
    l1: P,
    l2: P,
    optimism_portal: Address,
    l1_cross_domain_messenger: Address,
    message_passer: Address,
    proof_submitter: Option<Address>,
}

impl OpStackMessenger<DynProvider<Ethereum>> {
    /// Opens HTTP providers for both sides of `config`
    ///
    /// Fails with [`FinalizerError::MissingRpcUrl`] when either endpoint is absent.
    pub fn connect(config: &OpStackConfig, signer: Option<PrivateKeySigner>) -> Result<Self> {
        let l1_url = config
            .l1_rpc_url
            .as_ref()
            .ok_or_else(|| FinalizerError::MissingRpcUrl {
                chain: "ethereum".to_string(),
            })?;
        let l2_url = config
            .l2_rpc_url
            .as_ref()
            .ok_or_else(|| FinalizerError::MissingRpcUrl {
                chain: "optimism".to_string(),
            })?;

        let connector = AlloyConnector::new(signer);
        let l1 = connector.connect(l1_url);
        let l2 = AlloyConnector::read_only().connect(l2_url);

        Ok(Self::new(l1, l2, config).with_proof_submitter(connector.sender()))
    }
}

impl<P> OpStackMessenger<P>
where
    P: Provider<Ethereum> + Clone,
{
    pub fn new(l1: P, l2: P, config: &OpStackConfig) -> Self {
        Self {
            l1,
            l2,
            optimism_portal: config.optimism_portal,
            l1_cross_domain_messenger: config.l1_cross_domain_messenger,
            message_passer: config.message_passer,
            proof_submitter: None,
        }
    }

    /// Address whose proofs are inspected and whose wallet submits
    pub fn with_proof_submitter(mut self, submitter: Option<Address>) -> Self {
        self.proof_submitter = submitter;
        self
    }

    fn portal(&self) -> OptimismPortal2::OptimismPortal2Instance<P> {
        OptimismPortal2::new(self.optimism_portal, self.l1.clone())
    }

    fn require_submitter(&self) -> Result<Address> {
        self.proof_submitter.ok_or(FinalizerError::MissingCredential)
    }

    /// Reads the withdrawal at position `log_index` among the transaction's `MessagePassed` events
    pub async fn withdrawal(&self, tx_hash: TxHash, log_index: u64) -> Result<Withdrawal> {
        let receipt = self.l2.get_transaction_receipt(tx_hash).await?.ok_or_else(|| {
            FinalizerError::TransactionNotFound {
                tx_hash: tx_hash.to_string(),
            }
        })?;
        let l2_block = receipt
            .block_number
            .ok_or_else(|| FinalizerError::TransactionNotFound {
                tx_hash: tx_hash.to_string(),
            })?;

        let transaction = select_withdrawal(receipt.inner.logs(), self.message_passer, log_index)?;
        let hash = transaction.hash();

        debug!(
            withdrawal_hash = %hash,
            l2_block,
            event = "withdrawal_loaded"
        );

        Ok(Withdrawal {
            transaction,
            hash,
            l2_block,
        })
    }

    /// Newest game of the respected type whose output root covers `l2_block`
    pub async fn covering_game(&self, l2_block: u64) -> Result<Option<GameSearchResult>> {
        let portal = self.portal();
        let game_type = portal.respectedGameType().call().await.map_err(contract_error)?;
        let factory_address = portal
            .disputeGameFactory()
            .call()
            .await
            .map_err(contract_error)?;
        let factory = DisputeGameFactory::new(factory_address, self.l1.clone());

        let game_count = factory.gameCount().call().await.map_err(contract_error)?;
        if game_count.is_zero() {
            return Ok(None);
        }

        let games = factory
            .findLatestGames(
                game_type,
                game_count - U256::from(1),
                U256::from(GAME_SEARCH_WINDOW),
            )
            .call()
            .await
            .map_err(contract_error)?;

        let game = games
            .into_iter()
            .find(|game| game.l2_block_number().is_some_and(|block| block >= l2_block));

        debug!(
            game_type,
            l2_block,
            game_index = ?game.as_ref().map(|g| g.index),
            event = "dispute_game_search_completed"
        );

        Ok(game)
    }

    async fn is_relayed(&self, withdrawal: &Withdrawal) -> Result<bool> {
        // Withdrawals that do not go through the messenger are executed by the portal itself
        if withdrawal.transaction.target != self.l1_cross_domain_messenger {
            return Ok(true);
        }

        let messenger = L1CrossDomainMessenger::new(self.l1_cross_domain_messenger, self.l1.clone());
        messenger
            .successfulMessages(keccak256(&withdrawal.transaction.data))
            .call()
            .await
            .map_err(contract_error)
    }

    async fn output_root_proof(
        &self,
        withdrawal: &Withdrawal,
        game: &GameSearchResult,
    ) -> Result<(OutputRootProof, Vec<alloy_primitives::Bytes>)> {
        let game_block = game
            .l2_block_number()
            .ok_or_else(|| FinalizerError::Provider("dispute game without L2 block".into()))?;

        let block = self
            .l2
            .get_block_by_number(BlockNumberOrTag::Number(game_block))
            .await?
            .ok_or_else(|| FinalizerError::Provider(format!("L2 block {game_block} not found")))?;

        let account_proof = self
            .l2
            .get_proof(self.message_passer, vec![withdrawal.transaction.storage_slot()])
            .block_id(game_block.into())
            .await?;

        let storage_proof = account_proof
            .storage_proof
            .into_iter()
            .next()
            .map(|slot| slot.proof)
            .ok_or_else(|| FinalizerError::Provider("empty storage proof".into()))?;

        let proof = OutputRootProof {
            version: OUTPUT_ROOT_VERSION,
            stateRoot: block.header.state_root,
            messagePasserStorageRoot: account_proof.storage_hash,
            latestBlockhash: block.header.hash,
        };

        if proof.output_root() != game.rootClaim {
            warn!(
                computed = %proof.output_root(),
                root_claim = %game.rootClaim,
                game_block,
                event = "output_root_mismatch"
            );
        }

        Ok((proof, storage_proof))
    }

    async fn send(&self, tx: TransactionRequest, action: &'static str) -> Result<SubmissionReceipt> {
        let pending = self
            .l1
            .send_transaction(tx)
            .await
            .map_err(|e| FinalizerError::SubmissionFailed {
                reason: e.to_string(),
            })?;

        let receipt = SubmissionReceipt::new(*pending.tx_hash());
        info!(
            action,
            tx_hash = %receipt.transaction_id,
            portal = %self.optimism_portal,
            event = "withdrawal_transaction_submitted"
        );
        Ok(receipt)
    }
}

#[async_trait]
impl<P> StatusOracle for OpStackMessenger<P>
where
    P: Provider<Ethereum> + Clone + Send + Sync,
{
    #[instrument(skip(self), fields(tx_hash = %tx_hash))]
    async fn message_status(&self, tx_hash: TxHash, log_index: u64) -> Result<RelayStatus> {
        let withdrawal = self.withdrawal(tx_hash, log_index).await?;
        let portal = self.portal();

        let finalized = portal
            .finalizedWithdrawals(withdrawal.hash)
            .call()
            .await
            .map_err(contract_error)?;
        if finalized {
            return Ok(if self.is_relayed(&withdrawal).await? {
                RelayStatus::Relayed
            } else {
                RelayStatus::Finalized
            });
        }

        if let Some(submitter) = self.proof_submitter {
            let proven = portal
                .provenWithdrawals(withdrawal.hash, submitter)
                .call()
                .await
                .map_err(contract_error)?;

            if proven.timestamp != 0 {
                // checkWithdrawal reverts until the proof has matured
                return match portal.checkWithdrawal(withdrawal.hash, submitter).call().await {
                    Ok(_) => Ok(RelayStatus::ReadyForRelay),
                    Err(e) if is_revert(&e) => {
                        debug!(reason = %e, event = "withdrawal_not_yet_finalizable");
                        Ok(RelayStatus::Proven)
                    }
                    Err(e) => Err(contract_error(e)),
                };
            }
        }

        Ok(match self.covering_game(withdrawal.l2_block).await? {
            Some(_) => RelayStatus::ReadyToProve,
            None => RelayStatus::Submitted,
        })
    }
}

#[async_trait]
impl<P> WithdrawalSubmitter for OpStackMessenger<P>
where
    P: Provider<Ethereum> + Clone + Send + Sync,
{
    #[instrument(skip(self), fields(tx_hash = %tx_hash))]
    async fn prove_message(&self, tx_hash: TxHash, log_index: u64) -> Result<SubmissionReceipt> {
        let submitter = self.require_submitter()?;
        let withdrawal = self.withdrawal(tx_hash, log_index).await?;

        let game = self
            .covering_game(withdrawal.l2_block)
            .await?
            .ok_or_else(|| FinalizerError::SubmissionFailed {
                reason: format!(
                    "no dispute game covers L2 block {} yet",
                    withdrawal.l2_block
                ),
            })?;

        let (output_root_proof, storage_proof) = self.output_root_proof(&withdrawal, &game).await?;

        let tx = self
            .portal()
            .proveWithdrawalTransaction(
                withdrawal.transaction,
                game.index,
                output_root_proof,
                storage_proof,
            )
            .from(submitter)
            .into_transaction_request();

        self.send(tx, "prove").await
    }

    #[instrument(skip(self), fields(tx_hash = %tx_hash))]
    async fn finalize_message(
        &self,
        tx_hash: TxHash,
        log_index: u64,
    ) -> Result<SubmissionReceipt> {
        let submitter = self.require_submitter()?;
        let withdrawal = self.withdrawal(tx_hash, log_index).await?;

        let tx = self
            .portal()
            .finalizeWithdrawalTransaction(withdrawal.transaction)
            .from(submitter)
            .into_transaction_request();

        self.send(tx, "finalize").await
    }
}

fn contract_error(e: alloy_contract::Error) -> FinalizerError {
    FinalizerError::Provider(e.to_string())
}

/// Whether the call reached the contract and was reverted by it
fn is_revert(e: &alloy_contract::Error) -> bool {
    if e.as_revert_data().is_some() {
        return true;
    }
    matches!(
        e,
        alloy_contract::Error::TransportError(RpcError::ErrorResp(payload))
            if payload.message.contains("revert")
    )
}

/// Picks the `log_index`-th `MessagePassed` event emitted by `message_passer`
pub fn select_withdrawal(
    logs: &[Log],
    message_passer: Address,
    log_index: u64,
) -> Result<WithdrawalTransaction> {
    let passed: Vec<&Log> = logs
        .iter()
        .filter(|log| {
            log.address() == message_passer
                && log.topics().first() == Some(&MessagePassed::SIGNATURE_HASH)
        })
        .collect();

    let log = usize::try_from(log_index)
        .ok()
        .and_then(|index| passed.get(index))
        .ok_or_else(|| FinalizerError::EventNotFound {
            signature: format!("{} #{log_index}", MessagePassed::SIGNATURE),
            available_logs: passed.len(),
        })?;

    let event = MessagePassed::decode_log_data(log.data())?;
    Ok(WithdrawalTransaction::from(&event))
}
