use alloy_primitives::TxHash;
use bon::Builder;
use tracing::{info, Instrument, Span};

use super::config::PollingConfig;
use super::tracker::MessageStatusTracker;
use crate::error::Result;
use crate::protocol::{RelayStatus, SubmissionReceipt};
use crate::spans;
use crate::traits::{Clock, StatusOracle, WithdrawalSubmitter};

/// What a withdrawal action did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageOutcome {
    /// The action's transaction was sent
    Submitted(SubmissionReceipt),
    /// The withdrawal was already past this stage, nothing was sent
    AlreadyDone(RelayStatus),
}

impl StageOutcome {
    pub fn receipt(&self) -> Option<&SubmissionReceipt> {
        match self {
            Self::Submitted(receipt) => Some(receipt),
            Self::AlreadyDone(_) => None,
        }
    }
}

/// Drives an OP Stack withdrawal through prove and finalize
///
/// Each action waits for the stage that allows it, performs it once, and for
/// finalize also waits for the message to be relayed on L1.
#[derive(Builder, Clone, Debug)]
pub struct OpStackFinalizer<O: StatusOracle, W: WithdrawalSubmitter, C: Clock> {
    oracle: O,
    submitter: W,
    clock: C,
    #[builder(default = PollingConfig::status())]
    polling: PollingConfig,
    /// Skip an action whose stage has already been passed instead of resubmitting it
    #[builder(default)]
    skip_completed_stages: bool,
}

impl<O, W, C> OpStackFinalizer<O, W, C>
where
    O: StatusOracle,
    W: WithdrawalSubmitter,
    C: Clock,
{
    fn tracker(&self) -> MessageStatusTracker<&O, &C> {
        MessageStatusTracker::builder()
            .oracle(&self.oracle)
            .clock(&self.clock)
            .polling(self.polling)
            .build()
    }

    /// Waits until the withdrawal can be proven, then proves it
    pub async fn prove(&self, tx_hash: TxHash, log_index: u64) -> Result<StageOutcome> {
        let span = spans::withdrawal("prove", tx_hash, log_index);

        async {
            let result = self.run_prove(tx_hash, log_index).await;
            record_outcome(&result);
            result
        }
        .instrument(span)
        .await
    }

    /// Waits until the withdrawal can be finalized, finalizes it, and waits
    /// until it is relayed
    pub async fn finalize(&self, tx_hash: TxHash, log_index: u64) -> Result<StageOutcome> {
        let span = spans::withdrawal("finalize", tx_hash, log_index);

        async {
            let result = self.run_finalize(tx_hash, log_index).await;
            record_outcome(&result);
            result
        }
        .instrument(span)
        .await
    }

    async fn run_prove(&self, tx_hash: TxHash, log_index: u64) -> Result<StageOutcome> {
        let observed = self
            .tracker()
            .advance_to(tx_hash, log_index, RelayStatus::ReadyToProve)
            .await?;

        if self.skip_completed_stages && observed > RelayStatus::ReadyToProve {
            info!(observed = %observed, event = "prove_skipped");
            return Ok(StageOutcome::AlreadyDone(observed));
        }

        let receipt = self.submitter.prove_message(tx_hash, log_index).await?;
        info!(tx_hash = %receipt.transaction_id, event = "withdrawal_proven");
        Ok(StageOutcome::Submitted(receipt))
    }

    async fn run_finalize(&self, tx_hash: TxHash, log_index: u64) -> Result<StageOutcome> {
        let tracker = self.tracker();
        let observed = tracker
            .advance_to(tx_hash, log_index, RelayStatus::ReadyForRelay)
            .await?;

        let outcome = if self.skip_completed_stages && observed > RelayStatus::ReadyForRelay {
            info!(observed = %observed, event = "finalize_skipped");
            StageOutcome::AlreadyDone(observed)
        } else {
            let receipt = self.submitter.finalize_message(tx_hash, log_index).await?;
            info!(tx_hash = %receipt.transaction_id, event = "withdrawal_finalized");
            StageOutcome::Submitted(receipt)
        };

        tracker
            .advance_to(tx_hash, log_index, RelayStatus::Relayed)
            .await?;
        info!(event = "withdrawal_relayed");

        Ok(outcome)
    }
}

fn record_outcome(result: &Result<StageOutcome>) {
    match result {
        Ok(StageOutcome::Submitted(receipt)) => {
            Span::current().record("submitted_tx", tracing::field::display(receipt));
        }
        Ok(StageOutcome::AlreadyDone(_)) => {}
        Err(e) => spans::record_error(e),
    }
}
