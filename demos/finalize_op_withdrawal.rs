// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
//! Prove or finalize an OP Mainnet withdrawal on Ethereum
//!
//! Needs `RPC_MAINNET`, `RPC_OPTIMISM` and `PRIVATE_KEY`. The withdrawal must be
//! proven and finalized by the same key. Run `prove` first, then `finalize`
//! once the challenge period is over; `finalize` waits for it if started early,
//! so set `STATUS_MAX_WAIT_SECS` to bound it.
//!
//! Run with: `cargo run --example finalize_op_withdrawal -- <prove|finalize> <l2-tx-hash> [log-index]`

use alloy_primitives::TxHash;
use bridge_finalizer::providers::{OpStackMessenger, TokioClock};
use bridge_finalizer::{FinalizerConfig, FinalizerError, OpStackFinalizer, StageOutcome};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), FinalizerError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    const USAGE: &str = "usage: finalize_op_withdrawal <prove|finalize> <l2-tx-hash> [log-index]";

    let mut args = std::env::args().skip(1);
    let (Some(action), Some(tx_hash)) = (args.next(), args.next()) else {
        eprintln!("{USAGE}");
        std::process::exit(2);
    };
    if action != "prove" && action != "finalize" {
        eprintln!("{USAGE}");
        std::process::exit(2);
    }
    let tx_hash: TxHash = tx_hash.parse()?;
    let log_index = match args.next() {
        Some(index) => index
            .parse()
            .map_err(|_| FinalizerError::InvalidConfig(format!("invalid log index {index:?}")))?,
        None => 0,
    };

    let config = FinalizerConfig::from_env()?;
    let messenger = OpStackMessenger::connect(&config.op_stack, config.signer()?)?;

    let finalizer = OpStackFinalizer::builder()
        .oracle(messenger.clone())
        .submitter(messenger)
        .clock(TokioClock)
        .polling(config.status_polling)
        .skip_completed_stages(true)
        .build();

    let outcome = if action == "prove" {
        finalizer.prove(tx_hash, log_index).await?
    } else {
        finalizer.finalize(tx_hash, log_index).await?
    };

    match outcome {
        StageOutcome::Submitted(receipt) => println!("{action}: {receipt}"),
        StageOutcome::AlreadyDone(status) => println!("{action}: skipped, already {status}"),
    }

    Ok(())
}
