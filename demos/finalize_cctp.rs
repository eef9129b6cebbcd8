// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
//! Finalize a CCTP v1 transfer on its destination chain
//!
//! Reads RPC endpoints and the signing key from the environment (or a `.env`
//! file), waits for Circle's attestation and submits `receiveMessage`.
//!
//! Run with: `cargo run --example finalize_cctp -- <source-network> <tx-hash>`
//!
//! Set `RUST_LOG=bridge_finalizer=debug` to follow every poll.

use alloy_primitives::TxHash;
use bridge_finalizer::providers::{AlloyConnector, IrisAttestationProvider, TokioClock};
use bridge_finalizer::{CctpFinalizer, FinalizerConfig, FinalizerError, NetworkRegistry};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), FinalizerError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let (Some(source_network), Some(tx_hash)) = (args.next(), args.next()) else {
        eprintln!("usage: finalize_cctp <source-network> <tx-hash>");
        std::process::exit(2);
    };
    let tx_hash: TxHash = tx_hash.parse()?;

    let config = FinalizerConfig::from_env()?;
    let registry = NetworkRegistry::mainnet(&config.rpc)?;
    println!(
        "Known networks: {}",
        registry.names().collect::<Vec<_>>().join(", ")
    );

    let finalizer = CctpFinalizer::builder()
        .registry(registry)
        .connector(AlloyConnector::new(config.signer()?))
        .attestation_provider(IrisAttestationProvider::new(config.iris_api_url.clone())?)
        .clock(TokioClock)
        .polling(config.attestation_polling)
        .skip_if_received(true)
        .build();

    let outcome = finalizer.finalize(&source_network, tx_hash).await?;

    println!("Message hash: {}", outcome.message_hash);
    println!("Destination:  {}", outcome.destination.name);
    match outcome.receipt {
        Some(receipt) => println!("receiveMessage transaction: {receipt}"),
        None => println!("Message was already received, nothing submitted"),
    }

    Ok(())
}
