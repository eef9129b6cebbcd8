//! MessageTransmitter contract bindings and wrapper
//!
//! Only the surface the finalizer touches is bound: the `MessageSent` event on
//! the source chain, `receiveMessage` and the `usedNonces` replay map on the
//! destination chain.

use alloy_network::Ethereum;
use alloy_primitives::{Address, Bytes, FixedBytes};
use alloy_provider::Provider;
use alloy_rpc_types::TransactionRequest;
use alloy_sol_types::sol;
use tracing::{debug, info};

use MessageTransmitter::MessageTransmitterInstance;

/// The CCTP v1 Message Transmitter contract wrapper
pub struct MessageTransmitterContract<P: Provider<Ethereum>> {
    instance: MessageTransmitterInstance<P>,
}

impl<P: Provider<Ethereum>> MessageTransmitterContract<P> {
    pub fn new(address: Address, provider: P) -> Self {
        debug!(
            contract_address = %address,
            event = "message_transmitter_contract_initialized"
        );
        Self {
            instance: MessageTransmitterInstance::<P>::new(address, provider),
        }
    }

    /// Create transaction request for receiving a cross-chain message with attestation
    ///
    /// # Arguments
    ///
    /// * `message` - The message bytes from the source chain
    /// * `attestation` - The attestation service's signature over the message
    /// * `from_address` - Address that will submit the transaction
    pub fn receive_message_transaction(
        &self,
        message: Bytes,
        attestation: Bytes,
        from_address: Address,
    ) -> TransactionRequest {
        info!(
            message_len = message.len(),
            attestation_len = attestation.len(),
            from_address = %from_address,
            contract_address = %self.instance.address(),
            event = "receive_message_transaction_created"
        );

        self.instance
            .receiveMessage(message, attestation)
            .from(from_address)
            .into_transaction_request()
    }

    /// Check if a message has already been received
    ///
    /// `used_nonce_key` is `keccak256(sourceDomain ‖ nonce)`, see
    /// [`RawMessage::used_nonce_key`](crate::RawMessage::used_nonce_key). Any
    /// non-zero value in the map means the nonce was consumed.
    pub async fn is_message_received(
        &self,
        used_nonce_key: FixedBytes<32>,
    ) -> Result<bool, alloy_contract::Error> {
        let nonce_status = self.instance.usedNonces(used_nonce_key).call().await?;

        debug!(
            used_nonce_key = %used_nonce_key,
            nonce_status = %nonce_status,
            is_received = !nonce_status.is_zero(),
            event = "is_message_received_checked"
        );

        Ok(!nonce_status.is_zero())
    }

    pub fn address(&self) -> Address {
        *self.instance.address()
    }
}

sol! {
    #[allow(missing_docs)]
    #[sol(rpc)]
    contract MessageTransmitter {
        event MessageSent(bytes message);

        function receiveMessage(bytes calldata message, bytes calldata attestation)
            external
            returns (bool success);

        function usedNonces(bytes32 sourceAndNonce) external view returns (uint256);
    }
}
