//! OP Stack withdrawal contract bindings
//!
//! Fault proof era contracts: `OptimismPortal2` and the `DisputeGameFactory`
//! on L1, the `L2ToL1MessagePasser` predeploy on L2 and the replay map of the
//! `L1CrossDomainMessenger`.

use alloy_primitives::{keccak256, B256, U256};
use alloy_sol_types::{sol, SolValue};

sol! {
    #[allow(missing_docs)]
    #[derive(Debug, PartialEq, Eq)]
    struct WithdrawalTransaction {
        uint256 nonce;
        address sender;
        address target;
        uint256 value;
        uint256 gasLimit;
        bytes data;
    }

    #[allow(missing_docs)]
    #[derive(Debug, PartialEq, Eq)]
    struct OutputRootProof {
        bytes32 version;
        bytes32 stateRoot;
        bytes32 messagePasserStorageRoot;
        bytes32 latestBlockhash;
    }

    #[allow(missing_docs)]
    #[derive(Debug, PartialEq, Eq)]
    struct GameSearchResult {
        uint256 index;
        bytes32 metadata;
        uint64 timestamp;
        bytes32 rootClaim;
        bytes extraData;
    }

    #[allow(missing_docs)]
    #[sol(rpc)]
    contract OptimismPortal2 {
        function proveWithdrawalTransaction(
            WithdrawalTransaction memory _tx,
            uint256 _disputeGameIndex,
            OutputRootProof calldata _outputRootProof,
            bytes[] calldata _withdrawalProof
        ) external;

        function finalizeWithdrawalTransaction(WithdrawalTransaction memory _tx) external;

        function finalizedWithdrawals(bytes32 withdrawalHash) external view returns (bool);

        function provenWithdrawals(bytes32 withdrawalHash, address proofSubmitter)
            external
            view
            returns (address disputeGameProxy, uint64 timestamp);

        function checkWithdrawal(bytes32 _withdrawalHash, address _proofSubmitter) external view;

        function disputeGameFactory() external view returns (address);

        function respectedGameType() external view returns (uint32);
    }

    #[allow(missing_docs)]
    #[sol(rpc)]
    contract DisputeGameFactory {
        function gameCount() external view returns (uint256 gameCount_);

        function findLatestGames(uint32 _gameType, uint256 _start, uint256 _n)
            external
            view
            returns (GameSearchResult[] memory games_);
    }

    #[allow(missing_docs)]
    contract L2ToL1MessagePasser {
        event MessagePassed(
            uint256 indexed nonce,
            address indexed sender,
            address indexed target,
            uint256 value,
            uint256 gasLimit,
            bytes data,
            bytes32 withdrawalHash
        );
    }

    #[allow(missing_docs)]
    #[sol(rpc)]
    contract L1CrossDomainMessenger {
        function successfulMessages(bytes32 messageHash) external view returns (bool);
    }
}

/// Version byte of the output root preimage used by every current OP Stack chain
pub const OUTPUT_ROOT_VERSION: B256 = B256::ZERO;

impl WithdrawalTransaction {
    /// `keccak256(abi.encode(nonce, sender, target, value, gasLimit, data))`
    pub fn hash(&self) -> B256 {
        keccak256(
            (
                self.nonce,
                self.sender,
                self.target,
                self.value,
                self.gasLimit,
                self.data.clone(),
            )
                .abi_encode_params(),
        )
    }

    /// Slot of `sentMessages[hash]` in the message passer, the mapping lives at slot 0
    pub fn storage_slot(&self) -> B256 {
        keccak256((self.hash(), U256::ZERO).abi_encode())
    }
}

impl From<&L2ToL1MessagePasser::MessagePassed> for WithdrawalTransaction {
    fn from(event: &L2ToL1MessagePasser::MessagePassed) -> Self {
        Self {
            nonce: event.nonce,
            sender: event.sender,
            target: event.target,
            value: event.value,
            gasLimit: event.gasLimit,
            data: event.data.clone(),
        }
    }
}

impl OutputRootProof {
    /// Output root committed to by a dispute game's root claim
    pub fn output_root(&self) -> B256 {
        keccak256(
            (
                self.version,
                self.stateRoot,
                self.messagePasserStorageRoot,
                self.latestBlockhash,
            )
                .abi_encode(),
        )
    }
}

impl GameSearchResult {
    /// L2 block number the game's output root is claimed at
    ///
    /// The first word of `extraData` for every fault dispute game.
    pub fn l2_block_number(&self) -> Option<u64> {
        let word = self.extraData.get(..32)?;
        u64::try_from(U256::from_be_slice(word)).ok()
    }
}
