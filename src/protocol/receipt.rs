use alloy_primitives::TxHash;
use std::fmt;

/// Acknowledgment of a submitted transaction
///
/// Returned as soon as the node accepted the transaction, before it is mined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubmissionReceipt {
    pub transaction_id: TxHash,
}

impl SubmissionReceipt {
    pub const fn new(transaction_id: TxHash) -> Self {
        Self { transaction_id }
    }
}

impl fmt::Display for SubmissionReceipt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.transaction_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_tx_hash() {
        let receipt = SubmissionReceipt::new(TxHash::repeat_byte(0xab));
        insta::assert_snapshot!(receipt, @"0xabababababababababababababababababababababababababababababababab");
    }
}
