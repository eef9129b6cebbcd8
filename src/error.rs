use thiserror::Error;

#[derive(Error, Debug)]
pub enum FinalizerError {
    #[error("Unknown network {name:?}, it should be one of: {}", .valid.join(", "))]
    UnknownNetwork { name: String, valid: Vec<String> },

    #[error("Unknown destination domain {domain}, known domains: {}", format_domains(.valid))]
    UnknownDomain { domain: u32, valid: Vec<u32> },

    #[error("Event {signature} not found among {available_logs} transaction logs")]
    EventNotFound {
        signature: String,
        available_logs: usize,
    },

    #[error("Transaction not found: {tx_hash}")]
    TransactionNotFound { tx_hash: String },

    #[error("Malformed message: {reason}")]
    MalformedMessage { reason: String },

    #[error("Message not found by the attestation service: {message_hash}")]
    MessageNotFound { message_hash: String },

    #[error("Attestation failed: {reason}")]
    AttestationFailed { reason: String },

    #[error("Rate limit exceeded, retry after {retry_after_seconds} seconds")]
    RateLimitExceeded { retry_after_seconds: u64 },

    #[error("Gave up waiting for {operation} after {waited_secs} seconds")]
    PollingDeadlineExceeded {
        operation: &'static str,
        waited_secs: u64,
    },

    #[error("Waiting for message status failed: {reason}")]
    StatusWaitFailed { reason: String },

    #[error("Submission failed: {reason}")]
    SubmissionFailed { reason: String },

    #[error("No signing credential configured")]
    MissingCredential,

    #[error("No RPC endpoint configured for {chain}")]
    MissingRpcUrl { chain: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid URL: {reason}")]
    InvalidUrl { reason: String },

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("RPC error: {0}")]
    Rpc(#[from] alloy_json_rpc::RpcError<alloy_transport::TransportErrorKind>),

    #[error("ABI encoding/decoding error: {0}")]
    Abi(#[from] alloy_sol_types::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Hex conversion error: {0}")]
    Hex(#[from] alloy_primitives::hex::FromHexError),
}

fn format_domains(domains: &[u32]) -> String {
    domains
        .iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

pub type Result<T> = std::result::Result<T, FinalizerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_network_lists_valid_names() {
        let err = FinalizerError::UnknownNetwork {
            name: "solana".to_string(),
            valid: vec!["ethereum".to_string(), "base".to_string()],
        };
        insta::assert_snapshot!(err.to_string(), @r#"Unknown network "solana", it should be one of: ethereum, base"#);
    }

    #[test]
    fn test_unknown_domain_lists_valid_domains() {
        let err = FinalizerError::UnknownDomain {
            domain: 42,
            valid: vec![0, 1, 6],
        };
        insta::assert_snapshot!(err.to_string(), @"Unknown destination domain 42, known domains: 0, 1, 6");
    }
}
