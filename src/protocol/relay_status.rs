use std::fmt;

/// Lifecycle of an OP Stack withdrawal as seen from L1
///
/// The variants are ordered: a withdrawal only ever moves forward, so
/// `status >= RelayStatus::ReadyToProve` reads as "proving is possible or
/// already done".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RelayStatus {
    /// Sent on L2, no output root covering it has been proposed yet
    Submitted,
    /// An output root covers the withdrawal, it can be proven on L1
    ReadyToProve,
    /// Proven, still inside the challenge window
    Proven,
    /// Challenge window elapsed, it can be finalized
    ReadyForRelay,
    /// Finalized on the portal
    Finalized,
    /// The L1 cross domain messenger executed the message
    Relayed,
}

impl RelayStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Submitted => "submitted",
            Self::ReadyToProve => "ready_to_prove",
            Self::Proven => "proven",
            Self::ReadyForRelay => "ready_for_relay",
            Self::Finalized => "finalized",
            Self::Relayed => "relayed",
        }
    }
}

impl fmt::Display for RelayStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
