//! CCTP domain ID types for identifying blockchain networks
//!
//! Circle's Cross-Chain Transfer Protocol uses domain IDs as unique identifiers
//! for each supported blockchain network. The default network registry is built
//! from these.
//!
//! Reference: <https://developers.circle.com/stablecoins/evm-smart-contracts>

use std::fmt;

/// CCTP v1 domain identifier for the networks the finalizer relays between
///
/// # Example
///
/// ```rust
/// use bridge_finalizer::DomainId;
///
/// let base = DomainId::Base;
/// let domain_value: u32 = base.into();
/// assert_eq!(domain_value, 6);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum DomainId {
    /// Ethereum mainnet (Domain ID: 0)
    Ethereum = 0,
    /// Avalanche C-Chain (Domain ID: 1)
    Avalanche = 1,
    /// Optimism (Domain ID: 2)
    Optimism = 2,
    /// Arbitrum One (Domain ID: 3)
    Arbitrum = 3,
    /// Base (Domain ID: 6)
    Base = 6,
    /// Polygon PoS (Domain ID: 7)
    Polygon = 7,
}

impl DomainId {
    /// Every domain in the default registry, in domain order
    pub const ALL: [DomainId; 6] = [
        Self::Ethereum,
        Self::Avalanche,
        Self::Optimism,
        Self::Arbitrum,
        Self::Base,
        Self::Polygon,
    ];

    /// Returns the numeric domain ID value
    #[inline]
    pub const fn as_u32(self) -> u32 {
        self as u32
    }

    /// Attempts to create a DomainId from a u32 value
    ///
    /// # Example
    ///
    /// ```rust
    /// use bridge_finalizer::DomainId;
    ///
    /// assert_eq!(DomainId::from_u32(3), Some(DomainId::Arbitrum));
    /// assert_eq!(DomainId::from_u32(4), None);
    /// ```
    #[inline]
    pub const fn from_u32(value: u32) -> Option<Self> {
        match value {
            0 => Some(Self::Ethereum),
            1 => Some(Self::Avalanche),
            2 => Some(Self::Optimism),
            3 => Some(Self::Arbitrum),
            6 => Some(Self::Base),
            7 => Some(Self::Polygon),
            _ => None,
        }
    }

    /// Returns the human readable chain name
    #[inline]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Ethereum => "Ethereum",
            Self::Avalanche => "Avalanche",
            Self::Optimism => "Optimism",
            Self::Arbitrum => "Arbitrum",
            Self::Base => "Base",
            Self::Polygon => "Polygon",
        }
    }

    /// Returns the lowercase network name operators pass on the command line
    ///
    /// ```rust
    /// use bridge_finalizer::DomainId;
    ///
    /// assert_eq!(DomainId::Ethereum.network_name(), "ethereum");
    /// ```
    #[inline]
    pub const fn network_name(self) -> &'static str {
        match self {
            Self::Ethereum => "ethereum",
            Self::Avalanche => "avalanche",
            Self::Optimism => "optimism",
            Self::Arbitrum => "arbitrum",
            Self::Base => "base",
            Self::Polygon => "polygon",
        }
    }
}

impl From<DomainId> for u32 {
    #[inline]
    fn from(domain: DomainId) -> Self {
        domain.as_u32()
    }
}

impl TryFrom<u32> for DomainId {
    type Error = InvalidDomainId;

    #[inline]
    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::from_u32(value).ok_or(InvalidDomainId(value))
    }
}

impl fmt::Display for DomainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.as_u32())
    }
}

/// Error returned when attempting to convert an invalid u32 to a DomainId
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidDomainId(pub u32);

impl fmt::Display for InvalidDomainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid CCTP domain ID: {}", self.0)
    }
}

impl std::error::Error for InvalidDomainId {}
