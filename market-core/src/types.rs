//! Core types for the marketplace ledger
//!
//! All types are designed for:
//! - Deterministic serialization (serde)
//! - Memory safety (no unsafe code)
//! - Exact arithmetic (integer amounts in the smallest payment unit)

use serde::{Deserialize, Serialize};
use std::fmt;

/// Token identifier, assigned sequentially starting at 1 and never reused
pub type TokenId = u64;

/// Amount in the smallest payment unit
pub type Amount = u64;

/// The reserved null address, used as `from` in mint events
const NULL_ADDRESS: &str = "0x0000000000000000000000000000000000000000";

/// Participant address (creator, seller, buyer, operator, or the
/// marketplace escrow itself)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Address(String);

impl Address {
    /// Create new address
    pub fn new(addr: impl Into<String>) -> Self {
        Self(addr.into())
    }

    /// The null address; never a valid owner or caller
    pub fn null() -> Self {
        Self(NULL_ADDRESS.to_string())
    }

    /// Check whether this is the null address
    pub fn is_null(&self) -> bool {
        self.0 == NULL_ADDRESS
    }

    /// Get as string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Custody state of a single asset
///
/// A listing exists only while the marketplace holds the asset, so custody
/// and listing are one tagged variant rather than two separately mutable
/// fields. The "listing implies marketplace custody" invariant is therefore
/// unrepresentable to violate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssetState {
    /// Privately owned, not for sale
    Owned(Address),

    /// Escrowed by the marketplace, open for purchase
    Listed {
        /// Address that listed the asset and receives the proceeds
        seller: Address,
        /// Asking price, strictly positive
        price: Amount,
    },
}

/// Asset record: immutable URI plus current custody state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    /// Descriptive URI, set at mint and never changed
    pub uri: String,

    /// Current custody state
    pub state: AssetState,
}

/// An open offer to sell a specific asset at a fixed price
///
/// Read-side projection of [`AssetState::Listed`], returned by
/// `listing_of`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listing {
    /// Address that listed the asset
    pub seller: Address,

    /// Asking price
    pub price: Amount,
}

/// Transfer record emitted by every mutating operation
///
/// Mint events carry the token URI and `from = null`; internal transfers
/// (list, buy, cancel) carry an empty URI. The `price` field holds the
/// asking price on `list` and zero otherwise, mirroring the "no active
/// listing" semantics once a sale or cancellation is final.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferEvent {
    /// Token this event concerns
    pub token_id: TokenId,

    /// Previous custodian (null address on mint)
    pub from: Address,

    /// New custodian
    pub to: Address,

    /// Token URI (only populated on mint)
    pub token_uri: String,

    /// Asking price (only populated on list)
    pub price: Amount,
}
