//! Error types for the marketplace ledger

use crate::types::{Address, Amount, TokenId};
use thiserror::Error;

/// Result type for marketplace operations
pub type Result<T> = std::result::Result<T, Error>;

/// Marketplace errors
///
/// Domain rejections carry stable reason strings; every rejection is
/// synchronous and leaves the ledger state untouched.
#[derive(Error, Debug)]
pub enum Error {
    /// Listing attempted with a non-positive price
    #[error("price must be > 0")]
    InvalidPrice,

    /// Caller lacks the required capability
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Buy or cancel referencing a token with no active listing
    #[error("nft not listed for sale")]
    NotListed(TokenId),

    /// Buy with payment not exactly equal to the listing price
    #[error("incorrect price: listing is {expected}, paid {paid}")]
    IncorrectPrice {
        /// Listing price
        expected: Amount,
        /// Amount actually paid
        paid: Amount,
    },

    /// Withdraw attempted with nothing to withdraw
    #[error("balance is 0")]
    ZeroBalance,

    /// Query against a token that was never minted
    #[error("token not found: {0}")]
    NotFound(TokenId),

    /// Credit would overflow the recipient's balance
    #[error("balance overflow: {0}")]
    BalanceOverflow(Address),

    /// Concurrency error (actor mailbox closed, etc.)
    #[error("concurrency error: {0}")]
    Concurrency(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Metrics registration error
    #[error("metrics error: {0}")]
    Metrics(#[from] prometheus::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
