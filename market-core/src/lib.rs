//! Curio Market Core
//!
//! Asset-custody and listing state machine for a fixed-price marketplace of
//! uniquely-identified digital items.
//!
//! # Architecture
//!
//! - **Single Writer**: one logical writer task serializes all mutations
//! - **Tagged Custody**: a listing exists iff the marketplace holds the asset
//! - **Exact Splits**: integer floor-division fee accounting, no rounding policy
//! - **Event Log**: one transfer record per mutating operation, in commit order
//!
//! # Invariants
//!
//! - Custody is exclusive: exactly one owner per asset at all times
//! - Funds conservation: Σ(balances) == Σ(sale prices) for all time
//! - Rejected operations leave the ledger state unchanged
//! - Listing prices are strictly positive while the listing exists

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    rust_2018_idioms,
    missing_debug_implementations,
    clippy::all
)]

pub mod actor;
pub mod config;
pub mod error;
pub mod marketplace;
pub mod metrics;
pub mod registry;
pub mod types;

// Re-exports
pub use config::Config;
pub use error::{Error, Result};
pub use marketplace::Marketplace;
pub use metrics::Metrics;
pub use registry::MarketState;
pub use types::{Address, Amount, Asset, AssetState, Listing, TokenId, TransferEvent};
