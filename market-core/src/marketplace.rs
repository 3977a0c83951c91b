//! Main marketplace orchestration layer
//!
//! This module ties together the registry, actor and metrics components
//! into a high-level API for marketplace operations.
//!
//! # Example
//!
//! ```no_run
//! use market_core::{Address, Config, Marketplace};
//!
//! #[tokio::main]
//! async fn main() -> market_core::Result<()> {
//!     let market = Marketplace::open(Config::default())?;
//!
//!     let alice = Address::new("0xalice");
//!     let token = market.create("ipfs://item", &alice).await?;
//!     market.list(token, 100, &alice).await?;
//!
//!     Ok(())
//! }
//! ```

use crate::{
    actor::{spawn_market_actor, MarketHandle},
    registry::MarketState,
    types::{Address, Amount, Listing, TokenId, TransferEvent},
    Config, Metrics, Result,
};
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Instant;

/// Main marketplace interface
///
/// Mutations go through the single-writer actor; reads take the shared
/// lock directly.
pub struct Marketplace {
    /// Actor handle for mutating operations
    handle: MarketHandle,

    /// Direct state access (for reads)
    state: Arc<RwLock<MarketState>>,

    /// Prometheus metrics
    metrics: Metrics,

    /// Configuration
    config: Config,
}

impl Marketplace {
    /// Open a marketplace with the given configuration
    ///
    /// The ledger starts zeroed: no assets, no balances, no events.
    pub fn open(config: Config) -> Result<Self> {
        config.validate()?;

        let state = Arc::new(RwLock::new(MarketState::new(
            config.marketplace(),
            config.operator(),
            config.fee_bps,
        )));
        let handle = spawn_market_actor(state.clone(), config.mailbox_capacity);
        let metrics = Metrics::new()?;

        tracing::info!(
            service = %config.service_name,
            fee_bps = config.fee_bps,
            "marketplace opened"
        );

        Ok(Self {
            handle,
            state,
            metrics,
            config,
        })
    }

    // Mutating operations

    /// Mint a new token bound to `uri`, owned by `creator`
    pub async fn create(&self, uri: impl Into<String>, creator: &Address) -> Result<TokenId> {
        let start = Instant::now();
        let token_id = self.handle.create(uri.into(), creator.clone()).await?;

        self.metrics.record_mint();
        self.metrics
            .record_op_duration(start.elapsed().as_secs_f64());

        Ok(token_id)
    }

    /// List a token for sale at `price`
    pub async fn list(&self, token_id: TokenId, price: Amount, caller: &Address) -> Result<()> {
        let start = Instant::now();
        self.handle.list(token_id, price, caller.clone()).await?;

        self.metrics.record_listing();
        self.metrics
            .record_op_duration(start.elapsed().as_secs_f64());

        Ok(())
    }

    /// Buy a listed token with exact payment
    pub async fn buy(&self, token_id: TokenId, paid: Amount, buyer: &Address) -> Result<()> {
        let start = Instant::now();
        self.handle.buy(token_id, paid, buyer.clone()).await?;

        self.metrics.record_sale();
        self.metrics.update_fees_held(self.held_balance());
        self.metrics
            .record_op_duration(start.elapsed().as_secs_f64());

        Ok(())
    }

    /// Cancel a listing, returning custody to the seller
    pub async fn cancel(&self, token_id: TokenId, caller: &Address) -> Result<()> {
        let start = Instant::now();
        self.handle.cancel(token_id, caller.clone()).await?;

        self.metrics.record_cancellation();
        self.metrics
            .record_op_duration(start.elapsed().as_secs_f64());

        Ok(())
    }

    /// Withdraw the entire marketplace-held balance to the operator
    pub async fn withdraw(&self, caller: &Address) -> Result<Amount> {
        let start = Instant::now();
        let amount = self.handle.withdraw(caller.clone()).await?;

        self.metrics.update_fees_held(0);
        self.metrics
            .record_op_duration(start.elapsed().as_secs_f64());

        Ok(amount)
    }

    // Read accessors

    /// Current owner of a token
    pub fn owner_of(&self, token_id: TokenId) -> Result<Address> {
        self.state.read().owner_of(token_id)
    }

    /// URI a token was minted with
    pub fn uri_of(&self, token_id: TokenId) -> Result<String> {
        self.state.read().uri_of(token_id)
    }

    /// Active listing for a token, if any
    pub fn listing_of(&self, token_id: TokenId) -> Option<Listing> {
        self.state.read().listing_of(token_id)
    }

    /// Balance credited to an address
    pub fn balance_of(&self, addr: &Address) -> Amount {
        self.state.read().balance_of(addr)
    }

    /// Balance currently held by the marketplace (accrued fees)
    pub fn held_balance(&self) -> Amount {
        self.state.read().held_balance()
    }

    /// Number of tokens ever minted
    pub fn asset_count(&self) -> usize {
        self.state.read().asset_count()
    }

    /// Snapshot of the event log, in commit order
    pub fn events(&self) -> Vec<TransferEvent> {
        self.state.read().events().to_vec()
    }

    /// Configuration this marketplace was opened with
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Metrics collector
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    // Invariant checks

    /// Check funds conservation (balance total equals cumulative sale volume)
    pub fn check_funds_conservation(&self) -> bool {
        self.state.read().check_funds_conservation()
    }

    /// Check that every active listing carries a strictly positive price
    pub fn check_listing_invariant(&self) -> bool {
        self.state.read().check_listing_invariant()
    }

    /// Shutdown marketplace
    pub async fn shutdown(self) -> Result<()> {
        self.handle.shutdown().await?;
        tracing::info!("marketplace shut down");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    fn addr(s: &str) -> Address {
        Address::new(s)
    }

    fn open_test_market() -> Marketplace {
        Marketplace::open(Config::default()).unwrap()
    }

    #[tokio::test]
    async fn test_open_and_shutdown() {
        let market = open_test_market();
        assert_eq!(market.asset_count(), 0);
        market.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_open_rejects_invalid_config() {
        let config = Config {
            fee_bps: 20_000,
            ..Config::default()
        };
        assert!(matches!(Marketplace::open(config), Err(Error::Config(_))));
    }

    #[tokio::test]
    async fn test_full_sale_lifecycle() {
        let market = open_test_market();
        let alice = addr("0xalice");
        let bob = addr("0xbob");

        let token = market.create("ipfs://item-1", &alice).await.unwrap();
        assert_eq!(market.owner_of(token).unwrap(), alice);
        assert_eq!(market.uri_of(token).unwrap(), "ipfs://item-1");

        market.list(token, 123, &alice).await.unwrap();
        assert_eq!(
            market.owner_of(token).unwrap().as_str(),
            market.config().marketplace_address
        );

        market.buy(token, 123, &bob).await.unwrap();
        assert_eq!(market.owner_of(token).unwrap(), bob);
        assert_eq!(market.balance_of(&alice), 116);
        assert_eq!(market.held_balance(), 7);
        assert!(market.listing_of(token).is_none());

        assert!(market.check_funds_conservation());
        assert!(market.check_listing_invariant());

        let events = market.events();
        assert_eq!(events.len(), 3);

        market.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_cancel_roundtrip() {
        let market = open_test_market();
        let alice = addr("0xalice");

        let token = market.create("uri", &alice).await.unwrap();
        market.list(token, 50, &alice).await.unwrap();
        market.cancel(token, &alice).await.unwrap();

        assert_eq!(market.owner_of(token).unwrap(), alice);
        assert!(market.listing_of(token).is_none());

        // Second cancel must fail, never double-transfer
        let result = market.cancel(token, &alice).await;
        assert!(matches!(result, Err(Error::NotListed(_))));

        market.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_withdraw_lifecycle() {
        let market = open_test_market();
        let operator = market.config().operator();
        let alice = addr("0xalice");
        let bob = addr("0xbob");

        // Nothing accrued yet
        let result = market.withdraw(&operator).await;
        assert!(matches!(result, Err(Error::ZeroBalance)));

        let token = market.create("uri", &alice).await.unwrap();
        market.list(token, 1000, &alice).await.unwrap();
        market.buy(token, 1000, &bob).await.unwrap();
        assert_eq!(market.held_balance(), 50);

        // Non-operator rejected
        let result = market.withdraw(&alice).await;
        assert!(matches!(result, Err(Error::Unauthorized(_))));

        let withdrawn = market.withdraw(&operator).await.unwrap();
        assert_eq!(withdrawn, 50);
        assert_eq!(market.held_balance(), 0);
        assert_eq!(market.balance_of(&operator), 50);

        market.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_metrics_track_operations() {
        let market = open_test_market();
        let alice = addr("0xalice");
        let bob = addr("0xbob");

        let token = market.create("uri", &alice).await.unwrap();
        market.list(token, 100, &alice).await.unwrap();
        market.buy(token, 100, &bob).await.unwrap();

        let metrics = market.metrics();
        assert_eq!(metrics.mints_total.get(), 1);
        assert_eq!(metrics.listings_total.get(), 1);
        assert_eq!(metrics.sales_total.get(), 1);
        assert_eq!(metrics.fees_held.get(), 5);

        market.shutdown().await.unwrap();
    }
}
