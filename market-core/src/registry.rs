//! Asset registry and listing state machine
//!
//! [`MarketState`] owns the three shared structures of the ledger:
//!
//! - the asset registry (token id → URI + custody state),
//! - the listing table, folded into custody as [`AssetState::Listed`],
//! - the balance table, including the marketplace-held fee balance.
//!
//! Every public method is one indivisible transition: all preconditions are
//! checked before the first write, so a rejected operation leaves the state
//! byte-for-byte unchanged. Callers serialize access (see [`crate::actor`]);
//! this module itself is purely synchronous.

use crate::{
    error::{Error, Result},
    types::{Address, Amount, Asset, AssetState, Listing, TokenId, TransferEvent},
};
use std::collections::HashMap;

/// Split a sale price into seller proceeds and marketplace fee
///
/// Floor division: the fee rounds down, the seller gets the remainder.
/// A price of 1 at 5% yields fee 0 and proceeds 1. Widening to u128 keeps
/// `price * fee_bps` from overflowing.
fn split_payment(price: Amount, fee_bps: u16) -> (Amount, Amount) {
    let fee = (u128::from(price) * u128::from(fee_bps) / 10_000) as Amount;
    (price - fee, fee)
}

/// The marketplace ledger state
///
/// Zeroed at construction: no assets, no balances, no events.
#[derive(Debug, Clone)]
pub struct MarketState {
    /// Escrow address of the marketplace itself
    marketplace: Address,

    /// Operator entitled to withdraw accrued fees
    operator: Address,

    /// Fee rate in basis points (500 = 5%)
    fee_bps: u16,

    /// Next token id to assign (ids start at 1, never reused)
    next_token_id: TokenId,

    /// Asset registry
    assets: HashMap<TokenId, Asset>,

    /// Balance table; the marketplace's own entry is the accrued-fee balance
    balances: HashMap<Address, Amount>,

    /// Event log, one entry per mutating operation, in commit order
    events: Vec<TransferEvent>,

    /// Cumulative sale volume, for the funds-conservation check
    sales_volume: u128,
}

impl MarketState {
    /// Create an empty ledger
    pub fn new(marketplace: Address, operator: Address, fee_bps: u16) -> Self {
        Self {
            marketplace,
            operator,
            fee_bps,
            next_token_id: 1,
            assets: HashMap::new(),
            balances: HashMap::new(),
            events: Vec::new(),
            sales_volume: 0,
        }
    }

    // Mutating transitions

    /// Mint a new token bound to `uri`, owned by `creator`
    ///
    /// URIs are unconstrained: empty and duplicate URIs are permitted.
    pub fn create(&mut self, uri: impl Into<String>, creator: &Address) -> TokenId {
        let token_id = self.next_token_id;
        self.next_token_id += 1;

        let uri = uri.into();
        self.assets.insert(
            token_id,
            Asset {
                uri: uri.clone(),
                state: AssetState::Owned(creator.clone()),
            },
        );

        self.events.push(TransferEvent {
            token_id,
            from: Address::null(),
            to: creator.clone(),
            token_uri: uri,
            price: 0,
        });

        tracing::debug!(token_id, creator = %creator, "token minted");

        token_id
    }

    /// List a token for sale at `price`, escrowing it with the marketplace
    pub fn list(&mut self, token_id: TokenId, price: Amount, caller: &Address) -> Result<()> {
        if price == 0 {
            return Err(Error::InvalidPrice);
        }

        let marketplace = self.marketplace.clone();
        let asset = self
            .assets
            .get_mut(&token_id)
            .ok_or(Error::NotFound(token_id))?;

        match &asset.state {
            AssetState::Owned(owner) if owner == caller => {}
            _ => {
                return Err(Error::Unauthorized(
                    "caller is not token owner".to_string(),
                ))
            }
        }

        asset.state = AssetState::Listed {
            seller: caller.clone(),
            price,
        };

        self.events.push(TransferEvent {
            token_id,
            from: caller.clone(),
            to: marketplace,
            token_uri: String::new(),
            price,
        });

        tracing::debug!(token_id, price, seller = %caller, "token listed");

        Ok(())
    }

    /// Buy a listed token with exact payment
    ///
    /// Atomically credits the seller with `price - fee`, accrues the fee to
    /// the marketplace-held balance, transfers custody to the buyer and
    /// removes the listing. Price validation, the payment split and the
    /// listing removal all happen within one `&mut self` call, so no other
    /// transition can interleave between them.
    pub fn buy(&mut self, token_id: TokenId, paid: Amount, buyer: &Address) -> Result<()> {
        let (seller, price) = match self.assets.get(&token_id).map(|asset| &asset.state) {
            Some(AssetState::Listed { seller, price }) => (seller.clone(), *price),
            _ => return Err(Error::NotListed(token_id)),
        };

        if paid != price {
            return Err(Error::IncorrectPrice {
                expected: price,
                paid,
            });
        }

        // Both credits must fit before anything is written, so a rejected
        // sale cannot leave custody rebound with the seller unpaid.
        let (proceeds, fee) = split_payment(price, self.fee_bps);
        let seller_after = self
            .balance_of(&seller)
            .checked_add(proceeds)
            .ok_or_else(|| Error::BalanceOverflow(seller.clone()))?;
        let marketplace_after = if seller == self.marketplace {
            seller_after.checked_add(fee)
        } else {
            self.held_balance().checked_add(fee)
        }
        .ok_or_else(|| Error::BalanceOverflow(self.marketplace.clone()))?;

        let asset = self
            .assets
            .get_mut(&token_id)
            .ok_or(Error::NotListed(token_id))?;
        asset.state = AssetState::Owned(buyer.clone());

        if seller != self.marketplace {
            self.balances.insert(seller.clone(), seller_after);
        }
        self.balances.insert(self.marketplace.clone(), marketplace_after);
        self.sales_volume += u128::from(price);

        self.events.push(TransferEvent {
            token_id,
            from: self.marketplace.clone(),
            to: buyer.clone(),
            token_uri: String::new(),
            price: 0,
        });

        tracing::debug!(token_id, price, fee, seller = %seller, buyer = %buyer, "sale completed");

        Ok(())
    }

    /// Cancel a listing, returning custody to the seller
    pub fn cancel(&mut self, token_id: TokenId, caller: &Address) -> Result<()> {
        let marketplace = self.marketplace.clone();
        let asset = self
            .assets
            .get_mut(&token_id)
            .ok_or(Error::NotListed(token_id))?;

        let seller = match &asset.state {
            AssetState::Listed { seller, .. } => seller.clone(),
            AssetState::Owned(_) => return Err(Error::NotListed(token_id)),
        };

        if &seller != caller {
            return Err(Error::Unauthorized(
                "caller is not the listing seller".to_string(),
            ));
        }

        asset.state = AssetState::Owned(seller.clone());

        self.events.push(TransferEvent {
            token_id,
            from: marketplace,
            to: seller,
            token_uri: String::new(),
            price: 0,
        });

        tracing::debug!(token_id, "listing cancelled");

        Ok(())
    }

    /// Withdraw the entire marketplace-held balance to the operator
    ///
    /// Full withdrawal only; the held balance is reset to zero. Returns the
    /// amount transferred.
    pub fn withdraw(&mut self, caller: &Address) -> Result<Amount> {
        if caller != &self.operator {
            return Err(Error::Unauthorized(
                "caller is not the operator".to_string(),
            ));
        }

        let held = self.held_balance();
        if held == 0 {
            return Err(Error::ZeroBalance);
        }

        let operator_after = self
            .balance_of(caller)
            .checked_add(held)
            .ok_or_else(|| Error::BalanceOverflow(caller.clone()))?;

        self.balances.insert(self.marketplace.clone(), 0);
        self.balances.insert(caller.clone(), operator_after);

        tracing::debug!(amount = held, operator = %caller, "fees withdrawn");

        Ok(held)
    }

    // Read accessors

    /// Current owner of a token
    ///
    /// Reports the marketplace address while the token is listed.
    pub fn owner_of(&self, token_id: TokenId) -> Result<Address> {
        let asset = self.assets.get(&token_id).ok_or(Error::NotFound(token_id))?;
        Ok(match &asset.state {
            AssetState::Owned(owner) => owner.clone(),
            AssetState::Listed { .. } => self.marketplace.clone(),
        })
    }

    /// URI a token was minted with
    pub fn uri_of(&self, token_id: TokenId) -> Result<String> {
        self.assets
            .get(&token_id)
            .map(|asset| asset.uri.clone())
            .ok_or(Error::NotFound(token_id))
    }

    /// Active listing for a token, if any
    pub fn listing_of(&self, token_id: TokenId) -> Option<Listing> {
        match &self.assets.get(&token_id)?.state {
            AssetState::Listed { seller, price } => Some(Listing {
                seller: seller.clone(),
                price: *price,
            }),
            AssetState::Owned(_) => None,
        }
    }

    /// Balance credited to an address
    pub fn balance_of(&self, addr: &Address) -> Amount {
        self.balances.get(addr).copied().unwrap_or(0)
    }

    /// Balance currently held by the marketplace (accrued fees)
    pub fn held_balance(&self) -> Amount {
        self.balance_of(&self.marketplace)
    }

    /// Number of tokens ever minted
    pub fn asset_count(&self) -> usize {
        self.assets.len()
    }

    /// Event log, in commit order
    pub fn events(&self) -> &[TransferEvent] {
        &self.events
    }

    /// The marketplace escrow address
    pub fn marketplace_address(&self) -> &Address {
        &self.marketplace
    }

    /// The operator address
    pub fn operator_address(&self) -> &Address {
        &self.operator
    }

    // Invariant checks

    /// Check funds conservation
    ///
    /// Every completed sale credits exactly `price` across seller and
    /// marketplace, and withdrawals move value between balance entries
    /// without changing the sum, so the balance total must always equal the
    /// cumulative sale volume.
    pub fn check_funds_conservation(&self) -> bool {
        let total: u128 = self.balances.values().map(|b| u128::from(*b)).sum();
        total == self.sales_volume
    }

    /// Check that each listing has a strictly positive price
    ///
    /// Custody-implies-listing is structural ([`AssetState`]); the positive
    /// price is the remaining checkable half of the listing invariant.
    pub fn check_listing_invariant(&self) -> bool {
        self.assets.values().all(|asset| match &asset.state {
            AssetState::Listed { price, .. } => *price > 0,
            AssetState::Owned(_) => true,
        })
    }
}
