//! Property-based tests for marketplace invariants
//!
//! These tests use proptest to verify critical invariants:
//! - Funds conservation: Σ(balances) == Σ(sale prices)
//! - Exact splits: seller proceeds + fee == price for every sale
//! - Atomic rejection: failed preconditions mutate nothing
//! - Custody/listing coupling: a listing exists iff the marketplace owns the asset

use market_core::{Address, Amount, MarketState, TokenId};
use proptest::prelude::*;

const FEE_BPS: u16 = 500;

/// Strategy for generating valid prices (strictly positive)
fn price_strategy() -> impl Strategy<Value = Amount> {
    1u64..1_000_000_000u64
}

/// Strategy for generating participant addresses from a small pool,
/// so operations collide on the same actors often
fn address_strategy() -> impl Strategy<Value = Address> {
    (0u8..4).prop_map(|i| Address::new(format!("user-{}", i)))
}

/// One step of a random marketplace workload
#[derive(Debug, Clone)]
enum Op {
    Create(Address),
    List(TokenId, Amount, Address),
    BuyExact(TokenId, Address),
    BuyArbitrary(TokenId, Amount, Address),
    Cancel(TokenId, Address),
    Withdraw(Address),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        address_strategy().prop_map(Op::Create),
        (1u64..12, 0u64..1_000, address_strategy())
            .prop_map(|(id, price, caller)| Op::List(id, price, caller)),
        (1u64..12, address_strategy()).prop_map(|(id, buyer)| Op::BuyExact(id, buyer)),
        (1u64..12, 0u64..1_000, address_strategy())
            .prop_map(|(id, paid, buyer)| Op::BuyArbitrary(id, paid, buyer)),
        (1u64..12, address_strategy()).prop_map(|(id, caller)| Op::Cancel(id, caller)),
        prop_oneof![Just(Address::new("operator")), Just(Address::new("user-0"))]
            .prop_map(Op::Withdraw),
    ]
}

fn fresh_state() -> MarketState {
    MarketState::new(Address::new("market"), Address::new("operator"), FEE_BPS)
}

/// Apply one op, ignoring rejections (they are part of the workload)
fn apply(state: &mut MarketState, op: &Op) {
    match op {
        Op::Create(creator) => {
            state.create("uri", creator);
        }
        Op::List(id, price, caller) => {
            let _ = state.list(*id, *price, caller);
        }
        Op::BuyExact(id, buyer) => {
            if let Some(listing) = state.listing_of(*id) {
                let _ = state.buy(*id, listing.price, buyer);
            }
        }
        Op::BuyArbitrary(id, paid, buyer) => {
            let _ = state.buy(*id, *paid, buyer);
        }
        Op::Cancel(id, caller) => {
            let _ = state.cancel(*id, caller);
        }
        Op::Withdraw(caller) => {
            let _ = state.withdraw(caller);
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Property: every completed sale splits the price exactly
    #[test]
    fn prop_sale_splits_price_exactly(price in price_strategy()) {
        let mut state = fresh_state();
        let seller = Address::new("seller");
        let buyer = Address::new("buyer");

        let id = state.create("uri", &seller);
        state.list(id, price, &seller).unwrap();
        state.buy(id, price, &buyer).unwrap();

        let proceeds = state.balance_of(&seller);
        let fee = state.held_balance();
        prop_assert_eq!(proceeds + fee, price);

        // Floor division: the fee never exceeds the exact 5% share
        prop_assert_eq!(u128::from(fee), u128::from(price) * u128::from(FEE_BPS) / 10_000);
        prop_assert!(fee <= price / 20 + 1);
    }

    /// Property: a buy with the wrong amount changes nothing
    #[test]
    fn prop_wrong_payment_mutates_nothing(price in price_strategy(), delta in 1u64..1_000) {
        let mut state = fresh_state();
        let seller = Address::new("seller");
        let buyer = Address::new("buyer");

        let id = state.create("uri", &seller);
        state.list(id, price, &seller).unwrap();

        let events_before = state.events().len();
        let paid = price.wrapping_add(delta);
        prop_assert!(state.buy(id, paid, &buyer).is_err());

        prop_assert_eq!(state.owner_of(id).unwrap(), Address::new("market"));
        prop_assert_eq!(state.listing_of(id).unwrap().price, price);
        prop_assert_eq!(state.balance_of(&seller), 0);
        prop_assert_eq!(state.held_balance(), 0);
        prop_assert_eq!(state.events().len(), events_before);
    }

    /// Property: list then cancel restores the original owner
    #[test]
    fn prop_list_cancel_roundtrip(price in price_strategy()) {
        let mut state = fresh_state();
        let seller = Address::new("seller");

        let id = state.create("uri", &seller);
        state.list(id, price, &seller).unwrap();
        state.cancel(id, &seller).unwrap();

        prop_assert_eq!(state.owner_of(id).unwrap(), seller);
        prop_assert!(state.listing_of(id).is_none());
    }

    /// Property: under any workload, funds are conserved and every listing
    /// coincides with marketplace custody
    #[test]
    fn prop_workload_preserves_invariants(ops in prop::collection::vec(op_strategy(), 1..60)) {
        let mut state = fresh_state();

        for op in &ops {
            apply(&mut state, op);

            prop_assert!(state.check_funds_conservation());
            prop_assert!(state.check_listing_invariant());
        }

        // Custody and listing agree for every minted token
        let market = Address::new("market");
        for id in 1..=state.asset_count() as u64 {
            let listed = state.listing_of(id).is_some();
            let escrowed = state.owner_of(id).unwrap() == market;
            prop_assert_eq!(listed, escrowed);
        }
    }

    /// Property: withdraw drains the held balance exactly once
    #[test]
    fn prop_withdraw_drains_held_balance(prices in prop::collection::vec(price_strategy(), 1..10)) {
        let mut state = fresh_state();
        let seller = Address::new("seller");
        let buyer = Address::new("buyer");
        let operator = Address::new("operator");

        for price in &prices {
            let id = state.create("uri", &seller);
            state.list(id, *price, &seller).unwrap();
            state.buy(id, *price, &buyer).unwrap();
        }

        let held = state.held_balance();
        if held == 0 {
            // All fees floored to zero; withdraw must reject
            prop_assert!(state.withdraw(&operator).is_err());
        } else {
            let withdrawn = state.withdraw(&operator).unwrap();
            prop_assert_eq!(withdrawn, held);
            prop_assert_eq!(state.held_balance(), 0);
            prop_assert_eq!(state.balance_of(&operator), held);
            prop_assert!(state.withdraw(&operator).is_err());
        }

        prop_assert!(state.check_funds_conservation());
    }
}

#[cfg(test)]
mod integration_tests {
    use market_core::{Address, Config, Error, Marketplace};

    #[tokio::test]
    async fn test_competing_buyers_single_winner() {
        let market = Marketplace::open(Config::default()).unwrap();
        let seller = Address::new("0xseller");

        let token = market.create("uri", &seller).await.unwrap();
        market.list(token, 40, &seller).await.unwrap();

        // Race the buys through the actor mailbox
        let buyer1 = Address::new("0xbuyer-1");
        let buyer2 = Address::new("0xbuyer-2");
        let buyer3 = Address::new("0xbuyer-3");
        let buyer4 = Address::new("0xbuyer-4");
        let (r1, r2, r3, r4) = tokio::join!(
            market.buy(token, 40, &buyer1),
            market.buy(token, 40, &buyer2),
            market.buy(token, 40, &buyer3),
            market.buy(token, 40, &buyer4),
        );
        let results = [r1, r2, r3, r4];

        let wins = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(wins, 1);
        assert!(results
            .iter()
            .filter(|r| r.is_err())
            .all(|r| matches!(r, Err(Error::NotListed(_)))));

        // Exactly one payment was split
        assert_eq!(market.balance_of(&seller), 38);
        assert_eq!(market.held_balance(), 2);
        assert!(market.check_funds_conservation());

        market.shutdown().await.unwrap();
    }
}
