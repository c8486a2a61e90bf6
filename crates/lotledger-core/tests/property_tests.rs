//! Property-based tests for lotledger-core.
//!
//! These tests verify invariants of the lot transformations for arbitrary
//! holdings using proptest.
//!
//! Run with: cargo test -p lotledger-core --test `property_tests`

use chrono::NaiveDate;
use lotledger_core::{LotIdGenerator, SecurityLot, SecurityLots};
use proptest::prelude::*;
use rust_decimal::Decimal;

// ============================================================================
// Arbitrary generators
// ============================================================================

fn arb_shares() -> impl Strategy<Value = Decimal> {
    (1i64..100_000i64).prop_map(|n| Decimal::new(n, 2))
}

fn arb_cost() -> impl Strategy<Value = Decimal> {
    (0i64..10_000_000i64).prop_map(|n| Decimal::new(n, 2))
}

fn arb_date() -> impl Strategy<Value = NaiveDate> {
    (2020i32..2025i32, 1u32..13u32, 1u32..29u32)
        .prop_map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).unwrap())
}

/// Raw lot parameters; lots are built against a fresh generator per case.
fn arb_lot_specs() -> impl Strategy<Value = Vec<(NaiveDate, Decimal, Decimal)>> {
    prop::collection::vec((arb_date(), arb_shares(), arb_cost()), 1..12)
}

fn build(ids: &LotIdGenerator, specs: &[(NaiveDate, Decimal, Decimal)]) -> SecurityLots {
    specs
        .iter()
        .map(|&(date, shares, cost)| SecurityLot::acquired(ids, date, shares, cost).unwrap())
        .collect()
}

fn sell_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 30).unwrap()
}

/// A fraction of the holding in (0, 1], expressed in hundredths.
fn arb_fraction() -> impl Strategy<Value = Decimal> {
    (1i64..=100i64).prop_map(|n| Decimal::new(n, 2))
}

fn portion(lots: &SecurityLots, fraction: Decimal) -> Decimal {
    let shares = (lots.total_shares() * fraction).round_dp(2);
    shares.max(Decimal::new(1, 2))
}

// ============================================================================
// Removal properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// FIFO removal takes exactly the requested shares and never adds basis.
    #[test]
    fn prop_fifo_conserves_shares(specs in arb_lot_specs(), fraction in arb_fraction()) {
        let ids = LotIdGenerator::new();
        let lots = build(&ids, &specs);
        let sell = portion(&lots, fraction);

        let after = lots.remove_fifo_shares(&ids, sell_date(), sell).unwrap();
        prop_assert_eq!(after.total_shares(), lots.total_shares() - sell);
        prop_assert!(after.total_cost_basis() <= lots.total_cost_basis());
    }

    /// LIFO removal takes exactly the requested shares and never adds basis.
    #[test]
    fn prop_lifo_conserves_shares(specs in arb_lot_specs(), fraction in arb_fraction()) {
        let ids = LotIdGenerator::new();
        let lots = build(&ids, &specs);
        let sell = portion(&lots, fraction);

        let after = lots.remove_lifo_shares(&ids, sell_date(), sell).unwrap();
        prop_assert_eq!(after.total_shares(), lots.total_shares() - sell);
        prop_assert!(after.total_cost_basis() <= lots.total_cost_basis());
    }

    /// Selling everything FIFO or LIFO ends in the same place.
    #[test]
    fn prop_fifo_lifo_symmetry(specs in arb_lot_specs()) {
        let ids = LotIdGenerator::new();
        let lots = build(&ids, &specs);
        let all = lots.total_shares();

        let fifo = lots.remove_fifo_shares(&ids, sell_date(), all).unwrap();
        let lifo = lots.remove_lifo_shares(&ids, sell_date(), all).unwrap();
        prop_assert_eq!(fifo.total_shares(), lifo.total_shares());
        prop_assert_eq!(fifo.total_cost_basis(), lifo.total_cost_basis());
        prop_assert!(fifo.is_empty());
    }

    /// Asking for more than the holding fails and leaves it untouched.
    #[test]
    fn prop_over_disposal_fails(specs in arb_lot_specs(), extra in arb_shares()) {
        let ids = LotIdGenerator::new();
        let lots = build(&ids, &specs);
        let before = lots.clone();

        prop_assert!(lots.remove_fifo_shares(&ids, sell_date(), lots.total_shares() + extra).is_err());
        prop_assert!(lots.remove_lifo_shares(&ids, sell_date(), lots.total_shares() + extra).is_err());
        prop_assert_eq!(lots, before);
    }

    /// At most one lot survives a removal in altered form.
    #[test]
    fn prop_at_most_one_partial_lot(specs in arb_lot_specs(), fraction in arb_fraction()) {
        let ids = LotIdGenerator::new();
        let lots = build(&ids, &specs);
        let sell = portion(&lots, fraction);

        let after = lots.remove_fifo_shares(&ids, sell_date(), sell).unwrap();
        let fresh = after.iter().filter(|lot| lots.get(lot.lot_id()).is_none()).count();
        prop_assert!(fresh <= 1);
    }
}

// ============================================================================
// Ordering and scaling properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Members iterate by cost-basis date, ties broken by lot id.
    #[test]
    fn prop_lots_are_ordered(specs in arb_lot_specs(), fraction in arb_fraction()) {
        let ids = LotIdGenerator::new();
        let lots = build(&ids, &specs);
        let after = lots
            .remove_lifo_shares(&ids, sell_date(), portion(&lots, fraction))
            .unwrap();

        for snapshot in [&lots, &after] {
            for pair in snapshot.lots().windows(2) {
                let (a, b) = (&pair[0], &pair[1]);
                prop_assert!(a.cost_basis_date() <= b.cost_basis_date());
                if a.cost_basis_date() == b.cost_basis_date() {
                    prop_assert!(a.lot_id() < b.lot_id());
                }
            }
        }
    }

    /// Scaling by n:n is the identity.
    #[test]
    fn prop_identity_scaling(specs in arb_lot_specs(), n in arb_shares()) {
        let ids = LotIdGenerator::new();
        let lots = build(&ids, &specs);
        let scaled = lots.scale_shares(&ids, sell_date(), n, n).unwrap();
        prop_assert_eq!(&scaled, &lots);
        prop_assert!(scaled.is_same_snapshot(&lots));
    }

    /// Whole-number splits multiply shares and keep the cost basis.
    #[test]
    fn prop_split_keeps_cost_basis(specs in arb_lot_specs(), factor in 2i64..10i64) {
        let ids = LotIdGenerator::new();
        let lots = build(&ids, &specs);
        let factor = Decimal::from(factor);

        let scaled = lots.scale_shares(&ids, sell_date(), Decimal::ONE, factor).unwrap();
        prop_assert_eq!(scaled.total_shares(), lots.total_shares() * factor);
        prop_assert_eq!(scaled.total_cost_basis(), lots.total_cost_basis());
    }

    /// Distributed shares land within rounding distance of the amount.
    #[test]
    fn prop_distribution_approximates_amount(specs in arb_lot_specs(), amount in arb_shares()) {
        let ids = LotIdGenerator::new();
        let lots = build(&ids, &specs);

        let after = lots.distribute_cash(&ids, sell_date(), amount).unwrap();
        let added = after.total_shares() - lots.total_shares();
        // Each lot rounds by at most half a hundredth
        let tolerance = Decimal::new(5, 3) * Decimal::from(lots.len());
        prop_assert!((added - amount).abs() <= tolerance);
        prop_assert_eq!(after.total_cost_basis(), lots.total_cost_basis());
    }
}
