//! A single tax lot.
//!
//! A [`SecurityLot`] records some shares of one security together with the
//! cost basis attributed to them. It carries two dates:
//!
//! - `date`: when this lot value was produced. Partial disposals, splits and
//!   distributions produce new lot values, so this moves forward over time.
//! - `cost_basis_date`: the economic acquisition date, used for FIFO/LIFO
//!   ordering and holding-period calculations. It survives every
//!   transformation that is not itself a new acquisition.
//!
//! Lots are immutable. Every transformation returns a new lot with a fresh
//! [`LotId`].

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;

use crate::{LotError, LotId, LotIdGenerator};

/// Round half-up. All quantities rounded here are positive, so rounding
/// midpoints away from zero is the same thing.
pub(crate) fn round_half_up(value: Decimal, scale: u32) -> Decimal {
    value.round_dp_with_strategy(scale, RoundingStrategy::MidpointAwayFromZero)
}

/// One tax lot: a positive number of shares acquired at a cost basis.
///
/// Ordering and equality use `cost_basis_date`, then `lot_id`, then
/// `cost_basis`, then `shares`. The production `date` never takes part.
///
/// # Examples
///
/// ```
/// use lotledger_core::{LotIdGenerator, SecurityLot};
/// use rust_decimal_macros::dec;
/// use chrono::NaiveDate;
///
/// let ids = LotIdGenerator::new();
/// let bought = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
/// let sold = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
///
/// let lot = SecurityLot::new(&ids, bought, bought, dec!(100), dec!(1234.56)).unwrap();
/// let rest = lot.remove_shares(&ids, sold, dec!(25)).unwrap().unwrap();
///
/// assert_eq!(rest.shares(), dec!(75));
/// assert_eq!(rest.cost_basis(), dec!(925.92));
/// assert_eq!(rest.cost_basis_date(), bought);
/// assert_ne!(rest.lot_id(), lot.lot_id());
/// ```
#[derive(Debug, Clone, Copy, Serialize)]
pub struct SecurityLot {
    lot_id: LotId,
    date: NaiveDate,
    cost_basis_date: NaiveDate,
    shares: Decimal,
    cost_basis: Decimal,
}

impl SecurityLot {
    /// Create a lot with a freshly allocated identity.
    ///
    /// Fails if `shares` is not positive: a lot with no shares does not exist.
    pub fn new(
        ids: &LotIdGenerator,
        date: NaiveDate,
        cost_basis_date: NaiveDate,
        shares: Decimal,
        cost_basis: Decimal,
    ) -> Result<Self, LotError> {
        if shares <= Decimal::ZERO {
            return Err(LotError::NonPositiveShares { shares });
        }
        Ok(Self {
            lot_id: ids.next_id(),
            date,
            cost_basis_date,
            shares,
            cost_basis,
        })
    }

    /// Create an acquisition lot, where both dates are the acquisition date.
    pub fn acquired(
        ids: &LotIdGenerator,
        date: NaiveDate,
        shares: Decimal,
        cost_basis: Decimal,
    ) -> Result<Self, LotError> {
        Self::new(ids, date, date, shares, cost_basis)
    }

    /// The lot's identity.
    #[must_use]
    pub const fn lot_id(&self) -> LotId {
        self.lot_id
    }

    /// The date this lot value was produced.
    #[must_use]
    pub const fn date(&self) -> NaiveDate {
        self.date
    }

    /// The date used for ordering and aging.
    #[must_use]
    pub const fn cost_basis_date(&self) -> NaiveDate {
        self.cost_basis_date
    }

    /// Number of shares in the lot. Always positive.
    #[must_use]
    pub const fn shares(&self) -> Decimal {
        self.shares
    }

    /// Total cost basis attributed to the lot's shares.
    #[must_use]
    pub const fn cost_basis(&self) -> Decimal {
        self.cost_basis
    }

    /// Cost basis per share.
    #[must_use]
    pub fn cost_per_share(&self) -> Decimal {
        self.cost_basis / self.shares
    }

    /// Value of the lot at a given share price.
    #[must_use]
    pub fn market_value(&self, price: Decimal) -> Decimal {
        self.shares * price
    }

    /// Gain (or loss, if negative) of the lot at a given share price.
    #[must_use]
    pub fn unrealized_gain(&self, price: Decimal) -> Decimal {
        self.market_value(price) - self.cost_basis
    }

    /// Days between the cost-basis date and `as_of`.
    #[must_use]
    pub fn holding_days(&self, as_of: NaiveDate) -> i64 {
        (as_of - self.cost_basis_date).num_days()
    }

    /// Remove shares from this lot.
    ///
    /// Returns `None` when every share is removed; the lot is then fully
    /// consumed. Otherwise the surviving lot keeps the cost basis of the
    /// remaining shares, `cost_basis * remaining / shares` rounded half-up at
    /// the scale of the original cost basis, under a fresh identity dated
    /// `date`.
    pub fn remove_shares(
        &self,
        ids: &LotIdGenerator,
        date: NaiveDate,
        shares_to_remove: Decimal,
    ) -> Result<Option<Self>, LotError> {
        if shares_to_remove <= Decimal::ZERO {
            return Err(LotError::NonPositiveShares {
                shares: shares_to_remove,
            });
        }
        if shares_to_remove > self.shares {
            return Err(LotError::InsufficientShares {
                requested: shares_to_remove,
                available: self.shares,
            });
        }
        if shares_to_remove == self.shares {
            return Ok(None);
        }

        let remaining = self.shares - shares_to_remove;
        let cost_basis = round_half_up(
            self.cost_basis * remaining / self.shares,
            self.cost_basis.scale(),
        );

        Ok(Some(Self {
            lot_id: ids.next_id(),
            date,
            cost_basis_date: self.cost_basis_date,
            shares: remaining,
            cost_basis,
        }))
    }

    /// Rescale the share count by `shares_out / shares_in`.
    ///
    /// Expresses forward splits (1:2), reverse splits (10:1) and
    /// share-for-share mergers. The cost basis is unchanged. An identity
    /// ratio returns the lot itself, same identity included.
    ///
    /// The new share count is rounded half-up at the scale of
    /// `shares * shares_out`, so two lots of 15 under a 10:1 reverse split
    /// become 2 shares each. A lot that would round to zero keeps the
    /// unrounded quotient instead, so its cost basis is never lost.
    pub fn scale_shares(
        &self,
        ids: &LotIdGenerator,
        date: NaiveDate,
        shares_in: Decimal,
        shares_out: Decimal,
    ) -> Result<Self, LotError> {
        if shares_in <= Decimal::ZERO || shares_out <= Decimal::ZERO {
            return Err(LotError::InvalidRatio {
                shares_in,
                shares_out,
            });
        }
        if shares_in == shares_out {
            return Ok(*self);
        }

        let product = self.shares * shares_out;
        let exact = product / shares_in;
        let mut shares = round_half_up(exact, product.scale());
        // A lot that would round away entirely keeps its exact fraction.
        if shares.is_zero() {
            shares = exact;
        }
        if shares <= Decimal::ZERO {
            return Err(LotError::NonPositiveShares { shares });
        }

        Ok(Self {
            lot_id: ids.next_id(),
            date,
            cost_basis_date: self.cost_basis_date,
            shares,
            cost_basis: self.cost_basis,
        })
    }

    /// A copy of this lot holding `additional` more shares at the same cost
    /// basis.
    pub(crate) fn add_shares(
        &self,
        ids: &LotIdGenerator,
        date: NaiveDate,
        additional: Decimal,
    ) -> Self {
        Self {
            lot_id: ids.next_id(),
            date,
            cost_basis_date: self.cost_basis_date,
            shares: self.shares + additional,
            cost_basis: self.cost_basis,
        }
    }
}

impl PartialEq for SecurityLot {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SecurityLot {}

impl PartialOrd for SecurityLot {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SecurityLot {
    fn cmp(&self, other: &Self) -> Ordering {
        self.cost_basis_date
            .cmp(&other.cost_basis_date)
            .then_with(|| self.lot_id.cmp(&other.lot_id))
            .then_with(|| self.cost_basis.cmp(&other.cost_basis))
            .then_with(|| self.shares.cmp(&other.shares))
    }
}

impl fmt::Display for SecurityLot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} shares @ {} ({})",
            self.lot_id, self.shares, self.cost_basis, self.cost_basis_date
        )
    }
}
