//! The full holding of one security.
//!
//! A [`SecurityLots`] is an immutable, always-sorted set of
//! [`SecurityLot`]s. Its transformations (FIFO/LIFO removal, specific-lot
//! removal, scaling, distribution) each return a new collection; the
//! receiver is never modified. Clones share storage, so keeping every
//! historical snapshot around is cheap.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

use crate::lot::round_half_up;
use crate::{LotError, LotId, LotIdGenerator, SecurityLot};

/// Decimal places used for pro-rata share distributions.
const DISTRIBUTION_SCALE: u32 = 2;

/// A request to remove shares from one named lot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LotShares {
    /// The lot to reduce.
    pub lot_id: LotId,
    /// Shares to remove from it.
    pub shares: Decimal,
}

impl LotShares {
    /// Create a removal request.
    #[must_use]
    pub const fn new(lot_id: LotId, shares: Decimal) -> Self {
        Self { lot_id, shares }
    }
}

#[derive(Debug, Clone, Copy)]
struct Totals {
    shares: Decimal,
    cost_basis: Decimal,
}

/// The lots of one security at one point in time.
///
/// Members are kept sorted by cost-basis date, then lot id. An empty
/// collection is valid and means "no holding".
///
/// # Examples
///
/// ```
/// use lotledger_core::{LotIdGenerator, SecurityLot, SecurityLots};
/// use rust_decimal_macros::dec;
/// use chrono::NaiveDate;
///
/// let ids = LotIdGenerator::new();
/// let d = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
///
/// let lots: SecurityLots = [dec!(100), dec!(200), dec!(300), dec!(300)]
///     .into_iter()
///     .map(|shares| SecurityLot::acquired(&ids, d, shares, dec!(10)).unwrap())
///     .collect();
///
/// let credited = lots.distribute_cash(&ids, d, dec!(9)).unwrap();
/// assert_eq!(credited.total_shares(), dec!(909));
/// assert_eq!(credited.total_cost_basis(), dec!(40));
/// ```
#[derive(Clone)]
pub struct SecurityLots {
    lots: Arc<[SecurityLot]>,
    totals: OnceLock<Totals>,
}

impl Default for SecurityLots {
    fn default() -> Self {
        Self::from_sorted(Vec::new())
    }
}

impl SecurityLots {
    /// Create an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn from_sorted(lots: Vec<SecurityLot>) -> Self {
        debug_assert!(lots.windows(2).all(|w| w[0] <= w[1]));
        Self {
            lots: lots.into(),
            totals: OnceLock::new(),
        }
    }

    fn from_unsorted(mut lots: Vec<SecurityLot>) -> Self {
        lots.sort();
        Self::from_sorted(lots)
    }

    /// Get all lots, in order.
    #[must_use]
    pub fn lots(&self) -> &[SecurityLot] {
        &self.lots
    }

    /// Iterate over the lots, oldest cost-basis date first.
    pub fn iter(&self) -> std::slice::Iter<'_, SecurityLot> {
        self.lots.iter()
    }

    /// Number of lots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lots.len()
    }

    /// Check if there are no lots.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lots.is_empty()
    }

    /// Find a lot by identity.
    #[must_use]
    pub fn get(&self, lot_id: LotId) -> Option<&SecurityLot> {
        self.lots.iter().find(|lot| lot.lot_id() == lot_id)
    }

    /// Whether both values are the same snapshot (shared storage), not just
    /// equal ones.
    #[must_use]
    pub fn is_same_snapshot(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.lots, &other.lots)
    }

    fn totals(&self) -> Totals {
        *self.totals.get_or_init(|| Totals {
            shares: self.lots.iter().map(SecurityLot::shares).sum(),
            cost_basis: self.lots.iter().map(SecurityLot::cost_basis).sum(),
        })
    }

    /// Sum of the shares of every lot.
    #[must_use]
    pub fn total_shares(&self) -> Decimal {
        self.totals().shares
    }

    /// Sum of the cost basis of every lot.
    #[must_use]
    pub fn total_cost_basis(&self) -> Decimal {
        self.totals().cost_basis
    }

    /// Value of the whole holding at a given share price.
    #[must_use]
    pub fn market_value(&self, price: Decimal) -> Decimal {
        self.total_shares() * price
    }

    /// A new collection with `lot` added.
    #[must_use]
    pub fn with_lot(&self, lot: SecurityLot) -> Self {
        let mut lots = self.lots.to_vec();
        let at = lots.partition_point(|existing| existing < &lot);
        lots.insert(at, lot);
        Self::from_sorted(lots)
    }

    /// Remove shares from the oldest lots first.
    pub fn remove_fifo_shares(
        &self,
        ids: &LotIdGenerator,
        date: NaiveDate,
        shares: Decimal,
    ) -> Result<Self, LotError> {
        self.remove_ordered(ids, date, shares, false)
    }

    /// Remove shares from the newest lots first.
    pub fn remove_lifo_shares(
        &self,
        ids: &LotIdGenerator,
        date: NaiveDate,
        shares: Decimal,
    ) -> Result<Self, LotError> {
        self.remove_ordered(ids, date, shares, true)
    }

    /// Walk the lots in order (or reverse order), consuming whole lots until
    /// the request is met. The single partially consumed lot, if any, is
    /// replaced by what survives of it.
    fn remove_ordered(
        &self,
        ids: &LotIdGenerator,
        date: NaiveDate,
        shares: Decimal,
        reverse: bool,
    ) -> Result<Self, LotError> {
        if shares <= Decimal::ZERO {
            return Err(LotError::NonPositiveShares { shares });
        }

        let mut indices: Vec<usize> = (0..self.lots.len()).collect();
        if reverse {
            indices.reverse();
        }

        let mut remaining = shares;
        let mut consumed = vec![false; self.lots.len()];
        let mut partial: Option<(usize, Option<SecurityLot>)> = None;

        for idx in indices {
            if remaining.is_zero() {
                break;
            }

            let lot = &self.lots[idx];
            if lot.shares() <= remaining {
                tracing::trace!(lot = %lot.lot_id(), shares = %lot.shares(), "lot consumed");
                remaining -= lot.shares();
                consumed[idx] = true;
            } else {
                tracing::trace!(lot = %lot.lot_id(), shares = %remaining, "lot reduced");
                partial = Some((idx, lot.remove_shares(ids, date, remaining)?));
                remaining = Decimal::ZERO;
            }
        }

        if !remaining.is_zero() {
            return Err(LotError::InsufficientShares {
                requested: shares,
                available: self.total_shares(),
            });
        }

        let mut lots = Vec::with_capacity(self.lots.len());
        for (idx, lot) in self.lots.iter().enumerate() {
            if consumed[idx] {
                continue;
            }
            match &partial {
                Some((partial_idx, survivor)) if *partial_idx == idx => {
                    lots.extend(survivor.iter().copied());
                }
                _ => lots.push(*lot),
            }
        }

        Ok(Self::from_unsorted(lots))
    }

    /// Remove caller-chosen shares from caller-named lots.
    ///
    /// Several requests may name the same lot; they are added together.
    /// Fails if a named lot is not a member of this collection, or if the
    /// total requested from a lot exceeds its shares.
    pub fn remove_lot_shares(
        &self,
        ids: &LotIdGenerator,
        date: NaiveDate,
        lot_shares: &[LotShares],
    ) -> Result<Self, LotError> {
        let mut requested: BTreeMap<LotId, Decimal> = BTreeMap::new();
        for request in lot_shares {
            if request.shares <= Decimal::ZERO {
                return Err(LotError::NonPositiveShares {
                    shares: request.shares,
                });
            }
            *requested.entry(request.lot_id).or_default() += request.shares;
        }

        if let Some(&lot_id) = requested.keys().find(|id| self.get(**id).is_none()) {
            return Err(LotError::UnknownLot { lot_id });
        }

        let mut lots = Vec::with_capacity(self.lots.len());
        for lot in self {
            let Some(&shares) = requested.get(&lot.lot_id()) else {
                lots.push(*lot);
                continue;
            };
            let survivor = lot
                .remove_shares(ids, date, shares)
                .map_err(|err| match err {
                    LotError::InsufficientShares {
                        requested,
                        available,
                    } => LotError::LotOverdrawn {
                        lot_id: lot.lot_id(),
                        requested,
                        available,
                    },
                    other => other,
                })?;
            lots.extend(survivor);
        }

        Ok(Self::from_unsorted(lots))
    }

    /// Rescale every lot by `shares_out / shares_in` (splits and mergers).
    ///
    /// An identity ratio returns this same snapshot.
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
            return Ok(self.clone());
        }

        let lots = self
            .lots
            .iter()
            .map(|lot| lot.scale_shares(ids, date, shares_in, shares_out))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self::from_unsorted(lots))
    }

    /// Credit `amount` new shares across the lots, pro rata to each lot's
    /// share count.
    ///
    /// Each lot's addition is rounded half-up to two decimal places on its
    /// own; the additions are not corrected to sum exactly to `amount`. Cost
    /// bases are unchanged. Every resulting lot gets a fresh identity.
    pub fn distribute_cash(
        &self,
        ids: &LotIdGenerator,
        date: NaiveDate,
        amount: Decimal,
    ) -> Result<Self, LotError> {
        if amount <= Decimal::ZERO {
            return Err(LotError::NonPositiveShares { shares: amount });
        }
        if self.is_empty() {
            return Ok(self.clone());
        }

        let total = self.total_shares();
        let lots = self
            .lots
            .iter()
            .map(|lot| {
                let addition = round_half_up(amount * lot.shares() / total, DISTRIBUTION_SCALE);
                lot.add_shares(ids, date, addition)
            })
            .collect();

        Ok(Self::from_unsorted(lots))
    }
}

impl Serialize for SecurityLots {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.lots.iter())
    }
}

impl PartialEq for SecurityLots {
    fn eq(&self, other: &Self) -> bool {
        self.lots == other.lots
    }
}

impl Eq for SecurityLots {}

impl fmt::Debug for SecurityLots {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.lots.iter()).finish()
    }
}

impl fmt::Display for SecurityLots {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} shares @ {} in {} lots",
            self.total_shares(),
            self.total_cost_basis(),
            self.len()
        )
    }
}

impl FromIterator<SecurityLot> for SecurityLots {
    fn from_iter<I: IntoIterator<Item = SecurityLot>>(iter: I) -> Self {
        Self::from_unsorted(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a SecurityLots {
    type Item = &'a SecurityLot;
    type IntoIter = std::slice::Iter<'a, SecurityLot>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
