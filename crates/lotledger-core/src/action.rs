//! Recorded changes to a holding.
//!
//! A [`SecurityLotAction`] is data describing one change to a
//! [`SecurityLots`]: "add this lot", "sell 10 shares FIFO", "split 1:2".
//! Applying it is a pure function from the previous holding to the next,
//! so a timeline can keep the action next to the snapshot it produced.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;

use crate::{LotError, LotIdGenerator, LotShares, SecurityLot, SecurityLots};

/// One change to the lots of a security.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum SecurityLotAction {
    /// Add a newly acquired lot.
    AddLot {
        /// The lot to add.
        lot: SecurityLot,
    },
    /// Remove shares from the oldest lots first.
    SellFifoShares {
        /// Date of the disposal.
        date: NaiveDate,
        /// Shares removed.
        shares: Decimal,
    },
    /// Remove shares from the newest lots first.
    SellLifoShares {
        /// Date of the disposal.
        date: NaiveDate,
        /// Shares removed.
        shares: Decimal,
    },
    /// Remove shares from named lots.
    SellSpecificLots {
        /// Date of the disposal.
        date: NaiveDate,
        /// Shares removed per lot.
        lots: Vec<LotShares>,
    },
    /// Rescale every lot by `shares_out / shares_in`.
    ScaleShares {
        /// Date of the split or merger.
        date: NaiveDate,
        /// Shares given up.
        shares_in: Decimal,
        /// Shares received.
        shares_out: Decimal,
    },
    /// Credit new shares pro rata to existing lots.
    DistributeCash {
        /// Date of the distribution.
        date: NaiveDate,
        /// Total shares credited.
        amount: Decimal,
    },
}

impl SecurityLotAction {
    /// Apply this action to `lots`, producing the next holding.
    pub fn apply(
        &self,
        ids: &LotIdGenerator,
        lots: &SecurityLots,
    ) -> Result<SecurityLots, LotError> {
        match self {
            Self::AddLot { lot } => Ok(lots.with_lot(*lot)),
            Self::SellFifoShares { date, shares } => lots.remove_fifo_shares(ids, *date, *shares),
            Self::SellLifoShares { date, shares } => lots.remove_lifo_shares(ids, *date, *shares),
            Self::SellSpecificLots { date, lots: picks } => {
                lots.remove_lot_shares(ids, *date, picks)
            }
            Self::ScaleShares {
                date,
                shares_in,
                shares_out,
            } => lots.scale_shares(ids, *date, *shares_in, *shares_out),
            Self::DistributeCash { date, amount } => lots.distribute_cash(ids, *date, *amount),
        }
    }

    /// The date the action takes effect.
    #[must_use]
    pub const fn date(&self) -> NaiveDate {
        match self {
            Self::AddLot { lot } => lot.date(),
            Self::SellFifoShares { date, .. }
            | Self::SellLifoShares { date, .. }
            | Self::SellSpecificLots { date, .. }
            | Self::ScaleShares { date, .. }
            | Self::DistributeCash { date, .. } => *date,
        }
    }

    /// Whether the action adds a new lot. Only such an action can start a
    /// holding.
    #[must_use]
    pub const fn is_acquisition(&self) -> bool {
        matches!(self, Self::AddLot { .. })
    }

    /// Whether the action removes shares.
    #[must_use]
    pub const fn is_disposal(&self) -> bool {
        matches!(
            self,
            Self::SellFifoShares { .. } | Self::SellLifoShares { .. } | Self::SellSpecificLots { .. }
        )
    }
}

impl fmt::Display for SecurityLotAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AddLot { lot } => write!(f, "add {lot}"),
            Self::SellFifoShares { shares, .. } => write!(f, "sell {shares} FIFO"),
            Self::SellLifoShares { shares, .. } => write!(f, "sell {shares} LIFO"),
            Self::SellSpecificLots { lots, .. } => {
                write!(f, "sell")?;
                for (i, pick) in lots.iter().enumerate() {
                    let sep = if i == 0 { " " } else { ", " };
                    write!(f, "{sep}{} from {}", pick.shares, pick.lot_id)?;
                }
                Ok(())
            }
            Self::ScaleShares {
                shares_in,
                shares_out,
                ..
            } => write!(f, "scale {shares_in}:{shares_out}"),
            Self::DistributeCash { amount, .. } => write!(f, "distribute {amount}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn holding(ids: &LotIdGenerator) -> SecurityLots {
        let first = SecurityLot::acquired(ids, date(2024, 1, 1), dec!(10), dec!(100)).unwrap();
        let second = SecurityLot::acquired(ids, date(2024, 2, 1), dec!(10), dec!(200)).unwrap();
        SecurityLots::new().with_lot(first).with_lot(second)
    }

    #[test]
    fn test_add_lot_on_empty() {
        let ids = LotIdGenerator::new();
        let lot = SecurityLot::acquired(&ids, date(2024, 1, 1), dec!(10), dec!(1000)).unwrap();
        let action = SecurityLotAction::AddLot { lot };

        let lots = action.apply(&ids, &SecurityLots::new()).unwrap();
        assert_eq!(lots.total_shares(), dec!(10));
        assert_eq!(lots.total_cost_basis(), dec!(1000));
        assert!(action.is_acquisition());
        assert_eq!(action.date(), date(2024, 1, 1));
    }

    #[test]
    fn test_fifo_and_lifo_variants() {
        let ids = LotIdGenerator::new();
        let lots = holding(&ids);

        let fifo = SecurityLotAction::SellFifoShares {
            date: date(2024, 3, 1),
            shares: dec!(5),
        };
        let lifo = SecurityLotAction::SellLifoShares {
            date: date(2024, 3, 1),
            shares: dec!(5),
        };

        assert_eq!(fifo.apply(&ids, &lots).unwrap().total_cost_basis(), dec!(250));
        assert_eq!(lifo.apply(&ids, &lots).unwrap().total_cost_basis(), dec!(200));
        assert!(fifo.is_disposal() && lifo.is_disposal());
    }

    #[test]
    fn test_specific_lot_variant() {
        let ids = LotIdGenerator::new();
        let lots = holding(&ids);
        let second = lots.lots()[1].lot_id();

        let action = SecurityLotAction::SellSpecificLots {
            date: date(2024, 3, 1),
            lots: vec![LotShares::new(second, dec!(10))],
        };
        let after = action.apply(&ids, &lots).unwrap();
        assert_eq!(after.len(), 1);
        assert_eq!(after.total_cost_basis(), dec!(100));
    }

    #[test]
    fn test_scale_and_distribute_variants() {
        let ids = LotIdGenerator::new();
        let lots = holding(&ids);

        let split = SecurityLotAction::ScaleShares {
            date: date(2024, 3, 1),
            shares_in: dec!(1),
            shares_out: dec!(2),
        };
        assert_eq!(split.apply(&ids, &lots).unwrap().total_shares(), dec!(40));

        let credit = SecurityLotAction::DistributeCash {
            date: date(2024, 3, 1),
            amount: dec!(2),
        };
        let after = credit.apply(&ids, &lots).unwrap();
        assert_eq!(after.total_shares(), dec!(22));
        assert_eq!(after.total_cost_basis(), dec!(300));
        assert!(!credit.is_acquisition());
    }

    #[test]
    fn test_failed_action_leaves_input_intact() {
        let ids = LotIdGenerator::new();
        let lots = holding(&ids);
        let action = SecurityLotAction::SellFifoShares {
            date: date(2024, 3, 1),
            shares: dec!(21),
        };
        assert!(action.apply(&ids, &lots).is_err());
        assert_eq!(lots.total_shares(), dec!(20));
    }

    #[test]
    fn test_display() {
        let action = SecurityLotAction::ScaleShares {
            date: date(2024, 3, 1),
            shares_in: dec!(1),
            shares_out: dec!(4),
        };
        assert_eq!(action.to_string(), "scale 1:4");
        let sell = SecurityLotAction::SellSpecificLots {
            date: date(2024, 3, 1),
            lots: vec![
                LotShares::new(crate::LotId::new(3), dec!(2)),
                LotShares::new(crate::LotId::new(5), dec!(1)),
            ],
        };
        assert_eq!(sell.to_string(), "sell 2 from L3, 1 from L5");
    }
}
