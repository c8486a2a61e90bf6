//! Investment transactions as the tracker sees them.

use chrono::NaiveDate;
use lotledger_core::LotShares;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The kind of an investment transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    /// Shares bought for cash.
    Buy,
    /// Shares transferred in.
    AddShares,
    /// Shares sold for cash.
    Sell,
    /// Shares transferred out.
    RemoveShares,
    /// A distribution used to buy new shares at a price.
    Reinvest,
    /// A cash dividend.
    Dividend,
    /// New shares credited pro rata to the existing holding.
    StockDividend,
    /// Cash returned against the cost basis.
    ReturnOfCapital,
    /// A forward or reverse stock split.
    Split,
    /// A share-for-share merger.
    Merge,
}

impl TransactionKind {
    /// Whether the transaction creates a new lot. Only these can open a
    /// holding.
    #[must_use]
    pub const fn is_acquisition(self) -> bool {
        matches!(self, Self::Buy | Self::AddShares | Self::Reinvest)
    }

    /// Whether the transaction removes shares.
    #[must_use]
    pub const fn is_disposal(self) -> bool {
        matches!(self, Self::Sell | Self::RemoveShares)
    }

    /// Whether the transaction affects the lots at all. Cash dividends and
    /// return of capital do not.
    #[must_use]
    pub const fn changes_lots(self) -> bool {
        !matches!(self, Self::Dividend | Self::ReturnOfCapital)
    }

    const fn as_str(self) -> &'static str {
        match self {
            Self::Buy => "buy",
            Self::AddShares => "add_shares",
            Self::Sell => "sell",
            Self::RemoveShares => "remove_shares",
            Self::Reinvest => "reinvest",
            Self::Dividend => "dividend",
            Self::StockDividend => "stock_dividend",
            Self::ReturnOfCapital => "return_of_capital",
            Self::Split => "split",
            Self::Merge => "merge",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "buy" => Ok(Self::Buy),
            "add_shares" => Ok(Self::AddShares),
            "sell" => Ok(Self::Sell),
            "remove_shares" => Ok(Self::RemoveShares),
            "reinvest" => Ok(Self::Reinvest),
            "dividend" => Ok(Self::Dividend),
            "stock_dividend" => Ok(Self::StockDividend),
            "return_of_capital" => Ok(Self::ReturnOfCapital),
            "split" => Ok(Self::Split),
            "merge" => Ok(Self::Merge),
            _ => Err(format!("unknown transaction kind: {s}")),
        }
    }
}

/// A share ratio for splits and mergers: `shares_in` old shares become
/// `shares_out` new ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareRatio {
    /// Shares given up.
    pub shares_in: Decimal,
    /// Shares received.
    pub shares_out: Decimal,
}

impl ShareRatio {
    /// Create a ratio.
    #[must_use]
    pub const fn new(shares_in: Decimal, shares_out: Decimal) -> Self {
        Self {
            shares_in,
            shares_out,
        }
    }
}

/// One investment transaction of a single security.
///
/// `amount` is the net cash value of the transaction: the cost of a buy,
/// the proceeds of a sale. Its sign is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvestmentTransaction {
    /// What happened.
    pub kind: TransactionKind,
    /// When it happened.
    pub date: NaiveDate,
    /// Shares involved.
    #[serde(default)]
    pub quantity: Decimal,
    /// Net cash value.
    #[serde(default)]
    pub amount: Decimal,
    /// Share ratio, for splits and mergers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ratio: Option<ShareRatio>,
    /// Lots to sell from, for specific-lot disposals.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub lots: Vec<LotShares>,
    /// Free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,
}

impl InvestmentTransaction {
    /// Create a transaction.
    #[must_use]
    pub const fn new(
        kind: TransactionKind,
        date: NaiveDate,
        quantity: Decimal,
        amount: Decimal,
    ) -> Self {
        Self {
            kind,
            date,
            quantity,
            amount,
            ratio: None,
            lots: Vec::new(),
            memo: None,
        }
    }

    /// A purchase of `quantity` shares costing `amount`.
    #[must_use]
    pub const fn buy(date: NaiveDate, quantity: Decimal, amount: Decimal) -> Self {
        Self::new(TransactionKind::Buy, date, quantity, amount)
    }

    /// A sale of `quantity` shares for `amount`.
    #[must_use]
    pub const fn sell(date: NaiveDate, quantity: Decimal, amount: Decimal) -> Self {
        Self::new(TransactionKind::Sell, date, quantity, amount)
    }

    /// A split turning `shares_in` shares into `shares_out`.
    #[must_use]
    pub const fn split(date: NaiveDate, shares_in: Decimal, shares_out: Decimal) -> Self {
        Self::new(TransactionKind::Split, date, Decimal::ZERO, Decimal::ZERO)
            .with_ratio(ShareRatio::new(shares_in, shares_out))
    }

    /// Set the share ratio.
    #[must_use]
    pub const fn with_ratio(mut self, ratio: ShareRatio) -> Self {
        self.ratio = Some(ratio);
        self
    }

    /// Name the lots a disposal draws from.
    #[must_use]
    pub fn with_lots(mut self, lots: Vec<LotShares>) -> Self {
        self.lots = lots;
        self
    }

    /// Attach a description.
    #[must_use]
    pub fn with_memo(mut self, memo: impl Into<String>) -> Self {
        self.memo = Some(memo.into());
        self
    }

    /// Magnitude of the net cash value.
    #[must_use]
    pub fn net_amount(&self) -> Decimal {
        self.amount.abs()
    }

    /// Per-share price implied by the cash value, if the transaction moved
    /// shares for cash.
    #[must_use]
    pub fn implied_price(&self) -> Option<Decimal> {
        let trades_for_cash = matches!(
            self.kind,
            TransactionKind::Buy | TransactionKind::Sell | TransactionKind::Reinvest
        );
        (trades_for_cash && !self.quantity.is_zero() && !self.amount.is_zero())
            .then(|| self.net_amount() / self.quantity.abs())
    }
}
