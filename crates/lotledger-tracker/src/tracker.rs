//! The dated lot timeline of one security.
//!
//! A [`SecurityTransactionTracker`] replays the transactions of a security
//! in date order. Each transaction is turned into a [`SecurityLotAction`],
//! applied to the most recent snapshot, and the result is stored as a
//! [`DateEntry`] keyed by the transaction date. Once built, the timeline is
//! only queried: entries and their lots are immutable, so any number of
//! readers may share it.

use chrono::NaiveDate;
use lotledger_core::{LotIdGenerator, SecurityLot, SecurityLotAction, SecurityLots};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::{
    DateOffset, DisposalMethod, InvestmentTransaction, PriceSource, TrackerConfig, TrackerError,
    TransactionKind,
};

/// The state of a security's lots as of one date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DateEntry {
    date: NaiveDate,
    market_price: Option<Decimal>,
    action: Option<SecurityLotAction>,
    lots: SecurityLots,
    realized_gain: Decimal,
}

impl DateEntry {
    /// Date of the entry.
    #[must_use]
    pub const fn date(&self) -> NaiveDate {
        self.date
    }

    /// Market price of one share on the entry date, if known.
    #[must_use]
    pub const fn market_price(&self) -> Option<Decimal> {
        self.market_price
    }

    /// The action that produced this entry. `None` for an opening balance.
    #[must_use]
    pub const fn action(&self) -> Option<&SecurityLotAction> {
        self.action.as_ref()
    }

    /// The lots held after the entry.
    #[must_use]
    pub const fn lots(&self) -> &SecurityLots {
        &self.lots
    }

    /// Total shares held.
    #[must_use]
    pub fn total_shares(&self) -> Decimal {
        self.lots.total_shares()
    }

    /// Total cost basis of the shares held.
    #[must_use]
    pub fn cost_basis(&self) -> Decimal {
        self.lots.total_cost_basis()
    }

    /// Value of the holding at the entry's market price.
    #[must_use]
    pub fn market_value(&self) -> Option<Decimal> {
        self.market_price.map(|price| self.lots.market_value(price))
    }

    /// Market value minus cost basis, at the entry's market price.
    #[must_use]
    pub fn unrealized_gain(&self) -> Option<Decimal> {
        self.market_value().map(|value| value - self.cost_basis())
    }

    /// Gain realized by disposals up to and including this entry.
    #[must_use]
    pub const fn realized_gain(&self) -> Decimal {
        self.realized_gain
    }
}

/// Change in market value over a trailing period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PeriodChange {
    /// Date of the snapshot the period starts from.
    pub start_date: NaiveDate,
    /// Date the period ends on.
    pub end_date: NaiveDate,
    /// Market value at the start.
    pub start_value: Decimal,
    /// Market value at the end.
    pub end_value: Decimal,
}

impl PeriodChange {
    /// Absolute change in value.
    #[must_use]
    pub fn change(&self) -> Decimal {
        self.end_value - self.start_value
    }

    /// Change relative to the starting value, `None` when it started at zero.
    #[must_use]
    pub fn simple_return(&self) -> Option<Decimal> {
        (!self.start_value.is_zero()).then(|| self.change() / self.start_value)
    }
}

/// Timeline of lot snapshots for one security.
#[derive(Debug, Clone)]
pub struct SecurityTransactionTracker<'a> {
    security: String,
    currency: String,
    config: TrackerConfig,
    ids: &'a LotIdGenerator,
    timeline: BTreeMap<NaiveDate, DateEntry>,
}

impl<'a> SecurityTransactionTracker<'a> {
    /// Create an empty tracker for `security`, priced in `currency`, taking
    /// lot identities from `ids`.
    pub fn new(
        security: impl Into<String>,
        currency: impl Into<String>,
        ids: &'a LotIdGenerator,
    ) -> Self {
        Self {
            security: security.into(),
            currency: currency.into(),
            config: TrackerConfig::default(),
            ids,
            timeline: BTreeMap::new(),
        }
    }

    /// Create a tracker starting from an existing holding.
    ///
    /// The opening entry has no action; later transactions act on `lots`.
    pub fn with_opening(
        security: impl Into<String>,
        currency: impl Into<String>,
        ids: &'a LotIdGenerator,
        date: NaiveDate,
        lots: SecurityLots,
        market_price: Option<Decimal>,
    ) -> Self {
        let mut tracker = Self::new(security, currency, ids);
        tracker.timeline.insert(
            date,
            DateEntry {
                date,
                market_price,
                action: None,
                lots,
                realized_gain: Decimal::ZERO,
            },
        );
        tracker
    }

    /// Use `config` for subsequent transactions.
    #[must_use]
    pub const fn with_config(mut self, config: TrackerConfig) -> Self {
        self.config = config;
        self
    }

    /// Build a tracker by replaying `transactions`.
    ///
    /// Transactions are replayed in date order; those sharing a date keep
    /// their relative order.
    pub fn replay<'t>(
        security: impl Into<String>,
        currency: impl Into<String>,
        ids: &'a LotIdGenerator,
        config: TrackerConfig,
        transactions: impl IntoIterator<Item = &'t InvestmentTransaction>,
        prices: &dyn PriceSource,
    ) -> Result<Self, TrackerError> {
        let mut tracker = Self::new(security, currency, ids).with_config(config);
        let mut ordered: Vec<&InvestmentTransaction> = transactions.into_iter().collect();
        ordered.sort_by_key(|txn| txn.date);
        for txn in ordered {
            tracker.record_transaction(txn, prices)?;
        }
        tracing::debug!(
            security = %tracker.security,
            entries = tracker.timeline.len(),
            "replay complete"
        );
        Ok(tracker)
    }

    /// The tracked security.
    #[must_use]
    pub fn security(&self) -> &str {
        &self.security
    }

    /// The currency prices are quoted in.
    #[must_use]
    pub fn currency(&self) -> &str {
        &self.currency
    }

    /// The replay configuration.
    #[must_use]
    pub const fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Record one transaction.
    ///
    /// Returns the entry the transaction produced, or `None` for a
    /// transaction kind that does not change the lots (cash dividends,
    /// return of capital). On error the timeline is left unchanged, and a
    /// transaction rejected for its date, a missing acquisition or a missing
    /// price draws no lot identity. A lot action that fails part way may
    /// already have drawn identities for the lots it produced.
    ///
    /// Only a [`TransactionKind::Sell`] realizes gain; shares removed by
    /// [`TransactionKind::RemoveShares`] leave with their basis and no
    /// proceeds.
    pub fn record_transaction(
        &mut self,
        txn: &InvestmentTransaction,
        prices: &dyn PriceSource,
    ) -> Result<Option<&DateEntry>, TrackerError> {
        if !txn.kind.changes_lots() {
            tracing::debug!(
                security = %self.security,
                date = %txn.date,
                kind = %txn.kind,
                "transaction does not change lots"
            );
            return Ok(None);
        }

        if let Some(&last) = self.timeline.keys().next_back() {
            if txn.date < last {
                return Err(TrackerError::OutOfOrder {
                    security: self.security.clone(),
                    date: txn.date,
                    last,
                });
            }
        }

        let prior = self.timeline.range(..=txn.date).next_back().map(|(_, e)| e);
        if prior.is_none() && !txn.kind.is_acquisition() {
            return Err(TrackerError::MissingAcquisition {
                security: self.security.clone(),
                date: txn.date,
                kind: txn.kind,
            });
        }

        let market_price = self.market_price(txn, prices)?;
        let Some(action) = self.action_for(txn)? else {
            return Ok(None);
        };

        let empty = SecurityLots::new();
        let prior_lots = prior.map_or(&empty, |e| &e.lots);
        let prior_realized = prior.map_or(Decimal::ZERO, |e| e.realized_gain);

        let lots = action
            .apply(self.ids, prior_lots)
            .map_err(|source| TrackerError::Lot {
                date: txn.date,
                source,
            })?;

        let realized_gain = if txn.kind == TransactionKind::Sell {
            let removed_basis = prior_lots.total_cost_basis() - lots.total_cost_basis();
            prior_realized + txn.net_amount() - removed_basis
        } else {
            prior_realized
        };

        tracing::debug!(
            security = %self.security,
            date = %txn.date,
            %action,
            shares = %lots.total_shares(),
            cost_basis = %lots.total_cost_basis(),
            "applied lot action"
        );

        self.timeline.insert(
            txn.date,
            DateEntry {
                date: txn.date,
                market_price,
                action: Some(action),
                lots,
                realized_gain,
            },
        );
        Ok(self.timeline.get(&txn.date))
    }

    /// Translate a transaction into the lot action it implies.
    fn action_for(
        &self,
        txn: &InvestmentTransaction,
    ) -> Result<Option<SecurityLotAction>, TrackerError> {
        let action = match txn.kind {
            TransactionKind::Buy | TransactionKind::AddShares | TransactionKind::Reinvest => {
                let lot = SecurityLot::acquired(self.ids, txn.date, txn.quantity, txn.net_amount())
                    .map_err(|source| TrackerError::Lot {
                        date: txn.date,
                        source,
                    })?;
                SecurityLotAction::AddLot { lot }
            }
            TransactionKind::Sell | TransactionKind::RemoveShares => {
                if !txn.lots.is_empty() {
                    SecurityLotAction::SellSpecificLots {
                        date: txn.date,
                        lots: txn.lots.clone(),
                    }
                } else {
                    let shares = txn.quantity.abs();
                    match self.config.disposal {
                        DisposalMethod::Fifo => SecurityLotAction::SellFifoShares {
                            date: txn.date,
                            shares,
                        },
                        DisposalMethod::Lifo => SecurityLotAction::SellLifoShares {
                            date: txn.date,
                            shares,
                        },
                    }
                }
            }
            TransactionKind::StockDividend => SecurityLotAction::DistributeCash {
                date: txn.date,
                amount: txn.quantity,
            },
            TransactionKind::Split | TransactionKind::Merge => {
                let ratio = txn.ratio.ok_or(TrackerError::MissingRatio {
                    date: txn.date,
                    kind: txn.kind,
                })?;
                SecurityLotAction::ScaleShares {
                    date: txn.date,
                    shares_in: ratio.shares_in,
                    shares_out: ratio.shares_out,
                }
            }
            // Return of capital only lowers cost basis; no action models it.
            TransactionKind::Dividend | TransactionKind::ReturnOfCapital => return Ok(None),
        };
        Ok(Some(action))
    }

    fn market_price(
        &self,
        txn: &InvestmentTransaction,
        prices: &dyn PriceSource,
    ) -> Result<Option<Decimal>, TrackerError> {
        let price = prices
            .price(&self.security, &self.currency, txn.date)
            .or_else(|| txn.implied_price());
        if price.is_none() {
            if self.config.strict_prices {
                return Err(TrackerError::MissingPrice {
                    security: self.security.clone(),
                    currency: self.currency.clone(),
                    date: txn.date,
                });
            }
            tracing::warn!(
                security = %self.security,
                currency = %self.currency,
                date = %txn.date,
                "no market price"
            );
        }
        Ok(price)
    }

    /// The entry in effect on `date`.
    ///
    /// That is the latest entry on or before `date`. A date before the first
    /// entry yields the first entry; only an empty tracker yields `None`.
    #[must_use]
    pub fn date_entry(&self, date: NaiveDate) -> Option<&DateEntry> {
        self.timeline
            .range(..=date)
            .next_back()
            .map(|(_, entry)| entry)
            .or_else(|| self.earliest())
    }

    /// The first entry.
    #[must_use]
    pub fn earliest(&self) -> Option<&DateEntry> {
        self.timeline.values().next()
    }

    /// The most recent entry.
    #[must_use]
    pub fn latest(&self) -> Option<&DateEntry> {
        self.timeline.values().next_back()
    }

    /// All entries, oldest first.
    pub fn entries(&self) -> impl DoubleEndedIterator<Item = &DateEntry> + '_ {
        self.timeline.values()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.timeline.len()
    }

    /// Check if nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.timeline.is_empty()
    }

    /// Shares held on `date`.
    #[must_use]
    pub fn shares_at(&self, date: NaiveDate) -> Decimal {
        self.date_entry(date)
            .map_or(Decimal::ZERO, DateEntry::total_shares)
    }

    /// Cost basis held on `date`.
    #[must_use]
    pub fn cost_basis_at(&self, date: NaiveDate) -> Decimal {
        self.date_entry(date).map_or(Decimal::ZERO, DateEntry::cost_basis)
    }

    /// Realized gain up to `date`.
    #[must_use]
    pub fn realized_gain_at(&self, date: NaiveDate) -> Decimal {
        self.date_entry(date)
            .map_or(Decimal::ZERO, DateEntry::realized_gain)
    }

    /// Market value on `date`, priced from `prices` when it has a price for
    /// that date and from the entry's own price otherwise.
    #[must_use]
    pub fn market_value_at(&self, date: NaiveDate, prices: &dyn PriceSource) -> Option<Decimal> {
        let entry = self.date_entry(date)?;
        prices
            .price(&self.security, &self.currency, date)
            .or(entry.market_price)
            .map(|price| entry.lots.market_value(price))
    }

    /// Unrealized gain on `date`, priced as [`market_value_at`](Self::market_value_at).
    #[must_use]
    pub fn unrealized_gain_at(&self, date: NaiveDate, prices: &dyn PriceSource) -> Option<Decimal> {
        let cost_basis = self.date_entry(date)?.cost_basis();
        self.market_value_at(date, prices)
            .map(|value| value - cost_basis)
    }

    /// The entry in effect `offset` before `reference`.
    #[must_use]
    pub fn entry_before(&self, reference: NaiveDate, offset: DateOffset) -> Option<&DateEntry> {
        self.date_entry(offset.before(reference)?)
    }

    /// Market value change over the `offset` ending at `reference`.
    #[must_use]
    pub fn period_change(
        &self,
        reference: NaiveDate,
        offset: DateOffset,
        prices: &dyn PriceSource,
    ) -> Option<PeriodChange> {
        let start_date = offset.before(reference)?;
        Some(PeriodChange {
            start_date,
            end_date: reference,
            start_value: self.market_value_at(start_date, prices)?,
            end_value: self.market_value_at(reference, prices)?,
        })
    }
}
