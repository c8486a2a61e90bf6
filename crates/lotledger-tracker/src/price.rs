//! Market price lookup.
//!
//! The tracker asks a [`PriceSource`] for the price of a security on a date.
//! [`PriceDatabase`] is an in-memory source holding historical prices.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::HashMap;

/// Something that can price a security on a date.
pub trait PriceSource {
    /// The price of one share of `security`, quoted in `currency`, on or
    /// before `date`.
    fn price(&self, security: &str, currency: &str, date: NaiveDate) -> Option<Decimal>;
}

impl<F> PriceSource for F
where
    F: Fn(&str, &str, NaiveDate) -> Option<Decimal>,
{
    fn price(&self, security: &str, currency: &str, date: NaiveDate) -> Option<Decimal> {
        self(security, currency, date)
    }
}

/// A price entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceEntry {
    /// Date of the price.
    pub date: NaiveDate,
    /// Price amount.
    pub price: Decimal,
    /// Quote currency.
    pub currency: String,
}

/// Database of security prices.
///
/// Each security maps to a list of price entries kept sorted by date.
#[derive(Debug, Default, Clone)]
pub struct PriceDatabase {
    prices: HashMap<String, Vec<PriceEntry>>,
}

impl PriceDatabase {
    /// Create a new empty price database.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a price. A later price for the same date and currency replaces
    /// the earlier one.
    pub fn add_price(
        &mut self,
        security: impl Into<String>,
        date: NaiveDate,
        price: Decimal,
        currency: impl Into<String>,
    ) {
        let currency = currency.into();
        let entries = self.prices.entry(security.into()).or_default();
        let at = entries.partition_point(|e| e.date <= date);
        if let Some(existing) = entries[..at]
            .iter_mut()
            .rev()
            .take_while(|e| e.date == date)
            .find(|e| e.currency == currency)
        {
            existing.price = price;
            return;
        }
        entries.insert(
            at,
            PriceEntry {
                date,
                price,
                currency,
            },
        );
    }

    /// Get the price of a security on or before a given date.
    #[must_use]
    pub fn get_price(&self, security: &str, currency: &str, date: NaiveDate) -> Option<Decimal> {
        self.prices
            .get(security)?
            .iter()
            .rev()
            .find(|e| e.date <= date && e.currency == currency)
            .map(|e| e.price)
    }

    /// Get the most recent price of a security.
    #[must_use]
    pub fn get_latest_price(&self, security: &str, currency: &str) -> Option<Decimal> {
        self.prices
            .get(security)?
            .iter()
            .rev()
            .find(|e| e.currency == currency)
            .map(|e| e.price)
    }

    /// All price entries of a security, oldest first.
    #[must_use]
    pub fn entries(&self, security: &str) -> &[PriceEntry] {
        self.prices.get(security).map_or(&[], Vec::as_slice)
    }

    /// Number of securities with prices.
    #[must_use]
    pub fn len(&self) -> usize {
        self.prices.len()
    }

    /// Check if there are no prices at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}

impl PriceSource for PriceDatabase {
    fn price(&self, security: &str, currency: &str, date: NaiveDate) -> Option<Decimal> {
        self.get_price(security, currency, date)
    }
}
