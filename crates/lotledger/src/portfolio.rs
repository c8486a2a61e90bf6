//! Portfolio files.
//!
//! A portfolio file is JSON holding replay options, a price history and the
//! transactions of each security:
//!
//! ```json
//! {
//!   "options": { "disposal": "FIFO", "strict_prices": false },
//!   "prices": [
//!     { "security": "ACME", "date": "2024-01-02", "price": "101.25", "currency": "USD" }
//!   ],
//!   "securities": [
//!     {
//!       "symbol": "ACME",
//!       "currency": "USD",
//!       "transactions": [
//!         { "kind": "buy", "date": "2024-01-02", "quantity": "10", "amount": "1012.50" }
//!       ]
//!     }
//!   ]
//! }
//! ```
//!
//! # Lot identities
//!
//! Every security draws lot ids from the one generator passed to
//! [`PortfolioFile::build_trackers`]. Securities are replayed in file order,
//! each in date order, so with a fresh generator the first lot of the file is
//! `1` and a later security's ids continue after those of the securities
//! before it. A sale naming specific lots (`"lots": [{ "lot_id": 3, ... }]`)
//! must use ids numbered that way; adding a lot-creating transaction to an
//! earlier security shifts them.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use lotledger_core::LotIdGenerator;
use lotledger_tracker::{
    InvestmentTransaction, PriceDatabase, SecurityTransactionTracker, TrackerConfig,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::path::Path;

fn default_currency() -> String {
    "USD".to_string()
}

/// One historical price.
#[derive(Debug, Clone, Deserialize)]
pub struct PriceRecord {
    /// Security priced.
    pub security: String,
    /// Date of the price.
    pub date: NaiveDate,
    /// Price of one share.
    pub price: Decimal,
    /// Quote currency.
    #[serde(default = "default_currency")]
    pub currency: String,
}

/// The transactions of one security.
#[derive(Debug, Clone, Deserialize)]
pub struct SecurityRecord {
    /// Ticker or other identifier.
    pub symbol: String,
    /// Currency the security is priced in.
    #[serde(default = "default_currency")]
    pub currency: String,
    /// Transactions, in any order.
    #[serde(default)]
    pub transactions: Vec<InvestmentTransaction>,
}

/// A parsed portfolio file.
#[derive(Debug, Clone, Deserialize)]
pub struct PortfolioFile {
    /// Replay options.
    #[serde(default)]
    pub options: TrackerConfig,
    /// Price history.
    #[serde(default)]
    pub prices: Vec<PriceRecord>,
    /// Securities and their transactions.
    #[serde(default)]
    pub securities: Vec<SecurityRecord>,
}

impl PortfolioFile {
    /// Parse a portfolio from JSON text.
    pub fn from_json(source: &str) -> Result<Self> {
        serde_json::from_str(source).context("invalid portfolio file")
    }

    /// Read and parse a portfolio file.
    pub fn load(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_json(&source).with_context(|| format!("in {}", path.display()))
    }

    /// Collect the price history into a database.
    #[must_use]
    pub fn price_database(&self) -> PriceDatabase {
        let mut db = PriceDatabase::new();
        for record in &self.prices {
            db.add_price(
                record.security.clone(),
                record.date,
                record.price,
                record.currency.clone(),
            );
        }
        db
    }

    /// Replay every security into its own tracker, in file order.
    pub fn build_trackers<'a>(
        &self,
        ids: &'a LotIdGenerator,
        config: TrackerConfig,
        prices: &PriceDatabase,
    ) -> Result<Vec<SecurityTransactionTracker<'a>>> {
        self.securities
            .iter()
            .map(|security| {
                tracing::debug!(
                    security = %security.symbol,
                    transactions = security.transactions.len(),
                    "replaying"
                );
                SecurityTransactionTracker::replay(
                    security.symbol.clone(),
                    security.currency.clone(),
                    ids,
                    config,
                    &security.transactions,
                    prices,
                )
                .with_context(|| format!("failed to replay {}", security.symbol))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lotledger_tracker::DisposalMethod;
    use rust_decimal_macros::dec;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    const SAMPLE: &str = r#"{
        "options": { "disposal": "LIFO" },
        "prices": [
            { "security": "ACME", "date": "2024-01-02", "price": "100" },
            { "security": "ACME", "date": "2024-03-01", "price": "120", "currency": "USD" }
        ],
        "securities": [
            {
                "symbol": "ACME",
                "transactions": [
                    { "kind": "sell", "date": "2024-03-01", "quantity": "5", "amount": "600" },
                    { "kind": "buy", "date": "2024-01-02", "quantity": "10", "amount": "1000" },
                    { "kind": "buy", "date": "2024-02-01", "quantity": "10", "amount": "1100" }
                ]
            },
            { "symbol": "EMPTY", "currency": "EUR" }
        ]
    }"#;

    #[test]
    fn test_parse_sample() {
        let portfolio = PortfolioFile::from_json(SAMPLE).unwrap();
        assert_eq!(portfolio.options.disposal, DisposalMethod::Lifo);
        assert_eq!(portfolio.prices[0].currency, "USD");
        assert_eq!(portfolio.securities.len(), 2);
        assert_eq!(portfolio.securities[1].currency, "EUR");
        assert!(portfolio.securities[1].transactions.is_empty());
    }

    #[test]
    fn test_build_trackers() {
        let portfolio = PortfolioFile::from_json(SAMPLE).unwrap();
        let prices = portfolio.price_database();
        let ids = LotIdGenerator::new();
        let trackers = portfolio
            .build_trackers(&ids, portfolio.options, &prices)
            .unwrap();

        assert_eq!(trackers.len(), 2);
        let acme = &trackers[0];
        // LIFO: five of the 110-per-share lot sold
        assert_eq!(acme.shares_at(date(2024, 3, 1)), dec!(15));
        assert_eq!(acme.cost_basis_at(date(2024, 3, 1)), dec!(1550));
        assert_eq!(acme.realized_gain_at(date(2024, 3, 1)), dec!(50));
        assert!(trackers[1].is_empty());
    }

    #[test]
    fn test_replay_failure_names_security() {
        let portfolio = PortfolioFile::from_json(
            r#"{ "securities": [ { "symbol": "BAD", "transactions": [
                { "kind": "sell", "date": "2024-01-02", "quantity": "1", "amount": "1" }
            ] } ] }"#,
        )
        .unwrap();
        let ids = LotIdGenerator::new();
        let err = portfolio
            .build_trackers(&ids, portfolio.options, &portfolio.price_database())
            .unwrap_err();
        assert!(format!("{err:#}").starts_with("failed to replay BAD"));
    }

    #[test]
    fn test_lot_ids_continue_across_securities() {
        // ACME takes ids 1 and 2; the split gives GLOBEX's lot id 4
        let portfolio = PortfolioFile::from_json(
            r#"{ "securities": [
                { "symbol": "ACME", "transactions": [
                    { "kind": "buy", "date": "2024-01-02", "quantity": "10", "amount": "1000" },
                    { "kind": "buy", "date": "2024-01-03", "quantity": "10", "amount": "1000" }
                ] },
                { "symbol": "GLOBEX", "transactions": [
                    { "kind": "buy", "date": "2024-01-02", "quantity": "10", "amount": "500" },
                    { "kind": "split", "date": "2024-02-01",
                      "ratio": { "shares_in": "1", "shares_out": "2" } },
                    { "kind": "sell", "date": "2024-03-01", "quantity": "5", "amount": "400",
                      "lots": [ { "lot_id": 4, "shares": "5" } ] }
                ] }
            ] }"#,
        )
        .unwrap();
        let ids = LotIdGenerator::new();
        let trackers = portfolio
            .build_trackers(&ids, portfolio.options, &portfolio.price_database())
            .unwrap();

        let globex = &trackers[1];
        assert_eq!(globex.shares_at(date(2024, 3, 1)), dec!(15));
        assert_eq!(globex.realized_gain_at(date(2024, 3, 1)), dec!(275));
    }

    #[test]
    fn test_invalid_json() {
        assert!(PortfolioFile::from_json("{ not json").is_err());
    }
}
