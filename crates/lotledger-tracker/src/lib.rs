//! Dated lot timelines for investment securities.
//!
//! This crate replays the investment transactions of one security into a
//! timeline of [`SecurityLots`](lotledger_core::SecurityLots) snapshots and
//! answers point-in-time questions about it:
//!
//! - [`InvestmentTransaction`] - One buy, sell, split, distribution, ...
//! - [`SecurityTransactionTracker`] - The replayed timeline of one security
//! - [`DateEntry`] - One dated snapshot in that timeline
//! - [`PriceSource`] / [`PriceDatabase`] - Market price lookup
//! - [`DateOffset`] - "N days/weeks/months/years before" a reference date
//!
//! # Example
//!
//! ```
//! use lotledger_core::LotIdGenerator;
//! use lotledger_tracker::{InvestmentTransaction, PriceDatabase, SecurityTransactionTracker};
//! use rust_decimal_macros::dec;
//! use chrono::NaiveDate;
//!
//! let ids = LotIdGenerator::new();
//! let jan = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
//! let mar = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
//!
//! let mut prices = PriceDatabase::new();
//! prices.add_price("ACME", jan, dec!(100), "USD");
//!
//! let mut tracker = SecurityTransactionTracker::new("ACME", "USD", &ids);
//! tracker
//!     .record_transaction(&InvestmentTransaction::buy(jan, dec!(10), dec!(1000)), &prices)
//!     .unwrap();
//!
//! let entry = tracker.date_entry(mar).unwrap();
//! assert_eq!(entry.total_shares(), dec!(10));
//! assert_eq!(entry.cost_basis(), dec!(1000));
//! assert_eq!(entry.market_value(), Some(dec!(1000)));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod period;
mod price;
mod tracker;
mod transaction;

pub use config::{DisposalMethod, TrackerConfig};
pub use error::TrackerError;
pub use period::DateOffset;
pub use price::{PriceDatabase, PriceEntry, PriceSource};
pub use tracker::{DateEntry, PeriodChange, SecurityTransactionTracker};
pub use transaction::{InvestmentTransaction, ShareRatio, TransactionKind};
