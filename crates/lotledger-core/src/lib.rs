//! Core types for lotledger
//!
//! This crate provides the immutable tax-lot ledger used throughout the
//! lotledger project:
//!
//! - [`LotId`] / [`LotIdGenerator`] - Lot identities and their allocator
//! - [`SecurityLot`] - One tax lot: shares acquired at a cost basis
//! - [`SecurityLots`] - The full, always-sorted holding of one security
//! - [`SecurityLotAction`] - A recorded change applied to a [`SecurityLots`]
//!
//! Every transformation is pure: it returns a new value and leaves the
//! receiver untouched, so a failed operation never leaves a partial result.
//!
//! # Example
//!
//! ```
//! use lotledger_core::{LotIdGenerator, SecurityLot, SecurityLots};
//! use rust_decimal_macros::dec;
//! use chrono::NaiveDate;
//!
//! let ids = LotIdGenerator::new();
//! let jan = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
//! let feb = NaiveDate::from_ymd_opt(2024, 2, 15).unwrap();
//!
//! let lots = SecurityLots::new()
//!     .with_lot(SecurityLot::new(&ids, jan, jan, dec!(100), dec!(1000.00)).unwrap())
//!     .with_lot(SecurityLot::new(&ids, feb, feb, dec!(50), dec!(600.00)).unwrap());
//!
//! // Sell 120 shares, oldest lots first
//! let after = lots.remove_fifo_shares(&ids, feb, dec!(120)).unwrap();
//!
//! assert_eq!(after.total_shares(), dec!(30));
//! assert_eq!(after.total_cost_basis(), dec!(360.00)); // 600 * 30 / 50
//! assert_eq!(lots.total_shares(), dec!(150)); // original untouched
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod action;
pub mod error;
pub mod id;
pub mod lot;
pub mod lots;

pub use action::SecurityLotAction;
pub use error::LotError;
pub use id::{LotId, LotIdGenerator};
pub use lot::SecurityLot;
pub use lots::{LotShares, SecurityLots};

// Re-export commonly used external types
pub use chrono::NaiveDate;
pub use rust_decimal::Decimal;
