//! Tax-lot reporting tools.
//!
//! This crate provides the `lotledger-report` command, which replays the
//! investment transactions in a portfolio file and reports holdings, lot
//! timelines and trailing-period performance.
//!
//! # Example Usage
//!
//! ```bash
//! lotledger-report portfolio.json holdings --as-of 2024-06-30
//! lotledger-report portfolio.json --method lifo timeline
//! lotledger-report portfolio.json performance --as-of 2024-06-30 --lookback 6m
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cmd;
pub mod portfolio;
