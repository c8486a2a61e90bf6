//! Errors raised while replaying transactions.

use chrono::NaiveDate;
use lotledger_core::LotError;
use thiserror::Error;

use crate::TransactionKind;

/// Error that can occur while recording a transaction.
///
/// A failed transaction leaves the timeline exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrackerError {
    /// The first transaction of a security did not acquire shares.
    #[error("{security}: first transaction on {date} is a {kind}, not an acquisition")]
    MissingAcquisition {
        /// The security being tracked.
        security: String,
        /// Date of the offending transaction.
        date: NaiveDate,
        /// Its kind.
        kind: TransactionKind,
    },

    /// A transaction dated before the last recorded entry.
    #[error("{security}: transaction on {date} precedes the last entry on {last}")]
    OutOfOrder {
        /// The security being tracked.
        security: String,
        /// Date of the offending transaction.
        date: NaiveDate,
        /// Date of the last recorded entry.
        last: NaiveDate,
    },

    /// A split or merger without a share ratio.
    #[error("{kind} on {date} has no share ratio")]
    MissingRatio {
        /// Date of the offending transaction.
        date: NaiveDate,
        /// Its kind.
        kind: TransactionKind,
    },

    /// No market price was available and prices are required.
    #[error("no {currency} price for {security} on {date}")]
    MissingPrice {
        /// The security being priced.
        security: String,
        /// The quote currency.
        currency: String,
        /// The date priced.
        date: NaiveDate,
    },

    /// The lot transformation itself failed.
    #[error("transaction on {date} failed")]
    Lot {
        /// Date of the offending transaction.
        date: NaiveDate,
        /// The underlying lot error.
        #[source]
        source: LotError,
    },
}
