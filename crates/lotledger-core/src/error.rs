//! Errors raised by lot transformations.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::LotId;

/// Error that can occur while transforming lots.
///
/// All of these are data-integrity failures detected synchronously; the
/// receiver of the failed operation is still valid and unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LotError {
    /// More shares were requested than the lots hold.
    #[error("insufficient shares: requested {requested}, available {available}")]
    InsufficientShares {
        /// Shares requested.
        requested: Decimal,
        /// Shares available.
        available: Decimal,
    },

    /// More shares were requested from a named lot than it holds.
    #[error("lot {lot_id} holds {available} shares, cannot remove {requested}")]
    LotOverdrawn {
        /// The lot being reduced.
        lot_id: LotId,
        /// Total shares requested from the lot.
        requested: Decimal,
        /// Shares the lot holds.
        available: Decimal,
    },

    /// A specific-lot removal named a lot that is not in the collection.
    #[error("lot {lot_id} is not part of this holding")]
    UnknownLot {
        /// The lot that could not be matched.
        lot_id: LotId,
    },

    /// A share quantity that must be positive was zero or negative.
    #[error("share quantity must be positive, got {shares}")]
    NonPositiveShares {
        /// The offending quantity.
        shares: Decimal,
    },

    /// A scaling ratio with a zero or negative side.
    #[error("invalid share ratio {shares_in}:{shares_out}")]
    InvalidRatio {
        /// Shares given up.
        shares_in: Decimal,
        /// Shares received.
        shares_out: Decimal,
    },
}
