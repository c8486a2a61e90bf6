//! Replay configuration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which lots a disposal draws from when the transaction names none.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DisposalMethod {
    /// First In, First Out. Oldest lots are reduced first.
    #[default]
    #[serde(rename = "FIFO", alias = "fifo")]
    Fifo,
    /// Last In, First Out. Newest lots are reduced first.
    #[serde(rename = "LIFO", alias = "lifo")]
    Lifo,
}

impl FromStr for DisposalMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "FIFO" => Ok(Self::Fifo),
            "LIFO" => Ok(Self::Lifo),
            _ => Err(format!("unknown disposal method: {s}")),
        }
    }
}

impl fmt::Display for DisposalMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fifo => write!(f, "FIFO"),
            Self::Lifo => write!(f, "LIFO"),
        }
    }
}

/// Options controlling how transactions are replayed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Lot selection for disposals without named lots.
    pub disposal: DisposalMethod,
    /// Fail when no market price can be found for an entry, instead of
    /// recording the entry without one.
    pub strict_prices: bool,
}

impl TrackerConfig {
    /// Set the disposal method.
    #[must_use]
    pub const fn with_disposal(mut self, disposal: DisposalMethod) -> Self {
        self.disposal = disposal;
        self
    }

    /// Require a market price for every entry.
    #[must_use]
    pub const fn with_strict_prices(mut self) -> Self {
        self.strict_prices = true;
        self
    }
}
