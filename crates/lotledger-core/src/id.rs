//! Lot identities.
//!
//! Every [`SecurityLot`](crate::SecurityLot) carries a [`LotId`] allocated from
//! a [`LotIdGenerator`]. Identities are unique among the lots produced by one
//! generator; nothing stronger is promised. The generator is passed explicitly
//! to every operation that creates lots, so tests can start from a known seed.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

/// Identity of a single lot.
///
/// Ordering is numeric, so lots allocated later sort after lots allocated
/// earlier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LotId(u64);

impl LotId {
    /// Wrap a raw identity.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw numeric identity.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for LotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{}", self.0)
    }
}

impl FromStr for LotId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix('L').unwrap_or(s);
        digits
            .parse::<u64>()
            .map(Self)
            .map_err(|_| format!("invalid lot id: {s}"))
    }
}

/// Monotonic allocator of [`LotId`]s.
///
/// Safe to share between threads; allocation is a single atomic increment.
#[derive(Debug)]
pub struct LotIdGenerator {
    next: AtomicU64,
}

static GLOBAL: LotIdGenerator = LotIdGenerator::starting_at(1);

impl LotIdGenerator {
    /// Create a generator whose first identity is `L1`.
    #[must_use]
    pub const fn new() -> Self {
        Self::starting_at(1)
    }

    /// Create a generator whose first identity is `first`.
    #[must_use]
    pub const fn starting_at(first: u64) -> Self {
        Self {
            next: AtomicU64::new(first),
        }
    }

    /// The process-wide generator, for callers that have no reason to own one.
    #[must_use]
    pub fn global() -> &'static Self {
        &GLOBAL
    }

    /// Allocate the next identity.
    pub fn next_id(&self) -> LotId {
        LotId(self.next.fetch_add(1, Ordering::Relaxed))
    }

    /// The identity the next call to [`next_id`](Self::next_id) will return.
    #[must_use]
    pub fn peek(&self) -> LotId {
        LotId(self.next.load(Ordering::Relaxed))
    }
}

impl Default for LotIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}
