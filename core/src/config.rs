//! # Storefront Configuration & Constants
//!
//! Every magic number in ordmint lives here. The simulator delays, the paging
//! defaults and the transaction id shape are all part of the contract the
//! browser client was written against, so change them with care.

use std::time::Duration;

// ---------------------------------------------------------------------------
// Transaction Simulation
// ---------------------------------------------------------------------------

/// Time a freshly minted transaction spends in `pending` before the simulator
/// moves it to `processing`.
pub const PROCESSING_DELAY: Duration = Duration::from_millis(2_000);

/// Time spent in `processing` before the simulator marks it `completed`.
pub const COMPLETION_DELAY: Duration = Duration::from_millis(5_000);

// ---------------------------------------------------------------------------
// Transaction Identifiers
// ---------------------------------------------------------------------------

/// Prefix of every generated transaction id.
pub const TX_ID_PREFIX: &str = "tx_";

/// Number of random base-36 characters at the end of a transaction id.
pub const TX_ID_SUFFIX_LEN: usize = 8;

/// Alphabet for the random suffix. Lowercase, same as JavaScript's
/// `Number.prototype.toString(36)`.
pub const BASE36_ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

// ---------------------------------------------------------------------------
// Pagination
// ---------------------------------------------------------------------------

/// Page used when the query omits `page` or sends garbage.
pub const DEFAULT_PAGE: usize = 1;

/// Page size used when the query omits `limit` or sends garbage.
pub const DEFAULT_PAGE_LIMIT: usize = 10;

// ---------------------------------------------------------------------------
// Seed Catalog
// ---------------------------------------------------------------------------

/// Collection loaded at startup.
pub const SEED_COLLECTION: &str = "Pixel Foxes";

/// Mint fee for every seed collectible, in satoshis.
pub const SEED_MINT_FEE: u64 = 10_000;

// ---------------------------------------------------------------------------
// SimulatorConfig
// ---------------------------------------------------------------------------

/// Timing knobs for [`crate::simulator::TransactionSimulator`].
///
/// Defaults match [`PROCESSING_DELAY`] and [`COMPLETION_DELAY`]. Tests and
/// local demos shrink them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulatorConfig {
    /// Delay before `pending -> processing`.
    pub processing_delay: Duration,
    /// Further delay before `processing -> completed`.
    pub completion_delay: Duration,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            processing_delay: PROCESSING_DELAY,
            completion_delay: COMPLETION_DELAY,
        }
    }
}

impl SimulatorConfig {
    /// Build a config from millisecond values, as they arrive from the CLI.
    pub fn from_millis(processing_ms: u64, completion_ms: u64) -> Self {
        Self {
            processing_delay: Duration::from_millis(processing_ms),
            completion_delay: Duration::from_millis(completion_ms),
        }
    }

    /// Total time from mint to `completed`.
    pub fn total(&self) -> Duration {
        self.processing_delay + self.completion_delay
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_delays_sum_to_seven_seconds() {
        let cfg = SimulatorConfig::default();
        assert_eq!(cfg.processing_delay, Duration::from_secs(2));
        assert_eq!(cfg.total(), Duration::from_secs(7));
    }

    #[test]
    fn from_millis_matches_default() {
        assert_eq!(
            SimulatorConfig::from_millis(2_000, 5_000),
            SimulatorConfig::default()
        );
    }
}
