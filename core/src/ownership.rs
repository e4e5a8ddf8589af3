//! Ownership checks for existing ordinals.
//!
//! Before the storefront shows a wallet's ordinal it asks an external indexer
//! whether the wallet actually holds it. That indexer is not wired up; the
//! shipped [`AcceptAllOracle`] logs the request and says yes.

use async_trait::async_trait;

/// Answers "does this wallet own this ordinal?".
#[async_trait]
pub trait OwnershipOracle: Send + Sync {
    async fn is_owner(&self, ordinal_id: &str, wallet_address: &str) -> bool;
}

/// Approves every ownership query.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAllOracle;

#[async_trait]
impl OwnershipOracle for AcceptAllOracle {
    async fn is_owner(&self, ordinal_id: &str, wallet_address: &str) -> bool {
        tracing::info!(
            ordinal_id,
            wallet = wallet_address,
            "ownership check approved without external lookup"
        );
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn accept_all_says_yes() {
        let oracle: Arc<dyn OwnershipOracle> = Arc::new(AcceptAllOracle);
        assert!(oracle.is_owner("ord1:pixel-fox-1", "anyone").await);
        assert!(oracle.is_owner("", "").await);
    }
}
