use crate::domain::entities::chain::ChainSnapshot;
use crate::domain::error::DomainError;
use async_trait::async_trait;

/// Source of spot and option-chain data for the tracked underlying.
///
/// Both calls are all-or-nothing: an error aborts the scan.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Provider name for logging.
    fn name(&self) -> &str;

    async fn get_spot(&self) -> Result<f64, DomainError>;

    /// Near-expiry chain rows plus the listed expiries.
    async fn get_chain_snapshot(&self) -> Result<ChainSnapshot, DomainError>;
}
