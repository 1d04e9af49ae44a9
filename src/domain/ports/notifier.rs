use crate::domain::error::DomainError;
use async_trait::async_trait;

/// Outbound text delivery. Callers log failures and carry on.
#[async_trait]
pub trait Notifier: Send + Sync {
    fn name(&self) -> &str;

    async fn notify(&self, text: &str) -> Result<(), DomainError>;
}
