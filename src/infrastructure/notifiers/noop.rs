use crate::domain::error::DomainError;
use crate::domain::ports::notifier::Notifier;
use tracing::debug;

/// Used when no delivery channel is configured. Messages only reach the log.
pub struct NoopNotifier;

#[async_trait::async_trait]
impl Notifier for NoopNotifier {
    fn name(&self) -> &str {
        "noop"
    }

    async fn notify(&self, text: &str) -> Result<(), DomainError> {
        debug!(%text, "notification dropped, no channel configured");
        Ok(())
    }
}
