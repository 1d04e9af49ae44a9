use crate::domain::entities::signal::Signal;
use crate::domain::error::DomainError;
use chrono::NaiveDate;

#[derive(Debug, Clone, Default)]
pub struct SignalFilter {
    pub limit: Option<usize>,
    pub trading_date: Option<NaiveDate>,
    pub sent_only: bool,
}

/// Append-only log of scored signals, for offline calibration.
pub trait SignalRepository: Send + Sync {
    fn record(&self, signal: &Signal) -> Result<(), DomainError>;
    fn list(&self, filter: &SignalFilter) -> Result<Vec<Signal>, DomainError>;
}
