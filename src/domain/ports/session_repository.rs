use crate::domain::entities::session_state::SessionState;
use crate::domain::error::DomainError;

/// Durable storage for the single current session record.
pub trait SessionRepository: Send + Sync {
    /// `Ok(None)` when nothing usable is stored.
    fn load(&self) -> Result<Option<SessionState>, DomainError>;
    fn save(&self, session: &SessionState) -> Result<(), DomainError>;
    fn clear(&self) -> Result<(), DomainError>;
}
