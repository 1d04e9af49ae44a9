use crate::domain::entities::session_state::{SessionState, TopSignal};
use crate::domain::entities::signal::Signal;
use crate::domain::error::DomainError;
use crate::domain::ports::session_repository::SessionRepository;
use crate::domain::ports::signal_repository::{SignalFilter, SignalRepository};
use crate::domain::values::signal_state::SignalState;
use chrono::NaiveDate;
use serde::Serialize;
use std::sync::Arc;

pub struct StatusUseCase {
    sessions: Arc<dyn SessionRepository>,
    signals: Arc<dyn SignalRepository>,
}

#[derive(Debug, Serialize)]
pub struct SessionSummary {
    pub trading_date: NaiveDate,
    pub day_open_spot: Option<f64>,
    pub startup_notified: bool,
    pub signals_sent_today: u32,
    pub watch_sent_today: u32,
    pub top_signals_today: Vec<TopSignal>,
    pub tracked_strikes: usize,
    pub watching: Vec<String>,
    pub executed: Vec<String>,
}

impl SessionSummary {
    fn from_session(session: &SessionState) -> Self {
        let keys_in = |wanted: SignalState| -> Vec<String> {
            session
                .strikes
                .iter()
                .filter(|(_, s)| s.state == wanted)
                .map(|(k, _)| k.to_string())
                .collect()
        };
        Self {
            trading_date: session.trading_date,
            day_open_spot: session.day_open_spot,
            startup_notified: session.startup_notified,
            signals_sent_today: session.signals_sent_today,
            watch_sent_today: session.watch_sent_today,
            top_signals_today: session.top_signals_today.clone(),
            tracked_strikes: session.strikes.len(),
            watching: keys_in(SignalState::Watch),
            executed: keys_in(SignalState::Executed),
        }
    }
}

impl StatusUseCase {
    pub fn new(sessions: Arc<dyn SessionRepository>, signals: Arc<dyn SignalRepository>) -> Self {
        Self { sessions, signals }
    }

    pub fn summary(&self) -> Result<Option<SessionSummary>, DomainError> {
        Ok(self.sessions.load()?.as_ref().map(SessionSummary::from_session))
    }

    pub fn signals(&self, filter: &SignalFilter) -> Result<Vec<Signal>, DomainError> {
        self.signals.list(filter)
    }

    pub fn reset(&self) -> Result<(), DomainError> {
        self.sessions.clear()
    }
}
