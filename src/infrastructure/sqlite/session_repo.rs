//! Session persistence as a single JSON row.
//!
//! Records written by older builds may lack fields. They are read into
//! [`StoredSession`], where everything is optional, and [`migrate`] turns that
//! into a complete [`SessionState`] exactly once, at load time.

use crate::domain::entities::session_state::{SessionState, TopSignal};
use crate::domain::entities::strike_state::StrikeState;
use crate::domain::error::DomainError;
use crate::domain::ports::session_repository::SessionRepository;
use crate::domain::values::signal_state::SignalState;
use crate::domain::values::strike_key::StrikeKey;
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::sync::Mutex;
use tracing::warn;

pub struct SqliteSessionRepo {
    conn: Mutex<Connection>,
}

impl SqliteSessionRepo {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct StoredSession {
    #[serde(alias = "trading_day")]
    pub trading_date: Option<NaiveDate>,
    pub day_open_spot: Option<f64>,
    #[serde(alias = "startup_alert_sent")]
    pub startup_notified: Option<bool>,
    pub signals_sent_today: Option<u32>,
    pub watch_sent_today: Option<u32>,
    pub top_signals_today: Option<Vec<TopSignal>>,
    #[serde(default, alias = "data")]
    pub strikes: BTreeMap<String, StoredStrike>,
}

#[derive(Debug, Default, Deserialize)]
pub struct StoredStrike {
    #[serde(alias = "baseline")]
    pub baseline_oi: Option<i64>,
    pub baseline_ltp: Option<f64>,
    pub baseline_volume: Option<i64>,
    pub prev_oi: Option<i64>,
    pub state: Option<SignalState>,
    pub first_exec_time: Option<DateTime<Utc>>,
    pub scan_count: Option<u32>,
    pub decline_streak: Option<u32>,
}

/// Fill defaults for fields missing from an older record.
///
/// Returns `None` when the record has no trading date; such a record cannot
/// be attributed to a day and is treated as absent. Strikes without a
/// baseline OI or with an unparseable key are dropped and re-seeded on the
/// next scan.
pub fn migrate(stored: StoredSession) -> Option<SessionState> {
    let trading_date = stored.trading_date?;
    let strikes = stored
        .strikes
        .into_iter()
        .filter_map(|(key, s)| {
            let key: StrikeKey = match key.parse() {
                Ok(k) => k,
                Err(e) => {
                    warn!(error = %e, "dropping stored strike with bad key");
                    return None;
                }
            };
            let baseline_oi = s.baseline_oi?;
            Some((
                key,
                StrikeState {
                    baseline_oi,
                    baseline_ltp: s.baseline_ltp.unwrap_or(0.0),
                    baseline_volume: s.baseline_volume.unwrap_or(0),
                    prev_oi: s.prev_oi.unwrap_or(baseline_oi),
                    state: s.state.unwrap_or_default(),
                    first_exec_time: s.first_exec_time,
                    scan_count: s.scan_count.unwrap_or(0),
                    decline_streak: s.decline_streak.unwrap_or(0),
                },
            ))
        })
        .collect();

    Some(SessionState {
        trading_date,
        day_open_spot: stored.day_open_spot,
        startup_notified: stored.startup_notified.unwrap_or(false),
        signals_sent_today: stored.signals_sent_today.unwrap_or(0),
        watch_sent_today: stored.watch_sent_today.unwrap_or(0),
        top_signals_today: stored.top_signals_today.unwrap_or_default(),
        strikes,
    })
}

impl SessionRepository for SqliteSessionRepo {
    fn load(&self) -> Result<Option<SessionState>, DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let payload: Option<String> = conn
            .query_row("SELECT payload FROM session_state WHERE id = 1", [], |row| row.get(0))
            .optional()
            .map_err(|e| DomainError::Database(format!("Failed to load session: {e}")))?;
        let Some(payload) = payload else {
            return Ok(None);
        };
        match serde_json::from_str::<StoredSession>(&payload) {
            Ok(stored) => Ok(migrate(stored)),
            Err(e) => {
                warn!(error = %e, "stored session is not valid JSON, ignoring it");
                Ok(None)
            }
        }
    }

    fn save(&self, session: &SessionState) -> Result<(), DomainError> {
        let payload = serde_json::to_string(session)
            .map_err(|e| DomainError::Parse(format!("Failed to encode session: {e}")))?;
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        conn.execute(
            "INSERT INTO session_state (id, trading_date, payload, updated_at) VALUES (1, ?1, ?2, ?3)
             ON CONFLICT(id) DO UPDATE SET trading_date = excluded.trading_date, payload = excluded.payload, updated_at = excluded.updated_at",
            params![
                session.trading_date.to_string(),
                payload,
                Utc::now().to_rfc3339(),
            ],
        )
        .map_err(|e| DomainError::Database(format!("Failed to save session: {e}")))?;
        Ok(())
    }

    fn clear(&self) -> Result<(), DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        conn.execute("DELETE FROM session_state", [])
            .map_err(|e| DomainError::Database(format!("Failed to clear session: {e}")))?;
        Ok(())
    }
}
