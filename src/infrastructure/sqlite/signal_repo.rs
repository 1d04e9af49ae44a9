use crate::domain::entities::signal::Signal;
use crate::domain::error::DomainError;
use crate::domain::ports::signal_repository::*;
use rusqlite::{params, Connection};
use std::sync::Mutex;
use tracing::warn;

pub struct SqliteSignalRepo {
    conn: Mutex<Connection>,
}

impl SqliteSignalRepo {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    fn row_to_signal(row: &rusqlite::Row) -> Result<Option<Signal>, rusqlite::Error> {
        let id: String = row.get(0)?;
        let payload: String = row.get(1)?;
        match serde_json::from_str(&payload) {
            Ok(signal) => Ok(Some(signal)),
            Err(e) => {
                warn!(%id, error = %e, "skipping unreadable signal row");
                Ok(None)
            }
        }
    }
}

impl SignalRepository for SqliteSignalRepo {
    fn record(&self, signal: &Signal) -> Result<(), DomainError> {
        let payload = serde_json::to_string(signal)
            .map_err(|e| DomainError::Parse(format!("Failed to encode signal: {e}")))?;
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        conn.execute(
            "INSERT INTO signals (id, trading_date, strike_key, score, tier, decision, payload, detected_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                signal.id,
                signal.trading_date.to_string(),
                signal.key.to_string(),
                signal.score(),
                signal.conviction.tier.to_string(),
                signal.decision.map(|d| d.to_string()),
                payload,
                signal.detected_at.to_rfc3339(),
            ],
        )
        .map_err(|e| DomainError::Database(format!("Failed to record signal: {e}")))?;
        Ok(())
    }

    fn list(&self, filter: &SignalFilter) -> Result<Vec<Signal>, DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let mut sql = String::from("SELECT id, payload FROM signals WHERE 1=1");
        let mut param_values: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();

        if let Some(date) = &filter.trading_date {
            sql.push_str(&format!(" AND trading_date = ?{}", param_values.len() + 1));
            param_values.push(Box::new(date.to_string()));
        }
        if filter.sent_only {
            sql.push_str(" AND decision IN ('under_cap', 'replacement')");
        }
        sql.push_str(" ORDER BY detected_at DESC, score DESC");
        if let Some(limit) = filter.limit {
            sql.push_str(&format!(" LIMIT ?{}", param_values.len() + 1));
            param_values.push(Box::new(limit as i64));
        }

        let params_refs: Vec<&dyn rusqlite::types::ToSql> =
            param_values.iter().map(|p| p.as_ref()).collect();
        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let signals = stmt
            .query_map(params_refs.as_slice(), Self::row_to_signal)
            .map_err(|e| DomainError::Database(e.to_string()))?
            .filter_map(|r| r.ok().flatten())
            .collect();
        Ok(signals)
    }
}
