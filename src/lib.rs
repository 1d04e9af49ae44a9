pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;

use crate::application::scan::{ScanReport, ScanUseCase};
use crate::application::status::{SessionSummary, StatusUseCase};
use crate::domain::entities::signal::Signal;
use crate::domain::error::DomainError;
use crate::domain::ports::market_data::MarketDataProvider;
use crate::domain::ports::notifier::Notifier;
use crate::domain::ports::session_repository::SessionRepository;
use crate::domain::ports::signal_repository::{SignalFilter, SignalRepository};
use crate::domain::values::scan_config::ScanConfig;
use crate::infrastructure::feeds::fyers::FyersClient;
use crate::infrastructure::notifiers::noop::NoopNotifier;
use crate::infrastructure::notifiers::telegram::TelegramNotifier;
use crate::infrastructure::sqlite::migrations::run_migrations;
use crate::infrastructure::sqlite::session_repo::SqliteSessionRepo;
use crate::infrastructure::sqlite::signal_repo::SqliteSignalRepo;
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::Connection;
use std::sync::Arc;
use tracing::info;

/// External service credentials, passed in explicitly by the caller.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub fyers_client_id: String,
    pub fyers_access_token: String,
    pub fyers_symbol: String,
    pub telegram_token: Option<String>,
    pub telegram_chat_id: Option<String>,
}

pub struct OiWatch {
    scan_uc: ScanUseCase,
    status_uc: StatusUseCase,
    notifier: Arc<dyn Notifier>,
}

impl OiWatch {
    pub fn new(db_path: &str, config: ScanConfig, credentials: Credentials) -> Result<Self, DomainError> {
        let provider: Arc<dyn MarketDataProvider> = Arc::new(FyersClient::new(
            credentials.fyers_client_id,
            credentials.fyers_access_token,
            credentials.fyers_symbol,
            config.chain_strike_count,
        ));

        let notifier: Arc<dyn Notifier> = match (credentials.telegram_token, credentials.telegram_chat_id) {
            (Some(token), Some(chat_id)) if !token.is_empty() && !chat_id.is_empty() => {
                Arc::new(TelegramNotifier::new(token, chat_id))
            }
            _ => {
                info!("Telegram token/chat id not set, notifications are disabled");
                Arc::new(NoopNotifier)
            }
        };

        Self::with_providers(db_path, provider, notifier, config)
    }

    pub fn with_providers(
        db_path: &str,
        provider: Arc<dyn MarketDataProvider>,
        notifier: Arc<dyn Notifier>,
        config: ScanConfig,
    ) -> Result<Self, DomainError> {
        config.validate()?;

        let conn1 = open_connection(db_path)?;
        let conn2 = open_connection(db_path)?;
        run_migrations(&conn1)?;
        run_migrations(&conn2)?;

        let sessions: Arc<dyn SessionRepository> = Arc::new(SqliteSessionRepo::new(conn1));
        let signals: Arc<dyn SignalRepository> = Arc::new(SqliteSignalRepo::new(conn2));

        Ok(Self {
            scan_uc: ScanUseCase::new(provider, notifier.clone(), sessions.clone(), signals.clone(), config),
            status_uc: StatusUseCase::new(sessions, signals),
            notifier,
        })
    }

    pub fn config(&self) -> &ScanConfig {
        self.scan_uc.config()
    }

    pub async fn scan(&self) -> Result<ScanReport, DomainError> {
        self.scan_uc.execute(Utc::now()).await
    }

    pub async fn scan_at(&self, now: DateTime<Utc>) -> Result<ScanReport, DomainError> {
        self.scan_uc.execute(now).await
    }

    pub fn status(&self) -> Result<Option<SessionSummary>, DomainError> {
        self.status_uc.summary()
    }

    pub fn signals(
        &self,
        limit: Option<usize>,
        trading_date: Option<NaiveDate>,
        sent_only: bool,
    ) -> Result<Vec<Signal>, DomainError> {
        self.status_uc.signals(&SignalFilter {
            limit,
            trading_date,
            sent_only,
        })
    }

    pub fn reset(&self) -> Result<(), DomainError> {
        self.status_uc.reset()
    }

    /// Send a message straight through the notifier, surfacing failures.
    pub async fn test_alert(&self, text: &str) -> Result<(), DomainError> {
        self.notifier.notify(text).await
    }
}

fn open_connection(db_path: &str) -> Result<Connection, DomainError> {
    let conn = Connection::open(db_path).map_err(|e| DomainError::Database(format!("DB error: {e}")))?;
    conn.pragma_update(None, "journal_mode", "WAL")
        .map_err(|e| DomainError::Database(format!("WAL error: {e}")))?;
    Ok(conn)
}
