use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::application::classifier::{Classifier, Rejection, ScanContext};
use crate::application::messages;
use crate::domain::entities::session_state::SessionState;
use crate::domain::entities::signal::{Signal, WatchAlert};
use crate::domain::error::DomainError;
use crate::domain::ports::market_data::MarketDataProvider;
use crate::domain::ports::notifier::Notifier;
use crate::domain::ports::session_repository::SessionRepository;
use crate::domain::ports::signal_repository::SignalRepository;
use crate::domain::values::rate_limit::{record_signal, should_send, DailyLimits};
use crate::domain::values::scan_config::ScanConfig;
use crate::domain::values::thresholds::{adapt_thresholds, atm_strike, days_to_expiry, AdaptedThresholds};

/// Runs one scan: fetch, classify, score, rate-limit, notify, persist.
///
/// Load, mutate and save of the session happen under one lock, so two
/// overlapping calls on the same use case cannot lose each other's updates.
pub struct ScanUseCase {
    provider: Arc<dyn MarketDataProvider>,
    notifier: Arc<dyn Notifier>,
    sessions: Arc<dyn SessionRepository>,
    signals: Arc<dyn SignalRepository>,
    config: ScanConfig,
    lock: Mutex<()>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ScanOutcome {
    Completed,
    MarketClosed,
    /// A fetch failed; nothing was classified.
    Aborted { reason: String },
}

#[derive(Debug, Serialize)]
pub struct ScanReport {
    pub scanned_at: DateTime<Utc>,
    pub trading_date: NaiveDate,
    pub outcome: ScanOutcome,
    pub spot: Option<f64>,
    pub atm: Option<i64>,
    pub thresholds: Option<AdaptedThresholds>,
    pub rows: usize,
    pub skipped_rows: usize,
    pub seeded: usize,
    pub illiquid: usize,
    pub watches: Vec<WatchAlert>,
    pub signals: Vec<Signal>,
    pub rejections: Vec<Rejection>,
    pub persisted: bool,
}

impl ScanReport {
    fn empty(now: DateTime<Utc>, trading_date: NaiveDate, outcome: ScanOutcome) -> Self {
        Self {
            scanned_at: now,
            trading_date,
            outcome,
            spot: None,
            atm: None,
            thresholds: None,
            rows: 0,
            skipped_rows: 0,
            seeded: 0,
            illiquid: 0,
            watches: Vec::new(),
            signals: Vec::new(),
            rejections: Vec::new(),
            persisted: false,
        }
    }

    pub fn sent_signals(&self) -> impl Iterator<Item = &Signal> {
        self.signals
            .iter()
            .filter(|s| s.decision.is_some_and(|d| d.sends()))
    }
}

impl ScanUseCase {
    pub fn new(
        provider: Arc<dyn MarketDataProvider>,
        notifier: Arc<dyn Notifier>,
        sessions: Arc<dyn SessionRepository>,
        signals: Arc<dyn SignalRepository>,
        config: ScanConfig,
    ) -> Self {
        Self {
            provider,
            notifier,
            sessions,
            signals,
            config,
            lock: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    fn limits(&self) -> DailyLimits {
        DailyLimits {
            max_signals: self.config.max_signals_per_day,
            max_watch: self.config.max_watch_per_day,
            improvement_threshold: self.config.improvement_threshold,
        }
    }

    pub fn trading_date(&self, now: DateTime<Utc>) -> NaiveDate {
        now.with_timezone(&self.config.exchange_tz).date_naive()
    }

    pub fn is_market_open(&self, now: DateTime<Utc>) -> bool {
        let t: NaiveTime = now.with_timezone(&self.config.exchange_tz).time();
        t >= self.config.market_open && t <= self.config.market_close
    }

    pub async fn execute(&self, now: DateTime<Utc>) -> Result<ScanReport, DomainError> {
        let _guard = self.lock.lock().await;
        let today = self.trading_date(now);

        if self.config.check_market_hours && !self.is_market_open(now) {
            info!("market closed, skipping scan");
            return Ok(ScanReport::empty(now, today, ScanOutcome::MarketClosed));
        }

        let mut session = self.load_session(today);

        let spot = match self.provider.get_spot().await {
            Ok(spot) if spot.is_finite() && spot > 0.0 => spot,
            Ok(spot) => return Ok(self.abort(now, today, "spot fetch", &format!("invalid spot {spot}")).await),
            Err(e) => return Ok(self.abort(now, today, "spot fetch", &e.to_string()).await),
        };
        let snapshot = match self.provider.get_chain_snapshot().await {
            Ok(snapshot) => snapshot,
            Err(e) => return Ok(self.abort(now, today, "option chain fetch", &e.to_string()).await),
        };

        let day_open_spot = session.capture_day_open(spot);
        let atm = atm_strike(spot, self.config.strike_step);
        let thresholds = adapt_thresholds(
            days_to_expiry(&snapshot.expiries, today),
            day_open_spot,
            spot,
            self.config.base_min_score,
            self.config.base_premium_tolerance_pct,
        );
        info!(
            provider = self.provider.name(),
            spot,
            atm,
            days_to_expiry = ?thresholds.days_to_expiry,
            min_score = thresholds.min_score,
            premium_tolerance = thresholds.premium_tolerance_pct,
            rows = snapshot.rows.len(),
            "scan started"
        );

        if !session.startup_notified {
            self.notify(&messages::startup_message(&self.config.instrument, &thresholds))
                .await;
            session.startup_notified = true;
        }

        let rows = snapshot.rows.len();
        let ctx = ScanContext {
            now,
            trading_date: today,
            spot,
            day_open_spot,
            atm,
            thresholds,
            rows: ScanContext::index_rows(snapshot.rows),
        };
        let classification = Classifier::new(&self.config).classify(&mut session, &ctx);

        let notify_watches: Vec<&WatchAlert> = classification
            .watches
            .iter()
            .filter(|w| w.suppressed.is_none())
            .collect();
        if !notify_watches.is_empty() {
            self.notify(&messages::watch_message(&self.config.instrument, &notify_watches, spot, atm))
                .await;
        }

        let limits = self.limits();
        let mut signals = classification.candidates;
        for signal in &mut signals {
            let decision = should_send(&session, signal.score(), &limits);
            signal.decision = Some(decision);
            if decision.sends() {
                record_signal(
                    &mut session,
                    signal.key,
                    signal.score(),
                    signal.conviction.tier,
                    now,
                    &limits,
                );
                info!(strike = %signal.key, score = signal.score(), %decision, "sending signal");
                let text = messages::signal_message(
                    &self.config.instrument,
                    signal,
                    session.signals_sent_today,
                    limits.max_signals,
                );
                self.notify(&text).await;
            } else {
                info!(strike = %signal.key, score = signal.score(), %decision, "signal suppressed by daily cap");
            }
            if let Err(e) = self.signals.record(signal) {
                warn!(strike = %signal.key, error = %e, "failed to log signal");
            }
        }

        let persisted = match self.sessions.save(&session) {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "failed to persist session, this scan's state is lost");
                false
            }
        };

        Ok(ScanReport {
            scanned_at: now,
            trading_date: today,
            outcome: ScanOutcome::Completed,
            spot: Some(spot),
            atm: Some(atm),
            thresholds: Some(thresholds),
            rows,
            skipped_rows: snapshot.skipped_rows,
            seeded: classification.seeded,
            illiquid: classification.illiquid,
            watches: classification.watches,
            signals,
            rejections: classification.rejections,
            persisted,
        })
    }

    /// Load today's session, replacing anything from an earlier day.
    fn load_session(&self, today: NaiveDate) -> SessionState {
        match self.sessions.load() {
            Ok(Some(session)) if session.is_for(today) => return session,
            Ok(Some(stale)) => {
                info!(previous = %stale.trading_date, %today, "new trading day, resetting session");
            }
            Ok(None) => info!(%today, "no stored session, starting fresh"),
            Err(e) => warn!(error = %e, "stored session unreadable, starting fresh"),
        }
        let session = SessionState::fresh(today);
        if let Err(e) = self.sessions.save(&session) {
            warn!(error = %e, "failed to persist reset session");
        }
        session
    }

    async fn abort(&self, now: DateTime<Utc>, today: NaiveDate, what: &str, error: &str) -> ScanReport {
        warn!(error, "{what} failed, aborting scan");
        self.notify(&messages::failure_message(&self.config.instrument, what, error))
            .await;
        ScanReport::empty(
            now,
            today,
            ScanOutcome::Aborted {
                reason: format!("{what} failed: {error}"),
            },
        )
    }

    async fn notify(&self, text: &str) {
        if let Err(e) = self.notifier.notify(text).await {
            warn!(notifier = self.notifier.name(), error = %e, "notification failed");
        }
    }
}
