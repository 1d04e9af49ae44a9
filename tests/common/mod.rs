//! Shared test helpers: scripted market data and a recording notifier.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use oiwatch::domain::entities::chain::{ChainRow, ChainSnapshot};
use oiwatch::domain::error::DomainError;
use oiwatch::domain::ports::market_data::MarketDataProvider;
use oiwatch::domain::ports::notifier::Notifier;
use oiwatch::domain::values::option_side::OptionSide;
use oiwatch::domain::values::scan_config::ScanConfig;
use oiwatch::OiWatch;
use std::sync::{Arc, Mutex};

#[derive(Default)]
pub struct FakeProvider {
    spot: Mutex<Option<f64>>,
    snapshot: Mutex<Option<ChainSnapshot>>,
    failure: Mutex<Option<String>>,
}

impl FakeProvider {
    pub fn set(&self, spot: f64, rows: Vec<ChainRow>) {
        *self.spot.lock().unwrap() = Some(spot);
        *self.snapshot.lock().unwrap() = Some(ChainSnapshot {
            rows,
            expiries: vec![expiry()],
            skipped_rows: 0,
        });
        *self.failure.lock().unwrap() = None;
    }

    pub fn fail(&self, message: &str) {
        *self.failure.lock().unwrap() = Some(message.to_string());
    }
}

#[async_trait]
impl MarketDataProvider for FakeProvider {
    fn name(&self) -> &str {
        "fake"
    }

    async fn get_spot(&self) -> Result<f64, DomainError> {
        if let Some(msg) = self.failure.lock().unwrap().clone() {
            return Err(DomainError::Provider(msg));
        }
        self.spot
            .lock()
            .unwrap()
            .ok_or_else(|| DomainError::Provider("no spot scripted".into()))
    }

    async fn get_chain_snapshot(&self) -> Result<ChainSnapshot, DomainError> {
        self.snapshot
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| DomainError::Provider("no chain scripted".into()))
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub messages: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }

    pub fn count_containing(&self, needle: &str) -> usize {
        self.messages().iter().filter(|m| m.contains(needle)).count()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    fn name(&self) -> &str {
        "recording"
    }

    async fn notify(&self, text: &str) -> Result<(), DomainError> {
        self.messages.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

pub struct Harness {
    pub oi: OiWatch,
    pub provider: Arc<FakeProvider>,
    pub notifier: Arc<RecordingNotifier>,
}

pub fn setup() -> Harness {
    setup_with(ScanConfig::default())
}

pub fn setup_with(config: ScanConfig) -> Harness {
    setup_at(":memory:", config)
}

pub fn setup_at(db_path: &str, config: ScanConfig) -> Harness {
    let provider = Arc::new(FakeProvider::default());
    let notifier = Arc::new(RecordingNotifier::default());
    let oi = OiWatch::with_providers(db_path, provider.clone(), notifier.clone(), config).unwrap();
    Harness {
        oi,
        provider,
        notifier,
    }
}

/// 09:30 IST on 2025-10-20.
pub fn open_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 10, 20, 4, 0, 0).unwrap()
}

pub fn minutes_later(n: i64) -> DateTime<Utc> {
    open_time() + Duration::minutes(n)
}

pub fn expiry() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 10, 28).unwrap()
}

pub fn ce(strike: i64, oi: i64, ltp: f64, volume: i64) -> ChainRow {
    ChainRow {
        side: OptionSide::Call,
        strike,
        open_interest: oi,
        last_price: ltp,
        volume,
    }
}

pub fn pe(strike: i64, oi: i64, ltp: f64, volume: i64) -> ChainRow {
    ChainRow {
        side: OptionSide::Put,
        strike,
        open_interest: oi,
        last_price: ltp,
        volume,
    }
}
