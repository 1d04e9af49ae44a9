//! Per-trading-day session record and the strike ledger it owns.

use crate::domain::entities::strike_state::StrikeState;
use crate::domain::values::conviction::ConvictionTier;
use crate::domain::values::strike_key::StrikeKey;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A signal that was sent today, kept for replacement decisions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopSignal {
    pub key: StrikeKey,
    pub score: i32,
    pub tier: ConvictionTier,
    pub sent_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    pub trading_date: NaiveDate,
    /// Spot on the first successful scan of the day.
    pub day_open_spot: Option<f64>,
    pub startup_notified: bool,
    pub signals_sent_today: u32,
    pub watch_sent_today: u32,
    /// Highest-scoring sent signals, best first.
    pub top_signals_today: Vec<TopSignal>,
    pub strikes: BTreeMap<StrikeKey, StrikeState>,
}

impl SessionState {
    pub fn fresh(trading_date: NaiveDate) -> Self {
        Self {
            trading_date,
            day_open_spot: None,
            startup_notified: false,
            signals_sent_today: 0,
            watch_sent_today: 0,
            top_signals_today: Vec::new(),
            strikes: BTreeMap::new(),
        }
    }

    pub fn is_for(&self, date: NaiveDate) -> bool {
        self.trading_date == date
    }

    /// Capture the day-open spot once; later calls return the stored value.
    pub fn capture_day_open(&mut self, spot: f64) -> f64 {
        *self.day_open_spot.get_or_insert(spot)
    }

    /// Look up a strike, seeding its baseline on first sighting.
    ///
    /// Returns `true` as the second element when the strike was just created;
    /// the caller must not classify on that call.
    pub fn observe(&mut self, key: StrikeKey, oi: i64, ltp: f64, volume: i64) -> (&StrikeState, bool) {
        let mut is_new = false;
        let state = self.strikes.entry(key).or_insert_with(|| {
            is_new = true;
            StrikeState::seed(oi, ltp, volume)
        });
        (state, is_new)
    }

    pub fn update_prev_oi(&mut self, key: StrikeKey, oi: i64) {
        if let Some(state) = self.strikes.get_mut(&key) {
            state.prev_oi = oi;
        }
    }

    pub fn strike(&self, key: &StrikeKey) -> Option<&StrikeState> {
        self.strikes.get(key)
    }

    pub fn strike_mut(&mut self, key: &StrikeKey) -> Option<&mut StrikeState> {
        self.strikes.get_mut(key)
    }

    pub fn weakest_top_score(&self) -> Option<i32> {
        self.top_signals_today.iter().map(|s| s.score).min()
    }
}
