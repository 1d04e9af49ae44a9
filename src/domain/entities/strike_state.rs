use crate::domain::values::signal_state::SignalState;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Tracking record for one side/strike, created on first sighting each day.
///
/// The `baseline_*` fields are the day's anchor and are never rewritten.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrikeState {
    pub baseline_oi: i64,
    pub baseline_ltp: f64,
    pub baseline_volume: i64,
    pub prev_oi: i64,
    pub state: SignalState,
    pub first_exec_time: Option<DateTime<Utc>>,
    pub scan_count: u32,
    pub decline_streak: u32,
}

impl StrikeState {
    pub fn seed(oi: i64, ltp: f64, volume: i64) -> Self {
        Self {
            baseline_oi: oi,
            baseline_ltp: ltp,
            baseline_volume: volume,
            prev_oi: oi,
            state: SignalState::None,
            first_exec_time: None,
            scan_count: 0,
            decline_streak: 0,
        }
    }

    /// OI growth over the day's baseline (%), `None` when the baseline is zero.
    pub fn oi_pct(&self, oi: i64) -> Option<f64> {
        pct_change(self.baseline_oi, oi)
    }

    /// OI change since the previous scan (%), `None` when the previous OI is zero.
    pub fn scan_change_pct(&self, oi: i64) -> Option<f64> {
        pct_change(self.prev_oi, oi)
    }

    /// Premium change over the day's baseline (%); zero without a usable baseline.
    pub fn ltp_change_pct(&self, ltp: f64) -> f64 {
        if self.baseline_ltp <= 0.0 {
            return 0.0;
        }
        (ltp - self.baseline_ltp) / self.baseline_ltp * 100.0
    }

    /// Advance the lifecycle. Returns false (and leaves the state alone) for
    /// anything that is not a forward move.
    pub fn advance(&mut self, next: SignalState) -> bool {
        if next.rank() <= self.state.rank() {
            return false;
        }
        self.state = next;
        true
    }

    /// Record whether this scan is above the execution threshold.
    pub fn track_streak(&mut self, above_exec: bool, now: DateTime<Utc>) {
        if above_exec {
            self.scan_count += 1;
            if self.first_exec_time.is_none() {
                self.first_exec_time = Some(now);
            }
        } else {
            self.scan_count = 0;
            self.first_exec_time = None;
        }
    }
}

fn pct_change(from: i64, to: i64) -> Option<f64> {
    if from <= 0 {
        return None;
    }
    Some((to - from) as f64 / from as f64 * 100.0)
}
