//! Per-scan strike classification: NONE -> WATCH -> EXECUTED.
//!
//! A scan runs in three passes over the chain rows:
//! 1. seed baselines for strikes seen for the first time today,
//! 2. evaluate every established strike,
//! 3. roll `prev_oi` forward for every strike in the snapshot.
//!
//! Pass 3 runs after pass 2 so that the opposite-side decline check always
//! compares against the previous scan, whichever side is evaluated first.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info};

use crate::domain::entities::chain::ChainRow;
use crate::domain::entities::session_state::SessionState;
use crate::domain::entities::signal::{Signal, WatchAlert};
use crate::domain::values::conviction::{
    score_candidate, ConvictionScore, ScoreBreakdown, ScoreContext, ScoreInput,
};
use crate::domain::values::rate_limit::{can_send_watch, record_watch, DailyLimits};
use crate::domain::values::scan_config::ScanConfig;
use crate::domain::values::signal_state::SignalState;
use crate::domain::values::strike_key::StrikeKey;
use crate::domain::values::thresholds::AdaptedThresholds;

/// Market view shared by every strike in one scan.
#[derive(Debug, Clone)]
pub struct ScanContext {
    pub now: DateTime<Utc>,
    pub trading_date: NaiveDate,
    pub spot: f64,
    pub day_open_spot: f64,
    pub atm: i64,
    pub thresholds: AdaptedThresholds,
    pub rows: BTreeMap<StrikeKey, ChainRow>,
}

impl ScanContext {
    /// Index rows by key. A later duplicate of the same side/strike wins.
    pub fn index_rows(rows: Vec<ChainRow>) -> BTreeMap<StrikeKey, ChainRow> {
        rows.into_iter().map(|r| (r.key(), r)).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    /// Premium rose beyond the tolerance: buyers, not writers.
    PremiumRising,
    /// Both sides of the strike are building.
    BothSidesBuilding,
    /// No opposite-side observation to check covering against.
    NoOppositeData,
    /// Opposite side is not unwinding.
    NoCovering,
    BelowMinScore,
}

#[derive(Debug, Clone, Serialize)]
pub struct Rejection {
    pub key: StrikeKey,
    pub reason: RejectReason,
    pub score: Option<i32>,
    /// Factor breakdown, when the candidate got as far as scoring.
    pub breakdown: Option<ScoreBreakdown>,
}

#[derive(Debug, Default)]
pub struct Classification {
    /// Strikes seen for the first time today.
    pub seeded: usize,
    /// Strikes below the base OI floor.
    pub illiquid: usize,
    pub watches: Vec<WatchAlert>,
    /// Strikes that reached EXECUTED this scan: best score first, then lowest
    /// strike, calls before puts.
    pub candidates: Vec<Signal>,
    pub rejections: Vec<Rejection>,
}

pub struct Classifier<'a> {
    config: &'a ScanConfig,
    limits: DailyLimits,
}

impl<'a> Classifier<'a> {
    pub fn new(config: &'a ScanConfig) -> Self {
        Self {
            config,
            limits: DailyLimits {
                max_signals: config.max_signals_per_day,
                max_watch: config.max_watch_per_day,
                improvement_threshold: config.improvement_threshold,
            },
        }
    }

    pub fn classify(&self, session: &mut SessionState, ctx: &ScanContext) -> Classification {
        let mut out = Classification::default();

        let mut fresh = BTreeSet::new();
        for (key, row) in &ctx.rows {
            let (_, is_new) = session.observe(*key, row.open_interest, row.last_price, row.volume);
            if is_new {
                fresh.insert(*key);
            }
        }
        out.seeded = fresh.len();

        let oi_changes: BTreeMap<StrikeKey, f64> = ctx
            .rows
            .iter()
            .filter(|(key, _)| !fresh.contains(*key))
            .filter_map(|(key, row)| {
                let state = session.strike(key)?;
                if state.baseline_oi < self.config.min_base_oi {
                    return None;
                }
                Some((*key, state.oi_pct(row.open_interest)?))
            })
            .collect();

        for (key, row) in &ctx.rows {
            if fresh.contains(key) {
                continue;
            }
            self.evaluate(session, *key, row, ctx, &oi_changes, &mut out);
        }

        for (key, row) in &ctx.rows {
            session.update_prev_oi(*key, row.open_interest);
        }

        out.candidates.sort_by(|a, b| {
            b.score()
                .cmp(&a.score())
                .then(a.key.strike.cmp(&b.key.strike))
                .then(a.key.side.cmp(&b.key.side))
        });
        out
    }

    fn evaluate(
        &self,
        session: &mut SessionState,
        key: StrikeKey,
        row: &ChainRow,
        ctx: &ScanContext,
        oi_changes: &BTreeMap<StrikeKey, f64>,
        out: &mut Classification,
    ) {
        let Some(state) = session.strike(&key).cloned() else {
            return;
        };
        if state.baseline_oi < self.config.min_base_oi {
            out.illiquid += 1;
            return;
        }
        let Some(oi_pct) = state.oi_pct(row.open_interest) else {
            return;
        };

        let above_exec = oi_pct >= self.config.exec_oi_pct;
        let (scan_count, first_exec_time) = match session.strike_mut(&key) {
            Some(s) => {
                s.track_streak(above_exec, ctx.now);
                (s.scan_count, s.first_exec_time)
            }
            None => return,
        };

        let conflicted = self.both_sides_building(session, key, oi_pct, ctx);

        if state.state == SignalState::None && oi_pct >= self.config.watch_oi_pct {
            if let Some(s) = session.strike_mut(&key) {
                s.advance(SignalState::Watch);
            }
            let suppressed = if conflicted {
                Some("both sides building".to_string())
            } else if (key.strike - ctx.atm).abs() > self.config.strike_range_limit {
                Some(format!("more than {} points from ATM", self.config.strike_range_limit))
            } else if !can_send_watch(session, &self.limits) {
                Some("daily watch cap reached".to_string())
            } else {
                record_watch(session);
                None
            };
            info!(strike = %key, oi_pct = %format!("{oi_pct:.1}"), suppressed = ?suppressed, "NONE -> WATCH");
            out.watches.push(WatchAlert {
                key,
                open_interest: row.open_interest,
                oi_pct,
                suppressed,
            });
        }

        if state.state.is_terminal() || !above_exec {
            return;
        }

        let ltp_change_pct = state.ltp_change_pct(row.last_price);
        if ltp_change_pct > ctx.thresholds.premium_tolerance_pct {
            out.reject(key, RejectReason::PremiumRising, None);
            return;
        }
        if conflicted {
            out.reject(key, RejectReason::BothSidesBuilding, None);
            return;
        }

        let opposite = key.opposite();
        let (Some(opp_row), Some(opp_state)) = (ctx.rows.get(&opposite), session.strike_mut(&opposite)) else {
            out.reject(key, RejectReason::NoOppositeData, None);
            return;
        };
        let scan_decline = opp_state.scan_change_pct(opp_row.open_interest).unwrap_or(0.0);
        let cumulative = opp_state.oi_pct(opp_row.open_interest).unwrap_or(0.0);
        let covering = scan_decline <= self.config.min_decline_pct
            || cumulative <= self.config.min_cumulative_decline_pct;
        if !covering {
            opp_state.decline_streak = 0;
            debug!(strike = %key, scan_decline, cumulative, "no covering on opposite side");
            out.reject(key, RejectReason::NoCovering, None);
            return;
        }
        opp_state.decline_streak += 1;
        let opposite_decline_streak = opp_state.decline_streak;
        let opposite_change_pct = scan_decline.min(cumulative);

        let input = ScoreInput {
            key,
            volume: row.volume,
            baseline_volume: state.baseline_volume,
            minutes_since_first_exec: first_exec_time
                .map(|t| (ctx.now - t).num_minutes())
                .unwrap_or(0),
            opposite_change_pct,
            opposite_decline_streak,
            scan_count,
            ltp_change_pct,
        };
        let score_ctx = ScoreContext {
            atm: ctx.atm,
            day_open_spot: ctx.day_open_spot,
            current_spot: ctx.spot,
            strike_step: self.config.strike_step,
            premium_tolerance_pct: ctx.thresholds.premium_tolerance_pct,
            cluster_buildup_pct: self.config.watch_oi_pct,
            cluster_decline_pct: self.config.min_decline_pct,
        };
        let conviction = score_candidate(&input, &score_ctx, oi_changes);

        if conviction.score < ctx.thresholds.min_score {
            debug!(strike = %key, score = conviction.score, min = ctx.thresholds.min_score, "below minimum score");
            out.reject(key, RejectReason::BelowMinScore, Some(conviction));
            return;
        }

        if let Some(s) = session.strike_mut(&key) {
            s.advance(SignalState::Executed);
        }
        info!(strike = %key, score = conviction.score, tier = %conviction.tier, "-> EXECUTED");
        out.candidates.push(Signal {
            id: uuid::Uuid::new_v4().to_string(),
            trading_date: ctx.trading_date,
            key,
            open_interest: row.open_interest,
            baseline_oi: state.baseline_oi,
            oi_pct,
            last_price: row.last_price,
            ltp_change_pct,
            opposite_change_pct,
            conviction,
            min_score: ctx.thresholds.min_score,
            spot: ctx.spot,
            atm: ctx.atm,
            decision: None,
            detected_at: ctx.now,
        });
    }

    fn both_sides_building(&self, session: &SessionState, key: StrikeKey, oi_pct: f64, ctx: &ScanContext) -> bool {
        if oi_pct <= self.config.both_sides_avoid_pct {
            return false;
        }
        let opposite = key.opposite();
        let opp_pct = ctx
            .rows
            .get(&opposite)
            .and_then(|row| session.strike(&opposite)?.oi_pct(row.open_interest))
            .unwrap_or(0.0);
        opp_pct > self.config.both_sides_avoid_pct
    }
}

impl Classification {
    fn reject(&mut self, key: StrikeKey, reason: RejectReason, conviction: Option<ConvictionScore>) {
        self.rejections.push(Rejection {
            key,
            reason,
            score: conviction.map(|c| c.score),
            breakdown: conviction.map(|c| c.breakdown),
        });
    }
}
