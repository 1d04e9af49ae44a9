//! Conviction scoring for execution candidates.
//!
//! The score is additive: nine independently bounded factors, summed into a
//! total in `[SCORE_MIN, SCORE_MAX]`. The per-factor breakdown travels with
//! the signal so the outbound message and the calibration log can show why a
//! strike scored what it did.
//!
//! | Factor | Range |
//! |---|---|
//! | Strike proximity to ATM | 0..=30 |
//! | Volume multiple over baseline | 0..=20 |
//! | Buildup velocity | 0..=25 |
//! | Opposite-side decline | 0..=25 |
//! | Opposite-side decline streak | 0..=20 |
//! | Spot momentum alignment | -20..=20 |
//! | Sustainability | 0..=15 |
//! | Adjacent-strike cluster | 0..=20 |
//! | Premium behaviour | -10..=15 |

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::option_side::OptionSide;
use super::strike_key::StrikeKey;

pub const SCORE_MIN: i32 = -30;
pub const SCORE_MAX: i32 = 190;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ConvictionTier {
    Low,
    Medium,
    High,
    Premium,
}

impl ConvictionTier {
    pub fn from_score(score: i32) -> Self {
        if score >= 120 {
            ConvictionTier::Premium
        } else if score >= 90 {
            ConvictionTier::High
        } else if score >= 60 {
            ConvictionTier::Medium
        } else {
            ConvictionTier::Low
        }
    }
}

impl fmt::Display for ConvictionTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConvictionTier::Low => write!(f, "LOW"),
            ConvictionTier::Medium => write!(f, "MEDIUM"),
            ConvictionTier::High => write!(f, "HIGH"),
            ConvictionTier::Premium => write!(f, "PREMIUM"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub proximity: i32,
    pub volume: i32,
    pub velocity: i32,
    pub opposite_decline: i32,
    pub decline_streak: i32,
    pub momentum: i32,
    pub sustainability: i32,
    pub cluster: i32,
    pub premium: i32,
}

impl ScoreBreakdown {
    pub fn total(&self) -> i32 {
        self.proximity
            + self.volume
            + self.velocity
            + self.opposite_decline
            + self.decline_streak
            + self.momentum
            + self.sustainability
            + self.cluster
            + self.premium
    }

    /// Named components in display order.
    pub fn components(&self) -> [(&'static str, i32); 9] {
        [
            ("ATM proximity", self.proximity),
            ("Volume", self.volume),
            ("Velocity", self.velocity),
            ("Opp decline", self.opposite_decline),
            ("Decline streak", self.decline_streak),
            ("Momentum", self.momentum),
            ("Sustained", self.sustainability),
            ("Cluster", self.cluster),
            ("Premium", self.premium),
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConvictionScore {
    pub score: i32,
    pub tier: ConvictionTier,
    pub breakdown: ScoreBreakdown,
}

/// Observations for one execution candidate in the current scan.
#[derive(Debug, Clone)]
pub struct ScoreInput {
    pub key: StrikeKey,
    pub volume: i64,
    pub baseline_volume: i64,
    /// Minutes since OI% first crossed the execution threshold in this streak.
    pub minutes_since_first_exec: i64,
    /// Opposite-side change used for scoring (negative when declining).
    pub opposite_change_pct: f64,
    /// Opposite-side decline streak after this scan's update.
    pub opposite_decline_streak: u32,
    pub scan_count: u32,
    pub ltp_change_pct: f64,
}

/// Scan-wide market context shared by all candidates.
#[derive(Debug, Clone)]
pub struct ScoreContext {
    pub atm: i64,
    pub day_open_spot: f64,
    pub current_spot: f64,
    pub strike_step: i64,
    pub premium_tolerance_pct: f64,
    /// Same-side OI% at an adjacent strike that counts as cluster buildup.
    pub cluster_buildup_pct: f64,
    /// Opposite-side cumulative change at an adjacent strike that counts as cluster decline.
    pub cluster_decline_pct: f64,
}

/// Score one candidate. `oi_changes` maps every established, liquid strike in
/// this scan to its cumulative OI change from baseline (%).
pub fn score_candidate(
    input: &ScoreInput,
    ctx: &ScoreContext,
    oi_changes: &BTreeMap<StrikeKey, f64>,
) -> ConvictionScore {
    let breakdown = ScoreBreakdown {
        proximity: proximity_points((input.key.strike - ctx.atm).abs()),
        volume: volume_points(input.volume, input.baseline_volume),
        velocity: velocity_points(input.minutes_since_first_exec),
        opposite_decline: opposite_decline_points(input.opposite_change_pct),
        decline_streak: decline_streak_points(input.opposite_decline_streak),
        momentum: momentum_points(input.key.side, ctx.day_open_spot, ctx.current_spot),
        sustainability: sustainability_points(input.scan_count),
        cluster: cluster_points(input.key, ctx, oi_changes),
        premium: premium_points(input.ltp_change_pct, ctx.premium_tolerance_pct),
    };
    let score = breakdown.total().clamp(SCORE_MIN, SCORE_MAX);
    ConvictionScore {
        score,
        tier: ConvictionTier::from_score(score),
        breakdown,
    }
}

fn proximity_points(distance: i64) -> i32 {
    match distance {
        d if d <= 25 => 30,
        d if d <= 50 => 20,
        d if d <= 75 => 10,
        _ => 0,
    }
}

fn volume_points(volume: i64, baseline_volume: i64) -> i32 {
    if baseline_volume <= 0 {
        return 0;
    }
    let multiple = volume as f64 / baseline_volume as f64;
    if multiple >= 3.0 {
        20
    } else if multiple >= 2.0 {
        10
    } else if multiple >= 1.5 {
        5
    } else {
        0
    }
}

fn velocity_points(minutes: i64) -> i32 {
    match minutes {
        m if m <= 30 => 25,
        m if m <= 60 => 15,
        m if m <= 120 => 5,
        _ => 0,
    }
}

fn opposite_decline_points(change_pct: f64) -> i32 {
    let decline = -change_pct;
    if decline >= 10.0 {
        25
    } else if decline >= 5.0 {
        15
    } else if decline >= 1.5 {
        5
    } else {
        0
    }
}

fn decline_streak_points(streak: u32) -> i32 {
    match streak {
        s if s >= 3 => 20,
        2 => 10,
        _ => 0,
    }
}

/// Call writing expects spot to fall, put writing expects it to rise.
fn momentum_points(side: OptionSide, day_open_spot: f64, current_spot: f64) -> i32 {
    if day_open_spot <= 0.0 {
        return 0;
    }
    let move_pct = (current_spot - day_open_spot) / day_open_spot * 100.0;
    let aligned = match side {
        OptionSide::Call => -move_pct,
        OptionSide::Put => move_pct,
    };
    if aligned >= 0.3 {
        20
    } else if aligned >= 0.1 {
        10
    } else if aligned <= -0.3 {
        -20
    } else {
        0
    }
}

fn sustainability_points(scan_count: u32) -> i32 {
    match scan_count {
        s if s >= 3 => 15,
        2 => 10,
        _ => 0,
    }
}

fn cluster_points(key: StrikeKey, ctx: &ScoreContext, oi_changes: &BTreeMap<StrikeKey, f64>) -> i32 {
    let step = ctx.strike_step.max(1);
    let mut support = 0;
    for offset in [-2 * step, -step, step, 2 * step] {
        let neighbour = key.offset(offset);
        if oi_changes
            .get(&neighbour)
            .is_some_and(|pct| *pct >= ctx.cluster_buildup_pct)
        {
            support += 1;
        }
        if oi_changes
            .get(&neighbour.opposite())
            .is_some_and(|pct| *pct <= ctx.cluster_decline_pct)
        {
            support += 1;
        }
    }
    match support {
        s if s >= 4 => 20,
        s if s >= 2 => 10,
        _ => 0,
    }
}

fn premium_points(ltp_change_pct: f64, tolerance_pct: f64) -> i32 {
    if ltp_change_pct > tolerance_pct {
        -10
    } else if ltp_change_pct <= -5.0 {
        15
    } else if ltp_change_pct <= 1.0 {
        10
    } else if ltp_change_pct <= 3.0 {
        5
    } else {
        0
    }
}
