//! Expiry- and volatility-aware scan thresholds.
//!
//! Near expiry there is little time left for a short-buildup thesis to play
//! out, so the minimum conviction score rises. On trending days option
//! premiums move mechanically with spot, so the "premium must not rise"
//! confirmation loosens with the size of the day's move.

use chrono::NaiveDate;
use serde::Serialize;

/// Minimum score on the day before expiry.
pub const DAY_BEFORE_EXPIRY_MIN_SCORE: i32 = 100;
/// Minimum score on expiry day (premium tier only).
pub const EXPIRY_DAY_MIN_SCORE: i32 = 120;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AdaptedThresholds {
    pub days_to_expiry: Option<i64>,
    pub min_score: i32,
    /// Largest premium rise (%) still read as option writing.
    pub premium_tolerance_pct: f64,
    /// Absolute spot move since day open (%).
    pub spot_move_pct: f64,
}

/// Compute this scan's score floor and premium tolerance.
///
/// `days_to_expiry` of `None` (no expiry metadata) keeps the base score.
/// A negative value is treated as expiry day.
pub fn adapt_thresholds(
    days_to_expiry: Option<i64>,
    day_open_spot: f64,
    current_spot: f64,
    base_min_score: i32,
    base_tolerance_pct: f64,
) -> AdaptedThresholds {
    let min_score = match days_to_expiry {
        Some(d) if d <= 0 => EXPIRY_DAY_MIN_SCORE,
        Some(1) => DAY_BEFORE_EXPIRY_MIN_SCORE,
        _ => base_min_score,
    };

    let spot_move_pct = spot_move_abs_pct(day_open_spot, current_spot);
    let premium_tolerance_pct = if spot_move_pct >= 0.5 {
        15.0
    } else if spot_move_pct >= 0.3 {
        10.0
    } else {
        base_tolerance_pct
    };

    AdaptedThresholds {
        days_to_expiry,
        min_score,
        premium_tolerance_pct,
        spot_move_pct,
    }
}

fn spot_move_abs_pct(day_open_spot: f64, current_spot: f64) -> f64 {
    if day_open_spot <= 0.0 {
        return 0.0;
    }
    ((current_spot - day_open_spot) / day_open_spot * 100.0).abs()
}

/// Days from `today` to the nearest expiry on or after it.
pub fn days_to_expiry(expiries: &[NaiveDate], today: NaiveDate) -> Option<i64> {
    expiries
        .iter()
        .filter(|d| **d >= today)
        .min()
        .map(|d| (*d - today).num_days())
}

/// Nearest listed strike to `spot`.
pub fn atm_strike(spot: f64, step: i64) -> i64 {
    if step <= 0 {
        return spot.round() as i64;
    }
    ((spot / step as f64).round() as i64) * step
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_min_score_by_days_to_expiry() {
        assert_eq!(adapt_thresholds(Some(5), 100.0, 100.0, 70, 8.0).min_score, 70);
        assert_eq!(adapt_thresholds(Some(2), 100.0, 100.0, 70, 8.0).min_score, 70);
        assert_eq!(adapt_thresholds(Some(1), 100.0, 100.0, 70, 8.0).min_score, 100);
        assert_eq!(adapt_thresholds(Some(0), 100.0, 100.0, 70, 8.0).min_score, 120);
        assert_eq!(adapt_thresholds(None, 100.0, 100.0, 70, 8.0).min_score, 70);
    }

    #[test]
    fn test_premium_tolerance_by_spot_move() {
        // 0.2% move keeps the base tolerance
        let t = adapt_thresholds(Some(3), 24000.0, 24048.0, 70, 8.0);
        assert_eq!(t.premium_tolerance_pct, 8.0);
        // 0.3% move
        let t = adapt_thresholds(Some(3), 24000.0, 24072.0, 70, 8.0);
        assert_eq!(t.premium_tolerance_pct, 10.0);
        // 0.5% move down counts the same as up
        let t = adapt_thresholds(Some(3), 24000.0, 23880.0, 70, 8.0);
        assert_eq!(t.premium_tolerance_pct, 15.0);
    }

    #[test]
    fn test_zero_day_open_spot() {
        let t = adapt_thresholds(Some(3), 0.0, 24000.0, 70, 8.0);
        assert_eq!(t.spot_move_pct, 0.0);
        assert_eq!(t.premium_tolerance_pct, 8.0);
    }

    #[test]
    fn test_days_to_expiry_picks_nearest_future() {
        let today = NaiveDate::from_ymd_opt(2025, 10, 20).unwrap();
        let expiries = vec![
            NaiveDate::from_ymd_opt(2025, 10, 28).unwrap(),
            NaiveDate::from_ymd_opt(2025, 10, 14).unwrap(),
            NaiveDate::from_ymd_opt(2025, 10, 21).unwrap(),
        ];
        assert_eq!(days_to_expiry(&expiries, today), Some(1));
        assert_eq!(days_to_expiry(&[], today), None);
    }

    #[test]
    fn test_atm_strike_rounding() {
        assert_eq!(atm_strike(24012.4, 50), 24000);
        assert_eq!(atm_strike(24026.0, 50), 24050);
        assert_eq!(atm_strike(24074.9, 50), 24050);
    }
}
