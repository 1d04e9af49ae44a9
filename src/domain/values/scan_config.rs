//! Parameter bundle consumed by a scan.
//!
//! Built once per run (CLI flags, environment) and never mutated by the
//! classifier. All percentages are expressed in percent, not fractions.

use chrono::NaiveTime;
use chrono_tz::Tz;

use crate::domain::error::DomainError;

#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Label used in notifications.
    pub instrument: String,
    /// OI growth over baseline (%) that moves a strike from NONE to WATCH.
    pub watch_oi_pct: f64,
    /// OI growth over baseline (%) required for an execution candidate.
    pub exec_oi_pct: f64,
    /// Strikes whose baseline OI is below this floor are never classified.
    pub min_base_oi: i64,
    /// Distance between listed strikes; ATM is spot rounded to this step.
    pub strike_step: i64,
    /// Maximum distance from ATM (points) for a WATCH notification.
    pub strike_range_limit: i64,
    /// When both sides of a strike grew beyond this (%), the strike is ambiguous.
    pub both_sides_avoid_pct: f64,
    /// Scan-to-scan opposite-side change (%) that confirms covering.
    pub min_decline_pct: f64,
    /// Cumulative opposite-side change from baseline (%) that confirms covering.
    pub min_cumulative_decline_pct: f64,
    /// Minimum conviction score while expiry is two or more days away.
    pub base_min_score: i32,
    /// Premium tolerance (%) on quiet days.
    pub base_premium_tolerance_pct: f64,
    pub max_signals_per_day: u32,
    pub max_watch_per_day: u32,
    /// Margin a replacement signal must beat the weakest sent signal by.
    pub improvement_threshold: i32,
    /// Number of strikes around ATM requested from the provider.
    pub chain_strike_count: u32,
    pub check_market_hours: bool,
    pub market_open: NaiveTime,
    pub market_close: NaiveTime,
    pub exchange_tz: Tz,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            instrument: "NIFTY".to_string(),
            watch_oi_pct: 50.0,
            exec_oi_pct: 100.0,
            min_base_oi: 100_000,
            strike_step: 50,
            strike_range_limit: 150,
            both_sides_avoid_pct: 50.0,
            min_decline_pct: -1.5,
            min_cumulative_decline_pct: -10.0,
            base_min_score: 70,
            base_premium_tolerance_pct: 8.0,
            max_signals_per_day: 3,
            max_watch_per_day: 5,
            improvement_threshold: 10,
            chain_strike_count: 20,
            check_market_hours: false,
            market_open: NaiveTime::from_hms_opt(9, 15, 0).unwrap_or(NaiveTime::MIN),
            market_close: NaiveTime::from_hms_opt(15, 30, 0).unwrap_or(NaiveTime::MIN),
            exchange_tz: chrono_tz::Asia::Kolkata,
        }
    }
}

impl ScanConfig {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.instrument.trim().is_empty() {
            return Err(DomainError::Config("instrument label is empty".into()));
        }
        if self.strike_step <= 0 {
            return Err(DomainError::Config(format!(
                "strike_step must be positive, got {}",
                self.strike_step
            )));
        }
        if self.watch_oi_pct > self.exec_oi_pct {
            return Err(DomainError::Config(format!(
                "watch threshold {}% exceeds execution threshold {}%",
                self.watch_oi_pct, self.exec_oi_pct
            )));
        }
        if self.max_signals_per_day == 0 {
            return Err(DomainError::Config("max_signals_per_day must be at least 1".into()));
        }
        if self.min_base_oi < 1 {
            return Err(DomainError::Config("min_base_oi must be at least 1".into()));
        }
        if self.min_decline_pct > 0.0 || self.min_cumulative_decline_pct > 0.0 {
            return Err(DomainError::Config("decline thresholds must be zero or negative".into()));
        }
        if self.market_open >= self.market_close {
            return Err(DomainError::Config("market_open must be before market_close".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(ScanConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_watch_above_exec() {
        let cfg = ScanConfig {
            watch_oi_pct: 200.0,
            ..Default::default()
        };
        assert!(matches!(cfg.validate(), Err(DomainError::Config(_))));
    }

    #[test]
    fn test_rejects_positive_decline() {
        let cfg = ScanConfig {
            min_decline_pct: 1.5,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }
}
