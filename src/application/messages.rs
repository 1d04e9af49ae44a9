//! Outbound notification text.

use crate::domain::entities::signal::{SendDecision, Signal, WatchAlert};
use crate::domain::values::thresholds::AdaptedThresholds;

pub fn startup_message(instrument: &str, thresholds: &AdaptedThresholds) -> String {
    let expiry = match thresholds.days_to_expiry {
        Some(d) => format!("{d} day(s) to expiry"),
        None => "expiry unknown".to_string(),
    };
    format!(
        "🚀 {instrument} OI monitor started\n{expiry} | min score {} | premium tolerance {:.0}%",
        thresholds.min_score, thresholds.premium_tolerance_pct
    )
}

pub fn watch_message(instrument: &str, watches: &[&WatchAlert], spot: f64, atm: i64) -> String {
    let mut lines = vec![format!("👀 {instrument} OI WATCH | Spot {spot:.2} | ATM {atm}")];
    for w in watches {
        lines.push(format!(
            "{} {} | OI {} ({:+.1}%)",
            w.key.side, w.key.strike, w.open_interest, w.oi_pct
        ));
    }
    lines.join("\n")
}

pub fn signal_message(instrument: &str, signal: &Signal, sent_count: u32, cap: u32) -> String {
    let c = &signal.conviction;
    let mut lines = vec![
        format!(
            "📊 {instrument} {} {} SHORT BUILDUP | {} ({})",
            signal.key.side, signal.key.strike, c.tier, c.score
        ),
        format!(
            "OI {} ({:+.1}% vs {}) | LTP {:.2} ({:+.1}%)",
            signal.open_interest, signal.oi_pct, signal.baseline_oi, signal.last_price, signal.ltp_change_pct
        ),
        format!(
            "Opposite side {:+.1}% | Spot {:.2} | ATM {}",
            signal.opposite_change_pct, signal.spot, signal.atm
        ),
        String::new(),
        "Score breakdown:".to_string(),
    ];
    for (name, points) in c.breakdown.components() {
        lines.push(format!("  {name}: {points:+}"));
    }
    lines.push(String::new());
    lines.push(format!("Action: {}", signal.recommended_action()));
    let replacement = if signal.decision == Some(SendDecision::Replacement) {
        " (replaces weaker signal)"
    } else {
        ""
    };
    lines.push(format!("Signal {sent_count}/{cap} today{replacement}"));
    lines.join("\n")
}

pub fn failure_message(instrument: &str, what: &str, error: &str) -> String {
    format!("❌ {instrument} OI monitor: {what} failed: {error}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::values::conviction::{ConvictionScore, ConvictionTier, ScoreBreakdown};
    use crate::domain::values::option_side::OptionSide;
    use crate::domain::values::strike_key::StrikeKey;
    use chrono::{NaiveDate, Utc};

    fn signal() -> Signal {
        let breakdown = ScoreBreakdown {
            proximity: 30,
            volume: 10,
            velocity: 25,
            opposite_decline: 5,
            decline_streak: 0,
            momentum: 10,
            sustainability: 0,
            cluster: 0,
            premium: 10,
        };
        Signal {
            id: "abc".into(),
            trading_date: NaiveDate::from_ymd_opt(2025, 10, 20).unwrap(),
            key: StrikeKey::new(OptionSide::Call, 24000),
            open_interest: 250_000,
            baseline_oi: 120_000,
            oi_pct: 108.3,
            last_price: 95.5,
            ltp_change_pct: -1.0,
            opposite_change_pct: -2.0,
            conviction: ConvictionScore {
                score: 90,
                tier: ConvictionTier::High,
                breakdown,
            },
            min_score: 70,
            spot: 23990.0,
            atm: 24000,
            decision: Some(SendDecision::UnderCap),
            detected_at: Utc::now(),
        }
    }

    #[test]
    fn test_signal_message_contents() {
        let msg = signal_message("NIFTY", &signal(), 1, 3);
        assert!(msg.contains("CE 24000"));
        assert!(msg.contains("HIGH (90)"));
        assert!(msg.contains("ATM proximity: +30"));
        assert!(msg.contains("BUY 24000 PE"));
        assert!(msg.contains("Signal 1/3 today"));
        assert!(!msg.contains("replaces"));
    }

    #[test]
    fn test_replacement_is_marked() {
        let mut s = signal();
        s.decision = Some(SendDecision::Replacement);
        let msg = signal_message("NIFTY", &s, 3, 3);
        assert!(msg.contains("replaces weaker signal"));
    }
}
