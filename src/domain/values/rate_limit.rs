//! Daily alert caps.
//!
//! Execution signals and WATCH notifications have independent counters.
//! Once the signal cap is reached a new signal may still go out if it beats
//! the weakest signal already sent today by `improvement_threshold`; it then
//! takes that signal's place in the top list.

use chrono::{DateTime, Utc};

use crate::domain::entities::session_state::{SessionState, TopSignal};
use crate::domain::entities::signal::SendDecision;
use crate::domain::values::conviction::ConvictionTier;
use crate::domain::values::strike_key::StrikeKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailyLimits {
    pub max_signals: u32,
    pub max_watch: u32,
    pub improvement_threshold: i32,
}

pub fn should_send(session: &SessionState, score: i32, limits: &DailyLimits) -> SendDecision {
    if session.signals_sent_today < limits.max_signals {
        return SendDecision::UnderCap;
    }
    match session.weakest_top_score() {
        Some(weakest) if score > weakest + limits.improvement_threshold => SendDecision::Replacement,
        Some(_) => SendDecision::CapReached,
        // Counter at cap with no recorded scores: nothing to compare against.
        None => SendDecision::Replacement,
    }
}

/// Record a sent signal. The counter never exceeds the cap; a replacement
/// swaps out the weakest entry instead.
pub fn record_signal(
    session: &mut SessionState,
    key: StrikeKey,
    score: i32,
    tier: ConvictionTier,
    sent_at: DateTime<Utc>,
    limits: &DailyLimits,
) {
    session.top_signals_today.push(TopSignal {
        key,
        score,
        tier,
        sent_at,
    });
    session
        .top_signals_today
        .sort_by(|a, b| b.score.cmp(&a.score).then(a.sent_at.cmp(&b.sent_at)));
    session.top_signals_today.truncate(limits.max_signals as usize);
    if session.signals_sent_today < limits.max_signals {
        session.signals_sent_today += 1;
    }
}

pub fn can_send_watch(session: &SessionState, limits: &DailyLimits) -> bool {
    session.watch_sent_today < limits.max_watch
}

pub fn record_watch(session: &mut SessionState) {
    session.watch_sent_today += 1;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::values::option_side::OptionSide;
    use chrono::NaiveDate;

    fn limits() -> DailyLimits {
        DailyLimits {
            max_signals: 3,
            max_watch: 2,
            improvement_threshold: 10,
        }
    }

    fn session_at_cap() -> SessionState {
        let mut s = SessionState::fresh(NaiveDate::from_ymd_opt(2025, 10, 20).unwrap());
        let now = Utc::now();
        for (strike, score) in [(24000, 130), (24050, 110), (24100, 95)] {
            record_signal(
                &mut s,
                StrikeKey::new(OptionSide::Call, strike),
                score,
                ConvictionTier::from_score(score),
                now,
                &limits(),
            );
        }
        s
    }

    #[test]
    fn test_under_cap_always_sends() {
        let s = SessionState::fresh(NaiveDate::from_ymd_opt(2025, 10, 20).unwrap());
        assert_eq!(should_send(&s, -30, &limits()), SendDecision::UnderCap);
    }

    #[test]
    fn test_replacement_requires_clear_margin() {
        let s = session_at_cap();
        assert_eq!(s.signals_sent_today, 3);
        assert_eq!(should_send(&s, 104, &limits()), SendDecision::CapReached);
        assert_eq!(should_send(&s, 105, &limits()), SendDecision::CapReached);
        assert_eq!(should_send(&s, 106, &limits()), SendDecision::Replacement);
    }

    #[test]
    fn test_replacement_evicts_weakest() {
        let mut s = session_at_cap();
        record_signal(
            &mut s,
            StrikeKey::new(OptionSide::Put, 23900),
            106,
            ConvictionTier::High,
            Utc::now(),
            &limits(),
        );
        let scores: Vec<i32> = s.top_signals_today.iter().map(|t| t.score).collect();
        assert_eq!(scores, vec![130, 110, 106]);
        assert_eq!(s.signals_sent_today, 3);
    }

    #[test]
    fn test_watch_cap_independent() {
        let mut s = session_at_cap();
        assert!(can_send_watch(&s, &limits()));
        record_watch(&mut s);
        record_watch(&mut s);
        assert!(!can_send_watch(&s, &limits()));
    }
}
