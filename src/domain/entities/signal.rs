use crate::domain::values::conviction::ConvictionScore;
use crate::domain::values::option_side::OptionSide;
use crate::domain::values::strike_key::StrikeKey;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Why a scored candidate was or was not delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SendDecision {
    /// Daily cap not yet reached.
    UnderCap,
    /// Cap reached, but the score clears the weakest sent signal by the margin.
    Replacement,
    /// Cap reached and the score does not clear the margin.
    CapReached,
}

impl SendDecision {
    pub fn sends(self) -> bool {
        !matches!(self, SendDecision::CapReached)
    }
}

impl std::fmt::Display for SendDecision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SendDecision::UnderCap => write!(f, "under_cap"),
            SendDecision::Replacement => write!(f, "replacement"),
            SendDecision::CapReached => write!(f, "cap_reached"),
        }
    }
}

/// A strike that reached EXECUTED this scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Signal {
    pub id: String,
    pub trading_date: NaiveDate,
    pub key: StrikeKey,
    pub open_interest: i64,
    pub baseline_oi: i64,
    pub oi_pct: f64,
    pub last_price: f64,
    pub ltp_change_pct: f64,
    /// Opposite-side change used for scoring (%).
    pub opposite_change_pct: f64,
    pub conviction: ConvictionScore,
    pub min_score: i32,
    pub spot: f64,
    pub atm: i64,
    pub decision: Option<SendDecision>,
    pub detected_at: DateTime<Utc>,
}

impl Signal {
    pub fn score(&self) -> i32 {
        self.conviction.score
    }

    /// Action suggested on the other side of the strike.
    pub fn recommended_action(&self) -> String {
        let opposite = self.key.side.opposite();
        match self.key.side {
            OptionSide::Call => format!("BUY {} {} (call writers active, resistance)", self.key.strike, opposite),
            OptionSide::Put => format!("BUY {} {} (put writers active, support)", self.key.strike, opposite),
        }
    }
}

/// A strike that moved NONE -> WATCH this scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchAlert {
    pub key: StrikeKey,
    pub open_interest: i64,
    pub oi_pct: f64,
    /// `None` when a quality gate suppressed the notification.
    pub suppressed: Option<String>,
}
