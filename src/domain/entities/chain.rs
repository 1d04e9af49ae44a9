use crate::domain::values::option_side::OptionSide;
use crate::domain::values::strike_key::StrikeKey;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One option side at one strike, as observed in a single scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainRow {
    pub side: OptionSide,
    pub strike: i64,
    pub open_interest: i64,
    pub last_price: f64,
    pub volume: i64,
}

impl ChainRow {
    pub fn key(&self) -> StrikeKey {
        StrikeKey::new(self.side, self.strike)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChainSnapshot {
    pub rows: Vec<ChainRow>,
    /// Listed expiries for the underlying, any order.
    pub expiries: Vec<NaiveDate>,
    /// Rows the provider could not parse and dropped.
    #[serde(default)]
    pub skipped_rows: usize,
}
