use super::option_side::OptionSide;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Identifies one option contract in the tracked expiry: side plus strike.
///
/// Rendered as `CE_24000`, which is also the persisted form so that a
/// `BTreeMap<StrikeKey, _>` serializes as a plain JSON object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StrikeKey {
    pub side: OptionSide,
    pub strike: i64,
}

impl StrikeKey {
    pub fn new(side: OptionSide, strike: i64) -> Self {
        Self { side, strike }
    }

    /// Same strike, other side.
    pub fn opposite(&self) -> Self {
        Self::new(self.side.opposite(), self.strike)
    }

    pub fn offset(&self, points: i64) -> Self {
        Self::new(self.side, self.strike + points)
    }
}

impl fmt::Display for StrikeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.side, self.strike)
    }
}

impl FromStr for StrikeKey {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (side, strike) = s
            .split_once('_')
            .ok_or_else(|| format!("Invalid strike key: {s}"))?;
        let side: OptionSide = side.parse()?;
        let strike: i64 = strike
            .parse()
            .map_err(|_| format!("Invalid strike in key: {s}"))?;
        Ok(Self::new(side, strike))
    }
}

impl Serialize for StrikeKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for StrikeKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_and_parse() {
        let key = StrikeKey::new(OptionSide::Call, 24000);
        assert_eq!(key.to_string(), "CE_24000");
        assert_eq!("CE_24000".parse::<StrikeKey>().unwrap(), key);
        assert!("CE-24000".parse::<StrikeKey>().is_err());
        assert!("CE_abc".parse::<StrikeKey>().is_err());
    }

    #[test]
    fn test_opposite_keeps_strike() {
        let key = StrikeKey::new(OptionSide::Put, 23950);
        assert_eq!(key.opposite(), StrikeKey::new(OptionSide::Call, 23950));
    }

    #[test]
    fn test_map_key_serialization() {
        let mut map = std::collections::BTreeMap::new();
        map.insert(StrikeKey::new(OptionSide::Put, 100), 1);
        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, "{\"PE_100\":1}");
        let back: std::collections::BTreeMap<StrikeKey, i32> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, map);
    }
}
