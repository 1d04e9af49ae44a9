use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Option type at a strike. Serialized with exchange codes (`CE` / `PE`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum OptionSide {
    #[serde(rename = "CE")]
    Call,
    #[serde(rename = "PE")]
    Put,
}

impl OptionSide {
    pub fn opposite(self) -> Self {
        match self {
            OptionSide::Call => OptionSide::Put,
            OptionSide::Put => OptionSide::Call,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            OptionSide::Call => "CE",
            OptionSide::Put => "PE",
        }
    }
}

impl fmt::Display for OptionSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for OptionSide {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "CE" | "CALL" | "C" => Ok(OptionSide::Call),
            "PE" | "PUT" | "P" => Ok(OptionSide::Put),
            _ => Err(format!("Unknown option side: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opposite() {
        assert_eq!(OptionSide::Call.opposite(), OptionSide::Put);
        assert_eq!(OptionSide::Put.opposite(), OptionSide::Call);
    }

    #[test]
    fn test_parse_codes_and_names() {
        assert_eq!("CE".parse::<OptionSide>().unwrap(), OptionSide::Call);
        assert_eq!("put".parse::<OptionSide>().unwrap(), OptionSide::Put);
        assert!("XX".parse::<OptionSide>().is_err());
    }

    #[test]
    fn test_serde_uses_exchange_code() {
        assert_eq!(serde_json::to_string(&OptionSide::Put).unwrap(), "\"PE\"");
    }
}
