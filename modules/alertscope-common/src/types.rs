use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Closed vocabulary of alert classifications. Anything the store knows
/// that we don't is carried through as `Other` rather than rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MisconductType {
    Spoofing,
    WashTrading,
    Layering,
    FrontRunning,
    Other(String),
}

impl MisconductType {
    /// Classify a wire/store tag. Total: unknown tags become `Other`.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "spoofing" => Self::Spoofing,
            "wash_trading" => Self::WashTrading,
            "layering" => Self::Layering,
            "front_running" => Self::FrontRunning,
            other => Self::Other(other.to_string()),
        }
    }

    /// The wire/store tag for this type.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Spoofing => "spoofing",
            Self::WashTrading => "wash_trading",
            Self::Layering => "layering",
            Self::FrontRunning => "front_running",
            Self::Other(tag) => tag,
        }
    }
}

impl fmt::Display for MisconductType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MisconductType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_tag(s))
    }
}

impl Serialize for MisconductType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for MisconductType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Self::from_tag(&s))
    }
}
