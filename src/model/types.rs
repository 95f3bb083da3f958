use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid or unsupported stage type: '{0}'")]
pub struct ParseStageTypeError(String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StageType {
    Extraction,
    Beneficiation,
    Smelting,
    Refining,
    Manufacturing,
    Use,
    Eol,
    Recycling,
}

impl StageType {
    pub const ALL: [StageType; 8] = [
        StageType::Extraction,
        StageType::Beneficiation,
        StageType::Smelting,
        StageType::Refining,
        StageType::Manufacturing,
        StageType::Use,
        StageType::Eol,
        StageType::Recycling,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StageType::Extraction => "extraction",
            StageType::Beneficiation => "beneficiation",
            StageType::Smelting => "smelting",
            StageType::Refining => "refining",
            StageType::Manufacturing => "manufacturing",
            StageType::Use => "use",
            StageType::Eol => "eol",
            StageType::Recycling => "recycling",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StageType::Extraction => "Extraction",
            StageType::Beneficiation => "Beneficiation",
            StageType::Smelting => "Smelting",
            StageType::Refining => "Refining",
            StageType::Manufacturing => "Manufacturing",
            StageType::Use => "Use",
            StageType::Eol => "End of Life",
            StageType::Recycling => "Recycling",
        }
    }

    /// Stages whose declared loop recovery rates feed the recovery sub-score.
    #[inline]
    pub fn is_recovery_stage(&self) -> bool {
        matches!(self, StageType::Eol | StageType::Recycling)
    }
}

impl fmt::Display for StageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for StageType {
    type Err = ParseStageTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "extraction" => Ok(StageType::Extraction),
            "beneficiation" => Ok(StageType::Beneficiation),
            "smelting" => Ok(StageType::Smelting),
            "refining" => Ok(StageType::Refining),
            "manufacturing" => Ok(StageType::Manufacturing),
            "use" => Ok(StageType::Use),
            "eol" => Ok(StageType::Eol),
            "recycling" => Ok(StageType::Recycling),
            _ => Err(ParseStageTypeError(s.to_string())),
        }
    }
}
