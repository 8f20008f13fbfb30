use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Diagnostic category produced by the scorer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiagnosisLabel {
    Normal,
    Pneumonia,
    #[serde(rename = "COVID-19")]
    Covid19,
}

impl DiagnosisLabel {
    /// Fixed label order. Index positions are shared with the score arrays and
    /// decide argmax ties.
    pub const ALL: [DiagnosisLabel; 3] = [Self::Normal, Self::Pneumonia, Self::Covid19];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "Normal",
            Self::Pneumonia => "Pneumonia",
            Self::Covid19 => "COVID-19",
        }
    }

    pub fn index(&self) -> usize {
        match self {
            Self::Normal => 0,
            Self::Pneumonia => 1,
            Self::Covid19 => 2,
        }
    }
}

impl fmt::Display for DiagnosisLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DiagnosisLabel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Normal" => Ok(Self::Normal),
            "Pneumonia" => Ok(Self::Pneumonia),
            "COVID-19" => Ok(Self::Covid19),
            other => Err(format!("unknown diagnosis label: {other}")),
        }
    }
}
