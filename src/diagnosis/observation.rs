use serde::{Deserialize, Serialize};

/// Vitals and symptom flags for a single request
///
/// Values are not range-checked; anything outside the expected clinical range
/// is still routed through the threshold tables as-is.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PatientObservation {
    /// Years
    pub age: f64,
    /// Degrees Fahrenheit
    pub temperature: f64,
    /// Beats per minute
    pub heart_rate: f64,
    /// Percent oxygen saturation
    pub spo2: f64,
    pub cough: bool,
    pub fever: bool,
    pub breathing_issue: bool,
}

impl PatientObservation {
    pub const DEFAULT_AGE: f64 = 50.0;
    pub const DEFAULT_TEMPERATURE: f64 = 98.6;
    pub const DEFAULT_HEART_RATE: f64 = 72.0;
    pub const DEFAULT_SPO2: f64 = 98.0;

    /// Number of symptom flags set, in `0..=3`
    pub fn symptom_count(&self) -> u8 {
        u8::from(self.cough) + u8::from(self.fever) + u8::from(self.breathing_issue)
    }
}

impl Default for PatientObservation {
    fn default() -> Self {
        Self {
            age: Self::DEFAULT_AGE,
            temperature: Self::DEFAULT_TEMPERATURE,
            heart_rate: Self::DEFAULT_HEART_RATE,
            spo2: Self::DEFAULT_SPO2,
            cough: false,
            fever: false,
            breathing_issue: false,
        }
    }
}
