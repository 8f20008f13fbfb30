use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use super::label::DiagnosisLabel;
use super::normalize::{to_percent, Distribution};
use super::observation::PatientObservation;
use super::observer::ScoreObserver;
use super::rules::{CategoryScores, RULES};

/// Per-label percentages, each rounded to two decimals on its own
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Probabilities {
    #[serde(rename = "Normal")]
    pub normal: f64,
    #[serde(rename = "Pneumonia")]
    pub pneumonia: f64,
    #[serde(rename = "COVID-19")]
    pub covid: f64,
}

impl Probabilities {
    pub fn get(&self, label: DiagnosisLabel) -> f64 {
        match label {
            DiagnosisLabel::Normal => self.normal,
            DiagnosisLabel::Pneumonia => self.pneumonia,
            DiagnosisLabel::Covid19 => self.covid,
        }
    }
}

/// Scorer output, serialized as the `/predict` response body
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiagnosisResult {
    #[serde(rename = "diagnosis")]
    pub label: DiagnosisLabel,
    #[serde(rename = "confidence")]
    pub confidence_percent: f64,
    pub probabilities: Probabilities,
}

/// Stateless rule-based scorer
///
/// Cheap to share behind an `Arc`; every call builds its own accumulator.
#[derive(Clone, Default)]
pub struct RiskScorer {
    observer: Option<Arc<dyn ScoreObserver>>,
}

impl RiskScorer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_observer(observer: Arc<dyn ScoreObserver>) -> Self {
        Self {
            observer: Some(observer),
        }
    }

    /// Evidence totals after running every rule in order
    pub fn accumulate(&self, observation: &PatientObservation) -> CategoryScores {
        let mut scores = CategoryScores::new();
        for (name, rule) in RULES {
            rule(observation, &mut scores);
            if let Some(observer) = &self.observer {
                observer.on_rule(name, &scores);
            }
        }
        scores
    }

    pub fn score(&self, observation: &PatientObservation) -> DiagnosisResult {
        let scores = self.accumulate(observation);
        let dist = Distribution::from_scores(&scores);
        let label = dist.argmax();

        let result = DiagnosisResult {
            label,
            confidence_percent: to_percent(dist.get(label)),
            probabilities: Probabilities {
                normal: to_percent(dist.get(DiagnosisLabel::Normal)),
                pneumonia: to_percent(dist.get(DiagnosisLabel::Pneumonia)),
                covid: to_percent(dist.get(DiagnosisLabel::Covid19)),
            },
        };

        if let Some(observer) = &self.observer {
            observer.on_result(observation, &result);
        }
        result
    }
}

impl fmt::Debug for RiskScorer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RiskScorer")
            .field("observer", &self.observer.is_some())
            .finish()
    }
}

/// Score without an observer
pub fn score(observation: &PatientObservation) -> DiagnosisResult {
    RiskScorer::new().score(observation)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_normal() {
        let result = score(&PatientObservation::default());
        assert_eq!(result.label, DiagnosisLabel::Normal);
        assert_eq!(result.confidence_percent, 76.92);
        assert_eq!(result.probabilities.normal, 76.92);
        assert_eq!(result.probabilities.pneumonia, 11.54);
        assert_eq!(result.probabilities.covid, 11.54);
    }

    #[test]
    fn test_severe_presentation() {
        let obs = PatientObservation {
            age: 65.0,
            temperature: 103.0,
            heart_rate: 115.0,
            spo2: 90.0,
            cough: true,
            fever: true,
            breathing_issue: true,
        };
        let scores = RiskScorer::new().accumulate(&obs);
        assert_eq!(scores.normal, 0.0);
        assert!((scores.pneumonia - 1.25).abs() < 1e-9);
        assert!((scores.covid - 1.4).abs() < 1e-9);

        let result = score(&obs);
        assert_eq!(result.label, DiagnosisLabel::Covid19);
        // 0.15 / 1.15 after the single renormalization
        assert_eq!(result.probabilities.normal, 13.04);
        assert_eq!(result.probabilities.pneumonia, 41.02);
        assert_eq!(result.probabilities.covid, 45.94);
        assert_eq!(result.confidence_percent, result.probabilities.covid);
    }

    #[test]
    fn test_mild_fever_leans_pneumonia() {
        let obs = PatientObservation {
            temperature: 100.4,
            heart_rate: 105.0,
            spo2: 94.0,
            fever: true,
            ..Default::default()
        };
        let result = score(&obs);
        assert_eq!(result.label, DiagnosisLabel::Pneumonia);
    }

    #[test]
    fn test_serialized_shape() {
        let value = serde_json::to_value(score(&PatientObservation::default())).unwrap();
        assert_eq!(value["diagnosis"], "Normal");
        assert_eq!(value["confidence"], 76.92);
        assert_eq!(value["probabilities"]["Normal"], 76.92);
        assert_eq!(value["probabilities"]["COVID-19"], 11.54);
    }

    #[test]
    fn test_repeat_calls_are_identical() {
        let obs = PatientObservation {
            age: 3.0,
            temperature: 99.7,
            heart_rate: 58.0,
            spo2: 95.5,
            cough: true,
            ..Default::default()
        };
        let first = score(&obs);
        let second = score(&obs);
        assert_eq!(first.confidence_percent.to_bits(), second.confidence_percent.to_bits());
        assert_eq!(first, second);
    }
}
