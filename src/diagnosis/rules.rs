use serde::Serialize;

use super::label::DiagnosisLabel::{self, Covid19, Normal, Pneumonia};
use super::observation::PatientObservation;

/// Per-category evidence, built up additively by the rule evaluators
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CategoryScores {
    pub normal: f64,
    pub pneumonia: f64,
    pub covid: f64,
}

impl CategoryScores {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, label: DiagnosisLabel, weight: f64) {
        match label {
            DiagnosisLabel::Normal => self.normal += weight,
            DiagnosisLabel::Pneumonia => self.pneumonia += weight,
            DiagnosisLabel::Covid19 => self.covid += weight,
        }
    }

    pub fn total(&self) -> f64 {
        self.normal + self.pneumonia + self.covid
    }

    /// Scores in [`DiagnosisLabel::ALL`] order
    pub fn to_array(&self) -> [f64; 3] {
        [self.normal, self.pneumonia, self.covid]
    }
}

/// A threshold rule adding weighted evidence to the accumulator
pub type RuleEvaluator = fn(&PatientObservation, &mut CategoryScores);

/// Rules in evaluation order
pub const RULES: [(&str, RuleEvaluator); 5] = [
    ("temperature", temperature_rule),
    ("heart_rate", heart_rate_rule),
    ("spo2", spo2_rule),
    ("symptoms", symptom_rule),
    ("age", age_rule),
];

// The if/else chains below are order-sensitive: each branch relies on the
// previous comparisons having failed, and 100.4 stays in the third bucket.

pub fn temperature_rule(obs: &PatientObservation, scores: &mut CategoryScores) {
    let t = obs.temperature;
    if t < 98.0 {
        scores.add(Normal, 0.3);
    } else if t <= 99.0 {
        scores.add(Normal, 0.2);
    } else if t <= 100.4 {
        scores.add(Pneumonia, 0.3);
    } else if t < 101.5 {
        scores.add(Pneumonia, 0.4);
        scores.add(Covid19, 0.2);
    } else {
        scores.add(Covid19, 0.3);
        scores.add(Pneumonia, 0.3);
    }
}

pub fn heart_rate_rule(obs: &PatientObservation, scores: &mut CategoryScores) {
    let hr = obs.heart_rate;
    if hr < 60.0 {
        scores.add(Normal, 0.1);
    } else if hr <= 100.0 {
        scores.add(Normal, 0.2);
    } else if hr <= 110.0 {
        scores.add(Pneumonia, 0.2);
        scores.add(Covid19, 0.1);
    } else {
        scores.add(Pneumonia, 0.3);
        scores.add(Covid19, 0.2);
    }
}

/// Oxygen saturation carries the largest weights of all rules.
pub fn spo2_rule(obs: &PatientObservation, scores: &mut CategoryScores) {
    let spo2 = obs.spo2;
    if spo2 >= 97.0 {
        scores.add(Normal, 0.4);
    } else if spo2 >= 95.0 {
        scores.add(Normal, 0.2);
        scores.add(Pneumonia, 0.1);
    } else if spo2 >= 93.0 {
        scores.add(Pneumonia, 0.3);
        scores.add(Covid19, 0.2);
    } else {
        scores.add(Covid19, 0.4);
        scores.add(Pneumonia, 0.3);
    }
}

pub fn symptom_rule(obs: &PatientObservation, scores: &mut CategoryScores) {
    match obs.symptom_count() {
        0 => scores.add(Normal, 0.2),
        1 => {
            // cough > fever > breathing issue
            if obs.cough {
                scores.add(Pneumonia, 0.15);
                scores.add(Covid19, 0.1);
            } else if obs.fever {
                scores.add(Pneumonia, 0.2);
                scores.add(Covid19, 0.15);
            } else {
                scores.add(Pneumonia, 0.25);
            }
        }
        2 => {
            scores.add(Pneumonia, 0.3);
            scores.add(Covid19, 0.2);
        }
        _ => {
            scores.add(Covid19, 0.35);
            scores.add(Pneumonia, 0.25);
        }
    }
}

pub fn age_rule(obs: &PatientObservation, scores: &mut CategoryScores) {
    if obs.age < 5.0 {
        scores.add(Pneumonia, 0.2);
    } else if obs.age > 60.0 {
        scores.add(Covid19, 0.15);
        scores.add(Pneumonia, 0.1);
    }
}
