use super::label::DiagnosisLabel;
use super::rules::CategoryScores;

/// Lower bound applied to each raw fraction before the final rescale
pub const PROBABILITY_FLOOR: f64 = 0.15;

/// Normalized probabilities in [`DiagnosisLabel::ALL`] order, summing to 1
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Distribution([f64; 3]);

impl Distribution {
    /// Floor-then-renormalize.
    ///
    /// Pass 1 divides the raw scores by their total and lifts every fraction to
    /// at least [`PROBABILITY_FLOOR`]. Pass 2 divides each floored value by the
    /// sum of the floored values, once. A floored category therefore ends up
    /// slightly below the floor whenever any lifting happened.
    pub fn from_scores(scores: &CategoryScores) -> Self {
        let raw = scores.to_array();
        let mut total = scores.total();
        if total == 0.0 {
            total = 1.0;
        }

        let mut floored = [0.0; 3];
        for (slot, score) in floored.iter_mut().zip(raw) {
            *slot = (score / total).max(PROBABILITY_FLOOR);
        }

        let floored_sum: f64 = floored.iter().sum();
        let mut probs = [0.0; 3];
        for (slot, value) in probs.iter_mut().zip(floored) {
            *slot = value / floored_sum;
        }

        Self(probs)
    }

    pub fn get(&self, label: DiagnosisLabel) -> f64 {
        self.0[label.index()]
    }

    pub fn as_array(&self) -> [f64; 3] {
        self.0
    }

    /// Most likely label; ties go to the earliest label in fixed order.
    pub fn argmax(&self) -> DiagnosisLabel {
        let mut best = 0;
        for i in 1..self.0.len() {
            if self.0[i] > self.0[best] {
                best = i;
            }
        }
        DiagnosisLabel::ALL[best]
    }
}

/// `probability * 100` rounded to two decimal places
pub fn to_percent(probability: f64) -> f64 {
    round2(probability * 100.0)
}

/// Rounds the exact binary value, so exact ties such as 28.125 go to the even digit.
fn round2(value: f64) -> f64 {
    format!("{value:.2}").parse().unwrap_or(value)
}
