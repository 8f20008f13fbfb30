use super::observation::PatientObservation;
use super::rules::CategoryScores;
use super::scorer::DiagnosisResult;

/// Hook into the scoring pipeline
///
/// Observers only see intermediate and final state; they cannot alter it.
pub trait ScoreObserver: Send + Sync {
    /// Called after each rule with the accumulator as it stands
    fn on_rule(&self, _rule: &str, _scores: &CategoryScores) {}

    /// Called once per observation with the final result
    fn on_result(&self, observation: &PatientObservation, result: &DiagnosisResult);
}

/// Observer that forwards scoring events to `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl ScoreObserver for TracingObserver {
    fn on_rule(&self, rule: &str, scores: &CategoryScores) {
        tracing::debug!(
            rule,
            normal = scores.normal,
            pneumonia = scores.pneumonia,
            covid = scores.covid,
            "rule applied"
        );
    }

    fn on_result(&self, observation: &PatientObservation, result: &DiagnosisResult) {
        tracing::info!(
            diagnosis = %result.label,
            confidence = result.confidence_percent,
            normal = result.probabilities.normal,
            pneumonia = result.probabilities.pneumonia,
            covid = result.probabilities.covid,
            symptoms = observation.symptom_count(),
            "diagnosis scored"
        );
    }
}
