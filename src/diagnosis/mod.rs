//! Rule-based diagnosis scoring
//!
//! Turns a [`PatientObservation`] into a [`DiagnosisResult`] through five
//! additive rule evaluators and a floor-then-renormalize step.

pub mod label;
pub mod normalize;
pub mod observation;
pub mod observer;
pub mod rules;
pub mod scorer;

pub use label::DiagnosisLabel;
pub use normalize::{Distribution, PROBABILITY_FLOOR};
pub use observation::PatientObservation;
pub use observer::{ScoreObserver, TracingObserver};
pub use rules::{CategoryScores, RuleEvaluator, RULES};
pub use scorer::{score, DiagnosisResult, Probabilities, RiskScorer};
