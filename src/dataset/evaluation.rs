//! 规则引擎与合成标签的一致率评估

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{DatasetError, DatasetResult, PatientRecord};
use crate::diagnosis::{DiagnosisLabel, RiskScorer};

/// 评估报告
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationReport {
    pub total: usize,
    pub correct: usize,
    /// 百分比，保留两位小数
    pub accuracy: f64,
    /// 标签顺序，与混淆矩阵行列一致
    pub labels: [DiagnosisLabel; 3],
    /// `confusion[expected][predicted]`
    pub confusion: [[usize; 3]; 3],
    pub generated_at: DateTime<Utc>,
}

impl EvaluationReport {
    /// 某一标签的召回率（百分比）
    pub fn recall(&self, label: DiagnosisLabel) -> Option<f64> {
        let row = &self.confusion[label.index()];
        let support: usize = row.iter().sum();
        if support == 0 {
            return None;
        }
        Some(percent(row[label.index()], support))
    }
}

/// 逐条评分并统计一致率
pub fn evaluate(records: &[PatientRecord], scorer: &RiskScorer) -> DatasetResult<EvaluationReport> {
    if records.is_empty() {
        return Err(DatasetError::Empty);
    }

    let mut confusion = [[0usize; 3]; 3];
    for record in records {
        let result = scorer.score(&record.observation());
        confusion[record.diagnosis.index()][result.label.index()] += 1;
    }

    let correct: usize = (0..3).map(|i| confusion[i][i]).sum();
    let report = EvaluationReport {
        total: records.len(),
        correct,
        accuracy: percent(correct, records.len()),
        labels: DiagnosisLabel::ALL,
        confusion,
        generated_at: Utc::now(),
    };

    tracing::info!(
        total = report.total,
        correct = report.correct,
        accuracy = report.accuracy,
        "数据集评估完成"
    );
    Ok(report)
}

fn percent(part: usize, whole: usize) -> f64 {
    (part as f64 / whole as f64 * 10_000.0).round() / 100.0
}
