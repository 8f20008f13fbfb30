//! 合成病人记录生成器

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{Gender, PatientRecord};
use crate::diagnosis::DiagnosisLabel;

/// 按标签抽样的取值范围（整数区间均为闭区间）
struct LabelProfile {
    age: (u32, u32),
    temperature: (f64, f64),
    heart_rate: (u32, u32),
    spo2: (u32, u32),
}

impl LabelProfile {
    fn for_label(label: DiagnosisLabel) -> Self {
        match label {
            DiagnosisLabel::Normal => Self {
                age: (20, 60),
                temperature: (97.5, 98.6),
                heart_rate: (60, 80),
                spo2: (96, 100),
            },
            DiagnosisLabel::Pneumonia => Self {
                age: (35, 75),
                temperature: (100.0, 102.5),
                heart_rate: (85, 105),
                spo2: (91, 95),
            },
            DiagnosisLabel::Covid19 => Self {
                age: (30, 70),
                temperature: (100.5, 103.0),
                heart_rate: (90, 115),
                spo2: (88, 94),
            },
        }
    }
}

/// 生成 `patients` 条记录，相同种子产生相同数据集
pub fn generate(patients: usize, seed: u64) -> Vec<PatientRecord> {
    let mut rng = StdRng::seed_from_u64(seed);
    let records: Vec<PatientRecord> = (0..patients)
        .map(|i| generate_one(&mut rng, i + 1))
        .collect();

    tracing::debug!(patients = records.len(), seed, "合成数据集已生成");
    records
}

fn generate_one(rng: &mut StdRng, index: usize) -> PatientRecord {
    let diagnosis = DiagnosisLabel::ALL[rng.gen_range(0..DiagnosisLabel::ALL.len())];
    let profile = LabelProfile::for_label(diagnosis);

    let age = rng.gen_range(profile.age.0..=profile.age.1);
    let gender = if rng.gen_bool(0.5) {
        Gender::Male
    } else {
        Gender::Female
    };
    let temperature = round1(rng.gen_range(profile.temperature.0..=profile.temperature.1));
    let heart_rate = rng.gen_range(profile.heart_rate.0..=profile.heart_rate.1);
    let spo2 = rng.gen_range(profile.spo2.0..=profile.spo2.1);

    let (cough, fever, breathing_issue) = match diagnosis {
        DiagnosisLabel::Normal => (false, false, false),
        DiagnosisLabel::Pneumonia => (true, true, rng.gen_bool(0.5)),
        DiagnosisLabel::Covid19 => (true, true, true),
    };

    PatientRecord {
        patient_id: format!("P{index:04}"),
        age,
        gender,
        temperature,
        heart_rate,
        spo2,
        cough,
        fever,
        breathing_issue,
        diagnosis,
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
