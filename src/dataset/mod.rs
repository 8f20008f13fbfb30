//! 合成数据集模块
//!
//! 生成带标签的合成病人记录，并用规则引擎评估标签一致率

pub mod evaluation;
pub mod generator;

pub use evaluation::{evaluate, EvaluationReport};
pub use generator::generate;

use crate::diagnosis::{DiagnosisLabel, PatientObservation};
use std::fs;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use thiserror::Error;

/// CSV 表头
pub const CSV_HEADER: &str =
    "patient_id,age,gender,temperature,heart_rate,spo2,cough,fever,breathing_issue,diagnosis";

/// 数据集错误类型
#[derive(Error, Debug)]
pub enum DatasetError {
    /// 文件读写错误
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// 行格式错误
    #[error("Malformed row at line {line}: {reason}")]
    MalformedRow { line: usize, reason: String },

    /// 未知诊断标签
    #[error("Unknown diagnosis label '{label}' at line {line}")]
    UnknownLabel { line: usize, label: String },

    /// 数据集为空
    #[error("Dataset contains no records")]
    Empty,
}

/// 数据集结果类型
pub type DatasetResult<T> = Result<T, DatasetError>;

/// 性别（编码：M=1, F=0）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn code(&self) -> u8 {
        match self {
            Gender::Male => 1,
            Gender::Female => 0,
        }
    }

    fn from_code(code: &str) -> Option<Self> {
        match code {
            "1" => Some(Gender::Male),
            "0" => Some(Gender::Female),
            _ => None,
        }
    }
}

/// 单条病人记录
#[derive(Debug, Clone, PartialEq)]
pub struct PatientRecord {
    pub patient_id: String,
    pub age: u32,
    pub gender: Gender,
    /// 华氏度，保留一位小数
    pub temperature: f64,
    pub heart_rate: u32,
    pub spo2: u32,
    pub cough: bool,
    pub fever: bool,
    pub breathing_issue: bool,
    /// 合成时指定的标签
    pub diagnosis: DiagnosisLabel,
}

impl PatientRecord {
    /// 转换为评分输入
    pub fn observation(&self) -> PatientObservation {
        PatientObservation {
            age: f64::from(self.age),
            temperature: self.temperature,
            heart_rate: f64::from(self.heart_rate),
            spo2: f64::from(self.spo2),
            cough: self.cough,
            fever: self.fever,
            breathing_issue: self.breathing_issue,
        }
    }

    fn to_csv_row(&self) -> String {
        format!(
            "{},{},{},{:.1},{},{},{},{},{},{}",
            self.patient_id,
            self.age,
            self.gender.code(),
            self.temperature,
            self.heart_rate,
            self.spo2,
            u8::from(self.cough),
            u8::from(self.fever),
            u8::from(self.breathing_issue),
            self.diagnosis,
        )
    }

    fn from_csv_row(line: usize, row: &str) -> DatasetResult<Self> {
        let fields: Vec<&str> = row.split(',').map(str::trim).collect();
        if fields.len() != 10 {
            return Err(DatasetError::MalformedRow {
                line,
                reason: format!("expected 10 columns, found {}", fields.len()),
            });
        }

        let malformed = |column: &str, value: &str| DatasetError::MalformedRow {
            line,
            reason: format!("invalid {column} '{value}'"),
        };
        let integer = |column: &str, value: &str| {
            value.parse::<u32>().map_err(|_| malformed(column, value))
        };
        let flag = |column: &str, value: &str| match value {
            "0" => Ok(false),
            "1" => Ok(true),
            _ => Err(malformed(column, value)),
        };

        Ok(Self {
            patient_id: fields[0].to_string(),
            age: integer("age", fields[1])?,
            gender: Gender::from_code(fields[2]).ok_or_else(|| malformed("gender", fields[2]))?,
            temperature: fields[3]
                .parse::<f64>()
                .map_err(|_| malformed("temperature", fields[3]))?,
            heart_rate: integer("heart_rate", fields[4])?,
            spo2: integer("spo2", fields[5])?,
            cough: flag("cough", fields[6])?,
            fever: flag("fever", fields[7])?,
            breathing_issue: flag("breathing_issue", fields[8])?,
            diagnosis: fields[9].parse().map_err(|_| DatasetError::UnknownLabel {
                line,
                label: fields[9].to_string(),
            })?,
        })
    }
}

/// 写出 CSV
pub fn write_csv<W: Write>(mut writer: W, records: &[PatientRecord]) -> DatasetResult<()> {
    writeln!(writer, "{CSV_HEADER}")?;
    for record in records {
        writeln!(writer, "{}", record.to_csv_row())?;
    }
    writer.flush()?;
    Ok(())
}

/// 读取 CSV，跳过空行
pub fn read_csv<R: BufRead>(reader: R) -> DatasetResult<Vec<PatientRecord>> {
    let mut lines = reader.lines();

    match lines.next() {
        Some(header) => {
            let header = header?;
            if header.trim() != CSV_HEADER {
                return Err(DatasetError::MalformedRow {
                    line: 1,
                    reason: "unexpected header".to_string(),
                });
            }
        }
        None => return Err(DatasetError::Empty),
    }

    let mut records = Vec::new();
    for (idx, line) in lines.enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        records.push(PatientRecord::from_csv_row(idx + 2, &line)?);
    }
    Ok(records)
}

/// 保存数据集到文件
pub fn save_csv(path: &Path, records: &[PatientRecord]) -> DatasetResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let file = fs::File::create(path)?;
    write_csv(BufWriter::new(file), records)
}

/// 从文件加载数据集
pub fn load_csv(path: &Path) -> DatasetResult<Vec<PatientRecord>> {
    let file = fs::File::open(path)?;
    read_csv(BufReader::new(file))
}
