//! Vitals Triage - 规则诊断服务
//!
//! 根据生命体征与症状给出 Normal / Pneumonia / COVID-19 诊断建议

pub mod config;
pub mod dataset;
pub mod diagnosis;
pub mod error;
pub mod server;

pub use anyhow::Result;
