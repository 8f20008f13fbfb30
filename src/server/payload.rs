//! 请求体解析
//!
//! 缺省字段使用默认值；字段存在但类型不符时返回错误，不回退到默认值

use serde_json::{Map, Value};

use crate::diagnosis::PatientObservation;
use crate::error::{ApiError, ApiResult};

/// 将原始请求体解析为观测数据
pub fn parse_observation(body: &[u8]) -> ApiResult<PatientObservation> {
    let value: Value =
        serde_json::from_slice(body).map_err(|e| ApiError::MalformedBody(e.to_string()))?;
    observation_from_value(&value)
}

/// 从 JSON 值构造观测数据
pub fn observation_from_value(value: &Value) -> ApiResult<PatientObservation> {
    let fields = value.as_object().ok_or(ApiError::NotAnObject)?;

    Ok(PatientObservation {
        age: read_number(fields, "age", PatientObservation::DEFAULT_AGE)?,
        temperature: read_number(fields, "temperature", PatientObservation::DEFAULT_TEMPERATURE)?,
        heart_rate: read_number(fields, "heart_rate", PatientObservation::DEFAULT_HEART_RATE)?,
        spo2: read_number(fields, "spo2", PatientObservation::DEFAULT_SPO2)?,
        cough: read_flag(fields, "cough")?,
        fever: read_flag(fields, "fever")?,
        breathing_issue: read_flag(fields, "breathing_issue")?,
    })
}

fn read_number(fields: &Map<String, Value>, name: &str, default: f64) -> ApiResult<f64> {
    let Some(value) = fields.get(name) else {
        return Ok(default);
    };

    let number = match value {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| ApiError::invalid_field(name, format!("unrepresentable number {n}")))?,
        Value::String(s) => s.trim().parse::<f64>().map_err(|_| {
            ApiError::invalid_field(name, format!("could not convert string to number: '{s}'"))
        })?,
        other => {
            return Err(ApiError::invalid_field(
                name,
                format!("expected a number, got {}", kind(other)),
            ))
        }
    };

    if !number.is_finite() {
        return Err(ApiError::invalid_field(name, "value must be finite"));
    }
    Ok(number)
}

fn read_flag(fields: &Map<String, Value>, name: &str) -> ApiResult<bool> {
    let Some(value) = fields.get(name) else {
        return Ok(false);
    };

    let flag = match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => match n.as_f64() {
            Some(v) if v == 0.0 => Some(false),
            Some(v) if v == 1.0 => Some(true),
            _ => None,
        },
        Value::String(s) => match s.trim() {
            "0" | "false" => Some(false),
            "1" | "true" => Some(true),
            _ => None,
        },
        _ => None,
    };

    flag.ok_or_else(|| ApiError::invalid_field(name, format!("expected 0 or 1, got {value}")))
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_object_uses_defaults() {
        let obs = parse_observation(b"{}").unwrap();
        assert_eq!(obs, PatientObservation::default());
    }

    #[test]
    fn test_numeric_strings_are_coerced() {
        let obs = observation_from_value(&json!({
            "age": "65",
            "temperature": " 101.2 ",
            "heart_rate": 88,
            "spo2": "94",
            "cough": "1",
            "fever": true,
            "breathing_issue": 0.0,
        }))
        .unwrap();
        assert_eq!(obs.age, 65.0);
        assert_eq!(obs.temperature, 101.2);
        assert_eq!(obs.heart_rate, 88.0);
        assert_eq!(obs.spo2, 94.0);
        assert!(obs.cough);
        assert!(obs.fever);
        assert!(!obs.breathing_issue);
    }

    #[test]
    fn test_unknown_fields_are_ignored() {
        let obs = observation_from_value(&json!({ "has_image": true, "age": 30 })).unwrap();
        assert_eq!(obs.age, 30.0);
    }

    #[test]
    fn test_present_null_is_rejected() {
        let err = observation_from_value(&json!({ "spo2": null })).unwrap_err();
        assert_eq!(
            err,
            ApiError::invalid_field("spo2", "expected a number, got null")
        );
    }

    #[test]
    fn test_non_numeric_string_is_rejected() {
        let err = observation_from_value(&json!({ "age": "old" })).unwrap_err();
        assert!(err.to_string().contains("'age'"));
    }

    #[test]
    fn test_non_finite_is_rejected() {
        let err = observation_from_value(&json!({ "temperature": "NaN" })).unwrap_err();
        assert_eq!(err, ApiError::invalid_field("temperature", "value must be finite"));
    }

    #[test]
    fn test_flag_out_of_range_is_rejected() {
        assert!(observation_from_value(&json!({ "fever": 2 })).is_err());
        assert!(observation_from_value(&json!({ "cough": "yes" })).is_err());
        assert!(observation_from_value(&json!({ "breathing_issue": [] })).is_err());
    }

    #[test]
    fn test_bad_body_shapes() {
        assert!(matches!(
            parse_observation(b"{not json"),
            Err(ApiError::MalformedBody(_))
        ));
        assert_eq!(parse_observation(b"[1, 2]"), Err(ApiError::NotAnObject));
        assert!(matches!(parse_observation(b""), Err(ApiError::MalformedBody(_))));
    }
}
