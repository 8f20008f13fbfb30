//! 错误处理
//!
//! 客户端输入错误统一映射为 400 响应

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// 请求解析错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    /// 请求体不是合法 JSON
    #[error("Malformed request body: {0}")]
    MalformedBody(String),

    /// 请求体不是 JSON 对象
    #[error("Request body must be a JSON object")]
    NotAnObject,

    /// 字段存在但无法转换为期望类型
    #[error("Invalid value for '{field}': {reason}")]
    InvalidField { field: String, reason: String },
}

impl ApiError {
    pub fn invalid_field(field: &str, reason: impl Into<String>) -> Self {
        ApiError::InvalidField {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        tracing::warn!("请求被拒绝: {}", self);
        let body = Json(json!({ "error": self.to_string() }));
        (self.status(), body).into_response()
    }
}

/// 接口结果类型
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_formatting() {
        let error = ApiError::invalid_field("spo2", "expected a number, got null");
        assert_eq!(
            error.to_string(),
            "Invalid value for 'spo2': expected a number, got null"
        );
        assert!(matches!(error, ApiError::InvalidField { .. }));
    }

    #[test]
    fn test_error_status() {
        let response = ApiError::NotAnObject.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
