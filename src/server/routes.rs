//! 路由处理函数

use axum::body::Bytes;
use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};
use uuid::Uuid;

use super::payload::parse_observation;
use super::AppState;
use crate::diagnosis::DiagnosisResult;
use crate::error::ApiResult;

/// 服务说明
pub async fn home() -> Json<Value> {
    Json(json!({ "message": "Medical Diagnosis API is running!" }))
}

/// 存活检查
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "OK" }))
}

/// 诊断建议
///
/// 请求体按原始字节读取，不依赖 Content-Type 头
pub async fn predict(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<Json<DiagnosisResult>> {
    let request_id = Uuid::new_v4();
    let span = tracing::info_span!("predict", %request_id);

    span.in_scope(|| -> ApiResult<Json<DiagnosisResult>> {
        let observation = parse_observation(&body)?;
        tracing::debug!(?observation, "观测数据已解析");
        Ok(Json(state.scorer.score(&observation)))
    })
}
