//! HTTP 接口测试
//!
//! 通过 oneshot 直接驱动 Router，不占用端口

use anyhow::Result;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;
use vitals_triage::config::Config;
use vitals_triage::server::Server;

fn router() -> Router {
    Server::new_with_defaults().unwrap().router()
}

async fn send(router: Router, request: Request<Body>) -> Result<(StatusCode, Value)> {
    let response = router.oneshot(request).await?;
    let status = response.status();
    let bytes = response.into_body().collect().await?.to_bytes();
    Ok((status, serde_json::from_slice(&bytes)?))
}

fn predict_request(body: impl Into<Body>) -> Request<Body> {
    Request::post("/predict")
        .header(header::CONTENT_TYPE, "application/json")
        .body(body.into())
        .unwrap()
}

#[tokio::test]
async fn test_home_and_health() -> Result<()> {
    let (status, body) = send(router(), Request::get("/").body(Body::empty())?).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": "Medical Diagnosis API is running!" }));

    let (status, body) = send(router(), Request::get("/health").body(Body::empty())?).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "OK" }));

    Ok(())
}

#[tokio::test]
async fn test_predict_defaults() -> Result<()> {
    let (status, body) = send(router(), predict_request("{}")).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "diagnosis": "Normal",
            "confidence": 76.92,
            "probabilities": {
                "Normal": 76.92,
                "Pneumonia": 11.54,
                "COVID-19": 11.54,
            }
        })
    );
    Ok(())
}

#[tokio::test]
async fn test_predict_severe_case() -> Result<()> {
    let payload = json!({
        "age": 65,
        "temperature": 103,
        "heart_rate": 115,
        "spo2": 90,
        "cough": 1,
        "fever": 1,
        "breathing_issue": 1,
    });
    let (status, body) = send(router(), predict_request(payload.to_string())).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["diagnosis"], "COVID-19");
    assert_eq!(body["probabilities"]["Normal"], 13.04);
    assert_eq!(body["confidence"], body["probabilities"]["COVID-19"]);
    Ok(())
}

#[tokio::test]
async fn test_predict_accepts_form_strings() -> Result<()> {
    // 前端表单会把数值作为字符串提交，并附带额外字段
    let payload = json!({
        "age": "34",
        "temperature": "100.4",
        "heart_rate": "104",
        "spo2": "94",
        "cough": 0,
        "fever": 1,
        "breathing_issue": 0,
        "has_image": false,
    });
    let (status, body) = send(router(), predict_request(payload.to_string())).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["diagnosis"], "Pneumonia");
    Ok(())
}

#[tokio::test]
async fn test_predict_without_content_type() -> Result<()> {
    let request = Request::post("/predict").body(Body::from("{}"))?;
    let (status, body) = send(router(), request).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["diagnosis"], "Normal");
    Ok(())
}

#[tokio::test]
async fn test_predict_client_errors() -> Result<()> {
    let cases = [
        "{not json",
        "[]",
        "42",
        r#"{"age": null}"#,
        r#"{"spo2": "low"}"#,
        r#"{"temperature": {"value": 99}}"#,
        r#"{"cough": 3}"#,
        r#"{"fever": "maybe"}"#,
    ];

    for case in cases {
        let (status, body) = send(router(), predict_request(case)).await?;
        assert_eq!(status, StatusCode::BAD_REQUEST, "case: {case}");
        assert!(body["error"].is_string(), "case: {case}");
        assert!(body.get("diagnosis").is_none(), "case: {case}");
    }
    Ok(())
}

#[tokio::test]
async fn test_error_does_not_affect_next_request() -> Result<()> {
    let app = router();

    let (status, _) = send(app.clone(), predict_request(r#"{"age": "abc"}"#)).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(app, predict_request("{}")).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["diagnosis"], "Normal");
    Ok(())
}

#[tokio::test]
async fn test_cors_headers() -> Result<()> {
    let request = Request::get("/health")
        .header(header::ORIGIN, "http://localhost:3000")
        .body(Body::empty())?;
    let response = router().oneshot(request).await?;
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "*"
    );

    let mut config = Config::default();
    config.server.allowed_origins = vec!["http://localhost:3000".to_string()];
    let restricted = Server::new(&config)?.router();
    let request = Request::get("/health")
        .header(header::ORIGIN, "http://localhost:3000")
        .body(Body::empty())?;
    let response = restricted.oneshot(request).await?;
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "http://localhost:3000"
    );
    Ok(())
}

#[tokio::test]
async fn test_concurrent_requests() -> Result<()> {
    let app = router();
    let mut handles = Vec::new();
    for _ in 0..16 {
        let app = app.clone();
        handles.push(tokio::spawn(async move {
            send(app, predict_request(r#"{"spo2": 91, "cough": 1}"#)).await
        }));
    }

    let mut bodies = Vec::new();
    for handle in handles {
        let (status, body) = handle.await??;
        assert_eq!(status, StatusCode::OK);
        bodies.push(body);
    }
    assert!(bodies.windows(2).all(|w| w[0] == w[1]));
    Ok(())
}
