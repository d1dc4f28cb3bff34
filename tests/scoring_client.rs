//! Completion API client against a mock backend.

use serde_json::{json, Value};

use functions_client::config::ScoringConfig;
use functions_client::scoring::{ScoringClient, ScoringError};

mod common;

use common::MockResponse;

fn client(addr: std::net::SocketAddr) -> ScoringClient {
    let config = ScoringConfig {
        api_url: format!("http://{}/v1/completions", addr),
        ..ScoringConfig::default()
    };
    ScoringClient::new(config, "sk-test".into()).unwrap()
}

#[tokio::test]
async fn test_score_request_and_result() {
    let (addr, captured) = common::start_programmable_backend(|_| async {
        let body = json!({
            "choices": [{ "logprobs": { "top_logprobs": [{ "\"": 0.73f64.ln() }] } }]
        });
        MockResponse::new(200, body.to_string())
    })
    .await;

    let score = client(addr).score("A lovely dinner.").await.unwrap();
    assert_eq!(score, 73);

    let requests = captured.lock().unwrap();
    assert_eq!(requests[0].method, "POST");
    assert_eq!(requests[0].path, "/v1/completions");
    assert_eq!(requests[0].header("authorization"), Some("Bearer sk-test"));

    let body: Value = serde_json::from_str(&requests[0].body).unwrap();
    assert_eq!(body["prompt"], "A lovely dinner.<|disc_score|>");
    assert_eq!(body["max_tokens"], 1);
    assert_eq!(body["logprobs"], 5);
    assert_eq!(body["model"], "model-detect-v2");
}

#[tokio::test]
async fn test_non_integer_score_rejected() {
    let (addr, _) = common::start_programmable_backend(|_| async {
        let body = json!({
            "choices": [{ "logprobs": { "top_logprobs": [{ "\"": 0.735f64.ln() }] } }]
        });
        MockResponse::new(200, body.to_string())
    })
    .await;

    let err = client(addr).score("text").await.unwrap_err();
    assert!(matches!(err, ScoringError::NotInteger(_)));
}

#[tokio::test]
async fn test_error_status_surfaced() {
    let (addr, _) = common::start_mock_backend(401, r#"{"error":"invalid key"}"#).await;

    let err = client(addr).score("text").await.unwrap_err();
    match err {
        ScoringError::Status { status, body } => {
            assert_eq!(status, 401);
            assert!(body.contains("invalid key"));
        }
        other => panic!("unexpected error: {other}"),
    }
}
