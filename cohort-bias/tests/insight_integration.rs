#![cfg(feature = "insight")]

use std::time::Duration;

use mockito::{Matcher, Server};
use serde_json::json;

use cohort_bias::analyzers::AnalysisRunner;
use cohort_bias::core::{AnalysisReport, Dataset};
use cohort_bias::insight::{
    analyze_with_insight, InsightClient, InsightConfig, InsightError, InsightGenerator,
    InsightOutcome,
};

fn cohort() -> Dataset {
    let rows = [("M", "44"), ("m", "67"), ("F", "29"), ("1", "15")]
        .iter()
        .map(|(g, a)| vec![g.to_string(), a.to_string()])
        .collect();
    Dataset::new(vec!["gender".to_string(), "age".to_string()], rows).unwrap()
}

fn report() -> AnalysisReport {
    AnalysisRunner::new().run(&cohort()).unwrap()
}

fn client_for(server: &Server, max_retries: u32) -> InsightClient {
    let config = InsightConfig::new("sk-test")
        .with_endpoint(format!("{}/v1", server.url()))
        .with_model("test-model")
        .with_timeout(Duration::from_secs(5))
        .with_max_retries(max_retries);
    InsightClient::new(config).unwrap()
}

fn completion(content: &str) -> String {
    json!({
        "id": "chatcmpl-1",
        "choices": [
            {"index": 0, "message": {"role": "assistant", "content": content}, "finish_reason": "stop"}
        ]
    })
    .to_string()
}

#[tokio::test]
async fn test_generates_insight() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/chat/completions")
        .match_header("authorization", "Bearer sk-test")
        .match_body(Matcher::PartialJson(json!({"model": "test-model"})))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(completion("  The cohort skews male.  "))
        .expect(1)
        .create_async()
        .await;

    let text = client_for(&server, 0).generate(&report()).await.unwrap();

    assert_eq!(text, "The cohort skews male.");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_prompt_contains_statistics() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/chat/completions")
        .match_body(Matcher::Regex("Male: 3 \\(75.00%\\)".to_string()))
        .with_status(200)
        .with_body(completion("ok"))
        .create_async()
        .await;

    client_for(&server, 0).generate(&report()).await.unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn test_authentication_failure_is_not_retried() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/chat/completions")
        .with_status(401)
        .with_body("invalid api key")
        .expect(1)
        .create_async()
        .await;

    let err = client_for(&server, 3).generate(&report()).await.unwrap_err();

    assert!(matches!(err, InsightError::Authentication { ref message } if message == "invalid api key"));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_rate_limit_is_retried() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/chat/completions")
        .with_status(429)
        .with_header("retry-after", "0")
        .expect(2)
        .create_async()
        .await;

    let err = client_for(&server, 1).generate(&report()).await.unwrap_err();

    assert!(matches!(
        err,
        InsightError::RateLimited {
            retry_after_secs: Some(0)
        }
    ));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_rate_limit_beyond_timeout_is_not_retried() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/chat/completions")
        .with_status(429)
        .with_header("retry-after", "86400")
        .expect(1)
        .create_async()
        .await;

    let result = tokio::time::timeout(
        Duration::from_secs(10),
        client_for(&server, 2).generate(&report()),
    )
    .await
    .expect("generate should not wait for the server's retry delay");

    assert!(matches!(
        result,
        Err(InsightError::RateLimited {
            retry_after_secs: Some(86400)
        })
    ));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_server_error_exhausts_retries() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/chat/completions")
        .with_status(503)
        .with_body("overloaded")
        .expect(3)
        .create_async()
        .await;

    let err = client_for(&server, 2).generate(&report()).await.unwrap_err();

    assert!(matches!(err, InsightError::ServerError { status: 503, .. }));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_bad_request() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/v1/chat/completions")
        .with_status(400)
        .with_body("unknown model")
        .create_async()
        .await;

    let err = client_for(&server, 2).generate(&report()).await.unwrap_err();
    assert!(matches!(err, InsightError::InvalidRequest { .. }));
}

#[tokio::test]
async fn test_empty_choices_is_malformed() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/v1/chat/completions")
        .with_status(200)
        .with_body(json!({"choices": []}).to_string())
        .create_async()
        .await;

    let err = client_for(&server, 0).generate(&report()).await.unwrap_err();
    assert!(matches!(err, InsightError::MalformedResponse { .. }));
}

#[tokio::test]
async fn test_undecodable_body() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/v1/chat/completions")
        .with_status(200)
        .with_body("<html>gateway</html>")
        .create_async()
        .await;

    let err = client_for(&server, 0).generate(&report()).await.unwrap_err();
    assert!(matches!(err, InsightError::Serialization { .. }));
}

#[tokio::test]
async fn test_failed_insight_keeps_report() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/v1/chat/completions")
        .with_status(403)
        .create_async()
        .await;
    let client = client_for(&server, 0);

    let result = analyze_with_insight(&AnalysisRunner::new(), &cohort(), Some(&client))
        .await
        .unwrap();

    assert!(matches!(
        result.outcome,
        InsightOutcome::Failed(InsightError::Authentication { .. })
    ));
    assert_eq!(result.report, report());
    let value = serde_json::to_value(&result).unwrap();
    assert_eq!(value["male"], 3);
    assert!(value["insight_error"].is_string());
    assert!(value.get("insight").is_none());
}

#[tokio::test]
async fn test_successful_insight_in_json() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/v1/chat/completions")
        .with_status(200)
        .with_body(completion("Recruit more female participants."))
        .create_async()
        .await;
    let client = client_for(&server, 0);

    let result = analyze_with_insight(&AnalysisRunner::new(), &cohort(), Some(&client))
        .await
        .unwrap();

    let value = serde_json::to_value(&result).unwrap();
    assert_eq!(value["insight"], "Recruit more female participants.");
    assert_eq!(value["age_analysis"]["total_valid"], 4);
}
