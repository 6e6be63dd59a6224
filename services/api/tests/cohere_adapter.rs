use std::time::Duration;

use api_lib::adapters::CohereCompletionAdapter;
use doc_chat_core::{CompletionService, PortError, Prompt};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn adapter(server: &MockServer, timeout: Duration) -> CohereCompletionAdapter {
    CohereCompletionAdapter::new(
        Some("test-key".to_string()),
        "command-xlarge-nightly".to_string(),
        timeout,
    )
    .expect("client must build")
    .with_base_url(server.uri())
}

fn prompt() -> Prompt {
    Prompt::new("Document content: The sky is blue.\n\nUser: What color is the sky?\nChatbot:")
}

#[tokio::test]
async fn returns_first_candidate_trimmed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/generate"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_partial_json(json!({
            "model": "command-xlarge-nightly",
            "prompt": prompt().as_str(),
            "max_tokens": 300,
            "k": 0,
            "stop_sequences": ["\n"],
            "return_likelihoods": "NONE"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "gen-1",
            "generations": [
                { "id": "a", "text": "  Blue. " },
                { "id": "b", "text": "Azure." }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let result = adapter(&server, Duration::from_secs(5))
        .complete(&prompt())
        .await
        .expect("completion must succeed");

    assert_eq!(result.text, "Blue.");
}

#[tokio::test]
async fn non_success_status_is_an_upstream_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/generate"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "message": "invalid api token"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let err = adapter(&server, Duration::from_secs(5))
        .complete(&prompt())
        .await
        .unwrap_err();

    match err {
        PortError::Upstream(message) => {
            assert!(message.contains("401"), "status should be reported: {message}");
            assert!(message.contains("invalid api token"));
        }
        other => panic!("expected upstream error, got {other:?}"),
    }
}

#[tokio::test]
async fn empty_candidate_list_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/generate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "generations": [] })))
        .mount(&server)
        .await;

    let err = adapter(&server, Duration::from_secs(5))
        .complete(&prompt())
        .await
        .unwrap_err();

    assert!(matches!(err, PortError::EmptyCompletion));
}

#[tokio::test]
async fn malformed_body_is_an_upstream_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/generate"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
        .mount(&server)
        .await;

    let err = adapter(&server, Duration::from_secs(5))
        .complete(&prompt())
        .await
        .unwrap_err();

    assert!(matches!(err, PortError::Upstream(_)));
}

#[tokio::test]
async fn slow_upstream_hits_the_request_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/generate"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "generations": [{ "text": "late" }] }))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let timeout = Duration::from_millis(200);
    let err = adapter(&server, timeout).complete(&prompt()).await.unwrap_err();

    assert!(matches!(err, PortError::Timeout(t) if t == timeout));
}

#[tokio::test]
async fn unreachable_upstream_is_an_upstream_error() {
    let server = MockServer::start().await;
    let uri = server.uri();
    drop(server);

    let err = CohereCompletionAdapter::new(None, "command".to_string(), Duration::from_secs(2))
        .unwrap()
        .with_base_url(uri)
        .complete(&prompt())
        .await
        .unwrap_err();

    assert!(matches!(err, PortError::Upstream(_) | PortError::Timeout(_)));
}
