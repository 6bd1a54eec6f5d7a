//! Webhook 后端测试（wiremock 模拟服务端）

use notiscript::notification::{
    NotificationRequest, NotificationSink, NotifierConfig, ScriptDispatcher, ScriptNotifier,
    TracingReporter, WebhookConfig, WebhookDispatcher,
};
use serde_json::{json, Value};
use std::sync::Arc;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn dispatcher_for(server: &MockServer, token: Option<&str>) -> Arc<WebhookDispatcher> {
    Arc::new(
        WebhookDispatcher::new(WebhookConfig {
            base_url: server.uri(),
            token: token.map(str::to_string),
            timeout_secs: 5,
        })
        .unwrap(),
    )
}

#[tokio::test]
async fn test_webhook_posts_payload_to_script_service() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/services/script/ring"))
        .and(header("authorization", "Bearer secret"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let dispatcher = dispatcher_for(&server, Some("secret"));
    let notifier = ScriptNotifier::new(
        NotifierConfig::new("doorbell")
            .with_script_suffix("ring")
            .with_script_field("message", "msg"),
        dispatcher.clone(),
        Arc::new(TracingReporter),
    );

    notifier.send(NotificationRequest::new("Someone is here").with_title("Door"));
    dispatcher.wait_pending().await;

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(
        body,
        json!({
            "message": "msg",
            "data": {
                "notifier_fields": {"message": "Someone is here", "title": "Door"}
            }
        })
    );
}

#[tokio::test]
async fn test_webhook_server_error_does_not_surface() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let dispatcher = dispatcher_for(&server, None);
    let notifier = ScriptNotifier::new(
        NotifierConfig::new("failing"),
        dispatcher.clone(),
        Arc::new(TracingReporter),
    );

    notifier.send(NotificationRequest::new("x"));
    dispatcher.wait_pending().await;

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].url.path(), "/api/services/script/failing");
}

#[tokio::test]
async fn test_invoke_returns_before_request_completes() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_delay(std::time::Duration::from_millis(200)))
        .mount(&server)
        .await;

    let dispatcher = dispatcher_for(&server, None);
    let call = notiscript::ScriptCall::script("slow", Default::default());

    let started = std::time::Instant::now();
    dispatcher.invoke(&call).unwrap();
    assert!(started.elapsed() < std::time::Duration::from_millis(200));

    dispatcher.wait_pending().await;
}

#[tokio::test]
async fn test_script_id_cannot_escape_script_service_path() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let dispatcher = dispatcher_for(&server, None);
    let notifier = ScriptNotifier::new(
        NotifierConfig::new("doorbell"),
        dispatcher.clone(),
        Arc::new(TracingReporter),
    );

    for script_id in ["../../states/lock.front_door", "a?b=c#frag"] {
        notifier.send(NotificationRequest::new("x").with_data_entry("script_suffix", json!(script_id)));
    }
    dispatcher.wait_pending().await;

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
    for request in &requests {
        let path = request.url.path();
        let action = path
            .strip_prefix("/api/services/script/")
            .unwrap_or_else(|| panic!("request escaped script service: {}", path));
        assert!(!action.contains('/'), "action spans several segments: {}", path);
        assert!(request.url.query().is_none());
    }

    let mut paths: Vec<&str> = requests.iter().map(|r| r.url.path()).collect();
    paths.sort();
    assert_eq!(
        paths,
        vec![
            "/api/services/script/..%2F..%2Fstates%2Flock.front_door",
            "/api/services/script/a%3Fb=c%23frag",
        ]
    );
}

#[tokio::test]
async fn test_dot_segment_script_id_is_rejected_before_sending() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let dispatcher = dispatcher_for(&server, None);
    let err = dispatcher
        .invoke(&notiscript::ScriptCall::script("..", Default::default()))
        .unwrap_err();
    assert!(err.to_string().contains("Invalid service path segment"));

    dispatcher.wait_pending().await;
}
