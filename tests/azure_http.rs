//! HTTP-level tests for the Azure chat-completion provider against a loopback server

use std::sync::Arc;

use azure_chat_agents::{
    Agent, AgentConfig, AgentsError, AzureChatCompletion, ConnectionInfo, ConnectionOptions,
    Delegate, StaticTokenCredential, DELEGATION_GUIDANCE,
};
use serde_json::{json, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

const COMPLETION_BODY: &str = r#"{
    "id": "chatcmpl-123",
    "object": "chat.completion",
    "created": 1714571112,
    "model": "gpt-4.1-nano",
    "prompt_filter_results": [],
    "choices": [{
        "index": 0,
        "message": {"role": "assistant", "content": "Semantic threads intertwine"},
        "finish_reason": "stop",
        "logprobs": null,
        "content_filter_results": {}
    }],
    "usage": {"prompt_tokens": 21, "completion_tokens": 9, "total_tokens": 30}
}"#;

struct CapturedRequest {
    head: String,
    body: Value,
}

async fn read_request(socket: &mut TcpStream) -> CapturedRequest {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = socket.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);

        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            let head = String::from_utf8_lossy(&buf[..pos]).to_lowercase();
            let length = head
                .lines()
                .find_map(|l| l.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= pos + 4 + length {
                let body = serde_json::from_slice(&buf[pos + 4..pos + 4 + length])
                    .unwrap_or(Value::Null);
                return CapturedRequest { head, body };
            }
        }
    }
    panic!("connection closed before a full request arrived");
}

/// Serves one request with the given status line and body.
async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<CapturedRequest>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let request = read_request(&mut socket).await;
        let response = format!(
            "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
            body.len()
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.ok();
        request
    });
    (format!("http://{addr}/"), handle)
}

fn http_client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

fn agent(connection: ConnectionInfo, name: &str, instructions: &str) -> Agent {
    let service = AzureChatCompletion::new(connection.clone()).with_http_client(http_client());
    Agent::with_provider(AgentConfig::new(name, instructions, connection), Arc::new(service))
}

#[tokio::test]
async fn test_api_key_request_shape() {
    let (endpoint, server) = serve_once("200 OK", COMPLETION_BODY).await;
    let connection = ConnectionOptions::new()
        .endpoint(endpoint)
        .deployment_name("demo-gpt-4.1-nano")
        .api_key("secret-key")
        .api_version("2024-02-15-preview")
        .resolve_with(|_| None)
        .unwrap();

    let response = agent(connection, "Agent_Smith", "You are a helpful assistant.")
        .get_response("Write a haiku about Semantic Kernel.", None)
        .await
        .unwrap();

    assert_eq!(response.content, "Semantic threads intertwine");
    assert_eq!(response.finish_reason.as_deref(), Some("stop"));
    assert_eq!(response.usage.total_tokens, 30);

    let request = server.await.unwrap();
    assert!(request.head.starts_with(
        "post /openai/deployments/demo-gpt-4.1-nano/chat/completions?api-version=2024-02-15-preview http/1.1"
    ));
    assert!(request.head.contains("\r\napi-key: secret-key"));
    assert!(!request.head.contains("authorization:"));

    assert_eq!(request.body["model"], "demo-gpt-4.1-nano");
    assert_eq!(
        request.body["messages"],
        json!([
            {"role": "system", "content": "You are a helpful assistant."},
            {"role": "user", "content": "Write a haiku about Semantic Kernel."}
        ])
    );
}

#[tokio::test]
async fn test_credential_sends_bearer_token() {
    let (endpoint, server) = serve_once("200 OK", COMPLETION_BODY).await;
    let connection = ConnectionOptions::new()
        .endpoint(endpoint)
        .deployment_name("gpt-4")
        .credential(Arc::new(StaticTokenCredential::new("tok-123")))
        .resolve_with(|_| None)
        .unwrap();

    agent(connection, "Assistant", "You are a helpful assistant.")
        .get_response("Hello!", None)
        .await
        .unwrap();

    let request = server.await.unwrap();
    assert!(request.head.contains("\r\nauthorization: bearer tok-123"));
    assert!(!request.head.contains("api-key:"));
    assert!(request.head.contains("api-version=2024-10-21"));
}

#[tokio::test]
async fn test_delegates_travel_in_system_message() {
    let (endpoint, server) = serve_once("200 OK", COMPLETION_BODY).await;
    let connection = ConnectionOptions::new()
        .endpoint(endpoint)
        .deployment_name("gpt-4")
        .api_key("k")
        .resolve_with(|_| None)
        .unwrap();

    let triage = agent(connection, "TriageAgent", "Route requests.")
        .with_delegate(Delegate::named("BillingAgent", "Billing issues"))
        .with_delegate(Delegate::named("RefundAgent", "Refund inquiries"));
    triage.get_response("I was charged twice", None).await.unwrap();

    let request = server.await.unwrap();
    let system = request.body["messages"][0]["content"].as_str().unwrap();
    assert!(system.starts_with("Route requests."));
    assert!(system.contains("- BillingAgent: Billing issues"));
    assert!(system.contains("- RefundAgent: Refund inquiries"));
    assert!(system.trim_end().ends_with(DELEGATION_GUIDANCE));
    assert!(request.body.get("tools").is_none());
}

#[tokio::test]
async fn test_rate_limit_maps_to_remote_error() {
    let (endpoint, _server) = serve_once(
        "429 Too Many Requests",
        r#"{"error":{"code":"429","message":"Rate limit is exceeded. Try again in 7 seconds."}}"#,
    )
    .await;
    let connection = ConnectionOptions::new()
        .endpoint(endpoint)
        .deployment_name("gpt-4")
        .api_key("k")
        .resolve_with(|_| None)
        .unwrap();

    let err = agent(connection, "Assistant", "Help")
        .get_response("Hello!", None)
        .await
        .unwrap_err();

    assert!(err.is_rate_limited());
    assert!(err.to_string().contains("Rate limit is exceeded"));
}

#[tokio::test]
async fn test_unauthorized_maps_to_authentication_error() {
    let (endpoint, _server) = serve_once(
        "401 Unauthorized",
        r#"{"error":{"code":"401","message":"Access denied due to invalid subscription key."}}"#,
    )
    .await;
    let connection = ConnectionOptions::new()
        .endpoint(endpoint)
        .deployment_name("gpt-4")
        .api_key("wrong")
        .resolve_with(|_| None)
        .unwrap();

    let err = agent(connection, "Assistant", "Help")
        .get_response("Hello!", None)
        .await
        .unwrap_err();

    assert!(matches!(err, AgentsError::AuthenticationError { .. }));
}

#[tokio::test]
async fn test_response_without_choices_is_model_behavior_error() {
    let (endpoint, _server) = serve_once(
        "200 OK",
        r#"{"id":"x","object":"chat.completion","created":1,"model":"m","choices":[]}"#,
    )
    .await;
    let connection = ConnectionOptions::new()
        .endpoint(endpoint)
        .deployment_name("gpt-4")
        .api_key("k")
        .resolve_with(|_| None)
        .unwrap();

    let err = agent(connection, "Assistant", "Help")
        .get_response("Hello!", None)
        .await
        .unwrap_err();

    assert!(matches!(err, AgentsError::ModelBehaviorError { .. }));
}

#[tokio::test]
async fn test_unreachable_endpoint_is_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let connection = ConnectionOptions::new()
        .endpoint(format!("http://{addr}/"))
        .deployment_name("gpt-4")
        .api_key("k")
        .resolve_with(|_| None)
        .unwrap();

    let err = agent(connection, "Assistant", "Help")
        .get_response("Hello!", None)
        .await
        .unwrap_err();

    assert!(matches!(err, AgentsError::TransportError(_)));
}
