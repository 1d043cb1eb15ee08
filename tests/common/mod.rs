//! Shared test utilities for integration tests.
//!
//! Not all functions are used by every test file, but they're shared across tests.
#![allow(dead_code)]

use serde_json::{Value, json};
use wiremock::{MockServer, Request};

pub const TEST_MODEL: &str = "test-model";

/// A chat completion response body with one choice.
pub fn chat_completion(content: &str) -> Value {
    json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "created": 1_700_000_000,
        "model": TEST_MODEL,
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "logprobs": null,
            "finish_reason": "stop"
        }]
    })
}

/// An OpenAI-style error body.
pub fn api_error(kind: &str, message: &str) -> Value {
    json!({
        "error": {
            "message": message,
            "type": kind,
            "param": null,
            "code": null
        }
    })
}

/// A server-sent events body streaming `fragments` and then `[DONE]`.
pub fn sse_body(fragments: &[&str]) -> String {
    let mut body = String::new();
    for fragment in fragments {
        let chunk = json!({
            "id": "chatcmpl-test",
            "object": "chat.completion.chunk",
            "created": 1_700_000_000,
            "model": TEST_MODEL,
            "choices": [{
                "index": 0,
                "delta": {"content": fragment},
                "finish_reason": null
            }]
        });
        body.push_str(&format!("data: {}\n\n", chunk));
    }
    let last = json!({
        "id": "chatcmpl-test",
        "object": "chat.completion.chunk",
        "created": 1_700_000_000,
        "model": TEST_MODEL,
        "choices": [{
            "index": 0,
            "delta": {},
            "finish_reason": "stop"
        }]
    });
    body.push_str(&format!("data: {}\n\n", last));
    body.push_str("data: [DONE]\n\n");
    body
}

/// Base URL of a mock OpenAI-compatible API.
pub fn api_base(server: &MockServer) -> String {
    format!("{}/v1", server.uri())
}

/// JSON bodies of every request the server received.
pub async fn received_bodies(server: &MockServer) -> Vec<Value> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .map(request_json)
        .collect()
}

fn request_json(request: &Request) -> Value {
    serde_json::from_slice(&request.body).expect("request body should be JSON")
}
