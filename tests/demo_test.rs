//! Demo request against a mocked OpenAI-compatible server.
#![allow(deprecated)]

use std::time::Duration;

use assert_cmd::cargo::cargo_bin;
use assert_cmd::Command;
use httpmock::prelude::*;
use llamastrap::server::{ChatClient, DemoOutcome};
use predicates::prelude::*;
use serde_json::json;

const TOOL_CALL_RESPONSE: &str = r#"{
  "choices": [{
    "index": 0,
    "finish_reason": "tool_calls",
    "message": {
      "role": "assistant",
      "content": null,
      "tool_calls": [{
        "id": "call_0",
        "type": "function",
        "function": {
          "name": "get_current_weather",
          "arguments": "{\"location\": \"Paris, France\", \"unit\": \"celsius\"}"
        }
      }]
    }
  }]
}"#;

#[test]
fn client_reads_structured_tool_call() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST).path("/v1/chat/completions");
        then.status(200)
            .header("content-type", "application/json")
            .body(TOOL_CALL_RESPONSE);
    });

    let client = ChatClient::new(&server.base_url(), Duration::from_secs(5)).unwrap();
    let outcome = client.run_demo("local-model", "Weather in Paris?").unwrap();

    mock.assert();
    assert_eq!(
        outcome,
        DemoOutcome::ToolCall {
            name: "get_current_weather".to_string(),
            arguments: json!({ "location": "Paris, France", "unit": "celsius" }),
        }
    );
}

#[test]
fn client_reads_fenced_tool_call_in_content() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/v1/chat/completions");
        then.status(200)
            .header("content-type", "application/json")
            .json_body(json!({
                "choices": [{ "message": {
                    "role": "assistant",
                    "content": "```json\n{\"name\": \"get_current_weather\", \"arguments\": \"{\\\"location\\\": \\\"Oslo\\\"}\"}\n```"
                }}]
            }));
    });

    let client = ChatClient::new(&server.base_url(), Duration::from_secs(5)).unwrap();
    let outcome = client.run_demo("local-model", "Weather in Oslo?").unwrap();

    assert_eq!(
        outcome,
        DemoOutcome::ToolCall {
            name: "get_current_weather".to_string(),
            arguments: json!({ "location": "Oslo" }),
        }
    );
}

#[test]
fn demo_command_prints_tool_call() -> Result<(), Box<dyn std::error::Error>> {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/v1/chat/completions");
        then.status(200)
            .header("content-type", "application/json")
            .body(TOOL_CALL_RESPONSE);
    });

    let mut cmd = Command::new(cargo_bin("llamastrap"));
    cmd.env("CI", "1")
        .args(["demo", "--server-url", &server.base_url(), "--timeout", "5"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Tool call: get_current_weather"))
        .stdout(predicate::str::contains("Paris, France"));
    Ok(())
}

#[test]
fn demo_command_fails_on_server_error() -> Result<(), Box<dyn std::error::Error>> {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/v1/chat/completions");
        then.status(503).body("Loading model");
    });

    let mut cmd = Command::new(cargo_bin("llamastrap"));
    cmd.env("CI", "1")
        .args(["demo", "--server-url", &server.base_url(), "--timeout", "5"]);
    cmd.assert()
        .code(1)
        .stderr(predicate::str::contains("503"))
        .stderr(predicate::str::contains("Loading model"))
        .stderr(predicate::str::contains("llamastrap serve"));
    Ok(())
}
