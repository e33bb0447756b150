//! The demo tool-calling request.
//!
//! Sends one OpenAI-style chat completion with a single function tool and
//! reports which call the model chose. Models that don't emit structured
//! `tool_calls` often answer with the call as JSON in `content`, possibly
//! wrapped in a Markdown code fence; that form is recognized too.

use std::time::Duration;

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::{Result, StrapError};

/// Name of the function tool offered to the model.
pub const DEMO_TOOL: &str = "get_current_weather";

/// Default user message.
pub const DEFAULT_PROMPT: &str = "What is the weather like in Paris right now?";

const SYSTEM_PROMPT: &str =
    "You are a helpful assistant. Use the provided tools when they help answer the question.";

/// The request body for the demo.
pub fn demo_payload(model: &str, prompt: &str) -> Value {
    json!({
        "model": model,
        "messages": [
            { "role": "system", "content": SYSTEM_PROMPT },
            { "role": "user", "content": prompt },
        ],
        "tools": [{
            "type": "function",
            "function": {
                "name": DEMO_TOOL,
                "description": "Get the current weather in a given location",
                "parameters": {
                    "type": "object",
                    "properties": {
                        "location": {
                            "type": "string",
                            "description": "City and country, e.g. Paris, France"
                        },
                        "unit": {
                            "type": "string",
                            "enum": ["celsius", "fahrenheit"]
                        }
                    },
                    "required": ["location"]
                }
            }
        }],
        "tool_choice": "auto",
        "parallel_tool_calls": false,
        "stream": false,
    })
}

/// One message of a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self::with_role("system", content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::with_role("user", content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::with_role("assistant", content)
    }

    fn with_role(role: &str, content: impl Into<String>) -> Self {
        Self {
            role: role.to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
pub struct AssistantMessage {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub tool_calls: Vec<ResponseToolCall>,
}

#[derive(Debug, Deserialize)]
pub struct ResponseToolCall {
    pub function: FunctionCall,
}

#[derive(Debug, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    /// JSON-encoded arguments.
    #[serde(default)]
    pub arguments: String,
}

/// What the model did with the demo request.
#[derive(Debug, Clone, PartialEq)]
pub enum DemoOutcome {
    /// The model called a tool.
    ToolCall { name: String, arguments: Value },
    /// The model answered in prose.
    Answer(String),
}

/// Client for a llama-server's OpenAI-compatible API.
pub struct ChatClient {
    base_url: String,
    client: Client,
}

impl ChatClient {
    /// Create a client for the server at `base_url` with a request timeout.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StrapError::RequestFailed {
                url: base_url.to_string(),
                message: e.to_string(),
            })?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    /// The chat-completions URL.
    pub fn endpoint(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url)
    }

    /// POST `payload` and decode the response.
    pub fn complete(&self, payload: &Value) -> Result<ChatResponse> {
        let url = self.endpoint();
        let failed = |message: String| StrapError::RequestFailed {
            url: url.clone(),
            message,
        };

        tracing::debug!("POST {}", url);
        let response = self
            .client
            .post(&url)
            .json(payload)
            .send()
            .map_err(|e| failed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(failed(format!("HTTP {}: {}", status, body.trim())));
        }

        response
            .json::<ChatResponse>()
            .map_err(|e| failed(format!("unreadable response: {}", e)))
    }

    /// Send a conversation without tool definitions and return the text of
    /// the first choice.
    pub fn reply(&self, model: &str, messages: &[ChatMessage]) -> Result<String> {
        let payload = json!({
            "model": model,
            "messages": messages,
            "stream": false,
        });
        let response = self.complete(&payload)?;
        response
            .choices
            .first()
            .map(|choice| choice.message.content.clone().unwrap_or_default())
            .ok_or_else(|| StrapError::RequestFailed {
                url: self.endpoint(),
                message: "response has no choices".to_string(),
            })
    }

    /// Send the demo request and interpret the reply.
    pub fn run_demo(&self, model: &str, prompt: &str) -> Result<DemoOutcome> {
        let response = self.complete(&demo_payload(model, prompt))?;
        interpret(&response).map_err(|message| StrapError::RequestFailed {
            url: self.endpoint(),
            message,
        })
    }
}

/// Work out what the model did from the first choice.
pub fn interpret(response: &ChatResponse) -> std::result::Result<DemoOutcome, String> {
    let message = &response
        .choices
        .first()
        .ok_or_else(|| "response has no choices".to_string())?
        .message;

    if let Some(call) = message.tool_calls.first() {
        return Ok(DemoOutcome::ToolCall {
            name: call.function.name.clone(),
            arguments: parse_arguments(&call.function.arguments),
        });
    }

    let content = message.content.as_deref().unwrap_or("").trim();
    Ok(tool_call_from_content(content)
        .unwrap_or_else(|| DemoOutcome::Answer(content.to_string())))
}

/// Recognize a tool call written as JSON in the message text.
///
/// Accepts `{"name": ..., "arguments": ...}` (arguments may be an object
/// or a JSON string) and `{"tool": ..., <arguments inline>}`.
fn tool_call_from_content(content: &str) -> Option<DemoOutcome> {
    let value: Value = serde_json::from_str(extract_json_from_markdown(content)).ok()?;
    let object = value.as_object()?;

    if let Some(name) = object.get("name").and_then(Value::as_str) {
        let arguments = match object.get("arguments").or_else(|| object.get("parameters")) {
            Some(Value::String(raw)) => parse_arguments(raw),
            Some(other) => other.clone(),
            None => Value::Null,
        };
        return Some(DemoOutcome::ToolCall {
            name: name.to_string(),
            arguments,
        });
    }

    let name = object.get("tool").and_then(Value::as_str)?;
    let arguments = object
        .iter()
        .filter(|(key, _)| key.as_str() != "tool")
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();
    Some(DemoOutcome::ToolCall {
        name: name.to_string(),
        arguments: Value::Object(arguments),
    })
}

fn parse_arguments(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

/// Strip a surrounding Markdown code fence, with or without a language tag.
///
/// Text that doesn't start with a fence is returned trimmed.
pub fn extract_json_from_markdown(reply: &str) -> &str {
    let trimmed = reply.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    // A `json` tag may sit directly against the payload.
    let inner = inner.strip_prefix("json").unwrap_or(inner);

    // Drop the rest of the opening line when it only holds a language tag.
    let inner = match inner.split_once('\n') {
        Some((tag, rest)) if is_language_tag(tag) => rest,
        _ => inner,
    };

    inner.trim().trim_end_matches('`').trim()
}

fn is_language_tag(line: &str) -> bool {
    line.trim()
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(json: Value) -> ChatResponse {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn payload_offers_one_function_tool() {
        let payload = demo_payload("local-model", "weather?");

        assert_eq!(payload["model"], "local-model");
        assert_eq!(payload["tool_choice"], "auto");
        assert_eq!(payload["parallel_tool_calls"], false);
        assert_eq!(payload["stream"], false);
        assert_eq!(payload["messages"][0]["role"], "system");
        assert_eq!(payload["messages"][1]["content"], "weather?");
        assert_eq!(payload["tools"][0]["function"]["name"], DEMO_TOOL);
        assert_eq!(
            payload["tools"][0]["function"]["parameters"]["required"],
            json!(["location"])
        );
    }

    #[test]
    fn strips_json_fence() {
        let reply = "```json\n{\"tool\": \"x\"}\n```";
        assert_eq!(extract_json_from_markdown(reply), "{\"tool\": \"x\"}");
    }

    #[test]
    fn strips_json_fence_on_one_line() {
        let reply = "```json{\"tool\": \"x\"}```";
        assert_eq!(extract_json_from_markdown(reply), "{\"tool\": \"x\"}");
    }

    #[test]
    fn strips_other_language_tags() {
        let reply = "```jsonc\n{\"a\": 1}\n```";
        assert_eq!(extract_json_from_markdown(reply), "{\"a\": 1}");
    }

    #[test]
    fn keeps_payload_on_the_opening_line() {
        let reply = "```{\"a\": 1}\n```";
        assert_eq!(extract_json_from_markdown(reply), "{\"a\": 1}");
    }

    #[test]
    fn strips_bare_fence() {
        let reply = "  ```\n{\"a\": 1}\n```  ";
        assert_eq!(extract_json_from_markdown(reply), "{\"a\": 1}");
    }

    #[test]
    fn unfenced_text_is_trimmed() {
        assert_eq!(extract_json_from_markdown("  {\"a\": 1}\n"), "{\"a\": 1}");
    }

    #[test]
    fn structured_tool_call_wins() {
        let resp = response(json!({
            "choices": [{ "message": {
                "content": null,
                "tool_calls": [{ "id": "c1", "type": "function", "function": {
                    "name": "get_current_weather",
                    "arguments": "{\"location\":\"Paris, France\"}"
                }}]
            }}]
        }));

        assert_eq!(
            interpret(&resp).unwrap(),
            DemoOutcome::ToolCall {
                name: "get_current_weather".to_string(),
                arguments: json!({ "location": "Paris, France" }),
            }
        );
    }

    #[test]
    fn fenced_json_content_is_a_tool_call() {
        let resp = response(json!({
            "choices": [{ "message": {
                "content": "```json\n{\"name\": \"get_current_weather\", \"arguments\": {\"location\": \"Oslo\"}}\n```"
            }}]
        }));

        assert_eq!(
            interpret(&resp).unwrap(),
            DemoOutcome::ToolCall {
                name: "get_current_weather".to_string(),
                arguments: json!({ "location": "Oslo" }),
            }
        );
    }

    #[test]
    fn single_line_fenced_content_is_a_tool_call() {
        let resp = response(json!({
            "choices": [{ "message": {
                "content": "```json{\"name\":\"get_current_weather\",\"arguments\":{\"location\":\"Oslo\"}}```"
            }}]
        }));

        assert_eq!(
            interpret(&resp).unwrap(),
            DemoOutcome::ToolCall {
                name: "get_current_weather".to_string(),
                arguments: json!({ "location": "Oslo" }),
            }
        );
    }

    #[test]
    fn tool_keyed_content_keeps_other_fields_as_arguments() {
        let resp = response(json!({
            "choices": [{ "message": {
                "content": "{\"tool\": \"get_current_weather\", \"location\": \"Lima\"}"
            }}]
        }));

        assert_eq!(
            interpret(&resp).unwrap(),
            DemoOutcome::ToolCall {
                name: "get_current_weather".to_string(),
                arguments: json!({ "location": "Lima" }),
            }
        );
    }

    #[test]
    fn prose_is_an_answer() {
        let resp = response(json!({
            "choices": [{ "message": { "content": "It is sunny.\n" } }]
        }));
        assert_eq!(
            interpret(&resp).unwrap(),
            DemoOutcome::Answer("It is sunny.".to_string())
        );
    }

    #[test]
    fn empty_choices_is_an_error() {
        let resp = response(json!({ "choices": [] }));
        assert!(interpret(&resp).is_err());
    }

    #[test]
    fn endpoint_ignores_trailing_slash() {
        let client = ChatClient::new("http://127.0.0.1:8080/", Duration::from_secs(1)).unwrap();
        assert_eq!(client.endpoint(), "http://127.0.0.1:8080/v1/chat/completions");
    }
}
