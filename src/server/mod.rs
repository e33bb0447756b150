//! Running the inference server and talking to it.

pub mod chat;
pub mod launch;

pub use chat::{
    demo_payload, extract_json_from_markdown, ChatClient, ChatMessage, DemoOutcome, DEFAULT_PROMPT,
};
pub use launch::{resolve_server, ServerLaunch, SERVER_BINARY};
