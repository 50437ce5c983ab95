//! Shared test utilities and fixtures
//!
//! Common infrastructure for integration tests.

#![allow(dead_code)]

use std::time::SystemTime;

use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use venire_core::{Action, JuryState, JuryStore};
use venire_types::{
    ApiKey, GridLayout, JurorId, MessageKind, SeatingLimits, StartCorner, StrikeAllowance,
    SuggestSettings,
};

pub const TEST_API_KEY: &str = "sk-test-venire";

pub fn id(n: u32) -> JurorId {
    JurorId::new(n).expect("positive juror id")
}

/// The courtroom default: 7 x 5, numbered from the bottom-left.
pub fn default_store() -> JuryStore {
    JuryStore::new(JuryState::seeded(
        GridLayout::default(),
        StrikeAllowance::default(),
        SeatingLimits::default(),
    ))
}

pub fn store_with(columns: u32, rows: u32, corner: StartCorner, peremptory: u32) -> JuryStore {
    JuryStore::new(JuryState::seeded(
        GridLayout::new(columns, rows, corner).expect("valid grid"),
        StrikeAllowance::new(peremptory, peremptory).expect("positive allowance"),
        SeatingLimits::default(),
    ))
}

pub fn message(id: JurorId, sender: &str, text: &str) -> Action {
    Action::PostMessage {
        id,
        sender: sender.to_string(),
        text: text.to_string(),
        kind: MessageKind::Normal,
        at: SystemTime::now(),
    }
}

/// Suggestion settings pointed at a mock server, with a key.
pub fn suggest_settings(server: &MockServer) -> SuggestSettings {
    SuggestSettings {
        api_key: ApiKey::new(TEST_API_KEY),
        base_url: server.uri(),
        ..SuggestSettings::default()
    }
}

/// A chat-completions response whose message content is `content`.
pub fn completion_body(content: &str) -> serde_json::Value {
    serde_json::json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "created": 1_700_000_000,
        "model": "gpt-4o-mini",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }],
        "usage": { "prompt_tokens": 50, "completion_tokens": 30, "total_tokens": 80 }
    })
}

pub async fn mount_completion(server: &MockServer, content: &str) {
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header(
            "authorization",
            format!("Bearer {TEST_API_KEY}").as_str(),
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body(content)))
        .mount(server)
        .await;
}
