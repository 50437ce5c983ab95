//! Suggestion client against a mock completion API

use std::time::Duration;

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use venire_config::VenireConfig;
use venire_core::Action;
use venire_suggest::prompt::FALLBACK_QUESTIONS;
use venire_suggest::retry::RetryConfig;
use venire_suggest::{
    FallbackReason, SuggestClient, SuggestionContext, SuggestionScheduler, SuggestionSource,
};

use crate::common::{default_store, id, message, mount_completion, suggest_settings};

fn no_retry() -> RetryConfig {
    RetryConfig {
        max_retries: 0,
        ..RetryConfig::default()
    }
}

#[tokio::test]
async fn juror_thread_becomes_model_questions() {
    let server = MockServer::start().await;
    mount_completion(
        &server,
        r#"{"suggestions":["Who in your family drives for a living?","How did the claim resolve?"]}"#,
    )
    .await;

    let mut store = default_store();
    store
        .dispatch(message(id(12), "Lead", "Sister had a whiplash claim"))
        .unwrap();
    let state = store.state();
    let context = SuggestionContext::from_juror(state.juror(id(12)).unwrap(), state.staff_notes());

    let client = SuggestClient::new(suggest_settings(&server)).unwrap();
    let suggestions = client.suggest(&context).await;
    assert_eq!(suggestions.source, SuggestionSource::Model);
    assert_eq!(suggestions.questions.len(), 2);

    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body["model"], "gpt-4o-mini");
    let prompt = body["messages"][1]["content"].as_str().unwrap();
    assert!(prompt.contains("Lead: Sister had a whiplash claim"));
}

#[tokio::test]
async fn settings_flow_from_config_file() {
    let server = MockServer::start().await;
    mount_completion(&server, "- One?\n- Two?\n- Three?\n- Four?").await;

    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("config.toml");
    std::fs::write(
        &config_path,
        format!(
            "[suggest]\napi_key = \"{}\"\nbase_url = \"{}/\"\ndebounce_ms = 0\n",
            crate::common::TEST_API_KEY,
            server.uri()
        ),
    )
    .unwrap();
    let settings = VenireConfig::load_from(&config_path)
        .unwrap()
        .unwrap()
        .resolve()
        .unwrap();
    assert_eq!(settings.suggest.debounce, Duration::ZERO);

    let client = SuggestClient::new(settings.suggest).unwrap();
    let suggestions = client
        .suggest(&SuggestionContext {
            recent_chat: String::new(),
            notes: "Works at a hospital".to_string(),
        })
        .await;
    assert_eq!(suggestions.questions, vec!["One?", "Two?", "Three?"]);
}

#[tokio::test]
async fn garbage_reply_serves_fallback() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let client = SuggestClient::new(suggest_settings(&server))
        .unwrap()
        .with_retry_config(no_retry());
    let suggestions = client
        .suggest(&SuggestionContext {
            recent_chat: "Lead: hesitant about damages".to_string(),
            notes: String::new(),
        })
        .await;
    assert_eq!(
        suggestions.source,
        SuggestionSource::Fallback(FallbackReason::MalformedResponse)
    );
    assert_eq!(suggestions.questions, FALLBACK_QUESTIONS.to_vec());
}

#[tokio::test]
async fn blank_completion_serves_fallback() {
    let server = MockServer::start().await;
    mount_completion(&server, "   ").await;

    let client = SuggestClient::new(suggest_settings(&server)).unwrap();
    let suggestions = client
        .suggest(&SuggestionContext {
            recent_chat: "Lead: quiet".to_string(),
            notes: String::new(),
        })
        .await;
    assert_eq!(
        suggestions.source,
        SuggestionSource::Fallback(FallbackReason::EmptyResponse)
    );
}

#[tokio::test]
async fn json_in_the_wrong_shape_serves_fallback() {
    let server = MockServer::start().await;
    mount_completion(&server, r#"{"questions": ["Do you drive for work?"]}"#).await;

    let client = SuggestClient::new(suggest_settings(&server)).unwrap();
    let suggestions = client
        .suggest(&SuggestionContext {
            recent_chat: "Lead: commutes two hours".to_string(),
            notes: String::new(),
        })
        .await;
    assert_eq!(
        suggestions.source,
        SuggestionSource::Fallback(FallbackReason::EmptyResponse)
    );
    assert_eq!(suggestions.questions, FALLBACK_QUESTIONS.to_vec());
}

#[tokio::test]
async fn rate_limit_is_retried_then_answered() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after-ms", "5"))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_completion(&server, r#"{"suggestions":["After the retry?"]}"#).await;

    let client = SuggestClient::new(suggest_settings(&server)).unwrap();
    let suggestions = client
        .suggest(&SuggestionContext {
            recent_chat: "Lead: nurse".to_string(),
            notes: String::new(),
        })
        .await;
    assert_eq!(suggestions.questions, vec!["After the retry?"]);
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn switching_jurors_discards_the_earlier_fetch() {
    let server = MockServer::start().await;
    mount_completion(&server, r#"{"suggestions":["For the newest selection?"]}"#).await;

    let mut store = default_store();
    store.dispatch(message(id(1), "Lead", "Retired officer")).unwrap();
    store.dispatch(message(id(2), "Second", "Uber driver")).unwrap();
    store.dispatch(Action::Select(id(1))).unwrap();

    let client = SuggestClient::new(suggest_settings(&server)).unwrap();
    let mut scheduler = SuggestionScheduler::new(client).with_debounce(Duration::from_millis(100));

    let state = store.state();
    scheduler.request(
        id(1),
        SuggestionContext::from_juror(state.juror(id(1)).unwrap(), state.staff_notes()),
    );
    store.dispatch(Action::Select(id(2))).unwrap();
    let state = store.state();
    scheduler.request(
        id(2),
        SuggestionContext::from_juror(state.juror(id(2)).unwrap(), state.staff_notes()),
    );

    let suggestions = scheduler.next().await.unwrap();
    assert_eq!(suggestions.questions, vec!["For the newest selection?"]);
    assert_eq!(scheduler.current_juror(), Some(id(2)));

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert!(
        body["messages"][1]["content"]
            .as_str()
            .unwrap()
            .contains("Uber driver")
    );
}
