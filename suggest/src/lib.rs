//! Voir dire question suggestions.
//!
//! [`SuggestClient::suggest`] asks an OpenAI-compatible chat-completions
//! endpoint for up to three follow-up questions about one juror. It never
//! fails: a missing key, a transport or HTTP error, or an unusable reply all
//! degrade to [`prompt::FALLBACK_QUESTIONS`], and the reason is logged.
//!
//! [`SuggestionScheduler`] wraps the client for interactive use. It debounces
//! requests, aborts superseded ones, and tags results so a stale answer for a
//! previously selected juror is never shown.

pub mod prompt;
pub mod retry;
mod task;

use std::time::Duration;

use thiserror::Error;

pub use prompt::{SuggestionContext, parse_suggestions};
pub use task::{SuggestionResult, SuggestionScheduler};
use venire_types::SuggestSettings;

const CONNECT_TIMEOUT_SECS: u64 = 10;
const POOL_MAX_IDLE_PER_HOST: usize = 4;
const POOL_IDLE_TIMEOUT_SECS: u64 = 90;
const MAX_ERROR_BODY_BYTES: usize = 8 * 1024;

/// Why the built-in questions were served.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackReason {
    MissingApiKey,
    Transport,
    HttpStatus(u16),
    MalformedResponse,
    EmptyResponse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuggestionSource {
    Model,
    Fallback(FallbackReason),
    /// Nothing to ask about yet; no request was made.
    NoContext,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestions {
    pub questions: Vec<String>,
    pub source: SuggestionSource,
}

impl Suggestions {
    fn fallback(reason: FallbackReason) -> Self {
        Self {
            questions: prompt::fallback_questions(),
            source: SuggestionSource::Fallback(reason),
        }
    }
}

#[derive(Debug, Error)]
enum SuggestError {
    #[error("no API key configured")]
    MissingApiKey,
    #[error("request failed after {attempts} attempt(s): {source}")]
    Transport {
        attempts: u32,
        source: reqwest::Error,
    },
    #[error("API returned {status}: {body}")]
    Http { status: u16, body: String },
    #[error("could not decode completion: {0}")]
    Malformed(String),
    #[error("completion contained no questions")]
    Empty,
}

impl SuggestError {
    const fn reason(&self) -> FallbackReason {
        match self {
            Self::MissingApiKey => FallbackReason::MissingApiKey,
            Self::Transport { .. } => FallbackReason::Transport,
            Self::Http { status, .. } => FallbackReason::HttpStatus(*status),
            Self::Malformed(_) => FallbackReason::MalformedResponse,
            Self::Empty => FallbackReason::EmptyResponse,
        }
    }
}

/// Client for the suggestion endpoint.
#[derive(Debug, Clone)]
pub struct SuggestClient {
    http: reqwest::Client,
    settings: SuggestSettings,
    retry: retry::RetryConfig,
}

impl SuggestClient {
    pub fn new(settings: SuggestSettings) -> Result<Self, reqwest::Error> {
        let http = client_builder(&settings.base_url)
            .timeout(settings.timeout)
            .build()?;
        Ok(Self {
            http,
            settings,
            retry: retry::RetryConfig::default(),
        })
    }

    #[must_use]
    pub fn with_retry_config(mut self, retry: retry::RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    #[must_use]
    pub fn settings(&self) -> &SuggestSettings {
        &self.settings
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.settings.base_url.trim_end_matches('/')
        )
    }

    /// Suggest follow-up questions for `context`.
    pub async fn suggest(&self, context: &SuggestionContext) -> Suggestions {
        if context.is_empty() {
            return Suggestions {
                questions: Vec::new(),
                source: SuggestionSource::NoContext,
            };
        }

        match self.request(context).await {
            Ok(questions) => Suggestions {
                questions,
                source: SuggestionSource::Model,
            },
            Err(e) => {
                tracing::warn!(error = %e, "Suggestion request failed; serving fallback questions");
                Suggestions::fallback(e.reason())
            }
        }
    }

    async fn request(&self, context: &SuggestionContext) -> Result<Vec<String>, SuggestError> {
        let api_key = self
            .settings
            .api_key
            .as_ref()
            .ok_or(SuggestError::MissingApiKey)?;
        let url = self.endpoint();
        let body = prompt::build_request_body(&self.settings.model, context);

        let outcome = retry::send_with_retry(
            || {
                self.http
                    .post(&url)
                    .bearer_auth(api_key.expose_secret())
                    .json(&body)
            },
            &self.retry,
        )
        .await;

        let response = match outcome {
            retry::RetryOutcome::Success(response) => response,
            retry::RetryOutcome::HttpError(response) => {
                let status = response.status().as_u16();
                let body = read_capped_error_body(response).await;
                return Err(SuggestError::Http { status, body });
            }
            retry::RetryOutcome::ConnectionError { attempts, source } => {
                return Err(SuggestError::Transport { attempts, source });
            }
            retry::RetryOutcome::NonRetryable(source) => {
                return Err(SuggestError::Transport {
                    attempts: 1,
                    source,
                });
            }
        };

        let completion: prompt::CompletionResponse = response
            .json()
            .await
            .map_err(|e| SuggestError::Malformed(e.to_string()))?;
        let content = completion.content().ok_or(SuggestError::Empty)?;
        let questions = parse_suggestions(content);
        if questions.is_empty() {
            return Err(SuggestError::Empty);
        }
        tracing::debug!(count = questions.len(), "Received suggestions");
        Ok(questions)
    }
}

/// Hardened builder: no redirects, HTTPS only unless the endpoint is
/// loopback (a local model server or a test double).
fn client_builder(base_url: &str) -> reqwest::ClientBuilder {
    use reqwest::header::{HeaderMap, HeaderValue};

    let mut default_headers = HeaderMap::new();
    default_headers.insert(
        reqwest::header::USER_AGENT,
        HeaderValue::from_static(concat!("venire/", env!("CARGO_PKG_VERSION"))),
    );

    reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
        .redirect(reqwest::redirect::Policy::none())
        .https_only(!is_loopback(base_url))
        .pool_max_idle_per_host(POOL_MAX_IDLE_PER_HOST)
        .pool_idle_timeout(Some(Duration::from_secs(POOL_IDLE_TIMEOUT_SECS)))
        .default_headers(default_headers)
}

fn is_loopback(base_url: &str) -> bool {
    let Ok(url) = reqwest::Url::parse(base_url) else {
        return false;
    };
    let Some(host) = url.host_str() else {
        return false;
    };
    let host = host.trim_start_matches('[').trim_end_matches(']');
    host.eq_ignore_ascii_case("localhost")
        || host
            .parse::<std::net::IpAddr>()
            .is_ok_and(|ip| ip.is_loopback())
}

/// Read at most [`MAX_ERROR_BODY_BYTES`] of an error response.
async fn read_capped_error_body(mut response: reqwest::Response) -> String {
    let mut body = Vec::new();
    while let Ok(Some(chunk)) = response.chunk().await {
        body.extend_from_slice(&chunk);
        if body.len() > MAX_ERROR_BODY_BYTES {
            body.truncate(MAX_ERROR_BODY_BYTES);
            let text = String::from_utf8_lossy(&body);
            return format!("{text}...(truncated)");
        }
    }
    String::from_utf8_lossy(&body).into_owned()
}
