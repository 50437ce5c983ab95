//! Prompt construction and response parsing for question suggestions.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use venire_types::JurorRecord;

/// Messages included from the end of a juror's thread.
pub const RECENT_MESSAGE_LIMIT: usize = 5;
/// Characters of notes included in the prompt.
pub const NOTES_SNIPPET_CHARS: usize = 800;
/// Suggestions returned at most.
pub const MAX_SUGGESTIONS: usize = 3;
pub const TEMPERATURE: f64 = 0.4;

/// Served whenever the model cannot be reached or says nothing useful.
pub const FALLBACK_QUESTIONS: [&str; 3] = [
    "Have you or someone close to you had an experience that shapes how you see injury claims?",
    "How would you weigh symptoms that show up several days after a collision?",
    "Is there anything that would make it hard to follow the judge's instructions on damages?",
];

const SYSTEM_PROMPT: &str = "You write concise voir dire follow-up questions and answer in JSON.";

/// What the model sees about one juror.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SuggestionContext {
    /// `sender: text` lines, oldest first.
    pub recent_chat: String,
    pub notes: String,
}

impl SuggestionContext {
    /// The last few messages about `record`, plus its own notes followed by
    /// the shared staff notes, cut to [`NOTES_SNIPPET_CHARS`].
    #[must_use]
    pub fn from_juror(record: &JurorRecord, staff_notes: &str) -> Self {
        let start = record.messages.len().saturating_sub(RECENT_MESSAGE_LIMIT);
        let recent_chat = record.messages[start..]
            .iter()
            .map(venire_types::Message::transcript_line)
            .collect::<Vec<_>>()
            .join("\n");

        let combined = [record.notes.trim(), staff_notes.trim()]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join("\n");
        let notes = combined.chars().take(NOTES_SNIPPET_CHARS).collect();

        Self { recent_chat, notes }
    }

    /// No messages and no notes: there is nothing to ask about.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.recent_chat.trim().is_empty() && self.notes.trim().is_empty()
    }

    fn user_prompt(&self) -> String {
        let or_none = |text: &str| {
            if text.trim().is_empty() {
                "(none)".to_string()
            } else {
                text.to_string()
            }
        };
        format!(
            "You are assisting a trial team during voir dire.\n\
             Using ONLY the material below, propose {MAX_SUGGESTIONS} short, concrete follow-up \
             questions counsel could ask THIS juror. Focus on bias, fairness, prior experiences \
             and whether they can follow instructions. Keep each under 140 characters.\n\n\
             Recent team chat:\n{}\n\n\
             Notes:\n{}\n\n\
             Respond with ONLY valid JSON:\n\
             {{\"suggestions\":[\"...\",\"...\",\"...\"]}}",
            or_none(&self.recent_chat),
            or_none(&self.notes),
        )
    }
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

/// Chat-completions request body.
#[must_use]
pub fn build_request_body(model: &str, context: &SuggestionContext) -> Value {
    let prompt = context.user_prompt();
    json!({
        "model": model,
        "temperature": TEMPERATURE,
        "messages": [
            ChatMessage { role: "system", content: SYSTEM_PROMPT },
            ChatMessage { role: "user", content: &prompt },
        ],
    })
}

#[derive(Debug, Deserialize)]
pub(crate) struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl CompletionResponse {
    pub(crate) fn content(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|choice| choice.message.content.as_deref())
            .map(str::trim)
            .filter(|content| !content.is_empty())
    }
}

/// Extract up to [`MAX_SUGGESTIONS`] questions from model output.
///
/// Output that parses as JSON (optionally wrapped in a code fence) only
/// counts when it carries a `suggestions` array; any other JSON shape yields
/// nothing. Text that is not JSON is read one question per line with bullet
/// markers removed.
#[must_use]
pub fn parse_suggestions(text: &str) -> Vec<String> {
    let text = text.trim();
    if let Ok(value) = serde_json::from_str::<Value>(strip_code_fence(text)) {
        let Some(Value::Array(items)) = value.get("suggestions") else {
            return Vec::new();
        };
        return items
            .iter()
            .map(|item| match item {
                Value::String(s) => s.trim().to_string(),
                other => other.to_string(),
            })
            .filter(|s| !s.is_empty())
            .take(MAX_SUGGESTIONS)
            .collect();
    }

    text.lines()
        .map(|line| line.trim().trim_start_matches(['-', '•', '*']).trim())
        .filter(|line| !line.is_empty() && !line.starts_with("```"))
        .take(MAX_SUGGESTIONS)
        .map(str::to_string)
        .collect()
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

#[must_use]
pub fn fallback_questions() -> Vec<String> {
    FALLBACK_QUESTIONS.iter().map(|q| (*q).to_string()).collect()
}
