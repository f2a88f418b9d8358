use async_trait::async_trait;
use log::debug;

use crate::error::ModelError;

pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

const SYSTEM_PROMPT: &str = "You are a helpful assistant that summarizes YouTube videos. \
Provide a clear, structured summary that captures the key points, main arguments, and important details.";

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Who said what in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Model,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Model => "model",
        }
    }
}

/// One turn of a conversation, as the model API sees it.
#[derive(Debug, Clone)]
pub struct ChatTurn {
    pub role: Role,
    pub text: String,
}

/// Generative-text backend. `history` is the per-call conversation context;
/// summarization passes an empty history so requests never leak into each
/// other, and /chat passes the caller's own session turns.
#[async_trait]
pub trait SummaryModel: Send + Sync {
    async fn generate(&self, history: &[ChatTurn], prompt: &str) -> Result<String, ModelError>;
}

/// Prompt for a resolved transcript.
pub fn transcript_prompt(title: &str, transcript_text: &str) -> String {
    format!("Summarize this transcript from the video \"{title}\":\n\n{transcript_text}")
}

/// Prompt for a title-only fallback. The model has nothing but the title to
/// go on, so callers must surface the result as speculative.
pub fn title_prompt(title: &str) -> String {
    format!("Provide a detailed summary based on the video titled '{title}', as if you've watched it.")
}

/// Gemini `generateContent` client, one request-response per call.
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

impl GeminiClient {
    pub fn new(client: reqwest::Client, api_key: String, model: String) -> Self {
        GeminiClient {
            client,
            api_key,
            model,
        }
    }
}

#[async_trait]
impl SummaryModel for GeminiClient {
    async fn generate(&self, history: &[ChatTurn], prompt: &str) -> Result<String, ModelError> {
        debug!("Requesting summary from Gemini model {}", self.model);

        let mut contents: Vec<serde_json::Value> = history
            .iter()
            .map(|turn| {
                serde_json::json!({
                    "role": turn.role.as_str(),
                    "parts": [{"text": turn.text}]
                })
            })
            .collect();
        contents.push(serde_json::json!({
            "role": "user",
            "parts": [{"text": prompt}]
        }));

        let body = serde_json::json!({
            "contents": contents,
            "systemInstruction": {
                "parts": [{"text": SYSTEM_PROMPT}]
            },
            "generationConfig": {
                "temperature": 1.0,
                "topP": 0.95,
                "topK": 40,
                "maxOutputTokens": 8192,
                "responseMimeType": "text/plain"
            }
        });

        let url = format!(
            "{GEMINI_BASE_URL}/{}:generateContent?key={}",
            self.model, self.api_key
        );

        let resp = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| ModelError(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(ModelError(format!("Gemini API returned {status}: {body}")));
        }

        let json: serde_json::Value = resp.json().await.map_err(|e| ModelError(e.to_string()))?;
        extract_gemini_text(&json)
    }
}

fn extract_gemini_text(json: &serde_json::Value) -> Result<String, ModelError> {
    if let Some(parts) = json
        .get("candidates")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("content"))
        .and_then(|c| c.get("parts"))
        .and_then(|p| p.as_array())
    {
        let text: String = parts
            .iter()
            .filter_map(|part| part.get("text").and_then(|t| t.as_str()))
            .collect::<Vec<_>>()
            .join("");
        if !text.is_empty() {
            return Ok(text);
        }
    }
    Err(ModelError("unexpected Gemini API response format".to_string()))
}
