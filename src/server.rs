use std::sync::Arc;

use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::Json;
use log::info;
use serde::{Deserialize, Serialize};

use crate::error::SummarizeError;
use crate::pipeline::Pipeline;
use crate::session::SessionStore;
use crate::summarize::SummaryModel;

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
    pub model: Arc<dyn SummaryModel>,
    pub sessions: Arc<SessionStore>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/summarize", post(summarize))
        .route("/chat", post(chat))
        .with_state(state)
}

impl IntoResponse for SummarizeError {
    fn into_response(self) -> Response {
        let status = match &self {
            SummarizeError::InvalidInput(_) | SummarizeError::InvalidUrl => StatusCode::BAD_REQUEST,
            SummarizeError::ResolutionFailed => StatusCode::NOT_FOUND,
            SummarizeError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

const LANDING_PAGE: &str = r#"<!doctype html>
<html>
<head><title>ytsum</title></head>
<body>
  <h1>ytsum</h1>
  <p>POST a JSON body with <code>video_url</code> or <code>video_title</code> to <code>/summarize</code>.</p>
</body>
</html>
"#;

async fn home() -> Html<&'static str> {
    Html(LANDING_PAGE)
}

#[derive(Debug, Deserialize)]
pub struct SummarizeRequest {
    pub video_url: Option<String>,
    pub video_title: Option<String>,
    pub language: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SummarizeResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    pub summary: String,
    pub speculative: bool,
}

async fn summarize(
    State(state): State<AppState>,
    Json(req): Json<SummarizeRequest>,
) -> Result<Json<SummarizeResponse>, SummarizeError> {
    // Reject empty requests before anything upstream is touched.
    if req.video_url.is_none() && req.video_title.is_none() {
        return Err(SummarizeError::InvalidInput(
            "video_title or video_url is required".to_string(),
        ));
    }

    let out = state
        .pipeline
        .summarize(
            req.video_url.as_deref(),
            req.video_title.as_deref(),
            req.language.as_deref(),
        )
        .await?;

    info!(
        "Summarized {} (speculative={})",
        out.video_id.as_deref().unwrap_or("<unresolved>"),
        out.speculative
    );

    let video_url = out
        .video_id
        .as_ref()
        .map(|id| format!("https://www.youtube.com/watch?v={id}"));

    Ok(Json(SummarizeResponse {
        video_id: out.video_id,
        video_title: out.video_title,
        video_url,
        summary: out.summary,
        speculative: out.speculative,
    }))
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
}

async fn chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, SummarizeError> {
    if req.message.trim().is_empty() {
        return Err(SummarizeError::InvalidInput("message is required".to_string()));
    }

    let history = match req.session_id.as_deref() {
        Some(id) => state.sessions.history(id),
        None => Vec::new(),
    };

    let reply = state.model.generate(&history, &req.message).await?;

    if let Some(id) = req.session_id.as_deref() {
        state.sessions.append_exchange(id, &req.message, &reply);
    }

    Ok(Json(ChatResponse { response: reply }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use crate::error::{ModelError, SearchError, TranscriptError};
    use crate::pipeline::Fallback;
    use crate::search::{VideoHit, VideoSearch};
    use crate::summarize::ChatTurn;
    use crate::transcript::{Segment, Transcript, TranscriptFetcher};

    struct StubFetcher {
        captions: Option<Vec<&'static str>>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl TranscriptFetcher for StubFetcher {
        async fn fetch(&self, video_id: &str, _lang: &str) -> Result<Transcript, TranscriptError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.captions {
                Some(texts) => Ok(Transcript {
                    video_id: video_id.to_string(),
                    title: "Stub Video".to_string(),
                    language: "en".to_string(),
                    segments: texts
                        .iter()
                        .enumerate()
                        .map(|(i, t)| Segment {
                            text: t.to_string(),
                            start: i as f64,
                            duration: 1.0,
                        })
                        .collect(),
                }),
                None => Err(TranscriptError::Disabled),
            }
        }
    }

    struct StubSearch {
        hit: Option<VideoHit>,
    }

    #[async_trait]
    impl VideoSearch for StubSearch {
        async fn search(&self, _query: &str) -> Result<Option<VideoHit>, SearchError> {
            Ok(self.hit.clone())
        }
    }

    struct StubModel;

    #[async_trait]
    impl SummaryModel for StubModel {
        async fn generate(&self, history: &[ChatTurn], prompt: &str) -> Result<String, ModelError> {
            Ok(format!("summary[{}]: {prompt}", history.len()))
        }
    }

    fn app(captions: Option<Vec<&'static str>>, hit: Option<VideoHit>) -> (Router, Arc<StubFetcher>) {
        let fetcher = Arc::new(StubFetcher {
            captions,
            calls: AtomicUsize::new(0),
        });
        let model: Arc<dyn SummaryModel> = Arc::new(StubModel);
        let pipeline = Arc::new(Pipeline::new(
            fetcher.clone(),
            Fallback::Search(Arc::new(StubSearch { hit })),
            model.clone(),
            "en".to_string(),
            1,
        ));
        let state = AppState {
            pipeline,
            model,
            sessions: Arc::new(SessionStore::new()),
        };
        (router(state), fetcher)
    }

    async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> (StatusCode, serde_json::Value) {
        let resp = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = resp.status();
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, json)
    }

    #[tokio::test]
    async fn test_summarize_from_url_with_captions() {
        let (app, _) = app(Some(vec!["Hello", "world"]), None);
        let (status, body) = post_json(
            app,
            "/summarize",
            serde_json::json!({"video_url": "https://youtu.be/abc123?t=5"}),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["video_id"], "abc123");
        assert_eq!(body["speculative"], false);
        let summary = body["summary"].as_str().unwrap();
        assert!(summary.contains("Hello world"));
        assert_eq!(body["video_url"], "https://www.youtube.com/watch?v=abc123");
    }

    #[tokio::test]
    async fn test_summarize_title_search_miss_is_404() {
        let (app, _) = app(None, None);
        let (status, body) = post_json(
            app,
            "/summarize",
            serde_json::json!({"video_title": "Some Rare Video"}),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "No YouTube video found for this title.");
    }

    #[tokio::test]
    async fn test_summarize_missing_fields_is_400_before_any_call() {
        let (app, fetcher) = app(Some(vec!["unused"]), None);
        let (status, body) = post_json(app, "/summarize", serde_json::json!({})).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("required"));
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_summarize_invalid_url_is_400() {
        let (app, _) = app(Some(vec!["unused"]), None);
        let (status, body) = post_json(
            app,
            "/summarize",
            serde_json::json!({"video_url": "https://example.com/nope"}),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("video ID"));
    }

    #[tokio::test]
    async fn test_summarize_fallback_hit_is_speculative() {
        let (app, _) = app(
            None,
            Some(VideoHit {
                video_id: "resolved0001".to_string(),
                title: "Resolved Title".to_string(),
            }),
        );
        let (status, body) = post_json(
            app,
            "/summarize",
            serde_json::json!({"video_title": "Some Rare Video"}),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["video_id"], "resolved0001");
        assert_eq!(body["video_title"], "Resolved Title");
        assert_eq!(body["speculative"], true);
    }

    #[tokio::test]
    async fn test_chat_roundtrip_accumulates_session() {
        let (app, _) = app(None, None);

        let (status, body) = post_json(
            app.clone(),
            "/chat",
            serde_json::json!({"message": "hello", "session_id": "s1"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["response"].as_str().unwrap().contains("summary[0]"));

        // Second message in the same session sees two turns of history.
        let (status, body) = post_json(
            app,
            "/chat",
            serde_json::json!({"message": "again", "session_id": "s1"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["response"].as_str().unwrap().contains("summary[2]"));
    }

    #[tokio::test]
    async fn test_chat_empty_message_is_400() {
        let (app, _) = app(None, None);
        let (status, _) = post_json(app, "/chat", serde_json::json!({"message": "  "})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_home_serves_landing_page() {
        let (app, _) = app(None, None);
        let resp = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }
}
