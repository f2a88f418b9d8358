use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};

use crate::VideoReference;
use crate::error::{SummarizeError, TranscriptError};
use crate::search::VideoSearch;
use crate::summarize::{SummaryModel, title_prompt, transcript_prompt};
use crate::transcript::{Transcript, TranscriptFetcher};

/// The one fallback strategy active in this deployment. The original designs
/// are mutually exclusive alternatives, never combined.
pub enum Fallback {
    /// Pass the raw title straight to the model; no resolution at all.
    TitleEcho,
    /// Resolve via a search backend (keyed API or scrape) first.
    Search(Arc<dyn VideoSearch>),
}

/// What /summarize hands back to the HTTP layer.
#[derive(Debug, Clone)]
pub struct Summary {
    pub video_id: Option<String>,
    pub video_title: Option<String>,
    pub summary: String,
    /// True when the summary was synthesized from a title alone, with no
    /// transcript backing it.
    pub speculative: bool,
}

/// Sequences extraction, transcript fetch, fallback resolution, and the
/// summary request. Holds no per-request state.
pub struct Pipeline {
    fetcher: Arc<dyn TranscriptFetcher>,
    fallback: Fallback,
    model: Arc<dyn SummaryModel>,
    default_lang: String,
    fetch_attempts: u32,
}

impl Pipeline {
    pub fn new(
        fetcher: Arc<dyn TranscriptFetcher>,
        fallback: Fallback,
        model: Arc<dyn SummaryModel>,
        default_lang: String,
        fetch_attempts: u32,
    ) -> Self {
        Pipeline {
            fetcher,
            fallback,
            model,
            default_lang,
            fetch_attempts: fetch_attempts.max(1),
        }
    }

    /// Run one request through the pipeline. A URL input must yield a video
    /// ID or the request fails; a title input goes straight to the fallback.
    pub async fn summarize(
        &self,
        video_url: Option<&str>,
        video_title: Option<&str>,
        language: Option<&str>,
    ) -> Result<Summary, SummarizeError> {
        let lang = language.unwrap_or(&self.default_lang);

        if let Some(url) = video_url {
            let reference = VideoReference::new(url);
            let video_id = reference.video_id.ok_or(SummarizeError::InvalidUrl)?;

            match self.fetch_with_retry(&video_id, lang).await {
                Ok(transcript) => return self.summarize_transcript(video_id, transcript).await,
                Err(e) => {
                    info!("Transcript unavailable for {video_id}: {e}");
                    let seed = video_title.unwrap_or(url);
                    return self.resolve_and_summarize(seed, Some(video_id)).await;
                }
            }
        }

        let title = video_title.ok_or_else(|| {
            SummarizeError::InvalidInput("video_title or video_url is required".to_string())
        })?;
        self.resolve_and_summarize(title, None).await
    }

    async fn summarize_transcript(
        &self,
        video_id: String,
        transcript: Transcript,
    ) -> Result<Summary, SummarizeError> {
        let prompt = transcript_prompt(&transcript.title, &transcript.text());
        let summary = self.model.generate(&[], &prompt).await?;
        Ok(Summary {
            video_id: Some(video_id),
            video_title: (!transcript.title.is_empty()).then_some(transcript.title),
            summary,
            speculative: false,
        })
    }

    /// Exactly one strategy runs; the transcript fetcher is never re-entered.
    async fn resolve_and_summarize(
        &self,
        seed_title: &str,
        known_id: Option<String>,
    ) -> Result<Summary, SummarizeError> {
        match &self.fallback {
            Fallback::TitleEcho => {
                let prompt = title_prompt(seed_title);
                let summary = self.model.generate(&[], &prompt).await?;
                Ok(Summary {
                    video_id: known_id,
                    video_title: Some(seed_title.to_string()),
                    summary,
                    speculative: true,
                })
            }
            Fallback::Search(provider) => {
                let hit = match provider.search(seed_title).await {
                    Ok(Some(hit)) => hit,
                    Ok(None) => return Err(SummarizeError::ResolutionFailed),
                    Err(e) => {
                        // Transport failures and zero results are served the
                        // same way; the distinction only survives in logs.
                        warn!("Search fallback failed for {seed_title:?}: {e}");
                        return Err(SummarizeError::ResolutionFailed);
                    }
                };

                let prompt = title_prompt(&hit.title);
                let summary = self.model.generate(&[], &prompt).await?;
                Ok(Summary {
                    video_id: Some(hit.video_id),
                    video_title: Some(hit.title),
                    summary,
                    speculative: true,
                })
            }
        }
    }

    /// Retry transient fetch failures with exponential backoff. Disabled and
    /// NotFound are classifications, not outages, and return immediately.
    async fn fetch_with_retry(
        &self,
        video_id: &str,
        lang: &str,
    ) -> Result<Transcript, TranscriptError> {
        let mut attempt = 0;
        loop {
            match self.fetcher.fetch(video_id, lang).await {
                Ok(t) => return Ok(t),
                Err(e) if e.is_transient() && attempt + 1 < self.fetch_attempts => {
                    let delay = Duration::from_millis(500 * 2u64.pow(attempt));
                    debug!("Fetch attempt {} failed: {e}, retrying in {delay:?}", attempt + 1);
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
