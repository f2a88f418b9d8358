use thiserror::Error;

/// Classified transcript-retrieval failures.
///
/// `Disabled` and `NotFound` are terminal for the fetch stage; only
/// `Fetch` (transport or parse trouble) is worth retrying.
#[derive(Debug, Error)]
pub enum TranscriptError {
    #[error("transcripts are disabled for this video")]
    Disabled,
    #[error("no transcript found for this video")]
    NotFound,
    #[error("transcript fetch failed: {0}")]
    Fetch(String),
}

impl TranscriptError {
    pub fn is_transient(&self) -> bool {
        matches!(self, TranscriptError::Fetch(_))
    }
}

/// Transport or protocol failure from a search backend. Zero results is not
/// an error; it is `Ok(None)` from the provider.
#[derive(Debug, Error)]
#[error("search request failed: {0}")]
pub struct SearchError(pub String);

/// Transport or quota failure from the generative model service.
#[derive(Debug, Error)]
#[error("model request failed: {0}")]
pub struct ModelError(pub String);

/// Request-level failure, one variant per user-facing category. The HTTP
/// layer maps these to status codes (400 / 400 / 404 / 500).
#[derive(Debug, Error)]
pub enum SummarizeError {
    #[error("{0}")]
    InvalidInput(String),
    #[error("could not extract a video ID from the provided URL")]
    InvalidUrl,
    #[error("No YouTube video found for this title.")]
    ResolutionFailed,
    #[error("upstream service error: {0}")]
    Upstream(String),
}

impl From<ModelError> for SummarizeError {
    fn from(e: ModelError) -> Self {
        SummarizeError::Upstream(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_fetch_errors_are_transient() {
        assert!(TranscriptError::Fetch("timeout".into()).is_transient());
        assert!(!TranscriptError::Disabled.is_transient());
        assert!(!TranscriptError::NotFound.is_transient());
    }

    #[test]
    fn test_resolution_failed_message() {
        // This exact text is part of the HTTP contract for 404 responses.
        assert_eq!(
            SummarizeError::ResolutionFailed.to_string(),
            "No YouTube video found for this title."
        );
    }

    #[test]
    fn test_model_error_maps_to_upstream() {
        let e: SummarizeError = ModelError("quota exceeded".into()).into();
        assert!(matches!(e, SummarizeError::Upstream(_)));
        assert!(e.to_string().contains("quota exceeded"));
    }
}
