use async_trait::async_trait;
use log::debug;
use scraper::{Html, Selector};
use serde::Deserialize;
use url::Url;

use crate::USER_AGENT;
use crate::error::SearchError;
use crate::extract_video_id;

/// Top-ranked search result: a resolved identifier plus canonical title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoHit {
    pub video_id: String,
    pub title: String,
}

/// Free-text video search. Both the keyed Data API and the unauthenticated
/// scrape implement this, so deployments can swap them without touching
/// callers. `Ok(None)` means no candidate was found.
#[async_trait]
pub trait VideoSearch: Send + Sync {
    async fn search(&self, query: &str) -> Result<Option<VideoHit>, SearchError>;
}

const DATA_API_ENDPOINT: &str = "https://www.googleapis.com/youtube/v3/search";
const RESULTS_PAGE: &str = "https://www.youtube.com/results";

/// Authenticated search via the YouTube Data API v3 `search.list` endpoint.
pub struct DataApiSearch {
    client: reqwest::Client,
    api_key: String,
}

impl DataApiSearch {
    pub fn new(client: reqwest::Client, api_key: String) -> Self {
        DataApiSearch { client, api_key }
    }
}

#[derive(Debug, Deserialize)]
struct SearchListResponse {
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    id: SearchItemId,
    snippet: SearchSnippet,
}

#[derive(Debug, Deserialize)]
struct SearchItemId {
    #[serde(rename = "videoId")]
    video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchSnippet {
    title: String,
}

#[async_trait]
impl VideoSearch for DataApiSearch {
    async fn search(&self, query: &str) -> Result<Option<VideoHit>, SearchError> {
        debug!("Data API search: {query}");

        let resp = self
            .client
            .get(DATA_API_ENDPOINT)
            .query(&[
                ("part", "snippet"),
                ("type", "video"),
                ("maxResults", "1"),
                ("q", query),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| SearchError(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(SearchError(format!("YouTube search API returned {status}: {body}")));
        }

        let listing: SearchListResponse =
            resp.json().await.map_err(|e| SearchError(e.to_string()))?;

        Ok(listing.items.into_iter().next().and_then(|item| {
            let video_id = item.id.video_id?;
            Some(VideoHit {
                video_id,
                title: item.snippet.title,
            })
        }))
    }
}

/// Unauthenticated scrape of the search-results page.
///
/// Depends on undocumented HTML structure and will break silently when the
/// markup changes; an empty result is indistinguishable from a layout change.
pub struct ScrapeSearch {
    client: reqwest::Client,
}

impl ScrapeSearch {
    pub fn new(client: reqwest::Client) -> Self {
        ScrapeSearch { client }
    }
}

#[async_trait]
impl VideoSearch for ScrapeSearch {
    async fn search(&self, query: &str) -> Result<Option<VideoHit>, SearchError> {
        debug!("Scraping results page for: {query}");

        let resp = self
            .client
            .get(RESULTS_PAGE)
            .query(&[("search_query", query)])
            .header("User-Agent", USER_AGENT)
            .send()
            .await
            .map_err(|e| SearchError(e.to_string()))?
            .error_for_status()
            .map_err(|e| SearchError(e.to_string()))?;

        let html = resp.text().await.map_err(|e| SearchError(e.to_string()))?;
        Ok(first_watch_anchor(&html))
    }
}

/// First anchor whose target contains `/watch?v=`, as (id, title). The title
/// comes from the anchor's `title` attribute when present, else its text.
fn first_watch_anchor(html: &str) -> Option<VideoHit> {
    let doc = Html::parse_document(html);
    let selector = Selector::parse(r#"a[href*="/watch?v="]"#).ok()?;

    for anchor in doc.select(&selector) {
        let href = anchor.value().attr("href")?;
        let absolute = Url::parse("https://www.youtube.com")
            .ok()?
            .join(href)
            .ok()?;
        let Some(video_id) = extract_video_id(absolute.as_str()) else {
            continue;
        };

        let title = match anchor.value().attr("title") {
            Some(t) if !t.trim().is_empty() => t.trim().to_string(),
            _ => anchor.text().collect::<String>().trim().to_string(),
        };

        return Some(VideoHit { video_id, title });
    }

    None
}
