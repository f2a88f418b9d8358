pub mod config;
pub mod error;
pub mod pipeline;
pub mod search;
pub mod server;
pub mod session;
pub mod summarize;
pub mod transcript;

use url::Url;

/// Browser User-Agent sent on watch-page and scrape requests. YouTube serves
/// a reduced page to unknown clients.
pub(crate) const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

/// A user-supplied video reference, before and after resolution.
#[derive(Debug, Clone)]
pub struct VideoReference {
    pub raw_input: String,
    pub video_id: Option<String>,
    pub resolved_title: Option<String>,
}

impl VideoReference {
    pub fn new(raw_input: impl Into<String>) -> Self {
        let raw_input = raw_input.into();
        let video_id = extract_video_id(&raw_input);
        VideoReference {
            raw_input,
            video_id,
            resolved_title: None,
        }
    }
}

/// Extract a video ID from a YouTube URL.
///
/// Recognized forms: `youtube.com/watch?v=ID` (any host) and `youtu.be/ID`.
/// Known limitation: embed, shorts, mobile, and playlist-qualified links are
/// not recognized and return `None`.
pub fn extract_video_id(input: &str) -> Option<String> {
    let url = Url::parse(input.trim()).ok()?;

    // youtube.com/watch?v=<id>
    if url.path() == "/watch" {
        for (k, v) in url.query_pairs() {
            if k == "v" {
                let id = v.trim().to_string();
                if !id.is_empty() {
                    return Some(id);
                }
            }
        }
    }

    // youtu.be/<id>
    let host = url.host_str()?;
    if host.eq_ignore_ascii_case("youtu.be") {
        let seg = url.path_segments()?.next()?.trim();
        if !seg.is_empty() {
            return Some(seg.to_string());
        }
    }

    None
}
