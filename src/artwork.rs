use crate::error::{EmbedError, Result};
use crate::http::Transport;
use crate::tags::TrackQuery;
use reqwest::Url;
use serde::Deserialize;
use tracing::debug;

pub const DEFAULT_ARTWORK_API: &str = "https://itunes.apple.com/search";

const SEARCH_SIZE: &str = "100x100";
const EMBED_SIZE: &str = "600x600";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<ArtworkRecord>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ArtworkRecord {
    #[serde(rename = "artworkUrl100", default)]
    pub artwork_url: String,
}

/// Image bytes plus the content type the server declared for them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverArt {
    pub data: Vec<u8>,
    pub mime_type: String,
}

/// Search URL limited to one music result.
pub fn search_url(api: &str, query: &TrackQuery) -> Result<Url> {
    Url::parse_with_params(
        api,
        &[
            ("term", query.search_term().as_str()),
            ("media", "music"),
            ("limit", "1"),
        ],
    )
    .map_err(|e| EmbedError::decode("artwork endpoint URL", e))
}

/// Rewrites the first `100x100` token so the image is fetched at 600x600.
pub fn upscale_url(url: &str) -> String {
    url.replacen(SEARCH_SIZE, EMBED_SIZE, 1)
}

/// Looks up the artwork URL for `search`, then downloads the upscaled image.
pub fn fetch_cover_art(transport: &dyn Transport, search: &str) -> Result<CoverArt> {
    let resp = transport.get(search)?;
    let parsed: SearchResponse = serde_json::from_slice(&resp.body)
        .map_err(|e| EmbedError::decode("artwork search response", e))?;

    let record = parsed
        .results
        .into_iter()
        .next()
        .ok_or_else(|| EmbedError::NotFound("album art".to_string()))?;

    let image_url = upscale_url(&record.artwork_url);
    debug!(url = %image_url, "fetching cover art");
    let image = transport.get(&image_url)?;

    Ok(CoverArt {
        data: image.body,
        mime_type: image.content_type,
    })
}
