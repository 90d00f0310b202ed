use crate::error::{EmbedError, Result};
use crate::http::Transport;
use crate::tags::TrackQuery;
use reqwest::Url;
use serde::Deserialize;
use tracing::debug;

pub const DEFAULT_LYRICS_API: &str = "https://lrclib.net/api/search";

/// One search hit from lrclib. Null or missing fields decode as `None`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LyricsRecord {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub track_name: Option<String>,
    #[serde(default)]
    pub artist_name: Option<String>,
    #[serde(default)]
    pub album_name: Option<String>,
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub instrumental: Option<bool>,
    #[serde(default)]
    pub plain_lyrics: Option<String>,
    #[serde(default)]
    pub synced_lyrics: Option<String>,
}

impl LyricsRecord {
    /// Exact, case-sensitive match on both artist and title.
    fn matches(&self, query: &TrackQuery) -> bool {
        self.artist_name.as_deref() == Some(query.artist.as_str())
            && self.track_name.as_deref() == Some(query.title.as_str())
    }
}

/// Search URL with artist and title joined into the single `q` term.
pub fn search_url(api: &str, query: &TrackQuery) -> Result<Url> {
    Url::parse_with_params(api, &[("q", query.search_term())])
        .map_err(|e| EmbedError::decode("lyrics endpoint URL", e))
}

/// Returns the synced lyrics of the first record matching `query` exactly.
pub fn fetch_lyrics(transport: &dyn Transport, api: &str, query: &TrackQuery) -> Result<String> {
    let url = search_url(api, query)?;
    let resp = transport.get(url.as_str())?;

    let records: Vec<LyricsRecord> = serde_json::from_slice(&resp.body)
        .map_err(|e| EmbedError::decode("lyrics search response", e))?;
    debug!(count = records.len(), "lyrics search results");

    let record = records
        .into_iter()
        .find(|r| r.matches(query))
        .ok_or_else(|| EmbedError::NotFound(format!("lyrics for {}", query)))?;
    debug!(
        id = record.id.unwrap_or_default(),
        name = record.name.as_deref().unwrap_or(""),
        album = record.album_name.as_deref().unwrap_or(""),
        duration = record.duration.unwrap_or_default(),
        instrumental = record.instrumental.unwrap_or_default(),
        has_plain = record.plain_lyrics.is_some(),
        "matched lyrics record"
    );

    Ok(record.synced_lyrics.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::testing::FakeTransport;

    const PAYLOAD: &str = r#"[
        {"id": 1, "trackName": "T", "artistName": "Other", "syncedLyrics": "wrong artist"},
        {"id": 2, "trackName": "T", "artistName": "A", "albumName": "Al",
         "duration": 201.0, "instrumental": false,
         "plainLyrics": "plain", "syncedLyrics": "L1"},
        {"id": 3, "trackName": "T", "artistName": "A", "syncedLyrics": "second match"}
    ]"#;

    fn query(artist: &str, title: &str) -> TrackQuery {
        TrackQuery {
            artist: artist.to_string(),
            title: title.to_string(),
        }
    }

    fn transport_for(q: &TrackQuery, body: &str) -> FakeTransport {
        let url = search_url(DEFAULT_LYRICS_API, q).unwrap();
        FakeTransport::default().route(url.as_str(), body.as_bytes(), "application/json")
    }

    #[test]
    fn search_url_joins_and_escapes_terms() {
        let url = search_url(DEFAULT_LYRICS_API, &query("Sakanaction", "Shin Takarajima")).unwrap();
        assert_eq!(
            url.as_str(),
            "https://lrclib.net/api/search?q=Sakanaction+Shin+Takarajima"
        );

        let url = search_url(DEFAULT_LYRICS_API, &query("A&B", "x=y")).unwrap();
        assert_eq!(url.as_str(), "https://lrclib.net/api/search?q=A%26B+x%3Dy");
    }

    #[test]
    fn returns_synced_lyrics_of_first_exact_match() {
        let q = query("A", "T");
        let transport = transport_for(&q, PAYLOAD);
        assert_eq!(fetch_lyrics(&transport, DEFAULT_LYRICS_API, &q).unwrap(), "L1");
        assert_eq!(transport.requested().len(), 1);
    }

    #[test]
    fn unmatched_title_is_not_found() {
        let q = query("A", "T2");
        let transport = transport_for(&q, PAYLOAD);
        let err = fetch_lyrics(&transport, DEFAULT_LYRICS_API, &q).unwrap_err();
        assert!(matches!(err, EmbedError::NotFound(_)), "got {err:?}");
    }

    #[test]
    fn match_is_case_sensitive_and_untrimmed() {
        for (artist, title) in [("a", "T"), ("A", "t"), ("A ", "T"), ("A", " T")] {
            let q = query(artist, title);
            let transport = transport_for(&q, PAYLOAD);
            assert!(fetch_lyrics(&transport, DEFAULT_LYRICS_API, &q).is_err());
        }
    }

    #[test]
    fn null_synced_lyrics_yield_empty_text() {
        let q = query("A", "T");
        let body = r#"[{"trackName": "T", "artistName": "A", "syncedLyrics": null}]"#;
        let transport = transport_for(&q, body);
        assert_eq!(fetch_lyrics(&transport, DEFAULT_LYRICS_API, &q).unwrap(), "");
    }

    #[test]
    fn null_numeric_fields_still_decode() {
        let q = query("A", "T");
        let body = r#"[
            {"id": null, "trackName": "X", "artistName": "Y", "duration": null, "instrumental": null},
            {"id": null, "trackName": "T", "artistName": "A", "duration": null,
             "instrumental": null, "syncedLyrics": "L1"}
        ]"#;
        let transport = transport_for(&q, body);
        assert_eq!(fetch_lyrics(&transport, DEFAULT_LYRICS_API, &q).unwrap(), "L1");
    }

    #[test]
    fn malformed_payload_is_decode_error() {
        let q = query("A", "T");
        let transport = transport_for(&q, "{\"error\": true}");
        let err = fetch_lyrics(&transport, DEFAULT_LYRICS_API, &q).unwrap_err();
        assert!(matches!(err, EmbedError::Decode { .. }), "got {err:?}");
    }
}
