// SPDX-License-Identifier: GPL-3.0-or-later

//! iTunes Search API (no key required).

use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::collect::collect_two_pass;
use crate::error::{endpoint_url, ParseError, QueryError, Result};
use crate::matching::{artists_match, fuzzy_equal};

pub const DEFAULT_BASE_URL: &str = "https://itunes.apple.com";

/// Build the album search request for `artist` and `album`.
pub fn build_query(base_url: &str, artist: &str, album: &str) -> std::result::Result<Url, QueryError> {
    let mut url = endpoint_url(base_url, "search")?;
    url.query_pairs_mut()
        .append_pair("term", &format!("{artist} {album}"))
        .append_pair("entity", "album")
        .append_pair("limit", "10");
    Ok(url)
}

/// Extract up to `max_results` artwork URLs from a search response.
pub fn parse(body: &str, artist: &str, album: &str, max_results: usize) -> Result<Vec<String>> {
    let response: SearchResponse = serde_json::from_str(body)?;

    match response.result_count {
        None => return Err(ParseError::MissingField("resultCount")),
        Some(0) => return Err(ParseError::NoResults),
        Some(_) => {}
    }

    debug!(target: "itunes", results = response.results.len(), "parsing iTunes results");

    collect_two_pass(
        &response.results,
        max_results,
        |item| {
            item.title()
                .is_some_and(|title| fuzzy_equal(title, album) && artists_match(item.artist(), artist))
        },
        |item| artists_match(item.artist(), artist),
        SearchResult::artwork_url,
    )
}

/// Swap thumbnail sizes and compressed suffixes for the largest variant the CDN serves.
pub fn upgrade_artwork_url(url: &str) -> String {
    let mut url = url.to_string();
    for size in ["600x600", "512x512", "100x100", "60x60", "30x30"] {
        url = url.replace(size, "1200x1200");
    }

    if url.contains(".png") {
        if url.contains("bb.png") {
            url = url.replace("bb.png", "bb-80.png");
        } else if url.contains("bf.png") {
            url = url.replace("bf.png", "bb-80.png");
        }
    } else if url.contains(".jpg") || url.contains(".jpeg") {
        if url.contains("bb.jpg") {
            url = url.replace("bb.jpg", "bb-90.jpg");
        } else if url.contains("bf.jpg") {
            url = url.replace("bf.jpg", "bb-90.jpg");
        }
    }

    url
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchResponse {
    result_count: Option<u64>,
    #[serde(default)]
    results: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchResult {
    collection_name: Option<String>,
    track_name: Option<String>,
    artist_name: Option<String>,
    #[serde(rename = "artworkUrl600")]
    artwork_url_600: Option<String>,
    #[serde(rename = "artworkUrl512")]
    artwork_url_512: Option<String>,
    #[serde(rename = "artworkUrl100")]
    artwork_url_100: Option<String>,
    #[serde(rename = "artworkUrl60")]
    artwork_url_60: Option<String>,
    #[serde(rename = "artworkUrl30")]
    artwork_url_30: Option<String>,
}

impl SearchResult {
    /// Album entities carry `collectionName`; song entities only `trackName`.
    fn title(&self) -> Option<&str> {
        self.collection_name
            .as_deref()
            .or(self.track_name.as_deref())
    }

    fn artist(&self) -> &str {
        self.artist_name.as_deref().unwrap_or_default()
    }

    fn artwork_url(&self) -> Option<String> {
        [
            &self.artwork_url_600,
            &self.artwork_url_512,
            &self.artwork_url_100,
            &self.artwork_url_60,
            &self.artwork_url_30,
        ]
        .into_iter()
        .find_map(|url| url.as_deref())
        .map(upgrade_artwork_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_uses_album_entity() {
        let url = build_query(DEFAULT_BASE_URL, "Daft Punk", "Discovery").expect("valid url");
        assert_eq!(url.path(), "/search");
        assert_eq!(
            url.query(),
            Some("term=Daft+Punk+Discovery&entity=album&limit=10")
        );
    }

    #[test]
    fn artwork_url_is_upgraded() {
        assert_eq!(
            upgrade_artwork_url("https://is1.mzstatic.com/image/thumb/a/100x100bb.jpg"),
            "https://is1.mzstatic.com/image/thumb/a/1200x1200bb-90.jpg"
        );
        assert_eq!(
            upgrade_artwork_url("https://is1.mzstatic.com/image/thumb/a/60x60bf.png"),
            "https://is1.mzstatic.com/image/thumb/a/1200x1200bb-80.png"
        );
        assert_eq!(
            upgrade_artwork_url("https://example.com/cover.webp"),
            "https://example.com/cover.webp"
        );
    }
}
