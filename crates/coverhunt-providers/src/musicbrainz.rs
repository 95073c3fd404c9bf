// SPDX-License-Identifier: GPL-3.0-or-later

//! MusicBrainz recording search followed by Cover Art Archive downloads.
//!
//! The search yields release ids rather than images; each id is turned into a
//! Cover Art Archive URL which redirects straight to the image bytes.

use std::collections::HashSet;

use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::error::{endpoint_url, ParseError, QueryError, Result};
use crate::matching::artists_match;

pub const DEFAULT_BASE_URL: &str = "https://musicbrainz.org/ws/2";
pub const COVER_ART_ARCHIVE_BASE_URL: &str = "https://coverartarchive.org";

/// Which side of a release the Cover Art Archive should return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoverSide {
    Front,
    Back,
}

impl CoverSide {
    fn as_str(self) -> &'static str {
        match self {
            Self::Front => "front",
            Self::Back => "back",
        }
    }
}

pub fn build_query(base_url: &str, artist: &str, album: &str) -> std::result::Result<Url, QueryError> {
    let mut url = endpoint_url(base_url, "recording/")?;
    url.query_pairs_mut()
        .append_pair(
            "query",
            &format!("artist:\"{artist}\" AND recording:\"{album}\""),
        )
        .append_pair("fmt", "json")
        .append_pair("limit", "10")
        .append_pair("inc", "releases");
    Ok(url)
}

/// Collect release ids from recordings credited to `artist`, at most `max_results`.
pub fn parse_release_ids(body: &str, artist: &str, max_results: usize) -> Result<Vec<String>> {
    let response: RecordingSearchResponse = serde_json::from_str(body)?;

    let count = response.count.ok_or(ParseError::MissingField("count"))?;
    let recordings = response
        .recordings
        .ok_or(ParseError::MissingField("recordings"))?;
    if count == 0 {
        return Err(ParseError::NoResults);
    }

    let mut seen = HashSet::new();
    let mut release_ids = Vec::new();

    'recordings: for recording in recordings.iter().filter(|r| r.credits(artist)) {
        for release in &recording.releases {
            if release_ids.len() >= max_results {
                break 'recordings;
            }
            if let Some(id) = release.id.as_deref() {
                if seen.insert(id.to_string()) {
                    release_ids.push(id.to_string());
                }
            }
        }
    }

    debug!(target: "musicbrainz", releases = release_ids.len(), "collected release ids");

    if release_ids.is_empty() {
        return Err(ParseError::NoMatches);
    }
    Ok(release_ids)
}

/// Cover Art Archive image URL for one release.
pub fn cover_art_url(cover_art_base_url: &str, release_id: &str, side: CoverSide) -> String {
    format!(
        "{}/release/{}/{}",
        cover_art_base_url.trim_end_matches('/'),
        release_id,
        side.as_str()
    )
}

#[derive(Debug, Deserialize)]
struct RecordingSearchResponse {
    count: Option<u64>,
    recordings: Option<Vec<Recording>>,
}

#[derive(Debug, Deserialize)]
struct Recording {
    #[serde(rename = "artist-credit", default)]
    artist_credit: Vec<ArtistCredit>,
    #[serde(default)]
    releases: Vec<ReleaseRef>,
}

impl Recording {
    /// The credited name or the nested artist name matches.
    fn credits(&self, artist: &str) -> bool {
        self.artist_credit.iter().any(|credit| {
            credit
                .name
                .as_deref()
                .is_some_and(|name| artists_match(name, artist))
                || credit
                    .artist
                    .as_ref()
                    .and_then(|nested| nested.name.as_deref())
                    .is_some_and(|name| artists_match(name, artist))
        })
    }
}

#[derive(Debug, Deserialize)]
struct ArtistCredit {
    name: Option<String>,
    artist: Option<ArtistRef>,
}

#[derive(Debug, Deserialize)]
struct ArtistRef {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ReleaseRef {
    id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_combines_artist_and_recording() {
        let url = build_query(DEFAULT_BASE_URL, "Daft Punk", "Discovery").expect("valid url");
        assert_eq!(url.path(), "/ws/2/recording/");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            pairs[0],
            (
                "query".to_string(),
                "artist:\"Daft Punk\" AND recording:\"Discovery\"".to_string()
            )
        );
        assert!(pairs.contains(&("fmt".to_string(), "json".to_string())));
        assert!(pairs.contains(&("limit".to_string(), "10".to_string())));
        assert!(pairs.contains(&("inc".to_string(), "releases".to_string())));
    }

    #[test]
    fn cover_art_url_selects_side() {
        assert_eq!(
            cover_art_url("https://coverartarchive.org/", "abc", CoverSide::Front),
            "https://coverartarchive.org/release/abc/front"
        );
        assert_eq!(
            cover_art_url(COVER_ART_ARCHIVE_BASE_URL, "abc", CoverSide::Back),
            "https://coverartarchive.org/release/abc/back"
        );
    }
}
