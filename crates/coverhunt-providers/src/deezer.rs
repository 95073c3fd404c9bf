// SPDX-License-Identifier: GPL-3.0-or-later

//! Deezer search API (no key required).

use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::collect::{collect_two_pass, CandidateList};
use crate::error::{endpoint_url, ParseError, QueryError, Result};
use crate::matching::{artists_match, fuzzy_equal};

pub const DEFAULT_BASE_URL: &str = "https://api.deezer.com";

/// Build the advanced search request: `artist:"X" track:"Y"`.
pub fn build_query(base_url: &str, artist: &str, album: &str) -> std::result::Result<Url, QueryError> {
    let mut url = endpoint_url(base_url, "search")?;
    url.query_pairs_mut()
        .append_pair("q", &format!("artist:\"{artist}\" track:\"{album}\""))
        .append_pair("limit", "15");
    Ok(url)
}

/// Extract album cover URLs, most popular entries first.
pub fn parse(body: &str, artist: &str, album: &str, max_results: usize) -> Result<Vec<String>> {
    let tracks = ranked_tracks(body)?;

    collect_two_pass(
        &tracks,
        max_results,
        |track| fuzzy_equal(&track.title, album) && artists_match(&track.artist.name, artist),
        |track| artists_match(&track.artist.name, artist),
        Track::cover_url,
    )
}

/// Extract pictures of the requested artist from the same search response.
pub fn parse_artist_images(body: &str, artist: &str, max_results: usize) -> Result<Vec<String>> {
    let tracks = ranked_tracks(body)?;
    let mut list = CandidateList::new(max_results);

    for track in tracks.iter().filter(|track| artists_match(&track.artist.name, artist)) {
        if list.is_full() {
            break;
        }
        if let Some(url) = track.artist.picture_url() {
            list.push(url);
        }
    }

    list.finish()
}

fn ranked_tracks(body: &str) -> Result<Vec<Track>> {
    let response: SearchResponse = serde_json::from_str(body)?;

    if let Some(error) = response.error {
        return Err(ParseError::Api(error.message.unwrap_or_default()));
    }
    match response.total {
        None => return Err(ParseError::MissingField("total")),
        Some(0) => return Err(ParseError::NoResults),
        Some(_) => {}
    }

    let mut tracks = response.data;
    // Stable sort keeps Deezer's own order between equally ranked tracks.
    tracks.sort_by(|a, b| b.rank.cmp(&a.rank));
    debug!(target: "deezer", results = tracks.len(), "parsing Deezer results");
    Ok(tracks)
}

fn clean_url(url: &str) -> String {
    url.replace("\\/", "/").replace("1000x1000", "1200x1200")
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    total: Option<u64>,
    #[serde(default)]
    data: Vec<Track>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Track {
    title: String,
    #[serde(default)]
    rank: i64,
    artist: Artist,
    album: Option<Album>,
}

impl Track {
    fn cover_url(&self) -> Option<String> {
        let album = self.album.as_ref()?;
        album
            .cover_xl
            .as_deref()
            .or(album.cover_big.as_deref())
            .filter(|url| !url.is_empty())
            .map(clean_url)
    }
}

#[derive(Debug, Deserialize)]
struct Artist {
    name: String,
    picture_xl: Option<String>,
    picture_big: Option<String>,
}

impl Artist {
    fn picture_url(&self) -> Option<String> {
        self.picture_xl
            .as_deref()
            .or(self.picture_big.as_deref())
            .filter(|url| !url.is_empty())
            .map(clean_url)
    }
}

#[derive(Debug, Deserialize)]
struct Album {
    cover_xl: Option<String>,
    cover_big: Option<String>,
}
