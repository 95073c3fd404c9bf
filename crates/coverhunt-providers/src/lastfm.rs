// SPDX-License-Identifier: GPL-3.0-or-later

//! Last.fm `track.getinfo` (requires an API key).
//!
//! The lookup returns one album image in several fixed sizes, so this
//! provider never yields more than a single candidate.

use serde::Deserialize;
use url::Url;

use crate::error::{endpoint_url, ParseError, QueryError, Result};

pub const DEFAULT_BASE_URL: &str = "https://ws.audioscrobbler.com";

pub fn build_query(
    base_url: &str,
    api_key: &str,
    artist: &str,
    album: &str,
) -> std::result::Result<Url, QueryError> {
    let mut url = endpoint_url(base_url, "2.0/")?;
    url.query_pairs_mut()
        .append_pair("method", "track.getinfo")
        .append_pair("api_key", api_key)
        .append_pair("artist", artist)
        .append_pair("track", album)
        .append_pair("autocorrect", "1")
        .append_pair("format", "json");
    Ok(url)
}

/// Pick the best fixed-size image and rewrite it to the original upload.
pub fn parse(body: &str) -> Result<Vec<String>> {
    let response: TrackInfoResponse = serde_json::from_str(body)?;

    if response.error.is_some() || response.message.as_deref() == Some("Track not found") {
        return Err(ParseError::NotFound(
            response.message.unwrap_or_else(|| "Track not found".to_string()),
        ));
    }

    let images = response
        .track
        .ok_or(ParseError::MissingField("track"))?
        .album
        .ok_or(ParseError::MissingField("track.album"))?
        .image
        .ok_or(ParseError::MissingField("track.album.image"))?;

    // Size segments in the CDN path select a thumbnail; dropping them serves the original.
    for (size, segment) in [("extralarge", "u/300x300/"), ("large", "u/174s/")] {
        if let Some(image) = images
            .iter()
            .find(|image| image.size == size && !image.url.is_empty())
        {
            return Ok(vec![image.url.replace(segment, "u/")]);
        }
    }

    Err(ParseError::NoMatches)
}

#[derive(Debug, Deserialize)]
struct TrackInfoResponse {
    error: Option<u32>,
    message: Option<String>,
    track: Option<Track>,
}

#[derive(Debug, Deserialize)]
struct Track {
    album: Option<Album>,
}

#[derive(Debug, Deserialize)]
struct Album {
    image: Option<Vec<Image>>,
}

#[derive(Debug, Deserialize)]
struct Image {
    #[serde(default)]
    size: String,
    #[serde(rename = "#text", default)]
    url: String,
}
