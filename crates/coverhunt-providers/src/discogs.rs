// SPDX-License-Identifier: GPL-3.0-or-later

//! Discogs database search (requires a personal token or a consumer key pair).

use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::collect::collect_two_pass;
use crate::error::{endpoint_url, ParseError, QueryError, Result};
use crate::matching::{fuzzy_equal, starts_with_ignore_case, strip_the_prefix};

pub const DEFAULT_BASE_URL: &str = "https://api.discogs.com";

/// Credentials accepted by the Discogs search endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscogsAuth {
    Token(String),
    Consumer { key: String, secret: String },
}

impl DiscogsAuth {
    /// Resolve configured values; a token wins over a consumer key pair.
    pub fn resolve(
        token: Option<&str>,
        consumer_key: Option<&str>,
        consumer_secret: Option<&str>,
    ) -> Option<Self> {
        fn present(value: Option<&str>) -> Option<&str> {
            value.map(str::trim).filter(|v| !v.is_empty())
        }

        if let Some(token) = present(token) {
            return Some(Self::Token(token.to_string()));
        }
        match (present(consumer_key), present(consumer_secret)) {
            (Some(key), Some(secret)) => Some(Self::Consumer {
                key: key.to_string(),
                secret: secret.to_string(),
            }),
            _ => None,
        }
    }
}

pub fn build_query(
    base_url: &str,
    auth: &DiscogsAuth,
    artist: &str,
    album: &str,
) -> std::result::Result<Url, QueryError> {
    let mut url = endpoint_url(base_url, "database/search")?;
    {
        let mut pairs = url.query_pairs_mut();
        pairs
            .append_pair("q", &format!("{artist} {album}"))
            .append_pair("type", "release");
        match auth {
            DiscogsAuth::Token(token) => {
                pairs.append_pair("token", token);
            }
            DiscogsAuth::Consumer { key, secret } => {
                pairs.append_pair("key", key).append_pair("secret", secret);
            }
        }
    }
    Ok(url)
}

/// Extract cover URLs. Discogs titles read `"Artist - Album"`.
pub fn parse(body: &str, artist: &str, album: &str, max_results: usize) -> Result<Vec<String>> {
    let response: SearchResponse = serde_json::from_str(body)?;

    if let Some(message) = response.message {
        return Err(ParseError::Api(message));
    }
    let pagination = response
        .pagination
        .ok_or(ParseError::MissingField("pagination"))?;
    if pagination.items == 0 {
        return Err(ParseError::NoResults);
    }

    debug!(target: "discogs", results = response.results.len(), "parsing Discogs results");

    let artist_title = format!("{artist} - {album}");
    collect_two_pass(
        &response.results,
        max_results,
        |release| fuzzy_equal(&release.title, &artist_title),
        |release| title_starts_with_artist(&release.title, artist),
        Release::cover_url,
    )
}

fn title_starts_with_artist(title: &str, artist: &str) -> bool {
    if starts_with_ignore_case(title, artist) {
        return true;
    }
    let (title, artist) = (strip_the_prefix(title), strip_the_prefix(artist));
    starts_with_ignore_case(title, artist)
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    pagination: Option<Pagination>,
    #[serde(default)]
    results: Vec<Release>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Pagination {
    items: u64,
}

#[derive(Debug, Deserialize)]
struct Release {
    title: String,
    cover_image: Option<String>,
    thumb: Option<String>,
}

impl Release {
    fn cover_url(&self) -> Option<String> {
        [&self.cover_image, &self.thumb]
            .into_iter()
            .filter_map(|url| url.as_deref())
            .find(|url| !url.is_empty())
            .map(str::to_string)
    }
}
