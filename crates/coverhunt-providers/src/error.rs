// SPDX-License-Identifier: GPL-3.0-or-later

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ParseError>;

/// Why a provider response produced no usable candidates.
///
/// None of these are fatal to a search: the coordinator reports the provider
/// as finished without results and moves on.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("malformed response: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("missing expected field: {0}")]
    MissingField(&'static str),

    #[error("provider reported zero results")]
    NoResults,

    #[error("not found: {0}")]
    NotFound(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("no result matched the requested artist")]
    NoMatches,
}

/// A request URL could not be assembled from the configured endpoint.
#[derive(Debug, Error)]
#[error("invalid endpoint {endpoint}: {source}")]
pub struct QueryError {
    pub endpoint: String,
    #[source]
    pub source: url::ParseError,
}

pub(crate) fn endpoint_url(base: &str, path: &str) -> std::result::Result<url::Url, QueryError> {
    let endpoint = format!("{}/{}", base.trim_end_matches('/'), path);
    url::Url::parse(&endpoint).map_err(|source| QueryError { endpoint, source })
}
