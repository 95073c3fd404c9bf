// SPDX-License-Identifier: GPL-3.0-or-later

use coverhunt_providers::{ParseError, QueryError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected status {status} from {url}")]
    Status { status: u16, url: String },

    #[error("transport unavailable: {0}")]
    Unavailable(String),
}

/// Reasons a single provider run ends without candidate URLs.
#[derive(Debug, Error)]
pub(crate) enum ProviderError {
    #[error("no credentials configured")]
    MissingCredentials,

    #[error("search cancelled")]
    Cancelled,

    #[error(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Parse(#[from] ParseError),
}
