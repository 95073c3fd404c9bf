// SPDX-License-Identifier: GPL-3.0-or-later

//! Query builders and response parsers for the artwork providers.
//!
//! Every provider module exposes a `build_query` function that produces the
//! request URL and a `parse` function that turns the raw JSON body into an
//! ordered, deduplicated list of candidate image URLs. Nothing here performs
//! I/O; the search coordinator owns the network side.

mod collect;
pub mod deezer;
pub mod discogs;
pub mod error;
pub mod itunes;
pub mod lastfm;
pub mod matching;
pub mod musicbrainz;

use std::fmt;

pub use discogs::DiscogsAuth;
pub use error::{ParseError, QueryError, Result};
pub use musicbrainz::CoverSide;

/// The external metadata APIs that can be searched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    Itunes,
    Deezer,
    LastFm,
    MusicBrainz,
    Discogs,
}

impl ProviderKind {
    /// Launch order used by the search coordinator.
    pub const ALL: [ProviderKind; 5] = [
        ProviderKind::Itunes,
        ProviderKind::Deezer,
        ProviderKind::LastFm,
        ProviderKind::MusicBrainz,
        ProviderKind::Discogs,
    ];

    /// Stable display name, also used as the result source tag.
    pub fn name(self) -> &'static str {
        match self {
            Self::Itunes => "iTunes",
            Self::Deezer => "Deezer",
            Self::LastFm => "Last.fm",
            Self::MusicBrainz => "MusicBrainz",
            Self::Discogs => "Discogs",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Base URLs for every provider, overridable for self-hosted mirrors and tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub itunes: String,
    pub deezer: String,
    pub lastfm: String,
    pub musicbrainz: String,
    pub cover_art_archive: String,
    pub discogs: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            itunes: itunes::DEFAULT_BASE_URL.to_string(),
            deezer: deezer::DEFAULT_BASE_URL.to_string(),
            lastfm: lastfm::DEFAULT_BASE_URL.to_string(),
            musicbrainz: musicbrainz::DEFAULT_BASE_URL.to_string(),
            cover_art_archive: musicbrainz::COVER_ART_ARCHIVE_BASE_URL.to_string(),
            discogs: discogs::DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl Endpoints {
    /// Point every provider at one server, mounted under per-provider prefixes.
    ///
    /// Used by integration tests that serve all providers from a single mock.
    pub fn all_at(base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        Self {
            itunes: format!("{base}/itunes"),
            deezer: format!("{base}/deezer"),
            lastfm: format!("{base}/lastfm"),
            musicbrainz: format!("{base}/musicbrainz"),
            cover_art_archive: format!("{base}/coverartarchive"),
            discogs: format!("{base}/discogs"),
        }
    }
}
