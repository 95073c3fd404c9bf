// SPDX-License-Identifier: GPL-3.0-or-later
use std::path::Path;

use anyhow::{bail, Result};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub json: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Per-request timeout applied by the transport.
    pub timeout_secs: u64,
    /// Optional contact string appended to the user agent.
    pub contact: Option<String>,
    /// Minimum spacing between requests to musicbrainz.org.
    pub musicbrainz_min_interval_ms: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            contact: None,
            musicbrainz_min_interval_ms: 1000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    pub max_results_per_provider: usize,
    pub include_back_covers: bool,
    pub include_artist_images: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_results_per_provider: 3,
            include_back_covers: false,
            include_artist_images: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItunesConfig {
    pub enabled: bool,
    pub base_url: Option<String>,
}

impl Default for ItunesConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeezerConfig {
    pub enabled: bool,
    pub base_url: Option<String>,
}

impl Default for DeezerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LastFmConfig {
    pub enabled: bool,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
}

impl Default for LastFmConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_key: None,
            base_url: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MusicBrainzConfig {
    pub enabled: bool,
    pub base_url: Option<String>,
    pub cover_art_base_url: Option<String>,
}

impl Default for MusicBrainzConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: None,
            cover_art_base_url: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscogsConfig {
    pub enabled: bool,
    /// Personal access token. Takes precedence over the consumer key pair.
    pub token: Option<String>,
    pub consumer_key: Option<String>,
    pub consumer_secret: Option<String>,
    pub base_url: Option<String>,
}

impl Default for DiscogsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            token: None,
            consumer_key: None,
            consumer_secret: None,
            base_url: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProvidersConfig {
    pub itunes: ItunesConfig,
    pub deezer: DeezerConfig,
    pub lastfm: LastFmConfig,
    pub musicbrainz: MusicBrainzConfig,
    pub discogs: DiscogsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    pub telemetry: TelemetryConfig,
    pub http: HttpConfig,
    pub search: SearchConfig,
    pub providers: ProvidersConfig,
}

impl AppConfig {
    fn validate(&self) -> Result<()> {
        if self.search.max_results_per_provider == 0 {
            bail!("search.max_results_per_provider must be at least 1");
        }
        if self.http.timeout_secs == 0 {
            bail!("http.timeout_secs must be at least 1");
        }
        Ok(())
    }
}

/// Load configuration from defaults, optional TOML file, and environment overrides (prefix: COVERHUNT_).
pub fn load(config_path: Option<&Path>) -> Result<AppConfig> {
    let mut figment = Figment::from(Serialized::defaults(AppConfig::default()));

    if let Some(path) = config_path {
        figment = figment.merge(Toml::file(path));
    }

    figment = figment.merge(Env::prefixed("COVERHUNT_").split("__"));

    let config: AppConfig = figment.extract()?;
    config.validate()?;
    info!(target: "config", "configuration loaded");
    Ok(config)
}
