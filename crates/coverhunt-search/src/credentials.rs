// SPDX-License-Identifier: GPL-3.0-or-later

use coverhunt_config::ProvidersConfig;
use coverhunt_providers::{DiscogsAuth, Endpoints, ProviderKind};

/// Supplies per-provider enablement and secrets to a search.
pub trait CredentialsProvider: Send + Sync {
    fn is_enabled(&self, provider: ProviderKind) -> bool;

    fn lastfm_api_key(&self) -> Option<String>;

    /// A personal token takes precedence over a consumer key pair.
    fn discogs_auth(&self) -> Option<DiscogsAuth>;
}

/// Credentials read from the `[providers]` configuration section.
#[derive(Debug, Clone, Default)]
pub struct ConfigCredentials {
    providers: ProvidersConfig,
}

impl ConfigCredentials {
    pub fn new(providers: ProvidersConfig) -> Self {
        Self { providers }
    }
}

impl CredentialsProvider for ConfigCredentials {
    fn is_enabled(&self, provider: ProviderKind) -> bool {
        match provider {
            ProviderKind::Itunes => self.providers.itunes.enabled,
            ProviderKind::Deezer => self.providers.deezer.enabled,
            ProviderKind::LastFm => self.providers.lastfm.enabled,
            ProviderKind::MusicBrainz => self.providers.musicbrainz.enabled,
            ProviderKind::Discogs => self.providers.discogs.enabled,
        }
    }

    fn lastfm_api_key(&self) -> Option<String> {
        self.providers
            .lastfm
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .map(str::to_string)
    }

    fn discogs_auth(&self) -> Option<DiscogsAuth> {
        let discogs = &self.providers.discogs;
        DiscogsAuth::resolve(
            discogs.token.as_deref(),
            discogs.consumer_key.as_deref(),
            discogs.consumer_secret.as_deref(),
        )
    }
}

/// Provider base URLs, with configured overrides applied over the defaults.
pub fn endpoints_from_config(providers: &ProvidersConfig) -> Endpoints {
    let mut endpoints = Endpoints::default();
    let overrides = [
        (&mut endpoints.itunes, &providers.itunes.base_url),
        (&mut endpoints.deezer, &providers.deezer.base_url),
        (&mut endpoints.lastfm, &providers.lastfm.base_url),
        (&mut endpoints.musicbrainz, &providers.musicbrainz.base_url),
        (
            &mut endpoints.cover_art_archive,
            &providers.musicbrainz.cover_art_base_url,
        ),
        (&mut endpoints.discogs, &providers.discogs.base_url),
    ];
    for (slot, configured) in overrides {
        if let Some(url) = configured {
            *slot = url.clone();
        }
    }
    endpoints
}
