#![allow(dead_code)]

use std::io::Cursor;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use coverhunt_config::ProvidersConfig;
use coverhunt_search::{HttpTransport, ProviderKind, SearchCallbacks, TransportError};
use image::{ImageFormat, RgbImage};

pub const FAKE_BASE: &str = "http://fake.test";

#[derive(Debug, Clone)]
enum Route {
    Text(String),
    Binary(Bytes),
    Fail,
    Panic,
}

/// In-memory transport answering by URL prefix; unmatched URLs fail.
#[derive(Debug, Default)]
pub struct FakeTransport {
    routes: Vec<(String, Route)>,
    delay: Duration,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, prefix: impl Into<String>, body: impl Into<String>) -> Self {
        self.routes.push((prefix.into(), Route::Text(body.into())));
        self
    }

    pub fn binary(mut self, prefix: impl Into<String>, data: impl Into<Bytes>) -> Self {
        self.routes.push((prefix.into(), Route::Binary(data.into())));
        self
    }

    pub fn fail(mut self, prefix: impl Into<String>) -> Self {
        self.routes.push((prefix.into(), Route::Fail));
        self
    }

    /// Requests matching `prefix` panic inside the transport.
    pub fn panic(mut self, prefix: impl Into<String>) -> Self {
        self.routes.push((prefix.into(), Route::Panic));
        self
    }

    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    async fn lookup(&self, url: &str) -> Option<Route> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.routes
            .iter()
            .find(|(prefix, _)| url.starts_with(prefix.as_str()))
            .map(|(_, route)| route.clone())
    }
}

#[async_trait]
impl HttpTransport for FakeTransport {
    async fn fetch_text(&self, url: &str) -> Result<String, TransportError> {
        match self.lookup(url).await {
            Some(Route::Text(body)) => Ok(body),
            Some(Route::Panic) => panic!("transport failure for {url}"),
            _ => Err(TransportError::Unavailable(url.to_string())),
        }
    }

    async fn fetch_binary(&self, url: &str) -> Result<Bytes, TransportError> {
        match self.lookup(url).await {
            Some(Route::Binary(data)) => Ok(data),
            Some(Route::Panic) => panic!("transport failure for {url}"),
            _ => Err(TransportError::Unavailable(url.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recorded {
    Result { source: String, url: String },
    ProviderDone(String, bool),
    AllDone,
}

/// Collects every callback invocation in order.
#[derive(Debug, Clone, Default)]
pub struct Recorder(Arc<Mutex<Vec<Recorded>>>);

impl Recorder {
    pub fn callbacks(&self) -> SearchCallbacks {
        let results = self.0.clone();
        let providers = self.0.clone();
        let finished = self.0.clone();
        SearchCallbacks {
            on_result: Box::new(move |candidate| {
                results.lock().unwrap().push(Recorded::Result {
                    source: candidate.source,
                    url: candidate.url,
                });
            }),
            on_provider_done: Box::new(move |name, had_results| {
                providers
                    .lock()
                    .unwrap()
                    .push(Recorded::ProviderDone(name.to_string(), had_results));
            }),
            on_all_done: Box::new(move || {
                finished.lock().unwrap().push(Recorded::AllDone);
            }),
        }
    }

    pub fn events(&self) -> Vec<Recorded> {
        self.0.lock().unwrap().clone()
    }

    pub fn position(&self, event: &Recorded) -> Option<usize> {
        self.events().iter().position(|e| e == event)
    }
}

/// Provider configuration with only `kinds` enabled.
pub fn only(kinds: &[ProviderKind]) -> ProvidersConfig {
    let mut providers = ProvidersConfig::default();
    providers.itunes.enabled = kinds.contains(&ProviderKind::Itunes);
    providers.deezer.enabled = kinds.contains(&ProviderKind::Deezer);
    providers.lastfm.enabled = kinds.contains(&ProviderKind::LastFm);
    providers.musicbrainz.enabled = kinds.contains(&ProviderKind::MusicBrainz);
    providers.discogs.enabled = kinds.contains(&ProviderKind::Discogs);
    providers
}

pub fn png(width: u32, height: u32) -> Vec<u8> {
    let mut buffer = Cursor::new(Vec::new());
    RgbImage::new(width, height)
        .write_to(&mut buffer, ImageFormat::Png)
        .expect("encode png");
    buffer.into_inner()
}
