// SPDX-License-Identifier: GPL-3.0-or-later

//! Runs every enabled provider concurrently and funnels their outcomes to the
//! consumer's callbacks.
//!
//! Each provider run is its own tokio task, and so is each image download.
//! They report through an unbounded channel to a single collector task, which
//! is the only place callbacks are invoked. Callbacks therefore never run
//! concurrently with one another.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use coverhunt_config::SearchConfig;
use coverhunt_providers::{
    deezer, discogs, itunes, lastfm, musicbrainz, CoverSide, Endpoints, ProviderKind,
};
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};
use url::Url;

use crate::credentials::CredentialsProvider;
use crate::downloader::{download_and_deliver, ArtworkCandidate, DownloadBatch};
use crate::error::ProviderError;
use crate::transport::HttpTransport;

const DEFAULT_MAX_RESULTS: usize = 3;

/// What to search for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub artist: String,
    pub album: String,
    /// Upper bound on candidates per provider task, at least 1.
    pub max_results: usize,
    pub include_back_covers: bool,
    pub include_artist_images: bool,
}

impl SearchRequest {
    pub fn new(artist: impl Into<String>, album: impl Into<String>) -> Self {
        Self {
            artist: artist.into(),
            album: album.into(),
            max_results: DEFAULT_MAX_RESULTS,
            include_back_covers: false,
            include_artist_images: false,
        }
    }

    pub fn max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results.max(1);
        self
    }

    pub fn include_back_covers(mut self, include: bool) -> Self {
        self.include_back_covers = include;
        self
    }

    pub fn include_artist_images(mut self, include: bool) -> Self {
        self.include_artist_images = include;
        self
    }

    /// Apply the `[search]` configuration section.
    pub fn with_config(self, config: &SearchConfig) -> Self {
        self.max_results(config.max_results_per_provider)
            .include_back_covers(config.include_back_covers)
            .include_artist_images(config.include_artist_images)
    }
}

pub type ResultCallback = Box<dyn FnMut(ArtworkCandidate) + Send>;
pub type ProviderDoneCallback = Box<dyn FnMut(&str, bool) + Send>;
pub type AllDoneCallback = Box<dyn FnOnce() + Send>;

/// Consumer hooks. All three are invoked from one task, never concurrently.
pub struct SearchCallbacks {
    /// A validated image was downloaded.
    pub on_result: ResultCallback,
    /// A provider task finished; the flag tells whether it delivered anything.
    pub on_provider_done: ProviderDoneCallback,
    /// Every provider task finished. Not invoked after `cancel()`.
    pub on_all_done: AllDoneCallback,
}

impl Default for SearchCallbacks {
    fn default() -> Self {
        Self {
            on_result: Box::new(|_| {}),
            on_provider_done: Box::new(|_, _| {}),
            on_all_done: Box::new(|| {}),
        }
    }
}

impl fmt::Debug for SearchCallbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchCallbacks").finish_non_exhaustive()
    }
}

/// Lifecycle of one search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchPhase {
    Idle,
    Running,
    /// Every provider finished and `on_all_done` is being delivered.
    Completed,
    /// Cancelled; in-flight work is still being counted down.
    CancelledDraining,
    Done,
}

/// Messages from provider and download tasks to the collector.
#[derive(Debug)]
pub(crate) enum SearchEvent {
    Result(ArtworkCandidate),
    ProviderFinished { task: usize, had_results: bool },
}

/// The units of work a search fans out to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ProviderJob {
    Itunes,
    Deezer,
    DeezerArtist,
    LastFm,
    MusicBrainz(CoverSide),
    Discogs,
}

impl ProviderJob {
    fn name(self) -> &'static str {
        match self {
            Self::Itunes => "iTunes",
            Self::Deezer => "Deezer",
            Self::DeezerArtist => "Deezer (Artist)",
            Self::LastFm => "Last.fm",
            Self::MusicBrainz(CoverSide::Front) => "MusicBrainz",
            Self::MusicBrainz(CoverSide::Back) => "MusicBrainz (Back)",
            Self::Discogs => "Discogs",
        }
    }
}

/// Provider tasks to launch for `request`, in launch order.
fn enabled_jobs(request: &SearchRequest, credentials: &dyn CredentialsProvider) -> Vec<ProviderJob> {
    let mut jobs = Vec::new();
    for kind in ProviderKind::ALL {
        if !credentials.is_enabled(kind) {
            debug!(target: "search", provider = %kind, "provider disabled");
            continue;
        }
        match kind {
            ProviderKind::Itunes => jobs.push(ProviderJob::Itunes),
            ProviderKind::Deezer => {
                jobs.push(ProviderJob::Deezer);
                if request.include_artist_images {
                    jobs.push(ProviderJob::DeezerArtist);
                }
            }
            ProviderKind::LastFm => jobs.push(ProviderJob::LastFm),
            ProviderKind::MusicBrainz => {
                jobs.push(ProviderJob::MusicBrainz(CoverSide::Front));
                if request.include_back_covers {
                    jobs.push(ProviderJob::MusicBrainz(CoverSide::Back));
                }
            }
            ProviderKind::Discogs => jobs.push(ProviderJob::Discogs),
        }
    }
    jobs
}

/// Collector-side record of one provider task.
#[derive(Debug)]
struct ProviderTask {
    name: &'static str,
    done: bool,
    had_results: bool,
}

struct SearchState {
    phase: Mutex<SearchPhase>,
    apis_remaining: AtomicUsize,
    cancel: CancellationToken,
    done: watch::Sender<bool>,
}

impl SearchState {
    fn phase(&self) -> MutexGuard<'_, SearchPhase> {
        self.phase.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn set_phase(&self, phase: SearchPhase) {
        *self.phase() = phase;
    }

    fn mark_done(&self) {
        self.set_phase(SearchPhase::Done);
        self.done.send_replace(true);
    }
}

/// One artwork search across every enabled provider.
///
/// `start()` must be called from within a tokio runtime. The search state is
/// shared with the spawned tasks, so dropping the `ArtworkSearch` does not
/// stop work already in flight; call `cancel()` and `wait_done()` to release
/// resources deterministically.
pub struct ArtworkSearch {
    request: Arc<SearchRequest>,
    transport: Arc<dyn HttpTransport>,
    credentials: Arc<dyn CredentialsProvider>,
    endpoints: Arc<Endpoints>,
    callbacks: Mutex<Option<SearchCallbacks>>,
    state: Arc<SearchState>,
}

impl ArtworkSearch {
    pub fn new(
        request: SearchRequest,
        transport: Arc<dyn HttpTransport>,
        credentials: Arc<dyn CredentialsProvider>,
        endpoints: Endpoints,
        callbacks: SearchCallbacks,
    ) -> Self {
        let (done, _) = watch::channel(false);
        Self {
            request: Arc::new(request),
            transport,
            credentials,
            endpoints: Arc::new(endpoints),
            callbacks: Mutex::new(Some(callbacks)),
            state: Arc::new(SearchState {
                phase: Mutex::new(SearchPhase::Idle),
                apis_remaining: AtomicUsize::new(0),
                cancel: CancellationToken::new(),
                done,
            }),
        }
    }

    /// Launch every enabled provider. A second call is ignored.
    pub fn start(&self) {
        let callbacks = self
            .callbacks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
        let Some(callbacks) = callbacks else {
            warn!(target: "search", "search already started, ignoring start()");
            return;
        };

        let jobs = enabled_jobs(&self.request, self.credentials.as_ref());
        info!(
            target: "search",
            artist = %self.request.artist,
            album = %self.request.album,
            providers = jobs.len(),
            "starting artwork search"
        );

        if jobs.is_empty() {
            if !self.state.cancel.is_cancelled() {
                (callbacks.on_all_done)();
            }
            self.state.mark_done();
            return;
        }

        self.state.apis_remaining.store(jobs.len(), Ordering::Release);
        {
            let mut phase = self.state.phase();
            *phase = if self.state.cancel.is_cancelled() {
                SearchPhase::CancelledDraining
            } else {
                SearchPhase::Running
            };
        }

        let (events, receiver) = mpsc::unbounded_channel();
        let tasks = jobs
            .iter()
            .map(|job| ProviderTask {
                name: job.name(),
                done: false,
                had_results: false,
            })
            .collect();
        tokio::spawn(Collector::new(Arc::clone(&self.state), tasks, callbacks).run(receiver));

        for (index, job) in jobs.into_iter().enumerate() {
            let run = ProviderRun {
                index,
                job,
                request: Arc::clone(&self.request),
                transport: Arc::clone(&self.transport),
                credentials: Arc::clone(&self.credentials),
                endpoints: Arc::clone(&self.endpoints),
                events: events.clone(),
                cancel: self.state.cancel.clone(),
            };
            tokio::spawn(run.run());
        }
    }

    /// Stop delivering results and provider notifications. In-flight requests
    /// are not aborted; they drain and are still counted.
    pub fn cancel(&self) {
        let mut phase = self.state.phase();
        if !self.state.cancel.is_cancelled() {
            info!(target: "search", "search cancelled");
        }
        self.state.cancel.cancel();
        if *phase == SearchPhase::Running {
            *phase = SearchPhase::CancelledDraining;
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.state.cancel.is_cancelled()
    }

    /// Provider tasks that have not reported completion yet.
    pub fn apis_remaining(&self) -> usize {
        self.state.apis_remaining.load(Ordering::Acquire)
    }

    pub fn phase(&self) -> SearchPhase {
        *self.state.phase()
    }

    /// Resolves once every provider task has finished, cancelled or not.
    ///
    /// Never resolves for a search that was not started.
    pub async fn wait_done(&self) {
        let mut done = self.state.done.subscribe();
        let _ = done.wait_for(|finished| *finished).await;
    }
}

impl fmt::Debug for ArtworkSearch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArtworkSearch")
            .field("request", &self.request)
            .field("phase", &self.phase())
            .field("apis_remaining", &self.apis_remaining())
            .finish_non_exhaustive()
    }
}

/// Single consumer of search events; owns the callbacks.
struct Collector {
    state: Arc<SearchState>,
    tasks: Vec<ProviderTask>,
    on_result: ResultCallback,
    on_provider_done: ProviderDoneCallback,
    on_all_done: Option<AllDoneCallback>,
}

impl Collector {
    fn new(state: Arc<SearchState>, tasks: Vec<ProviderTask>, callbacks: SearchCallbacks) -> Self {
        Self {
            state,
            tasks,
            on_result: callbacks.on_result,
            on_provider_done: callbacks.on_provider_done,
            on_all_done: Some(callbacks.on_all_done),
        }
    }

    async fn run(mut self, mut events: mpsc::UnboundedReceiver<SearchEvent>) {
        while let Some(event) = events.recv().await {
            match event {
                SearchEvent::Result(candidate) => {
                    if self.state.cancel.is_cancelled() {
                        debug!(target: "search", url = %candidate.url, "dropping result after cancel");
                        continue;
                    }
                    (self.on_result)(candidate);
                }
                SearchEvent::ProviderFinished { task, had_results } => {
                    if self.provider_finished(task, had_results) {
                        return;
                    }
                }
            }
        }

        // Every provider task reports on drop, so this means a task was lost.
        let unfinished: Vec<usize> = self
            .tasks
            .iter()
            .enumerate()
            .filter(|(_, task)| !task.done)
            .map(|(index, _)| index)
            .collect();
        error!(
            target: "search",
            unfinished = unfinished.len(),
            "event channel closed before every provider finished, settling the rest without results"
        );
        for task in unfinished {
            if self.provider_finished(task, false) {
                return;
            }
        }
    }

    /// Record one provider completion. Returns true once the last one is in.
    fn provider_finished(&mut self, task: usize, had_results: bool) -> bool {
        let Some(entry) = self.tasks.get_mut(task) else {
            warn!(target: "search", task, "completion for unknown provider task");
            return false;
        };
        if entry.done {
            warn!(target: "search", provider = entry.name, "provider reported twice, ignoring");
            return false;
        }
        entry.done = true;
        entry.had_results = had_results;
        let name = entry.name;

        info!(target: "search", provider = name, had_results, "provider finished");
        if !self.state.cancel.is_cancelled() {
            (self.on_provider_done)(name, had_results);
        }

        if self.state.apis_remaining.fetch_sub(1, Ordering::AcqRel) != 1 {
            return false;
        }

        let with_results = self.tasks.iter().filter(|t| t.had_results).count();
        info!(target: "search", with_results, "all providers finished");
        if !self.state.cancel.is_cancelled() {
            self.state.set_phase(SearchPhase::Completed);
            if let Some(on_all_done) = self.on_all_done.take() {
                on_all_done();
            }
        }
        self.state.mark_done();
        true
    }
}

/// Reports a provider task as finished without results when dropped armed.
///
/// Covers early returns and unwinding alike; a task that hands its
/// completion to a download batch disarms it.
struct CompletionGuard {
    events: mpsc::UnboundedSender<SearchEvent>,
    task: usize,
    armed: bool,
}

impl CompletionGuard {
    fn new(events: mpsc::UnboundedSender<SearchEvent>, task: usize) -> Self {
        Self {
            events,
            task,
            armed: true,
        }
    }

    fn report(mut self, had_results: bool) {
        self.armed = false;
        let _ = self.events.send(SearchEvent::ProviderFinished {
            task: self.task,
            had_results,
        });
    }

    fn hand_off(mut self) {
        self.armed = false;
    }
}

impl Drop for CompletionGuard {
    fn drop(&mut self) {
        if self.armed {
            let _ = self.events.send(SearchEvent::ProviderFinished {
                task: self.task,
                had_results: false,
            });
        }
    }
}

/// Everything one provider task needs, owned so the task can outlive the caller.
struct ProviderRun {
    index: usize,
    job: ProviderJob,
    request: Arc<SearchRequest>,
    transport: Arc<dyn HttpTransport>,
    credentials: Arc<dyn CredentialsProvider>,
    endpoints: Arc<Endpoints>,
    events: mpsc::UnboundedSender<SearchEvent>,
    cancel: CancellationToken,
}

impl ProviderRun {
    #[instrument(skip_all, fields(provider = self.job.name()))]
    async fn run(self) {
        let completion = CompletionGuard::new(self.events.clone(), self.index);

        let urls = match self.image_urls().await {
            Ok(urls) => urls,
            Err(err) => {
                debug!(target: "search", error = %err, "provider produced no candidates");
                completion.report(false);
                return;
            }
        };

        if urls.is_empty() || self.cancel.is_cancelled() {
            completion.report(false);
            return;
        }

        debug!(target: "search", candidates = urls.len(), "downloading candidates");
        let batch = Arc::new(DownloadBatch::new(self.index, self.job.name(), urls.len()));
        for url in urls {
            tokio::spawn(download_and_deliver(
                Arc::clone(&self.transport),
                Arc::clone(&batch),
                url,
                self.events.clone(),
                self.cancel.clone(),
            ));
        }
        completion.hand_off();
    }

    async fn fetch(&self, url: Url) -> Result<String, ProviderError> {
        if self.cancel.is_cancelled() {
            return Err(ProviderError::Cancelled);
        }
        Ok(self.transport.fetch_text(url.as_str()).await?)
    }

    /// Query the provider and resolve the candidate image URLs, best first.
    async fn image_urls(&self) -> Result<Vec<String>, ProviderError> {
        let SearchRequest {
            artist,
            album,
            max_results,
            ..
        } = self.request.as_ref();
        let max_results = *max_results;
        let endpoints = self.endpoints.as_ref();

        let urls = match self.job {
            ProviderJob::Itunes => {
                let body = self
                    .fetch(itunes::build_query(&endpoints.itunes, artist, album)?)
                    .await?;
                itunes::parse(&body, artist, album, max_results)?
            }
            ProviderJob::Deezer => {
                let body = self
                    .fetch(deezer::build_query(&endpoints.deezer, artist, album)?)
                    .await?;
                deezer::parse(&body, artist, album, max_results)?
            }
            ProviderJob::DeezerArtist => {
                let body = self
                    .fetch(deezer::build_query(&endpoints.deezer, artist, album)?)
                    .await?;
                deezer::parse_artist_images(&body, artist, max_results)?
            }
            ProviderJob::LastFm => {
                let api_key = self
                    .credentials
                    .lastfm_api_key()
                    .ok_or(ProviderError::MissingCredentials)?;
                let body = self
                    .fetch(lastfm::build_query(&endpoints.lastfm, &api_key, artist, album)?)
                    .await?;
                lastfm::parse(&body)?
            }
            ProviderJob::MusicBrainz(side) => {
                let body = self
                    .fetch(musicbrainz::build_query(&endpoints.musicbrainz, artist, album)?)
                    .await?;
                musicbrainz::parse_release_ids(&body, artist, max_results)?
                    .iter()
                    .map(|id| musicbrainz::cover_art_url(&endpoints.cover_art_archive, id, side))
                    .collect()
            }
            ProviderJob::Discogs => {
                let auth = self
                    .credentials
                    .discogs_auth()
                    .ok_or(ProviderError::MissingCredentials)?;
                let body = self
                    .fetch(discogs::build_query(&endpoints.discogs, &auth, artist, album)?)
                    .await?;
                discogs::parse(&body, artist, album, max_results)?
            }
        };

        Ok(urls)
    }
}
