// SPDX-License-Identifier: GPL-3.0-or-later
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use coverhunt_config::{load as load_config, AppConfig, TelemetryConfig};
use coverhunt_search::{
    endpoints_from_config, ArtworkCandidate, ArtworkSearch, ConfigCredentials, ReqwestTransport,
    SearchCallbacks, SearchRequest,
};
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Search iTunes, Deezer, Last.fm, MusicBrainz and Discogs for album artwork.
#[derive(Debug, Parser)]
#[command(name = "coverhunt", version)]
struct Args {
    #[arg(long)]
    artist: String,

    #[arg(long)]
    album: String,

    /// Candidates per provider (overrides search.max_results_per_provider).
    #[arg(long)]
    max_results: Option<usize>,

    /// Also fetch back covers from the Cover Art Archive.
    #[arg(long)]
    back_covers: bool,

    /// Also fetch artist pictures from Deezer.
    #[arg(long)]
    artist_images: bool,

    #[arg(long)]
    config: Option<PathBuf>,

    /// Write every candidate image into this directory.
    #[arg(long)]
    output_dir: Option<PathBuf>,
}

#[derive(Debug)]
enum CliEvent {
    Result(ArtworkCandidate),
    ProviderDone(String, bool),
    AllDone,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;
    init_tracing(&config.telemetry);

    if let Some(dir) = &args.output_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("creating output directory {}", dir.display()))?;
    }

    let request = build_request(&args, &config);
    let endpoints = endpoints_from_config(&config.providers);
    let transport = build_transport(&config, &endpoints.musicbrainz)?;

    let (events, mut received) = mpsc::unbounded_channel();
    let search = ArtworkSearch::new(
        request,
        Arc::new(transport),
        Arc::new(ConfigCredentials::new(config.providers.clone())),
        endpoints,
        forwarding_callbacks(events),
    );

    search.start();

    let mut written = 0usize;
    let mut found = 0usize;
    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            event = received.recv() => match event {
                Some(CliEvent::Result(candidate)) => {
                    found += 1;
                    println!(
                        "{:<20} {:>5}x{:<5} {:<11} {}",
                        candidate.source, candidate.width, candidate.height, candidate.mime_type, candidate.url
                    );
                    if let Some(dir) = &args.output_dir {
                        let target = dir.join(file_name_for(found, &candidate));
                        std::fs::write(&target, &candidate.data)
                            .with_context(|| format!("writing {}", target.display()))?;
                        written += 1;
                    }
                }
                Some(CliEvent::ProviderDone(name, had_results)) => {
                    let outcome = if had_results { "ok" } else { "no results" };
                    println!("-- {name}: {outcome}");
                }
                Some(CliEvent::AllDone) | None => break,
            },
            _ = &mut shutdown => {
                search.cancel();
                info!(target: "cli", "waiting for in-flight requests to drain");
                search.wait_done().await;
                break;
            }
        }
    }

    info!(target: "cli", found, written, "search finished");
    Ok(())
}

fn init_tracing(telemetry: &TelemetryConfig) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&telemetry.log_level));
    let registry = tracing_subscriber::registry().with(env_filter);

    // Logs go to stderr so stdout stays a clean candidate listing.
    if telemetry.json {
        registry
            .with(fmt::layer().json().with_target(true).with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_thread_names(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

fn build_request(args: &Args, config: &AppConfig) -> SearchRequest {
    let mut request = SearchRequest::new(&args.artist, &args.album).with_config(&config.search);
    if let Some(max_results) = args.max_results {
        request = request.max_results(max_results);
    }
    if args.back_covers {
        request = request.include_back_covers(true);
    }
    if args.artist_images {
        request = request.include_artist_images(true);
    }
    request
}

fn build_transport(config: &AppConfig, musicbrainz_base: &str) -> Result<ReqwestTransport> {
    let mut builder =
        ReqwestTransport::builder().timeout(Duration::from_secs(config.http.timeout_secs));
    if let Some(contact) = &config.http.contact {
        builder = builder.contact(contact);
    }
    if let Some(host) = url::Url::parse(musicbrainz_base)
        .ok()
        .and_then(|url| url.host_str().map(str::to_string))
    {
        builder = builder.rate_limit_host(
            host,
            Duration::from_millis(config.http.musicbrainz_min_interval_ms),
        );
    }
    Ok(builder.build()?)
}

fn forwarding_callbacks(events: mpsc::UnboundedSender<CliEvent>) -> SearchCallbacks {
    let results = events.clone();
    let providers = events.clone();
    SearchCallbacks {
        on_result: Box::new(move |candidate| {
            let _ = results.send(CliEvent::Result(candidate));
        }),
        on_provider_done: Box::new(move |name, had_results| {
            let _ = providers.send(CliEvent::ProviderDone(name.to_string(), had_results));
        }),
        on_all_done: Box::new(move || {
            let _ = events.send(CliEvent::AllDone);
        }),
    }
}

fn extension_for(mime_type: &str) -> &'static str {
    match mime_type {
        "image/jpeg" => "jpg",
        "image/png" => "png",
        "image/webp" => "webp",
        "image/gif" => "gif",
        "image/bmp" => "bmp",
        _ => "bin",
    }
}

/// `03-musicbrainz-back.jpg` style names: ordinal, source slug, extension.
fn file_name_for(ordinal: usize, candidate: &ArtworkCandidate) -> PathBuf {
    let slug: String = candidate
        .source
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '-' })
        .collect::<String>()
        .split('-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-");
    Path::new(&format!("{ordinal:02}-{slug}")).with_extension(extension_for(candidate.mime_type))
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match (signal(SignalKind::interrupt()), signal(SignalKind::terminate())) {
            (Ok(mut interrupt), Ok(mut terminate)) => {
                tokio::select! {
                    _ = interrupt.recv() => {},
                    _ = terminate.recv() => {},
                }
            }
            (Err(err), _) | (_, Err(err)) => {
                warn!(target: "cli", error = %err, "could not install signal handlers");
                std::future::pending::<()>().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(target: "cli", error = %err, "could not install ctrl-c handler");
            std::future::pending::<()>().await;
        }
    }

    info!(target: "cli", "shutdown signal received, cancelling search");
}
