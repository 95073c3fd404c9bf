// SPDX-License-Identifier: GPL-3.0-or-later

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

use crate::coordinator::SearchEvent;
use crate::image::{detect_mime_type, is_valid_image_data, probe_dimensions};
use crate::transport::HttpTransport;

/// One downloaded, validated image handed to the consumer.
#[derive(Clone, PartialEq, Eq)]
pub struct ArtworkCandidate {
    pub data: Bytes,
    /// Name of the provider task that found the image, e.g. `"iTunes"`.
    pub source: String,
    pub url: String,
    /// Pixel width, 0 when the header could not be read.
    pub width: u32,
    pub height: u32,
    pub mime_type: &'static str,
}

impl ArtworkCandidate {
    /// Validate `data` and describe it; `None` when it is not a recognized image.
    pub fn from_download(source: &str, url: &str, data: Bytes) -> Option<Self> {
        if !is_valid_image_data(&data) {
            return None;
        }
        let (width, height) = probe_dimensions(&data);
        Some(Self {
            mime_type: detect_mime_type(&data),
            data,
            source: source.to_string(),
            url: url.to_string(),
            width,
            height,
        })
    }
}

impl fmt::Debug for ArtworkCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArtworkCandidate")
            .field("source", &self.source)
            .field("url", &self.url)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("mime_type", &self.mime_type)
            .field("bytes", &self.data.len())
            .finish()
    }
}

/// Shared bookkeeping for all downloads started by one provider task.
#[derive(Debug)]
pub(crate) struct DownloadBatch {
    task: usize,
    source: &'static str,
    pending: AtomicUsize,
    had_any: AtomicBool,
}

impl DownloadBatch {
    pub(crate) fn new(task: usize, source: &'static str, downloads: usize) -> Self {
        Self {
            task,
            source,
            pending: AtomicUsize::new(downloads),
            had_any: AtomicBool::new(false),
        }
    }

    fn record_success(&self) {
        self.had_any.store(true, Ordering::Release);
    }

    /// Count one download as finished. Returns `Some(had_any)` for the call
    /// that settles the batch, `None` for every other call.
    fn complete_one(&self) -> Option<bool> {
        match self.pending.fetch_sub(1, Ordering::AcqRel) {
            1 => Some(self.had_any.load(Ordering::Acquire)),
            _ => None,
        }
    }
}

/// Counts one download against its batch when dropped, including on unwind.
struct Settle<'a> {
    batch: &'a DownloadBatch,
    events: &'a UnboundedSender<SearchEvent>,
}

impl Drop for Settle<'_> {
    fn drop(&mut self) {
        if let Some(had_results) = self.batch.complete_one() {
            let _ = self.events.send(SearchEvent::ProviderFinished {
                task: self.batch.task,
                had_results,
            });
        }
    }
}

/// Fetch one image, deliver it if valid, and settle the batch.
///
/// The download that takes the batch to zero reports the provider as
/// finished, whether or not any image in the batch was usable.
#[instrument(skip_all, fields(source = batch.source, url = %url))]
pub(crate) async fn download_and_deliver(
    transport: Arc<dyn HttpTransport>,
    batch: Arc<DownloadBatch>,
    url: String,
    events: UnboundedSender<SearchEvent>,
    cancel: CancellationToken,
) {
    let _settle = Settle {
        batch: &batch,
        events: &events,
    };

    match transport.fetch_binary(&url).await {
        Ok(_) if cancel.is_cancelled() => {
            debug!(target: "downloader", "search cancelled, discarding image");
        }
        Ok(data) => match ArtworkCandidate::from_download(batch.source, &url, data) {
            Some(candidate) => {
                debug!(
                    target: "downloader",
                    width = candidate.width,
                    height = candidate.height,
                    mime = candidate.mime_type,
                    "image accepted"
                );
                if events.send(SearchEvent::Result(candidate)).is_ok() {
                    batch.record_success();
                }
            }
            None => debug!(target: "downloader", "response is not a recognized image"),
        },
        Err(err) => debug!(target: "downloader", error = %err, "image download failed"),
    }
}
