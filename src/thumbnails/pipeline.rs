//! Request/complete cycle for thumbnails
//!
//! Lives on the rendering thread. `request_thumbnail` answers from the
//! in-memory cache index or schedules at most one job per path; completion
//! events are applied in `process_events`.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_channel::{Receiver, TryRecvError};
use tracing::{debug, info, warn};

use super::cache::ThumbnailCache;
use super::generator::{ImageThumbnailer, ThumbnailGenerator};
use super::pending::PendingThumbnails;
use super::pool::{event_channel, ThumbnailEvent, ThumbnailJob, ThumbnailScheduler, Waker, WorkerPool};
use crate::config::ThumbnailConfig;
use crate::error::{FilePaneError, Result, ResultExt};

pub struct ThumbnailPipeline {
    cache: Arc<ThumbnailCache>,
    pending: PendingThumbnails,
    /// Paths whose last generation failed. Only quiets repeat logging; a
    /// later request still schedules a new attempt.
    failed: HashSet<PathBuf>,
    scheduler: Box<dyn ThumbnailScheduler>,
    events: Receiver<ThumbnailEvent>,
}

impl ThumbnailPipeline {
    pub fn new(
        cache: Arc<ThumbnailCache>,
        scheduler: Box<dyn ThumbnailScheduler>,
        events: Receiver<ThumbnailEvent>,
    ) -> Self {
        Self {
            cache,
            pending: PendingThumbnails::new(),
            failed: HashSet::new(),
            scheduler,
            events,
        }
    }

    /// Cache at the configured directory, `image`-based generator, and a
    /// worker pool sized from the config
    pub fn with_worker_pool(config: &ThumbnailConfig, waker: Option<Waker>) -> Result<Self> {
        let cache = Arc::new(ThumbnailCache::open(config.resolved_cache_dir())?);
        let generator: Arc<dyn ThumbnailGenerator> = Arc::new(ImageThumbnailer::new(config.size));
        let (events_tx, events_rx) = event_channel();
        let pool = WorkerPool::spawn(config.worker_count(), generator, events_tx, waker)?;
        Ok(Self::new(cache, Box::new(pool), events_rx))
    }

    pub fn cache(&self) -> &Arc<ThumbnailCache> {
        &self.cache
    }

    /// Cached thumbnail for `path`, scheduling generation when there is none
    ///
    /// Returns `None` while generation is pending or when a job was just
    /// scheduled. A path whose last attempt failed is scheduled again.
    pub fn request_thumbnail(&mut self, path: &Path) -> Option<PathBuf> {
        if let Some(cached) = self.cache.get(path) {
            return Some(cached);
        }
        let ticket = self.pending.try_begin(path)?;

        let job = ThumbnailJob {
            source: path.to_path_buf(),
            target: self.cache.cache_path_for(path),
            ticket,
        };
        if self.scheduler.schedule(job).log_err().is_none() {
            self.pending.complete(path, ticket);
            return None;
        }
        debug!(path = %path.display(), pending = self.pending.len(), "Scheduled thumbnail");
        None
    }

    /// Apply every completion event that has arrived
    ///
    /// Returns true when at least one new thumbnail became available, i.e.
    /// the host should re-render.
    pub fn process_events(&mut self) -> bool {
        let mut changed = false;
        loop {
            match self.events.try_recv() {
                Ok(event) => changed |= self.apply(event),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Closed) => {
                    if !self.pending.is_empty() {
                        warn!(pending = self.pending.len(), "Thumbnail event channel closed");
                    }
                    break;
                }
            }
        }
        changed
    }

    /// Block until one event arrives (if any request is outstanding), then
    /// drain the rest
    pub fn wait_for_progress(&mut self) -> bool {
        if self.pending.is_empty() {
            return self.process_events();
        }
        match self.events.recv_blocking() {
            Ok(event) => {
                let changed = self.apply(event);
                self.process_events() || changed
            }
            Err(_) => {
                // No worker left to complete anything
                warn!(pending = self.pending.len(), "Thumbnail event channel closed while waiting");
                self.pending = PendingThumbnails::new();
                false
            }
        }
    }

    fn apply(&mut self, event: ThumbnailEvent) -> bool {
        let ThumbnailEvent {
            source,
            ticket,
            result,
        } = event;
        let current = self.pending.complete(&source, ticket);

        match result {
            Ok(thumbnail) => {
                // A superseded job still wrote a valid file for this path
                self.failed.remove(&source);
                self.cache.insert(source, thumbnail);
                true
            }
            Err(error) => {
                if current {
                    let repeated = !self.failed.insert(source.clone());
                    log_failure(&source, &error, repeated);
                } else {
                    debug!(path = %source.display(), "Ignoring failure of superseded request");
                }
                false
            }
        }
    }

    pub fn is_pending(&self, path: &Path) -> bool {
        self.pending.contains(path)
    }

    pub fn has_failed(&self, path: &Path) -> bool {
        self.failed.contains(path)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn is_idle(&self) -> bool {
        self.pending.is_empty()
    }

    /// Drop pending and failure records for paths no longer listed
    pub fn retain_paths(&mut self, present: &HashSet<&Path>) {
        let dropped = self.pending.retain_present(present);
        self.failed.retain(|p| present.contains(p.as_path()));
        if dropped > 0 {
            info!(dropped, "Dropped pending thumbnails for vanished paths");
        }
    }
}

/// First failure of a path at warn, repeats from re-renders at debug
fn log_failure(path: &Path, error: &FilePaneError, repeated: bool) {
    if repeated {
        debug!(path = %path.display(), error = %error, "Thumbnail failed again");
        return;
    }
    warn!(
        path = %path.display(),
        severity = ?error.severity(),
        error = %error,
        "Thumbnail unavailable, keeping type icon"
    );
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
