//! Worker pool for thumbnail jobs
//!
//! N named threads pull jobs from one shared channel and post a
//! [`ThumbnailEvent`] per job back to the rendering thread. After each post
//! the optional waker runs so the host can schedule a repaint.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::Arc;
use std::thread::JoinHandle;

use async_channel::{Receiver, Sender};
use tracing::{debug, info, warn};

use super::generator::ThumbnailGenerator;
use super::pending::Ticket;
use crate::error::{FilePaneError, Result};

/// Host callback that asks for a re-render; called from worker threads
pub type Waker = Arc<dyn Fn() + Send + Sync>;

/// One unit of work: generate `target` from `source`
#[derive(Clone, Debug)]
pub struct ThumbnailJob {
    pub source: PathBuf,
    pub target: PathBuf,
    pub ticket: Ticket,
}

/// Completion of a job, success or failure
#[derive(Debug)]
pub struct ThumbnailEvent {
    pub source: PathBuf,
    pub ticket: Ticket,
    /// The written thumbnail path on success
    pub result: Result<PathBuf>,
}

/// Unbounded completion channel
pub fn event_channel() -> (Sender<ThumbnailEvent>, Receiver<ThumbnailEvent>) {
    async_channel::unbounded()
}

/// Accepts jobs for background execution
pub trait ThumbnailScheduler {
    fn schedule(&self, job: ThumbnailJob) -> Result<()>;
}

pub struct WorkerPool {
    jobs: Sender<ThumbnailJob>,
    handles: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawn `workers` threads (at least one)
    pub fn spawn(
        workers: usize,
        generator: Arc<dyn ThumbnailGenerator>,
        events: Sender<ThumbnailEvent>,
        waker: Option<Waker>,
    ) -> Result<Self> {
        let workers = workers.max(1);
        let (job_tx, job_rx) = async_channel::unbounded::<ThumbnailJob>();
        let mut handles = Vec::with_capacity(workers);

        for id in 0..workers {
            let jobs = job_rx.clone();
            let events = events.clone();
            let generator = Arc::clone(&generator);
            let waker = waker.clone();

            let handle = std::thread::Builder::new()
                .name(format!("thumbnail-worker-{id}"))
                .spawn(move || worker_loop(id, jobs, events, generator, waker))
                .map_err(|e| FilePaneError::WorkerPool(format!("spawn worker {id}: {e}")))?;
            handles.push(handle);
        }

        info!(workers, "Thumbnail worker pool started");
        Ok(Self {
            jobs: job_tx,
            handles,
        })
    }

    pub fn worker_count(&self) -> usize {
        self.handles.len()
    }

    /// Stop accepting jobs, let queued ones finish, and join the workers
    pub fn shutdown(mut self) {
        self.jobs.close();
        for handle in self.handles.drain(..) {
            if handle.join().is_err() {
                warn!("Thumbnail worker panicked");
            }
        }
        debug!("Thumbnail worker pool stopped");
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        // Workers drain the queue and exit on their own; not joined here so
        // dropping never waits on a decode.
        self.jobs.close();
    }
}

impl ThumbnailScheduler for WorkerPool {
    fn schedule(&self, job: ThumbnailJob) -> Result<()> {
        self.jobs
            .send_blocking(job)
            .map_err(|_| FilePaneError::WorkerPool("job queue closed".to_string()))
    }
}

fn worker_loop(
    id: usize,
    jobs: Receiver<ThumbnailJob>,
    events: Sender<ThumbnailEvent>,
    generator: Arc<dyn ThumbnailGenerator>,
    waker: Option<Waker>,
) {
    while let Ok(job) = jobs.recv_blocking() {
        // A panic in decode or resize must still produce an event, or the
        // path would stay pending and this worker would be lost.
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            generator.generate(&job.source, &job.target)
        }))
        .unwrap_or_else(|payload| {
            Err(FilePaneError::GeneratorPanic {
                path: job.source.clone(),
                message: panic_message(payload.as_ref()),
            })
        })
        .map(|()| job.target.clone());

        if let Err(e) = &result {
            warn!(
                worker = id,
                source = %job.source.display(),
                error = %e,
                "Thumbnail generation failed"
            );
        }

        let event = ThumbnailEvent {
            source: job.source,
            ticket: job.ticket,
            result,
        };
        if events.send_blocking(event).is_err() {
            debug!(worker = id, "Event receiver gone, worker exiting");
            break;
        }
        if let Some(wake) = &waker {
            wake();
        }
    }
    debug!(worker = id, "Thumbnail worker exiting");
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
