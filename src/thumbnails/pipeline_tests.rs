use super::*;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use async_channel::Sender;

use crate::thumbnails::pending::Ticket;

/// Records jobs instead of running them; tests complete them by hand
#[derive(Clone, Default)]
struct ManualScheduler {
    jobs: Rc<RefCell<VecDeque<ThumbnailJob>>>,
    reject: Rc<RefCell<bool>>,
}

impl ThumbnailScheduler for ManualScheduler {
    fn schedule(&self, job: ThumbnailJob) -> Result<()> {
        if *self.reject.borrow() {
            return Err(FilePaneError::WorkerPool("rejected".to_string()));
        }
        self.jobs.borrow_mut().push_back(job);
        Ok(())
    }
}

struct Harness {
    _dir: tempfile::TempDir,
    pipeline: ThumbnailPipeline,
    scheduler: ManualScheduler,
    events: Sender<ThumbnailEvent>,
}

impl Harness {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let cache = Arc::new(ThumbnailCache::open(dir.path().join("cache")).unwrap());
        let scheduler = ManualScheduler::default();
        let (tx, rx) = event_channel();
        let pipeline = ThumbnailPipeline::new(cache, Box::new(scheduler.clone()), rx);
        Self {
            _dir: dir,
            pipeline,
            scheduler,
            events: tx,
        }
    }

    fn scheduled(&self) -> usize {
        self.scheduler.jobs.borrow().len()
    }

    fn take_job(&self, index: usize) -> ThumbnailJob {
        self.scheduler.jobs.borrow_mut().remove(index).unwrap()
    }

    fn finish(&self, job: ThumbnailJob, ok: bool) {
        let result = if ok {
            Ok(job.target.clone())
        } else {
            Err(FilePaneError::ThumbnailWrite {
                path: job.target.clone(),
                message: "disk full".to_string(),
            })
        };
        self.events
            .send_blocking(ThumbnailEvent {
                source: job.source,
                ticket: job.ticket,
                result,
            })
            .unwrap();
    }
}

#[test]
fn test_repeated_requests_schedule_once() {
    let mut h = Harness::new();
    let p = Path::new("/pics/a.png");

    for _ in 0..5 {
        assert!(h.pipeline.request_thumbnail(p).is_none());
    }
    assert_eq!(h.scheduled(), 1);
    assert!(h.pipeline.is_pending(p));
}

#[test]
fn test_completion_populates_cache_and_stops_scheduling() {
    let mut h = Harness::new();
    let p = Path::new("/pics/a.png");
    h.pipeline.request_thumbnail(p);

    let job = h.take_job(0);
    let target = job.target.clone();
    h.finish(job, true);

    assert!(h.pipeline.process_events());
    assert!(!h.pipeline.is_pending(p));
    assert!(h.pipeline.is_idle());

    for _ in 0..3 {
        assert_eq!(h.pipeline.request_thumbnail(p), Some(target.clone()));
    }
    assert_eq!(h.scheduled(), 0);
}

#[test]
fn test_failure_is_retried_once_on_next_render() {
    let mut h = Harness::new();
    let p = Path::new("/pics/bad.jpg");
    h.pipeline.request_thumbnail(p);
    let job = h.take_job(0);
    h.finish(job, false);

    assert!(!h.pipeline.process_events());
    assert!(!h.pipeline.is_pending(p));
    assert!(h.pipeline.has_failed(p));

    // Several renders after the failure schedule exactly one new attempt
    for _ in 0..3 {
        assert!(h.pipeline.request_thumbnail(p).is_none());
    }
    assert_eq!(h.scheduled(), 1);
    assert!(h.pipeline.is_pending(p));

    let retry = h.take_job(0);
    let target = retry.target.clone();
    h.finish(retry, true);
    assert!(h.pipeline.process_events());
    assert!(!h.pipeline.has_failed(p));
    assert_eq!(h.pipeline.request_thumbnail(p), Some(target));
}

#[test]
fn test_repeated_failure_keeps_path_requestable() {
    let mut h = Harness::new();
    let p = Path::new("/pics/bad.jpg");

    for _ in 0..3 {
        h.pipeline.request_thumbnail(p);
        assert_eq!(h.scheduled(), 1);
        let job = h.take_job(0);
        h.finish(job, false);
        h.pipeline.process_events();
        assert!(h.pipeline.is_idle());
    }
    assert!(h.pipeline.has_failed(p));

    h.pipeline.retain_paths(&HashSet::new());
    assert!(!h.pipeline.has_failed(p));
}

#[test]
fn test_rejected_schedule_does_not_leak_pending() {
    let mut h = Harness::new();
    *h.scheduler.reject.borrow_mut() = true;
    let p = Path::new("/pics/a.png");

    assert!(h.pipeline.request_thumbnail(p).is_none());
    assert!(!h.pipeline.is_pending(p));

    *h.scheduler.reject.borrow_mut() = false;
    h.pipeline.request_thumbnail(p);
    assert_eq!(h.scheduled(), 1);
}

#[test]
fn test_late_completion_does_not_clear_newer_request() {
    let mut h = Harness::new();
    let p = Path::new("/pics/a.png");
    h.pipeline.request_thumbnail(p);
    let old = h.take_job(0);

    // Item set changes without p, then p comes back
    h.pipeline.retain_paths(&HashSet::new());
    assert!(!h.pipeline.is_pending(p));
    h.pipeline.request_thumbnail(p);
    assert_eq!(h.scheduled(), 1);

    h.finish(old, false);
    h.pipeline.process_events();
    assert!(h.pipeline.is_pending(p));
    assert!(!h.pipeline.has_failed(p));

    // Requests while the newer job runs still dedup
    h.pipeline.request_thumbnail(p);
    assert_eq!(h.scheduled(), 1);
}

#[test]
fn test_unprocessed_events_keep_path_pending() {
    let mut h = Harness::new();
    let p = Path::new("/pics/a.png");
    h.pipeline.request_thumbnail(p);
    let job = h.take_job(0);
    h.finish(job, true);

    // Not drained yet: still pending, no second job
    h.pipeline.request_thumbnail(p);
    assert_eq!(h.scheduled(), 0);
    assert!(h.pipeline.is_pending(p));
}

/// Small deterministic generator for interleaving tests
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.0 >> 33
    }

    fn below(&mut self, n: usize) -> usize {
        (self.next() % n as u64) as usize
    }
}

#[test]
fn test_interleavings_never_double_schedule() {
    let paths: Vec<PathBuf> = (0..5).map(|i| PathBuf::from(format!("/p/{i}.png"))).collect();

    for seed in 0..64 {
        let mut h = Harness::new();
        let mut rng = Lcg(seed);
        let mut sent_unprocessed: Vec<(PathBuf, Ticket)> = Vec::new();
        // Jobs superseded by an item-set change that dropped their path
        let mut orphaned: HashSet<Ticket> = HashSet::new();

        for _ in 0..300 {
            match rng.below(10) {
                0..=4 => {
                    let p = &paths[rng.below(paths.len())];
                    h.pipeline.request_thumbnail(p);
                }
                5 | 6 => {
                    if h.scheduled() > 0 {
                        let job = h.take_job(rng.below(h.scheduled()));
                        sent_unprocessed.push((job.source.clone(), job.ticket));
                        h.finish(job, rng.below(4) != 0);
                    }
                }
                7 | 8 => {
                    h.pipeline.process_events();
                    sent_unprocessed.clear();
                }
                _ => {
                    let present: HashSet<&Path> = paths
                        .iter()
                        .filter(|_| rng.below(2) == 0)
                        .map(|p| p.as_path())
                        .collect();
                    for job in h.scheduler.jobs.borrow().iter() {
                        if !present.contains(job.source.as_path()) {
                            orphaned.insert(job.ticket);
                        }
                    }
                    for (source, ticket) in &sent_unprocessed {
                        if !present.contains(source.as_path()) {
                            orphaned.insert(*ticket);
                        }
                    }
                    h.pipeline.retain_paths(&present);
                }
            }

            for p in &paths {
                let queued = h
                    .scheduler
                    .jobs
                    .borrow()
                    .iter()
                    .filter(|j| &j.source == p && !orphaned.contains(&j.ticket))
                    .count();
                let in_events = sent_unprocessed
                    .iter()
                    .filter(|(s, t)| s == p && !orphaned.contains(t))
                    .count();
                let live = queued + in_events;
                assert!(live <= 1, "seed {seed}: {} has {live} live jobs", p.display());
                assert_eq!(
                    live,
                    usize::from(h.pipeline.is_pending(p)),
                    "seed {seed}: pending state of {} disagrees with live jobs",
                    p.display()
                );
            }
        }
    }
}

#[test]
fn test_real_pool_generates_and_caches() {
    let tmp = tempfile::tempdir().unwrap();
    let source = tmp.path().join("photo.png");
    image::RgbImage::from_pixel(600, 300, image::Rgb([10, 120, 200]))
        .save(&source)
        .unwrap();

    let config = ThumbnailConfig {
        size: 256,
        workers: Some(2),
        cache_dir: Some(tmp.path().join("cache")),
    };
    let mut pipeline = ThumbnailPipeline::with_worker_pool(&config, None).unwrap();

    assert!(pipeline.request_thumbnail(&source).is_none());
    while !pipeline.is_idle() {
        pipeline.wait_for_progress();
    }

    let thumb = pipeline.request_thumbnail(&source).unwrap();
    assert_eq!(thumb, pipeline.cache().cache_path_for(&source));
    let decoded = image::open(&thumb).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (256, 128));
}

struct PanickingGenerator;

impl ThumbnailGenerator for PanickingGenerator {
    fn generate(&self, _source: &Path, _target: &Path) -> Result<()> {
        panic!("decoder blew up");
    }
}

#[test]
fn test_generator_panic_unpends_path() {
    let tmp = tempfile::tempdir().unwrap();
    let cache = Arc::new(ThumbnailCache::open(tmp.path().join("cache")).unwrap());
    let (tx, rx) = event_channel();
    let pool = WorkerPool::spawn(2, Arc::new(PanickingGenerator), tx, None).unwrap();
    let mut pipeline = ThumbnailPipeline::new(cache, Box::new(pool), rx);
    let p = Path::new("/pics/boom.png");

    assert!(pipeline.request_thumbnail(p).is_none());
    while !pipeline.is_idle() {
        pipeline.wait_for_progress();
    }
    assert!(!pipeline.is_pending(p));
    assert!(pipeline.has_failed(p));

    // Workers are still alive to take the retry
    assert!(pipeline.request_thumbnail(p).is_none());
    assert!(pipeline.is_pending(p));
    pipeline.wait_for_progress();
    assert!(pipeline.is_idle());
}
