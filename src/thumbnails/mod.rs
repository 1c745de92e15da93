//! Lazy thumbnail generation
//!
//! - `cache` - on-disk thumbnails plus the in-memory index read during render
//! - `pending` - ticketed set of outstanding requests
//! - `generator` - decode + resize + atomic PNG write
//! - `pool` - worker threads and the completion event channel
//! - `pipeline` - request/complete cycle owned by the rendering thread

mod cache;
mod generator;
mod pending;
mod pipeline;
mod pool;

pub use cache::{hash_path, is_fresh, ThumbnailCache};
pub use generator::{ImageThumbnailer, ThumbnailGenerator};
pub use pending::{PendingThumbnails, Ticket};
pub use pipeline::ThumbnailPipeline;
pub use pool::{event_channel, ThumbnailEvent, ThumbnailJob, ThumbnailScheduler, Waker, WorkerPool};
