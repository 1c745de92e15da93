//! Thumbnail generation (runs on worker threads)

use std::fs;
use std::path::Path;
use std::time::Instant;

use filetime::FileTime;
use image::ImageFormat;
use tracing::{debug, warn};

use super::cache::is_fresh;
use crate::error::{FilePaneError, Result};

/// Produces a thumbnail file for a source image
pub trait ThumbnailGenerator: Send + Sync + 'static {
    /// Write the thumbnail for `source` to `target`
    fn generate(&self, source: &Path, target: &Path) -> Result<()>;
}

/// Decodes with the `image` crate and writes a PNG bounded by `size`
#[derive(Clone, Copy, Debug)]
pub struct ImageThumbnailer {
    size: u32,
}

impl ImageThumbnailer {
    pub fn new(size: u32) -> Self {
        Self { size: size.max(1) }
    }
}

impl ThumbnailGenerator for ImageThumbnailer {
    fn generate(&self, source: &Path, target: &Path) -> Result<()> {
        let source_mtime = fs::metadata(source).and_then(|m| m.modified()).ok();

        if let Some(mtime) = source_mtime {
            if is_fresh(target, mtime) {
                debug!(source = %source.display(), "Reusing thumbnail from disk");
                return Ok(());
            }
        }

        let start = Instant::now();
        let img = image::open(source).map_err(|e| FilePaneError::ThumbnailDecode {
            path: source.to_path_buf(),
            source: e,
        })?;
        let thumb = img.thumbnail(self.size, self.size);

        let write_err = |message: String| FilePaneError::ThumbnailWrite {
            path: target.to_path_buf(),
            message,
        };

        let temp_path = target.with_extension("png.tmp");
        thumb
            .save_with_format(&temp_path, ImageFormat::Png)
            .map_err(|e| write_err(e.to_string()))?;
        if let Err(e) = fs::rename(&temp_path, target) {
            let _ = fs::remove_file(&temp_path);
            return Err(write_err(e.to_string()));
        }

        // Stamp with the source mtime so the next freshness check compares like for like
        if let Some(mtime) = source_mtime {
            if let Err(e) = filetime::set_file_mtime(target, FileTime::from_system_time(mtime)) {
                warn!(error = %e, target = %target.display(), "Failed to set thumbnail mtime");
            }
        }

        debug!(
            source = %source.display(),
            width = thumb.width(),
            height = thumb.height(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Generated thumbnail"
        );
        Ok(())
    }
}
