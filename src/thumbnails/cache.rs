//! Thumbnail cache: source path -> cached PNG on disk
//!
//! Files live at `<cache dir>/<sha256(source path)>.png`. The in-memory
//! index is what render-time lookups consult, so a frame never touches the
//! filesystem. Workers write through a temp file and rename, so a reader
//! never sees a half-written thumbnail.

use parking_lot::RwLock;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, info, warn};

use crate::error::{FilePaneError, Result};

/// Hex SHA-256 of a path's raw bytes, used as the cache file stem
pub fn hash_path(path: &Path) -> String {
    let mut hasher = Sha256::new();
    hasher.update(path.as_os_str().as_encoded_bytes());
    hex::encode(hasher.finalize())
}

/// A cached file is fresh when its mtime is not older than the source's
pub fn is_fresh(cached: &Path, source_mtime: SystemTime) -> bool {
    cached
        .metadata()
        .and_then(|m| m.modified())
        .map(|cache_mtime| cache_mtime >= source_mtime)
        .unwrap_or(false)
}

#[derive(Debug)]
pub struct ThumbnailCache {
    dir: PathBuf,
    index: RwLock<HashMap<PathBuf, PathBuf>>,
}

impl ThumbnailCache {
    /// Open (and create if needed) the cache directory
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .map_err(|e| FilePaneError::CacheDir(format!("{}: {}", dir.display(), e)))?;
        info!(dir = %dir.display(), "Thumbnail cache ready");
        Ok(Self {
            dir,
            index: RwLock::new(HashMap::new()),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Where the thumbnail for `source` is (or will be) stored
    pub fn cache_path_for(&self, source: &Path) -> PathBuf {
        self.dir.join(format!("{}.png", hash_path(source)))
    }

    /// Indexed thumbnail for `source`; memory only
    pub fn get(&self, source: &Path) -> Option<PathBuf> {
        self.index.read().get(source).cloned()
    }

    pub fn contains(&self, source: &Path) -> bool {
        self.index.read().contains_key(source)
    }

    pub fn insert(&self, source: PathBuf, thumbnail: PathBuf) {
        debug!(
            source = %source.display(),
            thumbnail = %thumbnail.display(),
            "Indexed thumbnail"
        );
        self.index.write().insert(source, thumbnail);
    }

    /// Forget the thumbnail for `source` and delete its file
    ///
    /// Returns whether an index entry existed.
    pub fn invalidate(&self, source: &Path) -> bool {
        let removed = self.index.write().remove(source);
        let file = removed
            .clone()
            .unwrap_or_else(|| self.cache_path_for(source));
        if file.exists() {
            if let Err(e) = fs::remove_file(&file) {
                warn!(error = %e, file = %file.display(), "Failed to delete cached thumbnail");
            }
        }
        removed.is_some()
    }

    pub fn len(&self) -> usize {
        self.index.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.read().is_empty()
    }
}
