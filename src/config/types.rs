//! Configuration type definitions
//!
//! This module contains all the struct definitions for configuration.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::defaults::*;
use crate::file_list::LayoutMode;

// ============================================
// UI CONFIG
// ============================================

/// Presentation settings for the file pane
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiConfig {
    /// Grid or list presentation (default: grid)
    #[serde(default)]
    pub view_mode: LayoutMode,
    /// Icon edge length in grid cells (default: 64)
    #[serde(default = "default_icon_size")]
    pub icon_size: u32,
    /// Width of one grid cell including margins; drives the column count (default: 120)
    #[serde(default = "default_grid_item_width")]
    pub grid_item_width: f32,
    /// Show dot-files (default: false). Applied by the scan collaborator.
    #[serde(default)]
    pub show_hidden: bool,
}

fn default_icon_size() -> u32 {
    DEFAULT_ICON_SIZE
}
fn default_grid_item_width() -> f32 {
    DEFAULT_GRID_ITEM_WIDTH
}

impl Default for UiConfig {
    fn default() -> Self {
        UiConfig {
            view_mode: LayoutMode::default(),
            icon_size: DEFAULT_ICON_SIZE,
            grid_item_width: DEFAULT_GRID_ITEM_WIDTH,
            show_hidden: false,
        }
    }
}

// ============================================
// THUMBNAIL CONFIG
// ============================================

/// Settings for the thumbnail pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThumbnailConfig {
    /// Bounding box edge for generated thumbnails (default: 256)
    #[serde(default = "default_thumbnail_size")]
    pub size: u32,
    /// Worker thread count (None = available parallelism, capped at 4)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workers: Option<usize>,
    /// Cache directory override (None = platform cache dir)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_dir: Option<PathBuf>,
}

fn default_thumbnail_size() -> u32 {
    DEFAULT_THUMBNAIL_SIZE
}

impl Default for ThumbnailConfig {
    fn default() -> Self {
        ThumbnailConfig {
            size: DEFAULT_THUMBNAIL_SIZE,
            workers: None,
            cache_dir: None,
        }
    }
}

impl ThumbnailConfig {
    /// Number of worker threads to spawn, never zero
    pub fn worker_count(&self) -> usize {
        match self.workers {
            Some(n) => n.max(1),
            None => std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
                .min(DEFAULT_MAX_THUMBNAIL_WORKERS),
        }
    }

    /// Directory holding cached thumbnails
    ///
    /// `~` in a configured path is expanded. Falls back to
    /// `<cache dir>/filepane/thumbnails`, then to the temp dir.
    pub fn resolved_cache_dir(&self) -> PathBuf {
        if let Some(dir) = &self.cache_dir {
            return PathBuf::from(shellexpand::tilde(&dir.to_string_lossy()).as_ref());
        }
        dirs::cache_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("filepane")
            .join("thumbnails")
    }
}

// ============================================
// MAIN CONFIG
// ============================================

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default)]
    pub ui: UiConfig,
    /// Partition the listing into category groups (default: false)
    #[serde(default)]
    pub group_files_by_type: bool,
    /// Category name -> extensions (with leading dot)
    #[serde(default = "default_file_categories")]
    pub file_categories: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub thumbnails: ThumbnailConfig,
}

fn default_file_categories() -> BTreeMap<String, Vec<String>> {
    DEFAULT_FILE_CATEGORIES
        .iter()
        .map(|(name, exts)| {
            (
                name.to_string(),
                exts.iter().map(|e| e.to_string()).collect(),
            )
        })
        .collect()
}

impl Default for Config {
    fn default() -> Self {
        Config {
            ui: UiConfig::default(),
            group_files_by_type: false,
            file_categories: default_file_categories(),
            thumbnails: ThumbnailConfig::default(),
        }
    }
}

impl Config {
    /// Get the category for a file based on its extension (case-insensitive)
    ///
    /// Returns None for uncategorized files (they go to "Other"). Categories are
    /// searched in name order, so an extension listed twice resolves to the
    /// lexicographically first category.
    pub fn get_file_category(&self, path: &Path) -> Option<&str> {
        let extension = path.extension()?.to_str()?;
        let ext_lower = format!(".{}", extension.to_lowercase());

        self.file_categories
            .iter()
            .find(|(_, extensions)| extensions.iter().any(|e| e.to_lowercase() == ext_lower))
            .map(|(category, _)| category.as_str())
    }
}
