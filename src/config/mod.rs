//! Configuration module - file pane settings
//!
//! This module provides functionality for:
//! - Loading configuration from ~/.filepane/config.json
//! - Default values for all settings
//! - Type definitions for config structures
//!
//! # Module Structure
//!
//! - `defaults` - All default constant values
//! - `types` - Configuration struct definitions (Config, UiConfig, ThumbnailConfig)
//! - `loader` - File system loading, parsing and saving

mod defaults;
mod loader;
mod types;

pub use defaults::{
    DEFAULT_GRID_ITEM_WIDTH, DEFAULT_THUMBNAIL_SIZE, FOLDERS_GROUP, OTHER_GROUP,
};

pub use types::{Config, ThumbnailConfig, UiConfig};

pub use loader::{default_config_path, load_config, load_config_from};

#[cfg(test)]
pub use defaults::{DEFAULT_FILE_CATEGORIES, DEFAULT_ICON_SIZE, DEFAULT_MAX_THUMBNAIL_WORKERS};

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
