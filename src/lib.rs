//! filepane - virtualized file list engine
//!
//! Renders large directory listings as a windowed grid or list, tracks
//! multi-item selection, groups files by category, and generates image
//! thumbnails on a worker pool without blocking the render loop.
//!
//! The host owns the window and drawing; this crate produces row and cell
//! descriptors for the visible range and raises [`file_list::FileListEvent`]s
//! for open, context-menu, and clipboard requests.

pub mod config;
pub mod error;
pub mod file_entry;
pub mod file_list;
pub mod grouping;
pub mod logging;
pub mod selection;
pub mod thumbnails;

pub use config::Config;
pub use error::{FilePaneError, Result};
pub use file_entry::{FileEntry, IconKey};
pub use file_list::{FileList, FileListEvent, LayoutMode, RenderedWindow};
pub use selection::{Modifiers, SelectionManager};
pub use thumbnails::{ThumbnailCache, ThumbnailPipeline};
