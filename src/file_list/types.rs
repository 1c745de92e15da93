//! Descriptors produced by the file list and the events it raises

use std::path::PathBuf;

use crate::file_entry::{FileEntry, IconKey};

use super::layout::LayoutMode;

/// What a cell shows as its icon
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CellIcon {
    /// Path of a cached thumbnail image
    Thumbnail(PathBuf),
    /// Type glyph; also shown while a thumbnail is pending or after it failed
    Fallback(IconKey),
}

/// One item cell
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CellDescriptor {
    pub entry: FileEntry,
    /// Absolute display position; stable element identity across frames
    pub display_index: usize,
    pub selected: bool,
    pub icon: CellIcon,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RowDescriptor {
    /// Group section header, e.g. "Images (12)"
    Header {
        row: usize,
        name: String,
        count: usize,
        collapsed: bool,
    },
    /// One list item or one grid row
    Items {
        row: usize,
        cells: Vec<CellDescriptor>,
    },
}

impl RowDescriptor {
    pub fn row(&self) -> usize {
        match self {
            RowDescriptor::Header { row, .. } | RowDescriptor::Items { row, .. } => *row,
        }
    }

    pub fn cells(&self) -> &[CellDescriptor] {
        match self {
            RowDescriptor::Header { .. } => &[],
            RowDescriptor::Items { cells, .. } => cells,
        }
    }
}

/// Full-pane overlay
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Overlay {
    #[default]
    None,
    Loading,
    NoItems,
}

/// Output of one render pass over a visible row range
#[derive(Clone, Debug, PartialEq)]
pub struct RenderedWindow {
    pub mode: LayoutMode,
    pub columns: usize,
    /// Total rows, for the host's scroll extent
    pub row_count: usize,
    /// Edge length the host draws cell icons and thumbnails at (px)
    pub icon_size: u32,
    pub rows: Vec<RowDescriptor>,
    pub overlay: Overlay,
}

impl RenderedWindow {
    pub fn cells(&self) -> impl Iterator<Item = &CellDescriptor> {
        self.rows.iter().flat_map(|r| r.cells().iter())
    }
}

/// Window-relative pointer position
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClipboardOp {
    Copy,
    Cut,
    Paste,
}

/// Requests for collaborators outside the list
#[derive(Clone, Debug, PartialEq)]
pub enum FileListEvent {
    /// Double-click on an item
    Open(PathBuf),
    /// Right-click; `path` is None on empty background
    ContextMenu {
        position: Point,
        path: Option<PathBuf>,
    },
    /// Clipboard keystroke with the selection at that moment, in display order
    Clipboard { op: ClipboardOp, paths: Vec<PathBuf> },
}
