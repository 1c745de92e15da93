//! Virtualized file list
//!
//! `FileList` owns the listing, selection, grouping, and thumbnail pipeline
//! for one pane. The host calls [`FileList::render_window`] with the visible
//! row range each frame and only those rows are built; thumbnails are
//! requested for visible image cells only.
//!
//! All methods run on the rendering thread. Worker completions reach the
//! list through [`FileList::process_thumbnail_events`].

mod layout;
mod types;

pub use layout::{column_count, LayoutMode, RowLayout, RowSpec};
pub use types::{
    CellDescriptor, CellIcon, ClipboardOp, FileListEvent, Overlay, Point, RenderedWindow,
    RowDescriptor,
};

use std::collections::{HashSet, VecDeque};
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::{debug, info};

use crate::config::Config;
use crate::file_entry::FileEntry;
use crate::grouping::{group_items, DisplayOrder, Grouping};
use crate::logging;
use crate::selection::{ClickKind, Modifiers, SelectionManager};
use crate::thumbnails::ThumbnailPipeline;

/// Viewport width assumed until the host reports one
pub const DEFAULT_VIEWPORT_WIDTH: f32 = 1000.0;

/// Render passes slower than this are logged
const SLOW_RENDER_MS: u64 = 8;

pub struct FileList {
    config: Config,
    items: Vec<FileEntry>,
    /// Set by the filter collaborator; None shows every item
    filtered: Option<Vec<FileEntry>>,
    is_loading: bool,
    mode: LayoutMode,
    group_by_type: bool,
    viewport_width: f32,
    collapsed: HashSet<String>,

    // Derived from the above; rebuilt by `regroup` / `relayout`
    grouping: Grouping,
    display: DisplayOrder,
    layout: RowLayout,

    selection: SelectionManager,
    thumbnails: ThumbnailPipeline,
    events: VecDeque<FileListEvent>,
}

impl FileList {
    pub fn new(config: Config, thumbnails: ThumbnailPipeline) -> Self {
        let mode = config.ui.view_mode;
        let group_by_type = config.group_files_by_type;
        let mut list = Self {
            config,
            items: Vec::new(),
            filtered: None,
            is_loading: false,
            mode,
            group_by_type,
            viewport_width: DEFAULT_VIEWPORT_WIDTH,
            collapsed: HashSet::new(),
            grouping: Grouping::Flat { len: 0 },
            display: DisplayOrder::default(),
            layout: RowLayout::build(&Grouping::Flat { len: 0 }, &HashSet::new(), 1),
            selection: SelectionManager::new(),
            thumbnails,
            events: VecDeque::new(),
        };
        list.regroup();
        list
    }

    // ============================================
    // INPUTS
    // ============================================

    /// Replace the listing (directory change or refresh)
    ///
    /// Selection and pending thumbnails for vanished paths are dropped. Any
    /// filter is cleared; the filter collaborator re-applies it.
    pub fn set_items(&mut self, items: Vec<FileEntry>) {
        {
            let present: HashSet<&Path> = items.iter().map(|e| e.path.as_path()).collect();
            if self.selection.retain_present(&present) {
                debug!(remaining = self.selection.len(), "Dropped selection for vanished paths");
            }
            self.thumbnails.retain_paths(&present);
        }
        info!(item_count = items.len(), "File list items replaced");
        self.items = items;
        self.filtered = None;
        self.regroup();
    }

    /// Set the filtered subset, or `None` to show every item
    pub fn set_filtered_items(&mut self, filtered: Option<Vec<FileEntry>>) {
        self.filtered = filtered;
        self.regroup();
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.is_loading = loading;
    }

    pub fn set_layout_mode(&mut self, mode: LayoutMode) {
        if self.mode != mode {
            self.mode = mode;
            self.relayout();
        }
    }

    pub fn set_group_by_type(&mut self, enabled: bool) {
        if self.group_by_type != enabled {
            self.group_by_type = enabled;
            self.regroup();
        }
    }

    pub fn set_viewport_width(&mut self, width: f32) {
        self.viewport_width = width;
        let columns = column_count(self.mode, width, self.config.ui.grid_item_width);
        if columns != self.layout.columns() {
            self.relayout();
        }
    }

    /// Collapse or expand a group; returns false for unknown groups
    pub fn toggle_group(&mut self, name: &str) -> bool {
        if !self.grouping.group_names().contains(&name) {
            return false;
        }
        if !self.collapsed.remove(name) {
            self.collapsed.insert(name.to_string());
        }
        debug!(group = name, collapsed = self.collapsed.contains(name), "Toggled group");
        self.regroup();
        true
    }

    // ============================================
    // STATE
    // ============================================

    pub fn items(&self) -> &[FileEntry] {
        &self.items
    }

    /// Items after filtering, before grouping
    pub fn filtered_items(&self) -> &[FileEntry] {
        self.filtered.as_deref().unwrap_or(&self.items)
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn layout_mode(&self) -> LayoutMode {
        self.mode
    }

    pub fn group_by_type(&self) -> bool {
        self.group_by_type
    }

    pub fn columns(&self) -> usize {
        self.layout.columns()
    }

    pub fn row_count(&self) -> usize {
        self.layout.row_count()
    }

    pub fn group_names(&self) -> Vec<&str> {
        self.grouping.group_names()
    }

    pub fn is_collapsed(&self, group: &str) -> bool {
        self.collapsed.contains(group)
    }

    /// Paths in the order they are on screen
    pub fn displayed_paths(&self) -> Vec<&Path> {
        shown_paths(&self.display, &self.items, &self.filtered)
    }

    /// Row showing `path`, for scroll-into-view
    pub fn row_for_path(&self, path: &Path) -> Option<usize> {
        let position = self.displayed_paths().iter().position(|p| *p == path)?;
        self.layout.row_for_position(position)
    }

    pub fn overlay(&self) -> Overlay {
        if self.is_loading {
            Overlay::Loading
        } else if self.filtered_items().is_empty() {
            Overlay::NoItems
        } else {
            Overlay::None
        }
    }

    pub fn thumbnails(&self) -> &ThumbnailPipeline {
        &self.thumbnails
    }

    fn regroup(&mut self) {
        let grouping = group_items(self.filtered_items(), self.group_by_type, &self.config);
        // Forget collapse state of groups that no longer exist
        let names: HashSet<&str> = grouping.group_names().into_iter().collect();
        self.collapsed.retain(|name| names.contains(name.as_str()));

        self.display = grouping.display_order(&self.collapsed);
        self.grouping = grouping;
        self.relayout();
    }

    fn relayout(&mut self) {
        let columns = column_count(self.mode, self.viewport_width, self.config.ui.grid_item_width);
        self.layout = RowLayout::build(&self.grouping, &self.collapsed, columns);
        debug!(
            mode = ?self.mode,
            columns,
            rows = self.layout.row_count(),
            displayed = self.display.len(),
            "Rebuilt row layout"
        );
    }

    // ============================================
    // RENDERING
    // ============================================

    /// Build descriptors for the rows in `range`
    ///
    /// Nothing outside the (clamped) range is touched. Image cells without a
    /// cached thumbnail show their type icon and get a thumbnail request.
    pub fn render_window(&mut self, range: Range<usize>) -> RenderedWindow {
        let start = Instant::now();
        let requested = range.clone();

        let Self {
            items,
            filtered,
            grouping,
            display,
            layout,
            selection,
            thumbnails,
            collapsed,
            ..
        } = self;
        let filtered_items: &[FileEntry] = filtered.as_deref().unwrap_or(items.as_slice());

        let mut rows = Vec::new();
        for (row, spec) in layout.window(range) {
            match spec {
                RowSpec::Header { group } => {
                    let Grouping::Grouped(groups) = &*grouping else {
                        crate::debug_panic!("header row in a flat layout");
                        continue;
                    };
                    let Some(group) = groups.get(group) else {
                        continue;
                    };
                    rows.push(RowDescriptor::Header {
                        row,
                        name: group.name.clone(),
                        count: group.len(),
                        collapsed: collapsed.contains(&group.name),
                    });
                }
                RowSpec::Items { start, end } => {
                    let cells = (start..end)
                        .filter_map(|position| {
                            let entry = filtered_items.get(display.item_index(position)?)?;
                            Some(CellDescriptor {
                                entry: entry.clone(),
                                display_index: position,
                                selected: selection.contains(&entry.path),
                                icon: cell_icon(entry, thumbnails),
                            })
                        })
                        .collect();
                    rows.push(RowDescriptor::Items { row, cells });
                }
            }
        }

        let window = RenderedWindow {
            mode: self.mode,
            columns: self.layout.columns(),
            row_count: self.layout.row_count(),
            icon_size: self.config.ui.icon_size,
            rows,
            overlay: self.overlay(),
        };

        logging::log_render_window(
            requested.start,
            requested.end,
            window.row_count,
            window.rows.len(),
        );
        logging::log_perf("render_window", start.elapsed().as_millis() as u64, SLOW_RENDER_MS);
        window
    }

    /// Apply finished thumbnail jobs; true when a re-render is needed
    pub fn process_thumbnail_events(&mut self) -> bool {
        self.thumbnails.process_events()
    }

    /// Block until a pending thumbnail finishes (no-op when idle)
    pub fn wait_for_thumbnails(&mut self) -> bool {
        self.thumbnails.wait_for_progress()
    }

    // ============================================
    // SELECTION
    // ============================================

    pub fn selection(&self) -> HashSet<PathBuf> {
        self.selection.snapshot()
    }

    pub fn selection_manager(&self) -> &SelectionManager {
        &self.selection
    }

    /// Selected paths in display order
    pub fn selected_paths(&self) -> Vec<PathBuf> {
        let displayed = self.displayed_paths();
        self.selection
            .ordered(&displayed)
            .into_iter()
            .map(Path::to_path_buf)
            .collect()
    }

    pub fn set_selection(&mut self, path: &Path) -> bool {
        let displayed = shown_paths(&self.display, &self.items, &self.filtered);
        self.selection.set_selection(path, &displayed)
    }

    pub fn toggle_selection(&mut self, path: &Path) -> bool {
        let displayed = shown_paths(&self.display, &self.items, &self.filtered);
        self.selection.toggle_selection(path, &displayed)
    }

    pub fn select_range(&mut self, path: &Path) -> bool {
        let displayed = shown_paths(&self.display, &self.items, &self.filtered);
        self.selection.select_range(path, &displayed)
    }

    pub fn clear_selection(&mut self) -> bool {
        self.selection.clear()
    }

    // ============================================
    // INPUT EVENTS
    // ============================================

    /// Left click on an item
    ///
    /// `click_count >= 2` raises [`FileListEvent::Open`]. Returns whether the
    /// selection changed.
    pub fn click(&mut self, path: &Path, modifiers: Modifiers, click_count: u32) -> bool {
        if click_count >= 2 {
            let displayed = shown_paths(&self.display, &self.items, &self.filtered);
            if displayed.contains(&path) {
                info!(path = %path.display(), "Open requested");
                self.events.push_back(FileListEvent::Open(path.to_path_buf()));
            }
            return false;
        }
        match modifiers.click_kind() {
            ClickKind::Replace => self.set_selection(path),
            ClickKind::Toggle => self.toggle_selection(path),
            ClickKind::Extend => self.select_range(path),
        }
    }

    /// Right click on an item (`Some`) or the empty background (`None`)
    ///
    /// An unselected item becomes the selection; a selected one keeps the
    /// current selection. Clicks on items no longer displayed are ignored.
    pub fn context_click(&mut self, path: Option<&Path>, position: Point) -> bool {
        let Some(path) = path else {
            self.events.push_back(FileListEvent::ContextMenu {
                position,
                path: None,
            });
            return false;
        };

        let displayed = shown_paths(&self.display, &self.items, &self.filtered);
        if !displayed.contains(&path) {
            debug!(path = %path.display(), "Ignoring context click on path not on display");
            return false;
        }
        let changed = self.selection.prepare_context_menu(path, &displayed);
        self.events.push_back(FileListEvent::ContextMenu {
            position,
            path: Some(path.to_path_buf()),
        });
        changed
    }

    /// Keystroke while the list has focus; true when handled
    ///
    /// Ctrl (or Cmd) + C / X / V raise clipboard requests carrying the
    /// current selection.
    pub fn handle_key(&mut self, key: &str, modifiers: Modifiers) -> bool {
        if !(modifiers.control || modifiers.platform) {
            return false;
        }
        let op = match key.to_ascii_lowercase().as_str() {
            "c" => ClipboardOp::Copy,
            "x" => ClipboardOp::Cut,
            "v" => ClipboardOp::Paste,
            _ => return false,
        };
        let paths = self.selected_paths();
        debug!(op = ?op, count = paths.len(), "Clipboard request");
        self.events.push_back(FileListEvent::Clipboard { op, paths });
        true
    }

    /// Take the events raised since the last call
    pub fn drain_events(&mut self) -> Vec<FileListEvent> {
        self.events.drain(..).collect()
    }
}

/// Paths in display order, over the filtered items when a filter is set
///
/// Takes the fields rather than `&self` so callers can still mutate the
/// selection or event queue while holding the result.
fn shown_paths<'a>(
    display: &'a DisplayOrder,
    items: &'a [FileEntry],
    filtered: &'a Option<Vec<FileEntry>>,
) -> Vec<&'a Path> {
    display.paths(filtered.as_deref().unwrap_or(items))
}

fn cell_icon(entry: &FileEntry, thumbnails: &mut ThumbnailPipeline) -> CellIcon {
    if entry.is_thumbnail_candidate() {
        if let Some(thumbnail) = thumbnails.request_thumbnail(&entry.path) {
            return CellIcon::Thumbnail(thumbnail);
        }
    }
    CellIcon::Fallback(entry.icon_key())
}

#[cfg(test)]
#[path = "file_list_tests.rs"]
mod tests;
