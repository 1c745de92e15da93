//! Multi-item selection with click / ctrl-click / shift-click semantics
//!
//! Every mutating operation receives the currently displayed paths so that
//! stale targets (a click on an entry that vanished in a refresh) are
//! ignored and shift-click ranges follow what the user sees.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::debug;

/// Which selection operation a left click maps to
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClickKind {
    /// Plain click
    Replace,
    /// Ctrl / Cmd click
    Toggle,
    /// Shift click
    Extend,
}

/// Keyboard modifiers held during a pointer event
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub control: bool,
    /// Cmd on macOS, Super elsewhere
    pub platform: bool,
    pub shift: bool,
}

impl Modifiers {
    pub fn click_kind(self) -> ClickKind {
        if self.control || self.platform {
            ClickKind::Toggle
        } else if self.shift {
            ClickKind::Extend
        } else {
            ClickKind::Replace
        }
    }
}

/// Selected paths plus the anchor used for range selection
#[derive(Clone, Debug, Default)]
pub struct SelectionManager {
    selected: HashSet<PathBuf>,
    anchor: Option<PathBuf>,
}

impl SelectionManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.selected.contains(path)
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn anchor(&self) -> Option<&Path> {
        self.anchor.as_deref()
    }

    /// Read-only copy for the clipboard collaborator
    pub fn snapshot(&self) -> HashSet<PathBuf> {
        self.selected.clone()
    }

    /// Selected paths in display order
    pub fn ordered<'a>(&self, displayed: &[&'a Path]) -> Vec<&'a Path> {
        displayed
            .iter()
            .copied()
            .filter(|p| self.selected.contains(*p))
            .collect()
    }

    /// Plain click: the selection becomes exactly `path`
    ///
    /// Returns whether anything changed.
    pub fn set_selection(&mut self, path: &Path, displayed: &[&Path]) -> bool {
        if !displayed.contains(&path) {
            debug!(path = %path.display(), "Ignoring selection of path not on display");
            return false;
        }
        let unchanged = self.selected.len() == 1 && self.selected.contains(path);
        self.selected.clear();
        self.selected.insert(path.to_path_buf());
        self.anchor = Some(path.to_path_buf());
        !unchanged
    }

    /// Ctrl/Cmd click: flip membership of `path`
    pub fn toggle_selection(&mut self, path: &Path, displayed: &[&Path]) -> bool {
        if !displayed.contains(&path) {
            debug!(path = %path.display(), "Ignoring toggle of path not on display");
            return false;
        }
        if self.selected.remove(path) {
            if self.anchor.as_deref() == Some(path) {
                self.anchor = None;
            }
        } else {
            self.selected.insert(path.to_path_buf());
            self.anchor = Some(path.to_path_buf());
        }
        true
    }

    /// Shift click: select everything between the anchor and `path`, inclusive
    ///
    /// Without an anchor (or with an anchor no longer displayed) this behaves
    /// like [`set_selection`](Self::set_selection). The anchor stays put so
    /// repeated shift-clicks pivot around it.
    pub fn select_range(&mut self, path: &Path, displayed: &[&Path]) -> bool {
        let Some(end) = displayed.iter().position(|p| *p == path) else {
            debug!(path = %path.display(), "Ignoring range to path not on display");
            return false;
        };
        let start = self
            .anchor
            .as_deref()
            .and_then(|anchor| displayed.iter().position(|p| *p == anchor));
        let Some(start) = start else {
            return self.set_selection(path, displayed);
        };

        let (lo, hi) = if start <= end { (start, end) } else { (end, start) };
        self.selected.clear();
        self.selected
            .extend(displayed[lo..=hi].iter().map(|p| p.to_path_buf()));
        debug!(lo, hi, count = self.selected.len(), "Range selection");
        true
    }

    /// Right click on `path`: keep an existing multi-selection that includes
    /// it, otherwise select it alone
    pub fn prepare_context_menu(&mut self, path: &Path, displayed: &[&Path]) -> bool {
        if self.selected.contains(path) {
            return false;
        }
        self.set_selection(path, displayed)
    }

    /// Drop paths no longer present after the item set changed
    pub fn retain_present(&mut self, present: &HashSet<&Path>) -> bool {
        let before = self.selected.len();
        self.selected.retain(|p| present.contains(p.as_path()));
        if let Some(anchor) = &self.anchor {
            if !present.contains(anchor.as_path()) {
                self.anchor = None;
            }
        }
        before != self.selected.len()
    }

    pub fn clear(&mut self) -> bool {
        let changed = !self.selected.is_empty();
        self.selected.clear();
        self.anchor = None;
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths<'a>(names: &'a [&'a str]) -> Vec<&'a Path> {
        names.iter().map(Path::new).collect()
    }

    fn set_of(names: &[&str]) -> HashSet<PathBuf> {
        names.iter().map(PathBuf::from).collect()
    }

    #[test]
    fn test_click_sequence() {
        let displayed = paths(&["A", "B", "C"]);
        let mut sel = SelectionManager::new();
        assert!(sel.is_empty());

        sel.set_selection(Path::new("A"), &displayed);
        assert_eq!(sel.snapshot(), set_of(&["A"]));

        sel.toggle_selection(Path::new("A"), &displayed);
        assert!(sel.is_empty());

        sel.set_selection(Path::new("A"), &displayed);
        sel.select_range(Path::new("C"), &displayed);
        assert_eq!(sel.snapshot(), set_of(&["A", "B", "C"]));
    }

    #[test]
    fn test_range_without_anchor_is_plain_select() {
        let displayed = paths(&["A", "B", "C"]);
        let mut sel = SelectionManager::new();
        sel.select_range(Path::new("B"), &displayed);
        assert_eq!(sel.snapshot(), set_of(&["B"]));
        assert_eq!(sel.anchor(), Some(Path::new("B")));
    }

    #[test]
    fn test_range_backwards_and_pivot() {
        let displayed = paths(&["A", "B", "C", "D", "E"]);
        let mut sel = SelectionManager::new();
        sel.set_selection(Path::new("C"), &displayed);

        sel.select_range(Path::new("A"), &displayed);
        assert_eq!(sel.snapshot(), set_of(&["A", "B", "C"]));

        // Anchor stays on C, so the next shift-click replaces the range
        sel.select_range(Path::new("E"), &displayed);
        assert_eq!(sel.snapshot(), set_of(&["C", "D", "E"]));
    }

    #[test]
    fn test_toggle_clears_anchor_of_removed_path() {
        let displayed = paths(&["A", "B"]);
        let mut sel = SelectionManager::new();
        sel.set_selection(Path::new("A"), &displayed);
        sel.toggle_selection(Path::new("B"), &displayed);
        assert_eq!(sel.anchor(), Some(Path::new("B")));

        sel.toggle_selection(Path::new("B"), &displayed);
        assert_eq!(sel.anchor(), None);
        assert_eq!(sel.snapshot(), set_of(&["A"]));
    }

    #[test]
    fn test_stale_targets_are_noops() {
        let displayed = paths(&["A", "B"]);
        let mut sel = SelectionManager::new();
        sel.set_selection(Path::new("A"), &displayed);

        assert!(!sel.set_selection(Path::new("gone"), &displayed));
        assert!(!sel.toggle_selection(Path::new("gone"), &displayed));
        assert!(!sel.select_range(Path::new("gone"), &displayed));
        assert_eq!(sel.snapshot(), set_of(&["A"]));
    }

    #[test]
    fn test_context_menu_preserves_multi_selection() {
        let displayed = paths(&["A", "B", "C"]);
        let mut sel = SelectionManager::new();
        sel.set_selection(Path::new("A"), &displayed);
        sel.toggle_selection(Path::new("B"), &displayed);

        assert!(!sel.prepare_context_menu(Path::new("B"), &displayed));
        assert_eq!(sel.snapshot(), set_of(&["A", "B"]));

        assert!(sel.prepare_context_menu(Path::new("C"), &displayed));
        assert_eq!(sel.snapshot(), set_of(&["C"]));
    }

    #[test]
    fn test_retain_present() {
        let displayed = paths(&["A", "B", "C"]);
        let mut sel = SelectionManager::new();
        sel.set_selection(Path::new("A"), &displayed);
        sel.select_range(Path::new("C"), &displayed);

        let present: HashSet<&Path> = [Path::new("B"), Path::new("C")].into_iter().collect();
        assert!(sel.retain_present(&present));
        assert_eq!(sel.snapshot(), set_of(&["B", "C"]));
        assert_eq!(sel.anchor(), None);
    }

    #[test]
    fn test_modifier_mapping() {
        let ctrl = Modifiers { control: true, ..Default::default() };
        let cmd_shift = Modifiers { platform: true, shift: true, ..Default::default() };
        let shift = Modifiers { shift: true, ..Default::default() };
        assert_eq!(ctrl.click_kind(), ClickKind::Toggle);
        assert_eq!(cmd_shift.click_kind(), ClickKind::Toggle);
        assert_eq!(shift.click_kind(), ClickKind::Extend);
        assert_eq!(Modifiers::default().click_kind(), ClickKind::Replace);
    }

    #[test]
    fn test_ordered_follows_display() {
        let displayed = paths(&["A", "B", "C"]);
        let mut sel = SelectionManager::new();
        sel.set_selection(Path::new("C"), &displayed);
        sel.toggle_selection(Path::new("A"), &displayed);
        assert_eq!(sel.ordered(&displayed), vec![Path::new("A"), Path::new("C")]);
    }
}
