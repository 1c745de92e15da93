//! Outstanding thumbnail requests
//!
//! A path is pending from the moment a job is scheduled until its completion
//! event is applied on the rendering thread. At most one request per path
//! is outstanding at any time.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

/// Identifies one pending request
///
/// Completions carry the ticket they were issued with; a completion whose
/// ticket no longer matches (the entry was dropped and re-requested) leaves
/// the newer entry alone.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Ticket(u64);

#[derive(Debug, Default)]
pub struct PendingThumbnails {
    entries: HashMap<PathBuf, Ticket>,
    next_ticket: u64,
}

impl PendingThumbnails {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check-and-insert in one step
    ///
    /// Returns a fresh ticket when `path` was not pending, `None` otherwise.
    pub fn try_begin(&mut self, path: &Path) -> Option<Ticket> {
        if self.entries.contains_key(path) {
            return None;
        }
        let ticket = Ticket(self.next_ticket);
        self.next_ticket += 1;
        self.entries.insert(path.to_path_buf(), ticket);
        Some(ticket)
    }

    /// Clear `path` if it is still pending under `ticket`
    pub fn complete(&mut self, path: &Path, ticket: Ticket) -> bool {
        match self.entries.get(path) {
            Some(current) if *current == ticket => {
                self.entries.remove(path);
                true
            }
            _ => false,
        }
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.entries.contains_key(path)
    }

    /// Drop entries for paths no longer present; returns how many went
    pub fn retain_present(&mut self, present: &HashSet<&Path>) -> usize {
        let before = self.entries.len();
        self.entries.retain(|p, _| present.contains(p.as_path()));
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_try_begin_dedups() {
        let mut pending = PendingThumbnails::new();
        let p = Path::new("/a.png");
        let ticket = pending.try_begin(p);
        assert!(ticket.is_some());
        assert!(pending.try_begin(p).is_none());
        assert!(pending.contains(p));
        assert_eq!(pending.len(), 1);
    }

    #[test]
    fn test_complete_requires_matching_ticket() {
        let mut pending = PendingThumbnails::new();
        let p = Path::new("/a.png");
        let old = pending.try_begin(p).unwrap();

        // Path vanished, then came back and was requested again
        pending.retain_present(&HashSet::new());
        let new = pending.try_begin(p).unwrap();
        assert_ne!(old, new);

        assert!(!pending.complete(p, old));
        assert!(pending.contains(p));
        assert!(pending.complete(p, new));
        assert!(pending.is_empty());
    }

    #[test]
    fn test_retain_present() {
        let mut pending = PendingThumbnails::new();
        pending.try_begin(Path::new("/a.png"));
        pending.try_begin(Path::new("/b.png"));
        let present: HashSet<&Path> = [Path::new("/b.png")].into_iter().collect();
        assert_eq!(pending.retain_present(&present), 1);
        assert!(!pending.contains(Path::new("/a.png")));
        assert!(pending.contains(Path::new("/b.png")));
    }
}
