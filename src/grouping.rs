//! Category grouping for the file pane
//!
//! Partitions the filtered listing into named sections ("Folders", one
//! section per configured category, "Other") and derives the display order
//! the user actually sees. Groups hold indices into the filtered items, the
//! same way grouped list rows point into a flat results array.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use tracing::{debug, instrument};

use crate::config::{Config, FOLDERS_GROUP, OTHER_GROUP};
use crate::file_entry::FileEntry;

/// A named section of the listing
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Group {
    pub name: String,
    /// Indices into the filtered items, in input order
    pub indices: Vec<usize>,
}

impl Group {
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Result of a grouping pass
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Grouping {
    /// Grouping disabled: the filtered items in their given order
    Flat { len: usize },
    /// Sections in display order
    Grouped(Vec<Group>),
}

/// Order group names: "Folders" first, "Other" last, the rest lexicographic
pub fn compare_group_names(a: &str, b: &str) -> Ordering {
    match (a, b) {
        _ if a == b => Ordering::Equal,
        (FOLDERS_GROUP, _) => Ordering::Less,
        (_, FOLDERS_GROUP) => Ordering::Greater,
        (OTHER_GROUP, _) => Ordering::Greater,
        (_, OTHER_GROUP) => Ordering::Less,
        _ => a.cmp(b),
    }
}

/// Partition `items` into groups when `group_by_type` is set
///
/// Directories go to "Folders", files with a configured category to that
/// category, everything else to "Other". Empty groups are not emitted.
/// Within a group items keep their relative order from `items`.
#[instrument(level = "debug", skip_all, fields(item_count = items.len(), group_by_type))]
pub fn group_items(items: &[FileEntry], group_by_type: bool, config: &Config) -> Grouping {
    if !group_by_type {
        return Grouping::Flat { len: items.len() };
    }

    let mut folders: Vec<usize> = Vec::new();
    let mut other: Vec<usize> = Vec::new();
    let mut categories: BTreeMap<&str, Vec<usize>> = BTreeMap::new();

    for (idx, entry) in items.iter().enumerate() {
        if entry.is_dir {
            folders.push(idx);
        } else if let Some(category) = config.get_file_category(&entry.path) {
            categories.entry(category).or_default().push(idx);
        } else {
            other.push(idx);
        }
    }

    let mut groups: Vec<Group> = Vec::with_capacity(categories.len() + 2);
    if !folders.is_empty() {
        groups.push(Group {
            name: FOLDERS_GROUP.to_string(),
            indices: folders,
        });
    }
    for (name, indices) in categories {
        // A user category literally named "Folders"/"Other" merges into the fixed one
        if let Some(existing) = groups.iter_mut().find(|g| g.name == name) {
            existing.indices.extend(indices);
            existing.indices.sort_unstable();
            continue;
        }
        if name == OTHER_GROUP {
            other.extend(indices);
            other.sort_unstable();
            continue;
        }
        groups.push(Group {
            name: name.to_string(),
            indices,
        });
    }
    if !other.is_empty() {
        groups.push(Group {
            name: OTHER_GROUP.to_string(),
            indices: other,
        });
    }

    groups.sort_by(|a, b| compare_group_names(&a.name, &b.name));

    debug!(
        group_count = groups.len(),
        groups = ?groups.iter().map(|g| (g.name.as_str(), g.len())).collect::<Vec<_>>(),
        "Grouped view: created type-based sections"
    );

    Grouping::Grouped(groups)
}

impl Grouping {
    /// Number of groups (0 in flat mode)
    pub fn group_count(&self) -> usize {
        match self {
            Grouping::Flat { .. } => 0,
            Grouping::Grouped(groups) => groups.len(),
        }
    }

    /// Group names in display order
    pub fn group_names(&self) -> Vec<&str> {
        match self {
            Grouping::Flat { .. } => Vec::new(),
            Grouping::Grouped(groups) => groups.iter().map(|g| g.name.as_str()).collect(),
        }
    }

    /// Indices into the filtered items in the order they are displayed
    ///
    /// Items of collapsed groups are not displayed and are left out.
    pub fn display_order(&self, collapsed: &HashSet<String>) -> DisplayOrder {
        let indices = match self {
            Grouping::Flat { len } => (0..*len).collect(),
            Grouping::Grouped(groups) => groups
                .iter()
                .filter(|g| !collapsed.contains(&g.name))
                .flat_map(|g| g.indices.iter().copied())
                .collect(),
        };
        DisplayOrder { indices }
    }
}

/// The on-screen item sequence, as indices into the filtered items
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DisplayOrder {
    indices: Vec<usize>,
}

impl DisplayOrder {
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Filtered-item index shown at display position `pos`
    pub fn item_index(&self, pos: usize) -> Option<usize> {
        self.indices.get(pos).copied()
    }

    /// Paths in display order
    pub fn paths<'a>(&'a self, items: &'a [FileEntry]) -> Vec<&'a Path> {
        self.indices
            .iter()
            .filter_map(|&i| items.get(i))
            .map(|e| e.path.as_path())
            .collect()
    }
}
