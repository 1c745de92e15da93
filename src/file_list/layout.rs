//! Row layout for the virtualized file list
//!
//! The list is a sequence of uniform rows. Flat layouts are pure arithmetic
//! over the item count; grouped layouts flatten each section into a header
//! row followed by its item rows, like a sectioned uniform list.

use std::collections::HashSet;
use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::grouping::Grouping;

/// Grid or list presentation
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutMode {
    #[default]
    Grid,
    List,
}

/// Items per row for `mode`
///
/// Grid mode fits `floor(width / item_width)` columns but never fewer than
/// one, including for zero, negative, or non-finite inputs.
pub fn column_count(mode: LayoutMode, viewport_width: f32, item_width: f32) -> usize {
    match mode {
        LayoutMode::List => 1,
        LayoutMode::Grid => {
            if !viewport_width.is_finite() || !item_width.is_finite() || item_width <= 0.0 {
                return 1;
            }
            let fit = (viewport_width / item_width).floor();
            if fit >= 1.0 {
                fit as usize
            } else {
                1
            }
        }
    }
}

/// What a single row shows
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RowSpec {
    /// Section header for group `group` (index into the grouping)
    Header { group: usize },
    /// Items at display positions `start..end`
    Items { start: usize, end: usize },
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum RowTable {
    Flat { len: usize },
    Grouped(Vec<RowSpec>),
}

/// Row table for the current grouping, collapse state, and column count
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RowLayout {
    table: RowTable,
    columns: usize,
}

impl RowLayout {
    pub fn build(grouping: &Grouping, collapsed: &HashSet<String>, columns: usize) -> Self {
        let columns = columns.max(1);
        let table = match grouping {
            Grouping::Flat { len } => RowTable::Flat { len: *len },
            Grouping::Grouped(groups) => {
                let mut rows = Vec::new();
                // Display position of the next visible item
                let mut position = 0;
                for (group_idx, group) in groups.iter().enumerate() {
                    rows.push(RowSpec::Header { group: group_idx });
                    if collapsed.contains(&group.name) {
                        continue;
                    }
                    let group_end = position + group.len();
                    while position < group_end {
                        let end = (position + columns).min(group_end);
                        rows.push(RowSpec::Items {
                            start: position,
                            end,
                        });
                        position = end;
                    }
                }
                RowTable::Grouped(rows)
            }
        };
        Self { table, columns }
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn row_count(&self) -> usize {
        match &self.table {
            RowTable::Flat { len } => len.div_ceil(self.columns),
            RowTable::Grouped(rows) => rows.len(),
        }
    }

    pub fn row(&self, row: usize) -> Option<RowSpec> {
        match &self.table {
            RowTable::Flat { len } => {
                let start = row.checked_mul(self.columns)?;
                if start >= *len {
                    return None;
                }
                Some(RowSpec::Items {
                    start,
                    end: (start + self.columns).min(*len),
                })
            }
            RowTable::Grouped(rows) => rows.get(row).copied(),
        }
    }

    /// Rows of `range` clamped to `[0, row_count)`
    ///
    /// Only rows inside the range are produced; an inverted or out-of-bounds
    /// range yields nothing.
    pub fn window(&self, range: Range<usize>) -> impl Iterator<Item = (usize, RowSpec)> + '_ {
        let clamped = clamp_range(range, self.row_count());
        clamped.filter_map(move |r| self.row(r).map(|spec| (r, spec)))
    }

    /// Row that shows display position `position`
    pub fn row_for_position(&self, position: usize) -> Option<usize> {
        match &self.table {
            RowTable::Flat { len } => (position < *len).then(|| position / self.columns),
            RowTable::Grouped(rows) => rows.iter().position(|spec| {
                matches!(spec, RowSpec::Items { start, end } if (*start..*end).contains(&position))
            }),
        }
    }
}

fn clamp_range(range: Range<usize>, row_count: usize) -> Range<usize> {
    let end = range.end.min(row_count);
    let start = range.start.min(end);
    start..end
}
