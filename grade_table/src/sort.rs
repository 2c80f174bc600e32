//! Three-way column sorting: ascending, descending, then back to document order.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::table::Row;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn css_class(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "sort-asc",
            SortDirection::Descending => "sort-desc",
        }
    }
}

/// At most one column is sorted at a time.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SortState {
    active: Option<(usize, SortDirection)>,
}

impl SortState {
    pub fn active(&self) -> Option<(usize, SortDirection)> {
        self.active
    }

    pub fn direction_of(&self, column: usize) -> Option<SortDirection> {
        match self.active {
            Some((c, dir)) if c == column => Some(dir),
            _ => None,
        }
    }

    /// Advance the clicked column one step and clear every other column.
    pub fn click(&mut self, column: usize) {
        self.active = match self.direction_of(column) {
            None => Some((column, SortDirection::Ascending)),
            Some(SortDirection::Ascending) => Some((column, SortDirection::Descending)),
            Some(SortDirection::Descending) => None,
        };
        debug!(column, state = ?self.active, "sort state changed");
    }
}

/// Numeric order with `-0 == 0`. NaN keys (non-numeric values) are equal to
/// each other and sort after every number when ascending.
fn compare_keys(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or_else(|| a.is_nan().cmp(&b.is_nan()))
}

/// Reorder `rows` in place for `state`. The result is always a permutation
/// of the input; ties keep their current relative order.
pub fn sort_rows(rows: &mut [Row], state: &SortState) {
    match state.active() {
        Some((column, direction)) => {
            let key = |row: &Row| row.cells.get(column).map_or(f64::NAN, |c| c.sort_key());
            rows.sort_by(|a, b| {
                let ord = compare_keys(key(a), key(b));
                match direction {
                    SortDirection::Ascending => ord,
                    SortDirection::Descending => ord.reverse(),
                }
            });
        }
        None => rows.sort_by_key(|row| row.index),
    }
}
