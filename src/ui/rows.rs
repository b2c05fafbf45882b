//! Display row derivation
//!
//! Pure transformation from a credential snapshot to the rows a
//! rendering strategy puts on screen. Rows are derived fresh on every
//! render pass and never stored.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::models::CredentialSnapshot;

/// Rows shown per grid page
pub const GRID_PAGE_SIZE: usize = 5;

/// Rendering strategy for the credential snapshot.
///
/// A configuration choice (CLI flag or config file), not a decision made
/// by the data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    /// One flat line per credential
    #[default]
    List,
    /// Paginated single-column grid with selection checkboxes
    Grid,
}

/// One rendered credential row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayRow {
    pub id: String,
    pub name: String,
    pub index: usize,
}

/// Derive display rows in snapshot iteration order.
///
/// The order is the snapshot's own entry order, never re-sorted.
pub fn snapshot_rows(snapshot: &CredentialSnapshot) -> Vec<DisplayRow> {
    snapshot
        .iter()
        .enumerate()
        .map(|(index, (id, name))| DisplayRow {
            id: id.to_string(),
            name: name.to_string(),
            index,
        })
        .collect()
}

/// Format one row as the list strategy's flat line
pub fn list_line(row: &DisplayRow) -> String {
    format!("key: {} Name: {}", row.index, row.name)
}

/// Number of grid pages for a snapshot of `len` entries (0 when empty)
pub fn page_count(len: usize) -> usize {
    len.div_ceil(GRID_PAGE_SIZE)
}

/// Clamp a page index to the snapshot's valid range
pub fn clamp_page(page: usize, len: usize) -> usize {
    page.min(page_count(len).saturating_sub(1))
}

/// Number of rows on one grid page
pub fn page_len(len: usize, page: usize) -> usize {
    len.saturating_sub(page * GRID_PAGE_SIZE).min(GRID_PAGE_SIZE)
}

/// Derive the rows of one grid page
pub fn page_rows(snapshot: &CredentialSnapshot, page: usize) -> Vec<DisplayRow> {
    snapshot
        .iter()
        .enumerate()
        .skip(page * GRID_PAGE_SIZE)
        .take(GRID_PAGE_SIZE)
        .map(|(index, (id, name))| DisplayRow {
            id: id.to_string(),
            name: name.to_string(),
            index,
        })
        .collect()
}
