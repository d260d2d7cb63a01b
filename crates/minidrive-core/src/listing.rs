//! File list view model.
//!
//! `render_rows` maps listing records to render instructions. `FileListView`
//! holds the rows currently on screen together with the search filter and
//! hands out action handles that are only valid for the render that produced
//! them.

use crate::models::FileRecord;
use crate::utils::contains_ignore_case;

/// Per-row actions, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    Download,
    Delete,
    Share,
}

impl ActionKind {
    pub const ALL: [ActionKind; 3] = [ActionKind::Download, ActionKind::Delete, ActionKind::Share];

    pub fn label(&self) -> &'static str {
        match self {
            ActionKind::Download => "Download",
            ActionKind::Delete => "Delete",
            ActionKind::Share => "Share",
        }
    }

    /// Key binding shown next to the label.
    pub fn key(&self) -> char {
        match self {
            ActionKind::Download => 'd',
            ActionKind::Delete => 'x',
            ActionKind::Share => 's',
        }
    }
}

/// An action bound to one file, keyed by filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowAction {
    pub kind: ActionKind,
    pub filename: String,
}

/// Render instruction for one list row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRow {
    pub filename: String,
    pub uploaded: String,
    pub actions: Vec<RowAction>,
}

/// Pure mapping from listing records to rows, preserving order.
pub fn render_rows(records: &[FileRecord]) -> Vec<FileRow> {
    records
        .iter()
        .map(|record| FileRow {
            filename: record.filename.clone(),
            uploaded: record.uploaded_display(),
            actions: ActionKind::ALL
                .iter()
                .map(|&kind| RowAction {
                    kind,
                    filename: record.filename.clone(),
                })
                .collect(),
        })
        .collect()
}

/// Reference to a row action from a specific render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionHandle {
    generation: u64,
    row: usize,
    kind: ActionKind,
}

#[derive(Debug, Default)]
pub struct FileListView {
    rows: Vec<FileRow>,
    hidden: Vec<bool>,
    query: String,
    generation: u64,
}

impl FileListView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace every row with a fresh render of `records`.
    /// Handles from earlier renders stop resolving.
    pub fn replace(&mut self, records: &[FileRecord]) {
        self.rows = render_rows(records);
        self.generation += 1;
        self.apply_filter();
    }

    pub fn rows(&self) -> &[FileRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Hide rows whose filename does not contain `query` (trimmed,
    /// case-insensitive). Rows are never removed or reordered.
    pub fn filter(&mut self, query: &str) {
        self.query = query.trim().to_lowercase();
        self.apply_filter();
    }

    pub fn clear_filter(&mut self) {
        self.filter("");
    }

    fn apply_filter(&mut self) {
        let query = &self.query;
        self.hidden = self
            .rows
            .iter()
            .map(|row| !query.is_empty() && !contains_ignore_case(&row.filename, query))
            .collect();
    }

    pub fn is_visible(&self, index: usize) -> bool {
        index < self.rows.len() && !self.hidden[index]
    }

    /// Visible rows with their index in the full list.
    pub fn visible_rows(&self) -> impl Iterator<Item = (usize, &FileRow)> {
        self.rows
            .iter()
            .enumerate()
            .filter(move |(i, _)| !self.hidden[*i])
    }

    pub fn visible_len(&self) -> usize {
        self.hidden.iter().filter(|h| !**h).count()
    }

    /// Index in the full list of the `nth` visible row.
    pub fn nth_visible(&self, nth: usize) -> Option<usize> {
        self.visible_rows().nth(nth).map(|(i, _)| i)
    }

    /// Handle for `kind` on the row at `index`, valid until the next render.
    pub fn handle(&self, index: usize, kind: ActionKind) -> Option<ActionHandle> {
        self.is_visible(index).then_some(ActionHandle {
            generation: self.generation,
            row: index,
            kind,
        })
    }

    /// The action a handle was issued for, or `None` if the rows have been
    /// re-rendered since.
    pub fn resolve(&self, handle: ActionHandle) -> Option<&RowAction> {
        if handle.generation != self.generation {
            return None;
        }
        self.rows
            .get(handle.row)?
            .actions
            .iter()
            .find(|a| a.kind == handle.kind)
    }
}
