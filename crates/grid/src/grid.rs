// Editable grid state.
// Holds the loaded baseline and the rows as currently edited, and turns
// each edit into a changeset against the baseline.

use serde::{Deserialize, Serialize};

use crate::diff::{appended_rows, diff, Changeset, Row};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    /// Row key this column edits
    pub key: String,
    /// Header label
    pub name: String,
}

impl Column {
    pub fn new(key: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
        }
    }
}

/// Result of an edit that actually changed something.
#[derive(Debug, Clone, PartialEq)]
pub struct RowsChange {
    /// Every edited row that differs from the baseline
    pub changed_rows: Vec<Row>,
    pub changes: Changeset,
}

#[derive(Debug, Clone)]
pub struct EditableGrid {
    columns: Vec<Column>,
    baseline: Vec<Row>,
    rows: Vec<Row>,
}

impl EditableGrid {
    pub fn new(columns: Vec<Column>, rows: Vec<Row>) -> Self {
        Self {
            columns,
            baseline: rows.clone(),
            rows,
        }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn baseline(&self) -> &[Row] {
        &self.baseline
    }

    fn tracked(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.key.as_str()).collect()
    }

    /// Accept a new set of rows from the editor.
    ///
    /// Returns `None` if nothing changed since the last call; otherwise the
    /// rows are stored and diffed against the baseline.
    pub fn handle_rows_change(&mut self, rows: Vec<Row>) -> Option<RowsChange> {
        if rows == self.rows {
            return None;
        }
        self.rows = rows;

        let changes = diff(&self.baseline, &self.rows, &self.tracked());
        let changed_rows = changes.iter().map(|c| c.row.clone()).collect();
        Some(RowsChange {
            changed_rows,
            changes,
        })
    }

    /// Edits not yet committed, diffed against the baseline.
    pub fn pending(&self) -> Changeset {
        diff(&self.baseline, &self.rows, &self.tracked())
    }

    /// Rows added past the end of the baseline.
    pub fn appended(&self) -> Vec<(usize, &Row)> {
        appended_rows(&self.baseline, &self.rows)
    }

    pub fn is_dirty(&self) -> bool {
        self.rows != self.baseline
    }

    /// Replace both snapshots, e.g. after reloading from the server.
    pub fn reset(&mut self, rows: Vec<Row>) {
        self.baseline = rows.clone();
        self.rows = rows;
    }

    /// Current rows become the new baseline.
    pub fn commit(&mut self) {
        self.baseline = self.rows.clone();
    }
}
