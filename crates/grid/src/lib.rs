//! Editable-grid support: positional row diffing, grid state and the
//! update/create split used when syncing edits back to the backend.
//!
//! Everything here is pure. No IO, no HTTP.

pub mod diff;
pub mod grid;
pub mod sync;

pub use diff::{
    appended_rows, diff, diff_records, values_equal, ChangedRow, Changeset, FieldChange, Row,
};
pub use grid::{Column, EditableGrid, RowsChange};
pub use sync::{has_identifier, plan_sync, SyncPlan};
