// Positional row diff for the editable grid.
// Two snapshots in, per-row field changes out. Rows are compared by
// index, not by key.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One grid row: column key → cell value.
pub type Row = Map<String, Value>;

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldChange {
    pub old_value: Value,
    pub new_value: Value,
}

/// An edited row with at least one tracked column changed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangedRow {
    pub index: usize,
    /// Full edited row, untracked columns included
    pub row: Row,
    /// Differing tracked columns only
    pub field_changes: BTreeMap<String, FieldChange>,
}

pub type Changeset = Vec<ChangedRow>;

// ---------------------------------------------------------------------------
// Diff
// ---------------------------------------------------------------------------

/// Compare `edited` against `original` row by row over `tracked` columns.
///
/// Rows of `edited` past the end of `original` are ignored here; see
/// [`appended_rows`]. A key absent from a row compares as `null`.
pub fn diff<S: AsRef<str>>(original: &[Row], edited: &[Row], tracked: &[S]) -> Changeset {
    edited
        .iter()
        .zip(original)
        .enumerate()
        .filter_map(|(index, (new_row, old_row))| {
            let field_changes = changed_fields(old_row, new_row, tracked);
            if field_changes.is_empty() {
                None
            } else {
                Some(ChangedRow {
                    index,
                    row: new_row.clone(),
                    field_changes,
                })
            }
        })
        .collect()
}

fn changed_fields<S: AsRef<str>>(
    old_row: &Row,
    new_row: &Row,
    tracked: &[S],
) -> BTreeMap<String, FieldChange> {
    let mut changes = BTreeMap::new();
    for col in tracked {
        let col = col.as_ref();
        let old_value = old_row.get(col).unwrap_or(&Value::Null);
        let new_value = new_row.get(col).unwrap_or(&Value::Null);
        if !values_equal(old_value, new_value) {
            changes.insert(
                col.to_string(),
                FieldChange {
                    old_value: old_value.clone(),
                    new_value: new_value.clone(),
                },
            );
        }
    }
    changes
}

/// Cell equality. Numbers compare by value, so `60` and `60.0` are equal;
/// arrays and objects compare element-wise.
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            if let (Some(x), Some(y)) = (x.as_i64(), y.as_i64()) {
                x == y
            } else if let (Some(x), Some(y)) = (x.as_u64(), y.as_u64()) {
                x == y
            } else {
                match (x.as_f64(), y.as_f64()) {
                    (Some(x), Some(y)) => x == y,
                    _ => false,
                }
            }
        }
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(x, y)| values_equal(x, y))
        }
        (Value::Object(x), Value::Object(y)) => {
            x.len() == y.len()
                && x.iter().all(|(k, v)| y.get(k).is_some_and(|w| values_equal(v, w)))
        }
        _ => a == b,
    }
}

/// Rows added after the original snapshot, with their index in `edited`.
pub fn appended_rows<'a>(original: &[Row], edited: &'a [Row]) -> Vec<(usize, &'a Row)> {
    edited.iter().enumerate().skip(original.len()).collect()
}

/// [`diff`] over any serializable records. Records that do not
/// serialize to a JSON object compare as empty rows.
pub fn diff_records<T: Serialize, S: AsRef<str>>(
    original: &[T],
    edited: &[T],
    tracked: &[S],
) -> Changeset {
    let original: Vec<Row> = original.iter().map(to_row).collect();
    let edited: Vec<Row> = edited.iter().map(to_row).collect();
    diff(&original, &edited, tracked)
}

fn to_row<T: Serialize>(record: &T) -> Row {
    match serde_json::to_value(record) {
        Ok(Value::Object(map)) => map,
        _ => Row::new(),
    }
}
