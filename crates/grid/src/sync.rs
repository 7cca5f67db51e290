// Split grid edits into updates of persisted rows and creates of new ones.

use serde::Serialize;
use serde_json::Value;

use crate::diff::{Changeset, Row};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SyncPlan {
    /// Rows that already exist on the server
    pub updates: Vec<Row>,
    /// Rows with no server identifier yet
    pub creates: Vec<Row>,
}

impl SyncPlan {
    /// Plan from a grid changeset plus the rows appended after the baseline.
    pub fn from_grid(changeset: &Changeset, appended: &[(usize, &Row)], id_field: &str) -> Self {
        let rows = changeset
            .iter()
            .map(|c| &c.row)
            .chain(appended.iter().map(|(_, row)| *row));
        split(rows, id_field)
    }

    pub fn is_empty(&self) -> bool {
        self.updates.is_empty() && self.creates.is_empty()
    }
}

pub fn plan_sync(rows: &[Row], id_field: &str) -> SyncPlan {
    split(rows.iter(), id_field)
}

/// True if the row carries a usable server id. Truthy values count: numeric
/// `0`, `false`, `null` and `""` do not, while the string `"0"` does.
pub fn has_identifier(row: &Row, id_field: &str) -> bool {
    match row.get(id_field) {
        None | Some(Value::Null) => false,
        Some(Value::Number(n)) => n.as_f64() != Some(0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Bool(b)) => *b,
        Some(_) => true,
    }
}

fn split<'a>(rows: impl Iterator<Item = &'a Row>, id_field: &str) -> SyncPlan {
    let mut plan = SyncPlan::default();
    for row in rows {
        if has_identifier(row, id_field) {
            plan.updates.push(row.clone());
        } else {
            plan.creates.push(row.clone());
        }
    }
    plan
}
