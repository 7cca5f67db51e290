//! `mdesk diff` and `mdesk sessions sync`: grid edits from JSON files.

use std::path::{Path, PathBuf};

use mentordesk_client::NewMeetingSession;
use mentordesk_grid::{Column, EditableGrid, Row, SyncPlan};
use serde_json::{json, Value};

use crate::exit_codes::EXIT_SYNC_PENDING;
use crate::output::print_json;
use crate::{CliError, Context};

const ID_FIELD: &str = "id";

/// Editable columns of the meeting-session grid.
pub fn default_columns() -> Vec<String> {
    ["mentor_id", "description", "session_date", "session_time", "duration", "note"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn read_rows(path: &Path) -> Result<Vec<Row>, CliError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| CliError::io(format!("{}: {}", path.display(), e)))?;
    serde_json::from_str(&text).map_err(|e| {
        CliError::input(format!("{}: {}", path.display(), e))
            .with_hint("expected a JSON array of objects")
    })
}

/// Load `original` as the baseline and apply `edited` as one edit.
fn load_grid(original: &Path, edited: &Path, columns: &[String]) -> Result<EditableGrid, CliError> {
    let columns = columns.iter().map(|key| Column::new(key.as_str(), key.as_str())).collect();
    let mut grid = EditableGrid::new(columns, read_rows(original)?);
    if let Some(change) = grid.handle_rows_change(read_rows(edited)?) {
        log::debug!("{} tracked rows changed", change.changed_rows.len());
    }
    Ok(grid)
}

// ── diff ────────────────────────────────────────────────────────────

pub fn cmd_diff(original: PathBuf, edited: PathBuf, columns: Vec<String>) -> Result<(), CliError> {
    let grid = load_grid(&original, &edited, &columns)?;
    let appended: Vec<Value> = grid
        .appended()
        .into_iter()
        .map(|(index, row)| json!({ "index": index, "row": row }))
        .collect();

    print_json(&json!({
        "changes": grid.pending(),
        "appended": appended,
    }))
}

// ── sessions sync ───────────────────────────────────────────────────

pub fn cmd_sessions_sync(
    ctx: &Context,
    original: PathBuf,
    edited: PathBuf,
    student_id: u64,
    columns: Vec<String>,
    dry_run: bool,
) -> Result<(), CliError> {
    let grid = load_grid(&original, &edited, &columns)?;
    let plan = SyncPlan::from_grid(&grid.pending(), &grid.appended(), ID_FIELD);

    let updates: Vec<Value> = plan.updates.iter().map(update_payload).collect();
    let creates = plan
        .creates
        .iter()
        .map(|row| create_payload(row, student_id))
        .collect::<Result<Vec<_>, _>>()?;

    if dry_run {
        print_json(&json!({ "updates": updates, "creates": creates }))?;
        if plan.is_empty() {
            return Ok(());
        }
        return Err(CliError { code: EXIT_SYNC_PENDING, message: String::new(), hint: None });
    }

    if plan.is_empty() {
        eprintln!("Nothing to sync");
        return Ok(());
    }

    let client = ctx.signed_in_client()?;
    if !updates.is_empty() {
        client.bulk_update_meeting_sessions(&updates)?;
    }
    if !creates.is_empty() {
        client.bulk_create_meeting_sessions(&creates)?;
    }

    print_json(&json!({ "updated": updates.len(), "created": creates.len() }))
}

/// Row as the bulk-update route wants it: the row itself plus
/// `session_id`, `date` and `time` unless the row already has them.
fn update_payload(row: &Row) -> Value {
    let mut body = row.clone();
    let aliases = [("session_id", ID_FIELD), ("date", "session_date"), ("time", "session_time")];
    for (target, source) in aliases {
        let value = row.get(source).cloned().unwrap_or(Value::Null);
        body.entry(target).or_insert(value);
    }
    Value::Object(body)
}

fn create_payload(row: &Row, student_id: u64) -> Result<NewMeetingSession, CliError> {
    Ok(NewMeetingSession {
        student_id,
        mentor_id: number_field(row, "mentor_id")?,
        date: text_field(row, "session_date")?,
        time: text_field(row, "session_time")?,
        duration: number_field(row, "duration")?
            .try_into()
            .map_err(|_| CliError::input("duration out of range"))?,
        description: row
            .get("description")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        note: row.get("note").and_then(Value::as_str).map(String::from),
    })
}

/// Numeric cell; editors often hand numbers back as strings.
fn number_field(row: &Row, key: &str) -> Result<u64, CliError> {
    let parsed = match row.get(key) {
        Some(Value::Number(n)) => n.as_u64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| CliError::input(format!("new row needs a numeric {}: {}", key, Value::Object(row.clone()))))
}

fn text_field(row: &Row, key: &str) -> Result<String, CliError> {
    match row.get(key).and_then(Value::as_str) {
        Some(s) if !s.trim().is_empty() => Ok(s.to_string()),
        _ => Err(CliError::input(format!("new row needs {}: {}", key, Value::Object(row.clone())))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(v: Value) -> Row {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn test_update_payload_adds_aliases() {
        let body = update_payload(&row(json!({
            "id": 7, "session_date": "2025-03-01", "session_time": "09:30:00", "duration": 90
        })));
        assert_eq!(body["session_id"], json!(7));
        assert_eq!(body["date"], json!("2025-03-01"));
        assert_eq!(body["time"], json!("09:30:00"));
        assert_eq!(body["duration"], json!(90));
    }

    #[test]
    fn test_update_payload_keeps_existing_keys() {
        let body = update_payload(&row(json!({"id": 7, "date": "2025-04-01", "session_date": "2025-03-01"})));
        assert_eq!(body["date"], json!("2025-04-01"));
    }

    #[test]
    fn test_create_payload_coerces_numbers() {
        let session = create_payload(
            &row(json!({
                "mentor_id": "4",
                "session_date": "2025-03-01",
                "session_time": "10:00",
                "duration": "45",
                "description": "Review",
                "note": null
            })),
            12,
        )
        .unwrap();
        assert_eq!(session.student_id, 12);
        assert_eq!(session.mentor_id, 4);
        assert_eq!(session.duration, 45);
        assert!(session.note.is_none());
    }

    #[test]
    fn test_create_payload_requires_mentor_and_date() {
        let err = create_payload(&row(json!({"session_date": "2025-03-01", "session_time": "10:00", "duration": 30})), 1)
            .unwrap_err();
        assert!(err.message.contains("mentor_id"));

        let err = create_payload(&row(json!({"mentor_id": 4, "session_time": "10:00", "duration": 30})), 1)
            .unwrap_err();
        assert!(err.message.contains("session_date"));
    }

    #[test]
    fn test_default_columns_match_grid() {
        let cols = default_columns();
        assert!(cols.contains(&"duration".to_string()));
        assert!(!cols.contains(&"id".to_string()));
    }
}
