// Property-based tests for the row diff.
// CI: 256 cases (default). Soak: PROPTEST_CASES=10000 cargo test --release

use mentordesk_grid::*;
use proptest::prelude::*;
use serde_json::{json, Value};

fn config() -> ProptestConfig {
    ProptestConfig {
        cases: std::env::var("PROPTEST_CASES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(256),
        failure_persistence: None,
        ..ProptestConfig::default()
    }
}

// ---------------------------------------------------------------------------
// Generators
// ---------------------------------------------------------------------------

const COLUMNS: [&str; 4] = ["duration", "description", "note", "session_time"];

/// Cell value: numbers, short strings, or null.
fn arb_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        2 => (0u32..240).prop_map(|n| json!(n)),
        2 => "[a-z ]{0,8}".prop_map(Value::String),
        1 => Just(Value::Null),
    ]
}

/// A row over a random subset of the known columns, plus an id.
fn arb_row() -> impl Strategy<Value = Row> {
    (
        0u64..50,
        prop::collection::vec(prop::option::of(arb_value()), COLUMNS.len()),
    )
        .prop_map(|(id, cells)| {
            let mut row = Row::new();
            row.insert("id".into(), json!(id));
            for (col, cell) in COLUMNS.iter().zip(cells) {
                if let Some(v) = cell {
                    row.insert(col.to_string(), v);
                }
            }
            row
        })
}

fn arb_rows() -> impl Strategy<Value = Vec<Row>> {
    prop::collection::vec(arb_row(), 0..12)
}

fn arb_tracked() -> impl Strategy<Value = Vec<String>> {
    prop::sample::subsequence(COLUMNS.to_vec(), 0..=COLUMNS.len())
        .prop_map(|cols| cols.into_iter().map(String::from).collect())
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(config())]

    #[test]
    fn identity_is_empty(rows in arb_rows(), tracked in arb_tracked()) {
        prop_assert!(diff(&rows, &rows, &tracked).is_empty());
    }

    #[test]
    fn float_encoded_integers_are_unchanged(rows in arb_rows(), tracked in arb_tracked()) {
        let reencoded: Vec<Row> = rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|(k, v)| {
                        let v = match v.as_u64() {
                            Some(n) => json!(n as f64),
                            None => v.clone(),
                        };
                        (k.clone(), v)
                    })
                    .collect()
            })
            .collect();
        prop_assert!(diff(&rows, &reencoded, &tracked).is_empty());
        prop_assert!(diff(&reencoded, &rows, &tracked).is_empty());
    }

    #[test]
    fn diff_is_deterministic(a in arb_rows(), b in arb_rows(), tracked in arb_tracked()) {
        let before_a = a.clone();
        let before_b = b.clone();
        let first = diff(&a, &b, &tracked);
        let second = diff(&a, &b, &tracked);
        prop_assert_eq!(first, second);
        prop_assert_eq!(a, before_a);
        prop_assert_eq!(b, before_b);
    }

    #[test]
    fn changes_are_real_and_tracked(a in arb_rows(), b in arb_rows(), tracked in arb_tracked()) {
        let changes = diff(&a, &b, &tracked);
        let mut last_index = None;
        for change in &changes {
            prop_assert!(change.index < a.len().min(b.len()));
            prop_assert!(last_index.map_or(true, |i| i < change.index));
            last_index = Some(change.index);

            prop_assert!(!change.field_changes.is_empty());
            prop_assert_eq!(&change.row, &b[change.index]);
            for (col, fc) in &change.field_changes {
                prop_assert!(tracked.contains(col));
                prop_assert!(!values_equal(&fc.old_value, &fc.new_value));
                let old = a[change.index].get(col).cloned().unwrap_or(Value::Null);
                prop_assert_eq!(&fc.old_value, &old);
            }
        }
    }

    #[test]
    fn plan_partitions_changed_and_appended(a in arb_rows(), b in arb_rows(), tracked in arb_tracked()) {
        let changes = diff(&a, &b, &tracked);
        let appended = appended_rows(&a, &b);
        let plan = SyncPlan::from_grid(&changes, &appended, "id");
        prop_assert_eq!(plan.updates.len() + plan.creates.len(), changes.len() + appended.len());
        for row in &plan.updates {
            prop_assert!(has_identifier(row, "id"));
        }
        for row in &plan.creates {
            prop_assert!(!has_identifier(row, "id"));
        }
    }
}
