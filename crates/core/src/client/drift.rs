//! Schema drift watcher: reconciles the column mapping baked into generated
//! code with the row shape actually observed at query time.
//!
//! Everything here is a warning on the operator channel; drift never alters
//! control flow of the query that exposed it.

use std::collections::HashSet;
use std::sync::Mutex;

use serde::Serialize;

use crate::client::columns::ColumnMap;
use crate::client::simplify::SimplifiedRow;
use crate::client::validate::{FieldIssue, RowValidator};

/// Cap on remembered issue signatures. Past this, new issues are still
/// warned about but no longer deduplicated.
const MAX_TRACKED_SIGNATURES: usize = 128;

#[derive(Debug, Serialize)]
#[serde(tag = "issue", rename_all = "snake_case")]
enum DriftIssue<'a> {
    MissingProperties { fields: Vec<&'a str> },
    UnexpectedProperty { field: &'a str },
    InvalidValues { issues: &'a [FieldIssue] },
}

/// Per-client drift state: the set of already-reported issue signatures.
#[derive(Debug, Default)]
pub struct DriftWatcher {
    seen: Mutex<HashSet<String>>,
}

impl DriftWatcher {
    /// Fresh watcher with an empty report history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inspect one simplified row against the expected mapping and
    /// validator. Each distinct issue is reported once per watcher.
    pub fn inspect(
        &self,
        entity: &str,
        row: &SimplifiedRow,
        columns: &ColumnMap,
        validator: &RowValidator,
    ) {
        let missing: Vec<&str> = columns
            .columns()
            .iter()
            .map(|column| column.name.as_str())
            .filter(|name| !row.contains_key(*name))
            .collect();
        if !missing.is_empty() {
            self.report(entity, &DriftIssue::MissingProperties { fields: missing });
        }

        for key in row.keys() {
            if columns.resolve(key).is_none() {
                self.report(entity, &DriftIssue::UnexpectedProperty { field: key });
            }
        }

        let issues = validator.check(row);
        if !issues.is_empty() {
            self.report(entity, &DriftIssue::InvalidValues { issues: &issues });
        }
    }

    /// Number of distinct issues reported so far. Test hook.
    pub fn reported(&self) -> usize {
        self.seen.lock().map_or(0, |seen| seen.len())
    }

    fn report(&self, entity: &str, issue: &DriftIssue<'_>) {
        let signature = serde_json::to_string(issue).unwrap_or_default();
        if let Ok(mut seen) = self.seen.lock() {
            if seen.contains(&signature) {
                return;
            }
            if seen.len() < MAX_TRACKED_SIGNATURES {
                seen.insert(signature.clone());
            }
        }
        tracing::warn!(entity, drift = %signature, "schema drift detected");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::client::columns::ColumnDef;
    use crate::schema::PropertyKind;
    use serde_json::json;

    fn columns() -> ColumnMap {
        ColumnMap::new(vec![
            ColumnDef {
                name: "name".into(),
                source: "Name".into(),
                kind: PropertyKind::Title,
                options: vec![],
            },
            ColumnDef {
                name: "price".into(),
                source: "Price".into(),
                kind: PropertyKind::Number,
                options: vec![],
            },
        ])
    }

    fn row(value: serde_json::Value) -> SimplifiedRow {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn test_same_issue_reported_once() {
        let columns = columns();
        let validator = RowValidator::from_map(&columns);
        let watcher = DriftWatcher::new();

        let sparse = row(json!({"name": "Dune"}));
        watcher.inspect("books", &sparse, &columns, &validator);
        watcher.inspect("books", &sparse, &columns, &validator);
        assert_eq!(watcher.reported(), 1);
    }

    #[test]
    fn test_distinct_issue_kinds_dedupe_independently() {
        let columns = columns();
        let validator = RowValidator::from_map(&columns);
        let watcher = DriftWatcher::new();

        // Missing `price`, plus a key the mapping does not know.
        let drifted = row(json!({"name": "Dune", "pageCount": 412}));
        watcher.inspect("books", &drifted, &columns, &validator);
        assert_eq!(watcher.reported(), 2);

        // A validator failure is a third, independent signature.
        let invalid = row(json!({"name": "Dune", "price": "not-a-number"}));
        watcher.inspect("books", &invalid, &columns, &validator);
        assert_eq!(watcher.reported(), 3);
    }

    #[test]
    fn test_clean_row_reports_nothing() {
        let columns = columns();
        let validator = RowValidator::from_map(&columns);
        let watcher = DriftWatcher::new();
        watcher.inspect(
            "books",
            &row(json!({"name": "Dune", "price": 9.5})),
            &columns,
            &validator,
        );
        assert_eq!(watcher.reported(), 0);
    }
}
