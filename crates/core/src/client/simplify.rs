//! The response simplifier: raw paginated rows → semantic rows.
//!
//! The inverse of the filter compiler's name translation. Rows that are
//! structurally not full records are logged and omitted, never an error.
//! Keys absent from a simplified row mean "no mapping existed for that
//! remote property", not "the value was null".

use serde_json::{Map, Value};

use crate::client::columns::ColumnMap;
use crate::schema::PropertyKind;

/// One simplified row: semantic name → extracted value.
pub type SimplifiedRow = Map<String, Value>;

/// Simplify every structurally valid row of a raw result page.
pub fn simplify_rows(rows: &[Value], columns: &ColumnMap) -> Vec<SimplifiedRow> {
    rows.iter()
        .filter_map(|row| simplify_row(row, columns))
        .collect()
}

/// Simplify one raw row. Returns `None` when the row has no `properties`
/// record to read.
pub fn simplify_row(row: &Value, columns: &ColumnMap) -> Option<SimplifiedRow> {
    let Some(properties) = row.get("properties").and_then(Value::as_object) else {
        tracing::warn!(
            id = row.get("id").and_then(|v| v.as_str()).unwrap_or("<unknown>"),
            "skipping result row without a properties record"
        );
        return None;
    };

    let mut simplified = SimplifiedRow::new();
    for (remote_name, value) in properties {
        let Some(column) = columns.resolve_source(remote_name) else {
            continue;
        };
        simplified.insert(column.name.clone(), extract_value(column.kind, value));
    }
    Some(simplified)
}

/// Kind-specific value extraction from a raw property payload.
fn extract_value(kind: PropertyKind, property: &Value) -> Value {
    let payload = property.get(kind.wire_name()).unwrap_or(&Value::Null);
    match kind {
        PropertyKind::Title | PropertyKind::RichText => extract_text_runs(payload),
        PropertyKind::Email | PropertyKind::PhoneNumber | PropertyKind::Url => {
            extract_plain_string(payload)
        }
        PropertyKind::UniqueId => extract_unique_id(payload),
        PropertyKind::Select => payload
            .get("name")
            .and_then(Value::as_str)
            .map_or(Value::Null, |name| Value::String(name.to_string())),
        PropertyKind::MultiSelect => payload.as_array().map_or(Value::Null, |selected| {
            Value::Array(
                selected
                    .iter()
                    .filter_map(|option| option.get("name").cloned())
                    .collect(),
            )
        }),
        PropertyKind::Checkbox => Value::Bool(payload.as_bool().unwrap_or(false)),
        PropertyKind::Number => match payload {
            Value::Number(n) => Value::Number(n.clone()),
            _ => Value::Null,
        },
        PropertyKind::Date => extract_date(payload),
    }
}

/// Concatenate the plain values of a text-run array, or null when absent.
fn extract_text_runs(payload: &Value) -> Value {
    match payload.as_array() {
        Some(runs) => Value::String(
            runs.iter()
                .filter_map(|run| run.get("plain_text").and_then(Value::as_str))
                .collect(),
        ),
        None => Value::Null,
    }
}

fn extract_plain_string(payload: &Value) -> Value {
    match payload.as_str() {
        Some(text) => Value::String(text.to_string()),
        None => Value::Null,
    }
}

/// A unique identifier renders as `PREFIX-number`, or just the number when
/// no prefix is configured.
fn extract_unique_id(payload: &Value) -> Value {
    let Some(number) = payload.get("number").and_then(Value::as_i64) else {
        return Value::Null;
    };
    match payload.get("prefix").and_then(Value::as_str) {
        Some(prefix) => Value::String(format!("{prefix}-{number}")),
        None => Value::String(number.to_string()),
    }
}

/// Dates keep only the fixed `{ start, end }` compound.
fn extract_date(payload: &Value) -> Value {
    let Some(start) = payload.get("start").and_then(Value::as_str) else {
        return Value::Null;
    };
    let mut date = Map::new();
    date.insert("start".into(), Value::String(start.to_string()));
    date.insert(
        "end".into(),
        payload.get("end").cloned().unwrap_or(Value::Null),
    );
    Value::Object(date)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::client::columns::ColumnDef;
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
                name: "bookRating".into(),
                source: "Book Rating".into(),
                kind: PropertyKind::Select,
                options: vec!["Good".into(), "Bad".into()],
            },
            ColumnDef {
                name: "tags".into(),
                source: "Tags".into(),
                kind: PropertyKind::MultiSelect,
                options: vec![],
            },
            ColumnDef {
                name: "price".into(),
                source: "Price".into(),
                kind: PropertyKind::Number,
                options: vec![],
            },
            ColumnDef {
                name: "onSale".into(),
                source: "On Sale".into(),
                kind: PropertyKind::Checkbox,
                options: vec![],
            },
            ColumnDef {
                name: "published".into(),
                source: "Published".into(),
                kind: PropertyKind::Date,
                options: vec![],
            },
        ])
    }

    fn raw_row() -> Value {
        json!({
            "object": "page",
            "id": "p1",
            "properties": {
                "Name": {"type": "title", "title": [
                    {"plain_text": "The "}, {"plain_text": "Dispossessed"}
                ]},
                "Book Rating": {"type": "select", "select": {"name": "Good"}},
                "Tags": {"type": "multi_select", "multi_select": [
                    {"name": "sf"}, {"name": "classic"}
                ]},
                "Price": {"type": "number", "number": 9.5},
                "On Sale": {"type": "checkbox", "checkbox": true},
                "Published": {"type": "date", "date": {"start": "1974-05-01", "end": null}},
                "Legacy Column": {"type": "formula", "formula": {"number": 3}}
            }
        })
    }

    #[test]
    fn test_simplify_extracts_per_kind_values() {
        let row = simplify_row(&raw_row(), &columns()).unwrap();
        assert_eq!(row["name"], json!("The Dispossessed"));
        assert_eq!(row["bookRating"], json!("Good"));
        assert_eq!(row["tags"], json!(["sf", "classic"]));
        assert_eq!(row["price"], json!(9.5));
        assert_eq!(row["onSale"], json!(true));
        assert_eq!(
            row["published"],
            json!({"start": "1974-05-01", "end": null})
        );
        // No mapping for the formula column: absent, not null.
        assert!(!row.contains_key("legacyColumn"));
    }

    #[test]
    fn test_rows_without_properties_are_omitted() {
        let rows = vec![
            json!({"object": "page", "id": "broken"}),
            raw_row(),
        ];
        let simplified = simplify_rows(&rows, &columns());
        assert_eq!(simplified.len(), 1);
    }

    #[test]
    fn test_absent_payloads_become_null() {
        let row = simplify_row(
            &json!({
                "properties": {
                    "Book Rating": {"type": "select", "select": null},
                    "Price": {"type": "number", "number": null}
                }
            }),
            &columns(),
        )
        .unwrap();
        assert_eq!(row["bookRating"], Value::Null);
        assert_eq!(row["price"], Value::Null);
    }

    #[test]
    fn test_date_without_start_is_null() {
        let row = simplify_row(
            &json!({"properties": {"Published": {"type": "date", "date": {}}}}),
            &columns(),
        )
        .unwrap();
        assert_eq!(row["published"], Value::Null);
    }
}
