//! Row validator generated modules hand to their entity client.
//!
//! Validates simplified rows against the column mapping's value shapes.
//! Choice columns are open enums: any string passes, the option list is
//! advisory for the generated type. Issues are data, not errors — the drift
//! watcher decides what to do with them.

use serde::Serialize;
use serde_json::Value;

use crate::client::columns::{ColumnDef, ColumnMap, ColumnSpec};
use crate::schema::{PropertyKind, ValueShape};

/// One validation finding for one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldIssue {
    /// Semantic field name.
    pub field: String,
    /// What the field's kind accepts.
    pub expected: String,
    /// Short description of what was found.
    pub found: String,
}

#[derive(Debug, Clone)]
struct FieldRule {
    name: String,
    required: bool,
    shape: ValueShape,
}

/// Validator over simplified rows of one entity.
#[derive(Debug, Clone)]
pub struct RowValidator {
    rules: Vec<FieldRule>,
}

impl RowValidator {
    /// Build from a generated `COLUMNS` constant.
    pub fn from_columns(columns: &'static [ColumnSpec]) -> Self {
        Self::from_defs(columns.iter().map(ColumnDef::from).collect::<Vec<_>>().as_slice())
    }

    /// Build from owned column definitions.
    pub fn from_defs(columns: &[ColumnDef]) -> Self {
        let rules = columns
            .iter()
            .map(|column| FieldRule {
                name: column.name.clone(),
                required: column.kind == PropertyKind::Title,
                shape: column.kind.value_shape(),
            })
            .collect();
        Self { rules }
    }

    /// Build from an indexed column map.
    pub fn from_map(columns: &ColumnMap) -> Self {
        Self::from_defs(columns.columns())
    }

    /// Check one simplified row. An absent optional field is not an issue
    /// here — the drift watcher reports missing mappings separately.
    pub fn check(&self, row: &serde_json::Map<String, Value>) -> Vec<FieldIssue> {
        let mut issues = Vec::new();
        for rule in &self.rules {
            match row.get(&rule.name) {
                None => {
                    if rule.required {
                        issues.push(issue(rule, "missing"));
                    }
                }
                Some(Value::Null) => {
                    if rule.required {
                        issues.push(issue(rule, "null"));
                    }
                }
                Some(value) => {
                    if !shape_matches(rule.shape, value) {
                        issues.push(issue(rule, json_type_name(value)));
                    }
                }
            }
        }
        issues
    }
}

fn issue(rule: &FieldRule, found: &str) -> FieldIssue {
    FieldIssue {
        field: rule.name.clone(),
        expected: rule.shape.describe().to_string(),
        found: found.to_string(),
    }
}

fn shape_matches(shape: ValueShape, value: &Value) -> bool {
    match shape {
        ValueShape::Text => value.is_string(),
        ValueShape::Number => value.is_number(),
        ValueShape::Flag => value.is_boolean(),
        ValueShape::TextList => value
            .as_array()
            .is_some_and(|items| items.iter().all(Value::is_string)),
        ValueShape::DateRange => {
            value.as_object().is_some_and(|compound| {
                compound.get("start").is_some_and(Value::is_string)
                    && compound
                        .get("end")
                        .is_none_or(|end| end.is_string() || end.is_null())
            })
        }
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
