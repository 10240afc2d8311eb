//! The filter compiler: semantic filter trees → wire filter trees.
//!
//! A compound node carries exactly one operator, so the wire shape where a
//! compound object has several sibling keys cannot be built from here at
//! all. Leaves copy their operator/operand pair onto the wire verbatim; only
//! the semantic name is translated, via the column mapping.

use serde_json::{Value, json};

use crate::client::columns::ColumnMap;
use crate::error::ClientError;
use crate::sdk::{Sort, SortDirection};

/// A semantic filter expression tree.
#[derive(Debug, Clone)]
pub enum Filter {
    /// All children must match.
    And(Vec<Filter>),
    /// Any child must match.
    Or(Vec<Filter>),
    /// One condition on one column: `(semantic name, operator, operand)`.
    Cond {
        /// Semantic column name.
        column: String,
        /// Remote operator vocabulary, passed through verbatim.
        op: String,
        /// Operand, passed through verbatim.
        value: Value,
    },
}

impl Filter {
    /// A leaf condition with an arbitrary remote operator.
    pub fn cond(column: impl Into<String>, op: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Cond {
            column: column.into(),
            op: op.into(),
            value: value.into(),
        }
    }

    /// `equals` condition.
    pub fn eq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::cond(column, "equals", value)
    }

    /// `does_not_equal` condition.
    pub fn ne(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::cond(column, "does_not_equal", value)
    }

    /// `contains` condition.
    pub fn contains(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::cond(column, "contains", value)
    }

    /// `less_than` condition.
    pub fn lt(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::cond(column, "less_than", value)
    }

    /// `greater_than` condition.
    pub fn gt(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::cond(column, "greater_than", value)
    }

    /// `is_empty` condition.
    pub fn is_empty(column: impl Into<String>) -> Self {
        Self::cond(column, "is_empty", true)
    }
}

/// Compile a semantic filter into the remote wire filter shape.
///
/// Unknown semantic names fail fast with [`ClientError::UnknownColumn`]
/// rather than producing a malformed wire filter.
pub fn compile_filter(filter: &Filter, columns: &ColumnMap) -> Result<Value, ClientError> {
    match filter {
        Filter::And(children) => Ok(json!({ "and": compile_children(children, columns)? })),
        Filter::Or(children) => Ok(json!({ "or": compile_children(children, columns)? })),
        Filter::Cond { column, op, value } => {
            let resolved = columns
                .resolve(column)
                .ok_or_else(|| ClientError::UnknownColumn {
                    column: column.clone(),
                })?;
            let mut condition = serde_json::Map::new();
            condition.insert(op.clone(), value.clone());
            let mut leaf = serde_json::Map::new();
            leaf.insert("property".into(), Value::String(resolved.source.clone()));
            leaf.insert(
                resolved.kind.wire_name().to_string(),
                Value::Object(condition),
            );
            Ok(Value::Object(leaf))
        }
    }
}

fn compile_children(children: &[Filter], columns: &ColumnMap) -> Result<Vec<Value>, ClientError> {
    children
        .iter()
        .map(|child| compile_filter(child, columns))
        .collect()
}

/// Compile semantic sort specs into wire sort entries, with the same
/// unknown-name fail-fast as filter leaves.
pub fn compile_sorts(
    sorts: &[(String, SortDirection)],
    columns: &ColumnMap,
) -> Result<Vec<Sort>, ClientError> {
    sorts
        .iter()
        .map(|(column, direction)| {
            let resolved = columns
                .resolve(column)
                .ok_or_else(|| ClientError::UnknownColumn {
                    column: column.clone(),
                })?;
            Ok(Sort {
                property: resolved.source.clone(),
                direction: *direction,
            })
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::client::columns::ColumnDef;
    use crate::schema::PropertyKind;

    fn columns() -> ColumnMap {
        ColumnMap::new(vec![
            ColumnDef {
                name: "rating".into(),
                source: "Rating".into(),
                kind: PropertyKind::Select,
                options: vec!["Good".into(), "Bad".into()],
            },
            ColumnDef {
                name: "price".into(),
                source: "Price".into(),
                kind: PropertyKind::Number,
                options: vec![],
            },
        ])
    }

    #[test]
    fn test_compound_filter_compiles_to_wire_shape() {
        let filter = Filter::And(vec![
            Filter::eq("rating", "Good"),
            Filter::lt("price", 10),
        ]);
        let wire = compile_filter(&filter, &columns()).unwrap();
        assert_eq!(
            wire,
            json!({
                "and": [
                    {"property": "Rating", "select": {"equals": "Good"}},
                    {"property": "Price", "number": {"less_than": 10}}
                ]
            })
        );
    }

    #[test]
    fn test_leaf_round_trips_through_reverse_lookup() {
        let columns = columns();
        let filter = Filter::Or(vec![
            Filter::eq("rating", "Bad"),
            Filter::gt("price", 3),
        ]);
        let wire = compile_filter(&filter, &columns).unwrap();
        for leaf in wire["or"].as_array().unwrap() {
            let property = leaf["property"].as_str().unwrap();
            let recovered = columns.resolve_source(property).unwrap();
            assert!(["rating", "price"].contains(&recovered.name.as_str()));
        }
    }

    #[test]
    fn test_unknown_column_fails_fast() {
        let err = compile_filter(&Filter::is_empty("ratings"), &columns()).unwrap_err();
        match err {
            ClientError::UnknownColumn { column } => assert_eq!(column, "ratings"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_nested_compounds_recurse() {
        let filter = Filter::Or(vec![
            Filter::And(vec![Filter::eq("rating", "Good")]),
            Filter::is_empty("price"),
        ]);
        let wire = compile_filter(&filter, &columns()).unwrap();
        assert_eq!(
            wire["or"][0],
            json!({"and": [{"property": "Rating", "select": {"equals": "Good"}}]})
        );
        assert_eq!(
            wire["or"][1],
            json!({"property": "Price", "number": {"is_empty": true}})
        );
    }

    #[test]
    fn test_sort_compilation_resolves_semantic_names() {
        let sorts = compile_sorts(
            &[("price".to_string(), SortDirection::Descending)],
            &columns(),
        )
        .unwrap();
        assert_eq!(sorts[0].property, "Price");
        let err = compile_sorts(
            &[("nope".to_string(), SortDirection::Ascending)],
            &columns(),
        )
        .unwrap_err();
        assert!(matches!(err, ClientError::UnknownColumn { .. }));
    }
}
