//! Column mapping: the bidirectional association between semantic names and
//! remote properties that generated modules bake in as a constant.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::schema::{PropertyKind, naming};

/// One column mapping entry in `&'static` form, as embedded by generated
/// modules in their `COLUMNS` constant.
#[derive(Debug, Clone, Copy)]
pub struct ColumnSpec {
    /// Semantic name (lower camel); key of simplified rows.
    pub name: &'static str,
    /// Original remote property name.
    pub source: &'static str,
    /// Property kind.
    pub kind: PropertyKind,
    /// Option labels for choice-like kinds.
    pub options: &'static [&'static str],
}

/// Owned column mapping entry; what schema snapshots serialize.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDef {
    /// Semantic name (lower camel).
    pub name: String,
    /// Original remote property name.
    pub source: String,
    /// Property kind.
    pub kind: PropertyKind,
    /// Option labels for choice-like kinds.
    #[serde(default)]
    pub options: Vec<String>,
}

impl From<&ColumnSpec> for ColumnDef {
    fn from(spec: &ColumnSpec) -> Self {
        Self {
            name: spec.name.to_string(),
            source: spec.source.to_string(),
            kind: spec.kind,
            options: spec.options.iter().map(|&o| o.to_string()).collect(),
        }
    }
}

/// Indexed column mapping used by the filter compiler and the response
/// simplifier. Lookup works both ways: by semantic name and by normalized
/// remote name.
#[derive(Debug, Clone)]
pub struct ColumnMap {
    columns: Vec<ColumnDef>,
    by_name: BTreeMap<String, usize>,
}

impl ColumnMap {
    /// Build from owned definitions. Later duplicates of a semantic name are
    /// unreachable through lookup; generation prevents them upstream.
    pub fn new(columns: Vec<ColumnDef>) -> Self {
        let mut by_name = BTreeMap::new();
        for (index, column) in columns.iter().enumerate() {
            by_name.entry(column.name.clone()).or_insert(index);
        }
        Self { columns, by_name }
    }

    /// Build from a generated `COLUMNS` constant.
    pub fn from_specs(specs: &'static [ColumnSpec]) -> Self {
        Self::new(specs.iter().map(ColumnDef::from).collect())
    }

    /// All columns, in mapping order.
    pub fn columns(&self) -> &[ColumnDef] {
        &self.columns
    }

    /// Look up a column by its semantic name.
    pub fn resolve(&self, name: &str) -> Option<&ColumnDef> {
        self.by_name.get(name).map(|&index| &self.columns[index])
    }

    /// Look up a column from a remote property name, normalizing it the same
    /// way semantic names were derived at generation time.
    pub fn resolve_source(&self, remote_name: &str) -> Option<&ColumnDef> {
        self.resolve(&naming::camel_case(remote_name))
    }
}
