//! Config source patching: two strategies behind one interface.
//!
//! The structural strategy edits the TOML syntax tree and preserves every
//! byte it does not touch. The rewrite strategy works on the evaluated
//! semantic value and re-renders the whole document, losing comments and
//! formatting — the accepted degradation of the fallback path. Strategy
//! selection is a capability probe: a strategy that cannot find anything to
//! patch reports [`PatchError::NoMatch`] and the next one runs.

use toml_edit::{Array, DocumentMut, Item, Value};

use crate::error::PatchError;

/// Key of the identifier array inside the config.
const DATABASES_KEY: &str = "databases";

/// Result of a patch operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatchOutcome {
    /// The source changed; the new text is carried.
    Modified(String),
    /// Nothing to do; the caller must not rewrite the file.
    Unchanged,
}

/// One way of editing config source text.
pub trait PatchStrategy: std::fmt::Debug {
    /// Append `id` to the identifier array if absent.
    fn append(
        &self,
        source: &str,
        id: &str,
        comment: Option<&str>,
    ) -> Result<PatchOutcome, PatchError>;

    /// Replace the identifier array so it contains exactly `ids`, compared
    /// as sets.
    fn replace_all(&self, source: &str, ids: &[String]) -> Result<PatchOutcome, PatchError>;
}

/// Syntax-tree patch via `toml_edit`; preserves untouched formatting.
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuralPatch;

/// Semantic-value fallback: parse, mutate, re-render the whole document.
#[derive(Debug, Clone, Copy, Default)]
pub struct RewritePatch;

/// Append `id` to the config's identifier array, trying the structural
/// strategy first and falling back to the full rewrite.
pub fn append_database(
    source: &str,
    id: &str,
    comment: Option<&str>,
) -> Result<PatchOutcome, PatchError> {
    with_fallback(|strategy| strategy.append(source, id, comment))
}

/// Replace the config's identifier array with exactly `ids`, same strategy
/// order.
pub fn replace_databases(source: &str, ids: &[String]) -> Result<PatchOutcome, PatchError> {
    with_fallback(|strategy| strategy.replace_all(source, ids))
}

fn with_fallback(
    op: impl Fn(&dyn PatchStrategy) -> Result<PatchOutcome, PatchError>,
) -> Result<PatchOutcome, PatchError> {
    let strategies: [&dyn PatchStrategy; 2] = [&StructuralPatch, &RewritePatch];
    for strategy in strategies {
        match op(strategy) {
            Err(PatchError::NoMatch) => {
                tracing::debug!(?strategy, "patch strategy found no match, falling back");
            }
            outcome => return outcome,
        }
    }
    Err(PatchError::NoMatch)
}

impl PatchStrategy for StructuralPatch {
    fn append(
        &self,
        source: &str,
        id: &str,
        comment: Option<&str>,
    ) -> Result<PatchOutcome, PatchError> {
        let mut doc: DocumentMut = source
            .parse()
            .map_err(|err: toml_edit::TomlError| PatchError::Unparseable(err.to_string()))?;
        let Some(array) = find_databases_array(&mut doc) else {
            return Err(PatchError::NoMatch);
        };
        if array_contains(array, id) {
            return Ok(PatchOutcome::Unchanged);
        }
        match comment {
            Some(comment) => {
                // A commented entry forces the array open across lines; a
                // line comment inside a single-line array would swallow the
                // closing bracket.
                let mut value = Value::from(id);
                let decor = value.decor_mut();
                decor.set_prefix(format!("\n    # {comment}\n    "));
                array.push_formatted(value);
                array.set_trailing("\n");
                array.set_trailing_comma(false);
            }
            None => array.push(id),
        }
        Ok(PatchOutcome::Modified(doc.to_string()))
    }

    fn replace_all(&self, source: &str, ids: &[String]) -> Result<PatchOutcome, PatchError> {
        let mut doc: DocumentMut = source
            .parse()
            .map_err(|err: toml_edit::TomlError| PatchError::Unparseable(err.to_string()))?;
        let Some(array) = find_databases_array(&mut doc) else {
            return Err(PatchError::NoMatch);
        };
        if array_set_equal(array, ids) {
            return Ok(PatchOutcome::Unchanged);
        }
        array.clear();
        for id in ids {
            array.push(id.as_str());
        }
        Ok(PatchOutcome::Modified(doc.to_string()))
    }
}

impl PatchStrategy for RewritePatch {
    fn append(
        &self,
        source: &str,
        id: &str,
        _comment: Option<&str>,
    ) -> Result<PatchOutcome, PatchError> {
        let mut value = parse_semantic(source)?;
        let array = semantic_databases_mut(&mut value);
        if array.iter().any(|entry| entry.as_str() == Some(id)) {
            return Ok(PatchOutcome::Unchanged);
        }
        array.push(toml::Value::String(id.to_string()));
        render_semantic(&value)
    }

    fn replace_all(&self, source: &str, ids: &[String]) -> Result<PatchOutcome, PatchError> {
        let mut value = parse_semantic(source)?;
        let array = semantic_databases_mut(&mut value);
        let current: std::collections::BTreeSet<&str> =
            array.iter().filter_map(toml::Value::as_str).collect();
        let wanted: std::collections::BTreeSet<&str> =
            ids.iter().map(String::as_str).collect();
        if current == wanted && current.len() == array.len() {
            return Ok(PatchOutcome::Unchanged);
        }
        *array = ids
            .iter()
            .map(|id| toml::Value::String(id.clone()))
            .collect();
        render_semantic(&value)
    }
}

/// The three recognized declaration shapes.
#[derive(Debug, Clone, Copy)]
enum ConfigShape {
    TopLevel,
    NtxTable,
    ToolNtxTable,
}

fn locate_shape(doc: &DocumentMut) -> Option<ConfigShape> {
    let root = doc.as_table();
    if root.contains_key(DATABASES_KEY) {
        return Some(ConfigShape::TopLevel);
    }
    if root
        .get("ntx")
        .and_then(Item::as_table_like)
        .and_then(|ntx| ntx.get(DATABASES_KEY))
        .is_some()
    {
        return Some(ConfigShape::NtxTable);
    }
    if root
        .get("tool")
        .and_then(Item::as_table_like)
        .and_then(|tool| tool.get("ntx"))
        .and_then(Item::as_table_like)
        .and_then(|ntx| ntx.get(DATABASES_KEY))
        .is_some()
    {
        return Some(ConfigShape::ToolNtxTable);
    }
    None
}

/// Locate the identifier array under the three recognized shapes: top
/// level, `[ntx]`, or `[tool.ntx]`.
fn find_databases_array(doc: &mut DocumentMut) -> Option<&mut Array> {
    let shape = locate_shape(doc)?;
    let root = doc.as_table_mut();
    let item = match shape {
        ConfigShape::TopLevel => root.get_mut(DATABASES_KEY),
        ConfigShape::NtxTable => root
            .get_mut("ntx")?
            .as_table_like_mut()?
            .get_mut(DATABASES_KEY),
        ConfigShape::ToolNtxTable => root
            .get_mut("tool")?
            .as_table_like_mut()?
            .get_mut("ntx")?
            .as_table_like_mut()?
            .get_mut(DATABASES_KEY),
    }?;
    item.as_value_mut().and_then(Value::as_array_mut)
}

fn array_contains(array: &Array, id: &str) -> bool {
    array.iter().any(|value| value.as_str() == Some(id))
}

fn array_set_equal(array: &Array, ids: &[String]) -> bool {
    let current: std::collections::BTreeSet<&str> =
        array.iter().filter_map(Value::as_str).collect();
    let wanted: std::collections::BTreeSet<&str> = ids.iter().map(String::as_str).collect();
    current == wanted && current.len() == array.len()
}

fn parse_semantic(source: &str) -> Result<toml::Value, PatchError> {
    source
        .parse::<toml::Value>()
        .map_err(|err| PatchError::Unparseable(err.to_string()))
}

/// The semantic location of the identifier array, mirroring
/// [`find_databases_array`] but creating the array at the top level when no
/// recognized shape carries one.
fn semantic_databases_mut(value: &mut toml::Value) -> &mut Vec<toml::Value> {
    let in_scoped = |value: &toml::Value, scope: &[&str]| {
        let mut cursor = value;
        for key in scope {
            match cursor.get(key) {
                Some(next) => cursor = next,
                None => return false,
            }
        }
        cursor.get(DATABASES_KEY).is_some_and(toml::Value::is_array)
    };

    let scope: &[&str] = if in_scoped(value, &[]) {
        &[]
    } else if in_scoped(value, &["ntx"]) {
        &["ntx"]
    } else if in_scoped(value, &["tool", "ntx"]) {
        &["tool", "ntx"]
    } else {
        &[]
    };

    let mut cursor = value;
    for key in scope {
        let table = ensure_table(cursor);
        cursor = table
            .entry(key.to_string())
            .or_insert_with(|| toml::Value::Table(toml::Table::new()));
    }
    let table = ensure_table(cursor);
    let entry = table
        .entry(DATABASES_KEY.to_string())
        .or_insert_with(|| toml::Value::Array(Vec::new()));
    if !entry.is_array() {
        *entry = toml::Value::Array(Vec::new());
    }
    match entry {
        toml::Value::Array(array) => array,
        // Unreachable: the arm above just forced the array shape.
        _ => unreachable!("databases entry was just coerced to an array"),
    }
}

fn ensure_table(value: &mut toml::Value) -> &mut toml::Table {
    if !value.is_table() {
        *value = toml::Value::Table(toml::Table::new());
    }
    match value {
        toml::Value::Table(table) => table,
        _ => unreachable!("value was just coerced to a table"),
    }
}

fn render_semantic(value: &toml::Value) -> Result<PatchOutcome, PatchError> {
    toml::to_string_pretty(value)
        .map(PatchOutcome::Modified)
        .map_err(|err| PatchError::Unparseable(err.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    const SOURCE: &str = "\
# ntx configuration
token = \"secret\"   # keep me out of version control

databases = [\"a\"]
";

    #[test]
    fn test_append_preserves_untouched_formatting() {
        let outcome = append_database(SOURCE, "b", None).unwrap();
        let PatchOutcome::Modified(patched) = outcome else {
            panic!("expected a modification");
        };
        assert!(patched.contains("databases = [\"a\", \"b\"]"));
        // Untouched region survives byte-for-byte, comments included.
        assert!(patched.contains("# ntx configuration\ntoken = \"secret\"   # keep me out of version control\n"));
    }

    #[test]
    fn test_append_existing_id_is_a_no_op() {
        assert_eq!(
            append_database(SOURCE, "a", None).unwrap(),
            PatchOutcome::Unchanged
        );
    }

    #[test]
    fn test_append_with_comment_keeps_valid_toml() {
        let PatchOutcome::Modified(patched) =
            append_database(SOURCE, "b", Some("Books")).unwrap()
        else {
            panic!("expected a modification");
        };
        assert!(patched.contains("# Books"));
        let reparsed = crate::config::parse_config(&patched).unwrap();
        assert_eq!(reparsed.databases, vec!["a", "b"]);
    }

    #[test]
    fn test_append_under_ntx_table_shape() {
        let source = "[ntx]\ntoken = \"secret\"\ndatabases = [\"a\"]\n";
        let PatchOutcome::Modified(patched) = append_database(source, "b", None).unwrap()
        else {
            panic!("expected a modification");
        };
        assert!(patched.contains("databases = [\"a\", \"b\"]"));
    }

    #[test]
    fn test_append_under_tool_ntx_shape() {
        let source = "[tool.ntx]\ndatabases = [\"a\"]\n";
        let PatchOutcome::Modified(patched) = append_database(source, "b", None).unwrap()
        else {
            panic!("expected a modification");
        };
        assert!(patched.contains("databases = [\"a\", \"b\"]"));
    }

    #[test]
    fn test_missing_array_falls_back_to_rewrite() {
        // No databases array anywhere: the structural probe reports NoMatch
        // and the semantic rewrite creates the array.
        let source = "token = \"secret\"\n";
        let PatchOutcome::Modified(patched) = append_database(source, "a", None).unwrap()
        else {
            panic!("expected a modification");
        };
        let reparsed = crate::config::parse_config(&patched).unwrap();
        assert_eq!(reparsed.databases, vec!["a"]);
    }

    #[test]
    fn test_unparseable_source_is_an_error() {
        let err = append_database("token = [unclosed", "a", None).unwrap_err();
        assert!(matches!(err, PatchError::Unparseable(_)));
    }

    #[test]
    fn test_replace_set_equal_is_a_no_op() {
        let outcome =
            replace_databases(SOURCE, &["a".to_string()]).unwrap();
        assert_eq!(outcome, PatchOutcome::Unchanged);
    }

    #[test]
    fn test_replace_rewrites_whole_array() {
        let PatchOutcome::Modified(patched) =
            replace_databases(SOURCE, &["b".to_string(), "c".to_string()]).unwrap()
        else {
            panic!("expected a modification");
        };
        assert!(patched.contains("databases = [\"b\", \"c\"]"));
        assert!(patched.contains("token = \"secret\""));
    }

    #[test]
    fn test_replace_ignores_order() {
        let source = "databases = [\"a\", \"b\"]\n";
        assert_eq!(
            replace_databases(source, &["b".to_string(), "a".to_string()]).unwrap(),
            PatchOutcome::Unchanged
        );
    }
}
