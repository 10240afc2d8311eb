//! Runtime entity client handed out by generated accessor functions.

pub mod columns;
pub mod drift;
pub mod filter;
pub mod simplify;
pub mod validate;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ClientError;
use crate::sdk::{
    CreatePageRequest, Icon, NotionClient, PageParent, QueryRequest, QueryResponse, SortDirection,
};
use crate::schema::PropertyKind;

pub use columns::{ColumnDef, ColumnMap, ColumnSpec};
pub use drift::DriftWatcher;
pub use filter::{Filter, compile_filter, compile_sorts};
pub use simplify::{SimplifiedRow, simplify_row, simplify_rows};
pub use validate::{FieldIssue, RowValidator};

/// Re-exported polling helper; the one bounded-wait primitive callers get.
pub use crate::sdk::{PollConfig, PollError, poll_until};

/// The fixed compound shape of date values in generated types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateValue {
    /// Start of the range.
    pub start: String,
    /// Optional end of the range.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
}

/// Query parameters in semantic terms.
#[derive(Debug, Clone, Default)]
pub struct QueryArgs {
    /// Semantic filter tree.
    pub filter: Option<Filter>,
    /// Semantic sorts: `(column, direction)` pairs.
    pub sorts: Vec<(String, SortDirection)>,
    /// Page size cap.
    pub page_size: Option<u32>,
    /// Resume cursor.
    pub start_cursor: Option<String>,
}

/// One simplified result page: semantic rows plus the untouched raw page.
#[derive(Debug)]
pub struct SimplifiedPage {
    /// Simplified rows, in response order.
    pub rows: Vec<SimplifiedRow>,
    /// The raw response, exactly as received.
    pub raw: QueryResponse,
}

/// Serialized form of an entity's column mapping; what `.schema.json`
/// snapshot files contain.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaSnapshot {
    /// Remote database identifier.
    pub id: String,
    /// Generated type name.
    pub class_name: String,
    /// Human display name.
    pub display_name: String,
    /// Lower-camel accessor name.
    pub camel_case_name: String,
    /// Column mapping entries, in generation order.
    pub columns: Vec<ColumnDef>,
}

/// Typed client for one generated entity.
///
/// Holds the identity, column mapping, validator, and drift state the
/// generated accessor closed over. Not shared across entities: the drift
/// deduplication set is scoped to one client instance.
#[derive(Debug)]
pub struct EntityClient {
    sdk: Arc<NotionClient>,
    database_id: String,
    columns: ColumnMap,
    validator: RowValidator,
    drift: DriftWatcher,
}

impl EntityClient {
    /// Construct from a generated `COLUMNS` constant. Called by generated
    /// accessor factories.
    pub fn new(sdk: Arc<NotionClient>, database_id: &str, columns: &'static [ColumnSpec]) -> Self {
        let map = ColumnMap::from_specs(columns);
        Self::from_parts(sdk, database_id.to_string(), map)
    }

    /// Construct from owned column definitions.
    pub fn from_defs(sdk: Arc<NotionClient>, database_id: String, columns: Vec<ColumnDef>) -> Self {
        Self::from_parts(sdk, database_id, ColumnMap::new(columns))
    }

    /// Construct from a serialized schema snapshot, the directly loadable
    /// form written next to each generated module.
    pub fn from_snapshot(sdk: Arc<NotionClient>, snapshot_json: &str) -> Result<Self, ClientError> {
        let snapshot: SchemaSnapshot = serde_json::from_str(snapshot_json)?;
        Ok(Self::from_defs(sdk, snapshot.id, snapshot.columns))
    }

    fn from_parts(sdk: Arc<NotionClient>, database_id: String, columns: ColumnMap) -> Self {
        let validator = RowValidator::from_map(&columns);
        Self {
            sdk,
            database_id,
            columns,
            validator,
            drift: DriftWatcher::new(),
        }
    }

    /// The remote database identifier this client is bound to.
    pub fn database_id(&self) -> &str {
        &self.database_id
    }

    /// The column mapping this client resolves names against.
    pub fn columns(&self) -> &ColumnMap {
        &self.columns
    }

    /// Compile `args` and fetch one page, simplifying its rows. The first
    /// simplified row of the page is drift-checked; the rest are not, a
    /// sampling tradeoff that keeps validation cost constant per query.
    pub async fn query(&self, args: QueryArgs) -> Result<SimplifiedPage, ClientError> {
        let request = self.compile_query(&args)?;
        let raw = self.sdk.query_database(&self.database_id, &request).await?;
        let rows = simplify_rows(&raw.results, &self.columns);
        if let Some(first) = rows.first() {
            self.drift
                .inspect(&self.database_id, first, &self.columns, &self.validator);
        }
        Ok(SimplifiedPage { rows, raw })
    }

    /// Walk every page sequentially and collect all simplified rows.
    pub async fn query_all(&self, args: QueryArgs) -> Result<Vec<SimplifiedRow>, ClientError> {
        let mut all = Vec::new();
        let mut cursor = args.start_cursor.clone();
        loop {
            let page = self
                .query(QueryArgs {
                    start_cursor: cursor,
                    ..args.clone()
                })
                .await?;
            all.extend(page.rows);
            if !page.raw.has_more {
                return Ok(all);
            }
            cursor = page.raw.next_cursor;
        }
    }

    /// Create a record from semantic values. Returns the created page.
    pub async fn create(
        &self,
        values: &serde_json::Map<String, Value>,
        icon: Option<Icon>,
    ) -> Result<Value, ClientError> {
        let request = self.build_create_request(values, icon)?;
        Ok(self.sdk.create_page(&request).await?)
    }

    /// Dry run of [`Self::create`]: build and return the call body that
    /// would have been sent, without sending it.
    pub fn create_preview(
        &self,
        values: &serde_json::Map<String, Value>,
        icon: Option<Icon>,
    ) -> Result<Value, ClientError> {
        let request = self.build_create_request(values, icon)?;
        Ok(serde_json::to_value(&request)?)
    }

    fn compile_query(&self, args: &QueryArgs) -> Result<QueryRequest, ClientError> {
        let filter = args
            .filter
            .as_ref()
            .map(|f| compile_filter(f, &self.columns))
            .transpose()?;
        let sorts = if args.sorts.is_empty() {
            None
        } else {
            Some(compile_sorts(&args.sorts, &self.columns)?)
        };
        Ok(QueryRequest {
            filter,
            sorts,
            start_cursor: args.start_cursor.clone(),
            page_size: args.page_size,
        })
    }

    fn build_create_request(
        &self,
        values: &serde_json::Map<String, Value>,
        icon: Option<Icon>,
    ) -> Result<CreatePageRequest, ClientError> {
        let mut properties = serde_json::Map::new();
        for (name, value) in values {
            let column = self
                .columns
                .resolve(name)
                .ok_or_else(|| ClientError::UnknownColumn {
                    column: name.clone(),
                })?;
            properties.insert(
                column.source.clone(),
                property_payload(column.kind, name, value)?,
            );
        }
        Ok(CreatePageRequest {
            parent: PageParent {
                database_id: self.database_id.clone(),
            },
            properties,
            icon,
        })
    }
}

/// Inverse of the simplifier's extraction: one semantic value → one remote
/// property payload.
fn property_payload(kind: PropertyKind, column: &str, value: &Value) -> Result<Value, ClientError> {
    let invalid = || ClientError::InvalidValue {
        column: column.to_string(),
        expected: kind.value_shape().describe(),
    };
    let payload = match kind {
        PropertyKind::Title | PropertyKind::RichText => {
            let text = value.as_str().ok_or_else(invalid)?;
            serde_json::json!([{ "text": { "content": text } }])
        }
        PropertyKind::Email | PropertyKind::PhoneNumber | PropertyKind::Url => {
            Value::String(value.as_str().ok_or_else(invalid)?.to_string())
        }
        PropertyKind::Select => {
            serde_json::json!({ "name": value.as_str().ok_or_else(invalid)? })
        }
        PropertyKind::MultiSelect => {
            let labels = value.as_array().ok_or_else(invalid)?;
            let selected: Vec<Value> = labels
                .iter()
                .map(|label| {
                    label
                        .as_str()
                        .map(|name| serde_json::json!({ "name": name }))
                        .ok_or_else(invalid)
                })
                .collect::<Result<_, _>>()?;
            Value::Array(selected)
        }
        PropertyKind::Number => {
            if !value.is_number() {
                return Err(invalid());
            }
            value.clone()
        }
        PropertyKind::Checkbox => Value::Bool(value.as_bool().ok_or_else(invalid)?),
        PropertyKind::Date => {
            let compound: DateValue =
                serde_json::from_value(value.clone()).map_err(|_| invalid())?;
            serde_json::to_value(&compound)?
        }
        // Unique identifiers are remote-assigned; they cannot be written.
        PropertyKind::UniqueId => return Err(invalid()),
    };
    let mut wrapped = serde_json::Map::new();
    wrapped.insert(kind.wire_name().to_string(), payload);
    Ok(Value::Object(wrapped))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;
    use url::Url;

    fn sdk() -> Arc<NotionClient> {
        let base = Url::parse("http://localhost:1/").unwrap();
        Arc::new(NotionClient::with_base_url("t", base))
    }

    fn client() -> EntityClient {
        EntityClient::from_defs(
            sdk(),
            "db1".to_string(),
            vec![
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
                    name: "price".into(),
                    source: "Price".into(),
                    kind: PropertyKind::Number,
                    options: vec![],
                },
            ],
        )
    }

    #[test]
    fn test_create_preview_builds_wire_body_without_sending() {
        let client = client();
        let values = json!({
            "name": "Dune",
            "bookRating": "Good",
            "price": 9.5
        });
        let body = client
            .create_preview(values.as_object().unwrap(), None)
            .unwrap();
        assert_eq!(body["parent"], json!({"database_id": "db1"}));
        assert_eq!(
            body["properties"]["Name"],
            json!({"title": [{"text": {"content": "Dune"}}]})
        );
        assert_eq!(
            body["properties"]["Book Rating"],
            json!({"select": {"name": "Good"}})
        );
        assert_eq!(body["properties"]["Price"], json!({"number": 9.5}));
    }

    #[test]
    fn test_create_preview_rejects_unknown_column() {
        let client = client();
        let values = json!({"pageCount": 412});
        let err = client
            .create_preview(values.as_object().unwrap(), None)
            .unwrap_err();
        assert!(matches!(err, ClientError::UnknownColumn { .. }));
    }

    #[test]
    fn test_create_preview_rejects_mistyped_value() {
        let client = client();
        let values = json!({"price": "cheap"});
        let err = client
            .create_preview(values.as_object().unwrap(), None)
            .unwrap_err();
        match err {
            ClientError::InvalidValue { column, expected } => {
                assert_eq!(column, "price");
                assert_eq!(expected, "a number");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_query_compiles_filter_and_simplifies_page() {
        use wiremock::matchers::{body_partial_json, method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/databases/db1/query"))
            .and(body_partial_json(json!({
                "filter": {"property": "Book Rating", "select": {"equals": "Good"}}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "object": "list",
                "results": [
                    {"object": "page", "id": "p1", "properties": {
                        "Name": {"type": "title", "title": [{"plain_text": "Dune"}]},
                        "Book Rating": {"type": "select", "select": {"name": "Good"}}
                    }},
                    {"object": "page", "id": "p2"}
                ],
                "next_cursor": null,
                "has_more": false
            })))
            .mount(&server)
            .await;

        let base = Url::parse(&format!("{}/", server.uri())).unwrap();
        let sdk = Arc::new(NotionClient::with_base_url("t", base));
        let client = EntityClient::from_defs(
            sdk,
            "db1".to_string(),
            vec![
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
            ],
        );

        let page = client
            .query(QueryArgs {
                filter: Some(Filter::eq("bookRating", "Good")),
                ..QueryArgs::default()
            })
            .await
            .unwrap();

        // The malformed second row is omitted; the raw page keeps both.
        assert_eq!(page.rows.len(), 1);
        assert_eq!(page.rows[0]["name"], json!("Dune"));
        assert_eq!(page.rows[0]["bookRating"], json!("Good"));
        assert_eq!(page.raw.results.len(), 2);
    }

    #[tokio::test]
    async fn test_query_all_walks_every_page() {
        use wiremock::matchers::{body_partial_json, method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        fn page_row(title: &str) -> Value {
            json!({"object": "page", "id": title, "properties": {
                "Name": {"type": "title", "title": [{"plain_text": title}]}
            }})
        }

        let server = MockServer::start().await;
        // Mounted first so the cursor-bearing second request matches here.
        Mock::given(method("POST"))
            .and(path("/databases/db1/query"))
            .and(body_partial_json(json!({"start_cursor": "c2"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "object": "list",
                "results": [page_row("second")],
                "next_cursor": null,
                "has_more": false
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/databases/db1/query"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "object": "list",
                "results": [page_row("first")],
                "next_cursor": "c2",
                "has_more": true
            })))
            .mount(&server)
            .await;

        let base = Url::parse(&format!("{}/", server.uri())).unwrap();
        let sdk = Arc::new(NotionClient::with_base_url("t", base));
        let client = EntityClient::from_defs(
            sdk,
            "db1".to_string(),
            vec![ColumnDef {
                name: "name".into(),
                source: "Name".into(),
                kind: PropertyKind::Title,
                options: vec![],
            }],
        );

        let rows = client.query_all(QueryArgs::default()).await.unwrap();
        let titles: Vec<_> = rows.iter().map(|row| row["name"].clone()).collect();
        assert_eq!(titles, vec![json!("first"), json!("second")]);
    }

    #[test]
    fn test_snapshot_round_trip() {
        let snapshot = json!({
            "id": "db1",
            "className": "Books",
            "displayName": "Books",
            "camelCaseName": "books",
            "columns": [
                {"name": "name", "source": "Name", "kind": "title", "options": []}
            ]
        });
        let client = EntityClient::from_snapshot(sdk(), &snapshot.to_string()).unwrap();
        assert_eq!(client.database_id(), "db1");
        assert_eq!(client.columns().resolve("name").unwrap().source, "Name");
    }
}
