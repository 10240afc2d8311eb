//! The code synthesizer: mapped properties + entity identity → module AST.
//!
//! Deterministic by construction: the only inputs are the ordered property
//! list and the identity, and every derived name comes from them. Calling
//! this twice with the same inputs yields byte-identical source.

use crate::cache::EntityMeta;
use crate::client::{ColumnDef, SchemaSnapshot};
use crate::codegen::ir::{Emit, RsExpr, RsField, RsItem, RsModule, RsType};
use crate::schema::mapper::MappedProperty;
use crate::schema::{ValueShape, naming};

/// Names derived once from a database's identity.
#[derive(Debug, Clone)]
pub struct EntityIdentity {
    /// Remote database identifier.
    pub database_id: String,
    /// Human display name (database title).
    pub display_name: String,
    /// Derived type name: `Book Club` → `BookClub`.
    pub class_name: String,
    /// Lower-camel accessor name: `bookClub`.
    pub accessor_name: String,
    /// Module (and file, and accessor fn) name: `book_club`.
    pub module_name: String,
}

impl EntityIdentity {
    /// Derive all names from the remote identity. Titles that normalize to
    /// nothing fall back to `Entity`.
    pub fn derive(database_id: &str, display_name: &str) -> Self {
        let mut class_name = naming::ident_safe(&naming::pascal_case(display_name));
        if class_name.is_empty() {
            class_name = "Entity".to_string();
        }
        let mut accessor_name = naming::ident_safe(&naming::camel_case(display_name));
        if accessor_name.is_empty() {
            accessor_name = "entity".to_string();
        }
        let module_name = naming::ident_safe(&naming::camel_to_snake(&accessor_name));
        Self {
            database_id: database_id.to_string(),
            display_name: display_name.to_string(),
            class_name,
            accessor_name,
            module_name,
        }
    }

    /// The metadata persisted for this entity.
    pub fn meta(&self) -> EntityMeta {
        EntityMeta {
            id: self.database_id.clone(),
            class_name: self.class_name.clone(),
            display_name: self.display_name.clone(),
            camel_case_name: self.accessor_name.clone(),
        }
    }
}

/// Synthesize the module AST for one entity.
pub fn synthesize_module(identity: &EntityIdentity, properties: &[MappedProperty]) -> RsModule {
    let mut items = Vec::new();

    items.push(RsItem::Const {
        doc: format!("Remote identifier of the `{}` database.", identity.display_name),
        name: "DATABASE_ID".to_string(),
        ty: RsType::Str,
        value: RsExpr::Str(identity.database_id.clone()),
    });

    // Choice constants in first-seen mapping order.
    for property in properties {
        if let Some(options) = &property.options {
            items.push(RsItem::Const {
                doc: format!("Options of the `{}` column.", property.source),
                name: options_const_name(property),
                ty: RsType::StrSlice,
                value: RsExpr::SliceLit(
                    options.iter().map(|o| RsExpr::Str(o.clone())).collect(),
                ),
            });
        }
    }

    items.push(RsItem::Const {
        doc: "Column mapping consumed by the filter compiler and the response simplifier."
            .to_string(),
        name: "COLUMNS".to_string(),
        ty: RsType::Slice("ColumnSpec".to_string()),
        value: RsExpr::SliceLit(properties.iter().map(column_spec_literal).collect()),
    });

    items.push(row_struct(identity, properties));

    items.push(RsItem::Fn {
        doc: format!("Validator over simplified `{}` rows.", identity.display_name),
        name: "validator".to_string(),
        params: Vec::new(),
        ret: "RowValidator".to_string(),
        body: RsExpr::Call {
            func: "RowValidator::from_columns".to_string(),
            args: vec![RsExpr::Path("COLUMNS".to_string())],
        },
    });

    items.push(RsItem::Fn {
        doc: format!("Typed client for the `{}` database.", identity.display_name),
        name: identity.module_name.clone(),
        params: vec![("sdk".to_string(), "Arc<NotionClient>".to_string())],
        ret: "EntityClient".to_string(),
        body: RsExpr::Call {
            func: "EntityClient::new".to_string(),
            args: vec![
                RsExpr::Path("sdk".to_string()),
                RsExpr::Path("DATABASE_ID".to_string()),
                RsExpr::Path("COLUMNS".to_string()),
            ],
        },
    });

    RsModule {
        docs: vec![
            format!("Generated by ntx from the `{}` database.", identity.display_name),
            String::new(),
            "Do not edit by hand; rerun `ntx generate` to refresh.".to_string(),
        ],
        uses: module_uses(properties),
        items,
    }
}

/// Render one entity module to source text.
pub fn render_module(identity: &EntityIdentity, properties: &[MappedProperty]) -> String {
    synthesize_module(identity, properties).emit()
}

/// Build the directly loadable schema snapshot for one entity.
pub fn build_snapshot(identity: &EntityIdentity, properties: &[MappedProperty]) -> SchemaSnapshot {
    SchemaSnapshot {
        id: identity.database_id.clone(),
        class_name: identity.class_name.clone(),
        display_name: identity.display_name.clone(),
        camel_case_name: identity.accessor_name.clone(),
        columns: properties.iter().map(column_def).collect(),
    }
}

fn options_const_name(property: &MappedProperty) -> String {
    naming::ident_safe(&format!("{}_OPTIONS", naming::shouty_case(&property.source)))
}

fn column_spec_literal(property: &MappedProperty) -> RsExpr {
    let options = match &property.options {
        Some(_) => RsExpr::Path(options_const_name(property)),
        None => RsExpr::SliceLit(Vec::new()),
    };
    RsExpr::StructLit {
        path: "ColumnSpec".to_string(),
        fields: vec![
            ("name".to_string(), RsExpr::Str(property.name.clone())),
            ("source".to_string(), RsExpr::Str(property.source.clone())),
            (
                "kind".to_string(),
                RsExpr::Path(format!("PropertyKind::{:?}", property.kind)),
            ),
            ("options".to_string(), options),
        ],
    }
}

fn column_def(property: &MappedProperty) -> ColumnDef {
    ColumnDef {
        name: property.name.clone(),
        source: property.source.clone(),
        kind: property.kind,
        options: property.options.clone().unwrap_or_default(),
    }
}

fn row_struct(identity: &EntityIdentity, properties: &[MappedProperty]) -> RsItem {
    let fields = properties
        .iter()
        .map(|property| {
            let base = shape_type(property.type_sig.shape);
            let (ty, mut serde_attrs) = if property.type_sig.required {
                (base, Vec::new())
            } else {
                (
                    RsType::Option(Box::new(base)),
                    vec!["skip_serializing_if = \"Option::is_none\"".to_string()],
                )
            };
            if property.field != property.name {
                serde_attrs.insert(0, format!("rename = \"{}\"", property.name));
            }
            RsField {
                doc: format!("`{}`", property.source),
                name: property.field.clone(),
                serde_attrs,
                ty,
            }
        })
        .collect();
    RsItem::Struct {
        doc: format!("One simplified `{}` row.", identity.display_name),
        name: format!("{}Row", identity.class_name),
        derives: vec![
            "Debug".to_string(),
            "Clone".to_string(),
            "Serialize".to_string(),
            "Deserialize".to_string(),
        ],
        fields,
    }
}

fn shape_type(shape: ValueShape) -> RsType {
    match shape {
        ValueShape::Text => RsType::OwnedString,
        ValueShape::Number => RsType::F64,
        ValueShape::Flag => RsType::Bool,
        ValueShape::TextList => RsType::Vec(Box::new(RsType::OwnedString)),
        ValueShape::DateRange => RsType::Named("DateValue".to_string()),
    }
}

fn module_uses(properties: &[MappedProperty]) -> Vec<String> {
    let mut client_items = vec!["ColumnSpec", "EntityClient", "RowValidator"];
    if properties
        .iter()
        .any(|p| p.type_sig.shape == ValueShape::DateRange)
    {
        client_items.push("DateValue");
        client_items.sort_unstable();
    }
    vec![
        "std::sync::Arc".to_string(),
        format!("ntx_core::client::{{{}}}", client_items.join(", ")),
        "ntx_core::schema::PropertyKind".to_string(),
        "ntx_core::sdk::NotionClient".to_string(),
        "serde::{Deserialize, Serialize}".to_string(),
    ]
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::schema::mapper::map_properties;
    use crate::schema::{PropertyDescriptor, PropertyKind, RemoteKind};

    fn descriptor(name: &str, kind: PropertyKind, options: &[&str]) -> PropertyDescriptor {
        PropertyDescriptor {
            name: name.to_string(),
            kind: RemoteKind::Supported(kind),
            options: options.iter().map(|&o| o.to_string()).collect(),
        }
    }

    fn book_properties() -> Vec<MappedProperty> {
        map_properties(&[
            descriptor("Name", PropertyKind::Title, &[]),
            descriptor("Book Rating", PropertyKind::Select, &["Good", "Bad"]),
            descriptor("Price", PropertyKind::Number, &[]),
            descriptor("Published", PropertyKind::Date, &[]),
        ])
        .unwrap()
    }

    #[test]
    fn test_identity_derivation() {
        let identity = EntityIdentity::derive("db1", "Book Club");
        assert_eq!(identity.class_name, "BookClub");
        assert_eq!(identity.accessor_name, "bookClub");
        assert_eq!(identity.module_name, "book_club");

        let fallback = EntityIdentity::derive("db2", "✨");
        assert_eq!(fallback.class_name, "Entity");
        assert_eq!(fallback.module_name, "entity");
    }

    #[test]
    fn test_render_is_idempotent() {
        let identity = EntityIdentity::derive("db1", "Books");
        let properties = book_properties();
        let first = render_module(&identity, &properties);
        let second = render_module(&identity, &properties);
        assert_eq!(first, second);
    }

    #[test]
    fn test_rendered_module_contains_all_outputs() {
        let identity = EntityIdentity::derive("2f6e1a", "Books");
        let rendered = render_module(&identity, &book_properties());

        assert!(rendered.starts_with("//! Generated by ntx from the `Books` database."));
        assert!(rendered.contains("pub const DATABASE_ID: &str = \"2f6e1a\";"));
        assert!(rendered.contains(
            "pub const BOOK_RATING_OPTIONS: &[&str] = &[\"Good\", \"Bad\"];"
        ));
        assert!(rendered.contains("pub const COLUMNS: &[ColumnSpec] = &["));
        assert!(rendered.contains("kind: PropertyKind::Select,"));
        assert!(rendered.contains("options: BOOK_RATING_OPTIONS,"));
        assert!(rendered.contains("pub struct BooksRow {"));
        assert!(rendered.contains("    pub name: String,\n"));
        assert!(rendered.contains(
            "    #[serde(rename = \"bookRating\", skip_serializing_if = \"Option::is_none\")]\n"
        ));
        assert!(rendered.contains("    pub book_rating: Option<String>,\n"));
        assert!(rendered.contains("    pub published: Option<DateValue>,\n"));
        assert!(rendered.contains("use ntx_core::client::{ColumnSpec, DateValue, EntityClient, RowValidator};"));
        assert!(rendered.contains("pub fn validator() -> RowValidator {"));
        assert!(rendered.contains("pub fn books(sdk: Arc<NotionClient>) -> EntityClient {"));
        assert!(rendered.contains("    EntityClient::new(sdk, DATABASE_ID, COLUMNS)\n"));
    }

    #[test]
    fn test_unsupported_properties_absent_from_all_outputs() {
        let identity = EntityIdentity::derive("db1", "Books");
        let properties = map_properties(&[
            descriptor("Name", PropertyKind::Title, &[]),
            PropertyDescriptor {
                name: "Owner".to_string(),
                kind: RemoteKind::Unsupported("people".to_string()),
                options: Vec::new(),
            },
        ])
        .unwrap();
        let rendered = render_module(&identity, &properties);
        assert!(!rendered.contains("Owner"));
        let snapshot = build_snapshot(&identity, &properties);
        assert_eq!(snapshot.columns.len(), 1);
    }

    #[test]
    fn test_snapshot_carries_identity_and_columns() {
        let identity = EntityIdentity::derive("db1", "Books");
        let snapshot = build_snapshot(&identity, &book_properties());
        assert_eq!(snapshot.id, "db1");
        assert_eq!(snapshot.class_name, "Books");
        assert_eq!(snapshot.camel_case_name, "books");
        assert_eq!(snapshot.columns[1].options, vec!["Good", "Bad"]);
        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["className"], "Books");
        assert_eq!(json["columns"][1]["kind"], "select");
    }
}
