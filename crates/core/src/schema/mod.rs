//! Remote schema model: property kinds, descriptors, and the mapping from
//! remote property descriptors to semantic columns.

pub mod mapper;
pub mod naming;

use serde::{Deserialize, Serialize};

use crate::sdk::{Database, RemoteProperty};

/// The closed set of supported property kinds.
///
/// Dispatch over kinds is always a `match` on this enum so that adding a
/// kind forces every handler site to be updated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyKind {
    /// The database's title column. Always present, never null.
    Title,
    /// Free-form rich text.
    RichText,
    /// Numeric value.
    Number,
    /// Boolean flag.
    Checkbox,
    /// Date range with a required start and optional end.
    Date,
    /// Single choice from a configured option list.
    Select,
    /// Multiple choices from a configured option list.
    MultiSelect,
    /// Remote-assigned unique identifier.
    UniqueId,
    /// Email address.
    Email,
    /// Phone number.
    PhoneNumber,
    /// URL.
    Url,
}

impl PropertyKind {
    /// Every supported kind, in declaration order.
    pub const ALL: &'static [Self] = &[
        Self::Title,
        Self::RichText,
        Self::Number,
        Self::Checkbox,
        Self::Date,
        Self::Select,
        Self::MultiSelect,
        Self::UniqueId,
        Self::Email,
        Self::PhoneNumber,
        Self::Url,
    ];

    /// The kind discriminator used on the wire, both in schema descriptors
    /// and as the key of filter leaves.
    pub fn wire_name(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::RichText => "rich_text",
            Self::Number => "number",
            Self::Checkbox => "checkbox",
            Self::Date => "date",
            Self::Select => "select",
            Self::MultiSelect => "multi_select",
            Self::UniqueId => "unique_id",
            Self::Email => "email",
            Self::PhoneNumber => "phone_number",
            Self::Url => "url",
        }
    }

    /// Parse a wire discriminator into a supported kind.
    pub fn from_wire(wire: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.wire_name() == wire)
    }

    /// Whether this kind carries a configured option list.
    pub fn is_choice(self) -> bool {
        matches!(self, Self::Select | Self::MultiSelect)
    }

    /// The shape of this kind's simplified value. Shared by the generated
    /// type signature and the generated validator, which is what keeps the
    /// two from disagreeing.
    pub fn value_shape(self) -> ValueShape {
        match self {
            Self::Title
            | Self::RichText
            | Self::Select
            | Self::UniqueId
            | Self::Email
            | Self::PhoneNumber
            | Self::Url => ValueShape::Text,
            Self::Number => ValueShape::Number,
            Self::Checkbox => ValueShape::Flag,
            Self::Date => ValueShape::DateRange,
            Self::MultiSelect => ValueShape::TextList,
        }
    }
}

/// Shape of a simplified value, as seen by generated types and validators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueShape {
    /// A string.
    Text,
    /// A number.
    Number,
    /// A boolean.
    Flag,
    /// An array of strings.
    TextList,
    /// A `{ start, end }` compound. The shape is fixed; it is not derived
    /// from the remote schema.
    DateRange,
}

impl ValueShape {
    /// Human-readable expectation, used in validator diagnostics.
    pub fn describe(self) -> &'static str {
        match self {
            Self::Text => "a string",
            Self::Number => "a number",
            Self::Flag => "a boolean",
            Self::TextList => "an array of strings",
            Self::DateRange => "a date range object",
        }
    }
}

/// Kind of a remote property as fetched, supported or not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteKind {
    /// A kind ntx can generate code for.
    Supported(PropertyKind),
    /// Everything else; logged and skipped during mapping.
    Unsupported(String),
}

/// One property descriptor of a fetched schema, in mapper-ready form.
#[derive(Debug, Clone)]
pub struct PropertyDescriptor {
    /// Remote property name.
    pub name: String,
    /// Parsed kind.
    pub kind: RemoteKind,
    /// Option labels for choice-like kinds, in remote order.
    pub options: Vec<String>,
}

impl PropertyDescriptor {
    /// Build a descriptor from a wire property.
    pub fn from_remote(name: &str, property: &RemoteProperty) -> Self {
        let kind = match PropertyKind::from_wire(&property.kind) {
            Some(kind) => RemoteKind::Supported(kind),
            None => RemoteKind::Unsupported(property.kind.clone()),
        };
        Self {
            name: name.to_string(),
            kind,
            options: property.option_names(),
        }
    }
}

/// Descriptors of a database in generation order: the title column first,
/// then the rest sorted by remote name. The order is what makes repeated
/// generation byte-identical.
pub fn descriptors_in_order(database: &Database) -> Vec<PropertyDescriptor> {
    let mut title = Vec::new();
    let mut rest = Vec::new();
    for (name, property) in &database.properties {
        let descriptor = PropertyDescriptor::from_remote(name, property);
        if matches!(descriptor.kind, RemoteKind::Supported(PropertyKind::Title)) {
            title.push(descriptor);
        } else {
            rest.push(descriptor);
        }
    }
    title.extend(rest);
    title
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_names_round_trip() {
        for kind in PropertyKind::ALL {
            assert_eq!(PropertyKind::from_wire(kind.wire_name()), Some(*kind));
        }
        assert_eq!(PropertyKind::from_wire("rollup"), None);
    }

    #[test]
    fn test_descriptors_put_title_first() {
        let db: Database = serde_json::from_value(serde_json::json!({
            "id": "db1",
            "title": [{"plain_text": "Books"}],
            "properties": {
                "Price": {"id": "a", "name": "Price", "type": "number"},
                "Name": {"id": "title", "name": "Name", "type": "title"},
                "Author": {"id": "b", "name": "Author", "type": "rich_text"}
            }
        }))
        .unwrap();
        let names: Vec<_> = descriptors_in_order(&db)
            .into_iter()
            .map(|d| d.name)
            .collect();
        assert_eq!(names, vec!["Name", "Author", "Price"]);
    }

    #[test]
    fn test_unsupported_kind_is_preserved_as_string() {
        let descriptor = PropertyDescriptor::from_remote(
            "Refs",
            &serde_json::from_value(serde_json::json!({
                "id": "x", "name": "Refs", "type": "relation"
            }))
            .unwrap(),
        );
        assert_eq!(descriptor.kind, RemoteKind::Unsupported("relation".into()));
    }
}
