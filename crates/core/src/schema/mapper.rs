//! The property type mapper: remote descriptors → semantic columns.
//!
//! Pure functions; no IO. Unsupported kinds map to `None` and the caller
//! logs and skips them — an unsupported property is not an error.

use crate::error::MapError;
use crate::schema::naming;
use crate::schema::{PropertyDescriptor, PropertyKind, RemoteKind, ValueShape};

/// Type signature of a generated field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeSig {
    /// Base value shape.
    pub shape: ValueShape,
    /// Whether the generated field is non-optional.
    pub required: bool,
}

/// Validator descriptor of a generated field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatorRule {
    /// Accepted value shape.
    pub shape: ValueShape,
    /// Whether null is accepted.
    pub nullable: bool,
}

/// One semantic column: the mapper's output triple plus the derived names.
#[derive(Debug, Clone)]
pub struct MappedProperty {
    /// Original remote property name.
    pub source: String,
    /// Semantic name (lower camel); key of simplified rows.
    pub name: String,
    /// Field identifier (snake) used in the generated struct.
    pub field: String,
    /// Supported kind.
    pub kind: PropertyKind,
    /// Type-signature half of the triple.
    pub type_sig: TypeSig,
    /// Validator half of the triple.
    pub rule: ValidatorRule,
    /// Enum metadata for choice-like kinds: ordered, deduplicated labels.
    pub options: Option<Vec<String>>,
}

/// Map one descriptor. Returns `None` for unsupported kinds and for names
/// that normalize to an empty identifier; the caller logs and skips.
pub fn map_property(descriptor: &PropertyDescriptor) -> Option<MappedProperty> {
    let kind = match &descriptor.kind {
        RemoteKind::Supported(kind) => *kind,
        RemoteKind::Unsupported(_) => return None,
    };
    let name = naming::camel_case(&descriptor.name);
    if name.is_empty() {
        return None;
    }
    let field = naming::ident_safe(&naming::snake_case(&descriptor.name));

    // The title column is the only required, non-nullable field.
    let required = kind == PropertyKind::Title;
    let shape = kind.value_shape();

    let options = kind.is_choice().then(|| dedup_options(&descriptor.options));

    Some(MappedProperty {
        source: descriptor.name.clone(),
        name,
        field,
        kind,
        type_sig: TypeSig { shape, required },
        rule: ValidatorRule {
            shape,
            nullable: !required,
        },
        options,
    })
}

/// Map an ordered descriptor list, skipping unsupported entries with a
/// warning and failing the entity on semantic-name collisions.
pub fn map_properties(descriptors: &[PropertyDescriptor]) -> Result<Vec<MappedProperty>, MapError> {
    let mut mapped: Vec<MappedProperty> = Vec::with_capacity(descriptors.len());
    for descriptor in descriptors {
        let Some(property) = map_property(descriptor) else {
            let kind = match &descriptor.kind {
                RemoteKind::Unsupported(kind) => kind.as_str(),
                RemoteKind::Supported(_) => "empty-name",
            };
            tracing::warn!(
                property = %descriptor.name,
                kind,
                "skipping property with unsupported kind"
            );
            continue;
        };
        if let Some(existing) = mapped.iter().find(|m| m.name == property.name) {
            return Err(MapError::NameCollision {
                first: existing.source.clone(),
                second: property.source,
                name: property.name,
            });
        }
        mapped.push(property);
    }
    Ok(mapped)
}

/// Deduplicate option labels preserving first-seen order.
fn dedup_options(options: &[String]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    options
        .iter()
        .filter(|o| seen.insert(o.as_str()))
        .cloned()
        .collect()
}
