//! Source emission via the `Emit` trait.
//!
//! Each AST node renders itself; composition happens by concatenation.
//! Indentation is four spaces, matching rustfmt defaults so generated
//! modules survive a format pass unchanged.

use super::types::{RsExpr, RsField, RsItem, RsModule, RsType};

const INDENT: &str = "    ";

/// Trait for rendering AST nodes to source text.
pub trait Emit {
    /// Render this node.
    fn emit(&self) -> String;
}

impl Emit for RsType {
    fn emit(&self) -> String {
        match self {
            Self::OwnedString => "String".to_string(),
            Self::F64 => "f64".to_string(),
            Self::Bool => "bool".to_string(),
            Self::Str => "&str".to_string(),
            Self::StrSlice => "&[&str]".to_string(),
            Self::Slice(inner) => format!("&[{inner}]"),
            Self::Option(inner) => format!("Option<{}>", inner.emit()),
            Self::Vec(inner) => format!("Vec<{}>", inner.emit()),
            Self::Named(name) => name.clone(),
        }
    }
}

/// Escape a string for a Rust string literal.
fn escape_str(text: &str) -> String {
    text.chars()
        .flat_map(|c| match c {
            '\\' => vec!['\\', '\\'],
            '"' => vec!['\\', '"'],
            '\n' => vec!['\\', 'n'],
            '\t' => vec!['\\', 't'],
            '\r' => vec!['\\', 'r'],
            other => vec![other],
        })
        .collect()
}

impl Emit for RsExpr {
    fn emit(&self) -> String {
        self.emit_at(0)
    }
}

impl RsExpr {
    /// Render at the given indentation depth. Slice literals of struct
    /// literals break across lines; everything else stays inline.
    pub fn emit_at(&self, depth: usize) -> String {
        match self {
            Self::Str(text) => format!("\"{}\"", escape_str(text)),
            Self::Path(path) => path.clone(),
            Self::SliceLit(items) => {
                if items.is_empty() {
                    return "&[]".to_string();
                }
                if items.iter().any(|i| matches!(i, Self::StructLit { .. })) {
                    let inner_pad = INDENT.repeat(depth + 1);
                    let close_pad = INDENT.repeat(depth);
                    let rendered: Vec<String> = items
                        .iter()
                        .map(|item| format!("{inner_pad}{},\n", item.emit_at(depth + 1)))
                        .collect();
                    format!("&[\n{}{close_pad}]", rendered.concat())
                } else {
                    let rendered: Vec<String> =
                        items.iter().map(|item| item.emit_at(depth)).collect();
                    format!("&[{}]", rendered.join(", "))
                }
            }
            Self::StructLit { path, fields } => {
                let inner_pad = INDENT.repeat(depth + 1);
                let close_pad = INDENT.repeat(depth);
                let rendered: Vec<String> = fields
                    .iter()
                    .map(|(name, value)| {
                        format!("{inner_pad}{name}: {},\n", value.emit_at(depth + 1))
                    })
                    .collect();
                format!("{path} {{\n{}{close_pad}}}", rendered.concat())
            }
            Self::Call { func, args } => {
                let rendered: Vec<String> = args.iter().map(|arg| arg.emit_at(depth)).collect();
                format!("{func}({})", rendered.join(", "))
            }
        }
    }
}

impl Emit for RsField {
    fn emit(&self) -> String {
        let mut out = String::new();
        if !self.doc.is_empty() {
            out.push_str(&format!("{INDENT}/// {}\n", self.doc));
        }
        if !self.serde_attrs.is_empty() {
            out.push_str(&format!(
                "{INDENT}#[serde({})]\n",
                self.serde_attrs.join(", ")
            ));
        }
        out.push_str(&format!("{INDENT}pub {}: {},\n", self.name, self.ty.emit()));
        out
    }
}

impl Emit for RsItem {
    fn emit(&self) -> String {
        match self {
            Self::Const { doc, name, ty, value } => {
                let mut out = String::new();
                if !doc.is_empty() {
                    out.push_str(&format!("/// {doc}\n"));
                }
                out.push_str(&format!(
                    "pub const {name}: {} = {};\n",
                    ty.emit(),
                    value.emit_at(0)
                ));
                out
            }
            Self::Struct {
                doc,
                name,
                derives,
                fields,
            } => {
                let mut out = String::new();
                if !doc.is_empty() {
                    out.push_str(&format!("/// {doc}\n"));
                }
                if !derives.is_empty() {
                    out.push_str(&format!("#[derive({})]\n", derives.join(", ")));
                }
                out.push_str(&format!("pub struct {name} {{\n"));
                for field in fields {
                    out.push_str(&field.emit());
                }
                out.push_str("}\n");
                out
            }
            Self::Fn {
                doc,
                name,
                params,
                ret,
                body,
            } => {
                let mut out = String::new();
                if !doc.is_empty() {
                    out.push_str(&format!("/// {doc}\n"));
                }
                let rendered: Vec<String> = params
                    .iter()
                    .map(|(param, ty)| format!("{param}: {ty}"))
                    .collect();
                out.push_str(&format!(
                    "pub fn {name}({}) -> {ret} {{\n",
                    rendered.join(", ")
                ));
                out.push_str(&format!("{INDENT}{}\n", body.emit_at(1)));
                out.push_str("}\n");
                out
            }
        }
    }
}

impl Emit for RsModule {
    fn emit(&self) -> String {
        let mut out = String::new();
        for line in &self.docs {
            if line.is_empty() {
                out.push_str("//!\n");
            } else {
                out.push_str(&format!("//! {line}\n"));
            }
        }
        if !self.docs.is_empty() {
            out.push('\n');
        }
        for use_path in &self.uses {
            out.push_str(&format!("use {use_path};\n"));
        }
        if !self.uses.is_empty() {
            out.push('\n');
        }
        for (index, item) in self.items.iter().enumerate() {
            if index > 0 {
                out.push('\n');
            }
            out.push_str(&item.emit());
        }
        out
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_emit_types() {
        assert_eq!(RsType::OwnedString.emit(), "String");
        assert_eq!(RsType::StrSlice.emit(), "&[&str]");
        assert_eq!(RsType::Slice("ColumnSpec".into()).emit(), "&[ColumnSpec]");
        assert_eq!(
            RsType::Option(Box::new(RsType::Vec(Box::new(RsType::OwnedString)))).emit(),
            "Option<Vec<String>>"
        );
    }

    #[test]
    fn test_emit_string_escapes() {
        let expr = RsExpr::Str("say \"hi\"\n".into());
        assert_eq!(expr.emit(), "\"say \\\"hi\\\"\\n\"");
    }

    #[test]
    fn test_emit_flat_slice_stays_inline() {
        let expr = RsExpr::SliceLit(vec![
            RsExpr::Str("Good".into()),
            RsExpr::Str("Bad".into()),
        ]);
        assert_eq!(expr.emit(), "&[\"Good\", \"Bad\"]");
        assert_eq!(RsExpr::SliceLit(vec![]).emit(), "&[]");
    }

    #[test]
    fn test_emit_struct_slice_breaks_lines() {
        let expr = RsExpr::SliceLit(vec![RsExpr::StructLit {
            path: "ColumnSpec".into(),
            fields: vec![
                ("name".into(), RsExpr::Str("price".into())),
                ("kind".into(), RsExpr::Path("PropertyKind::Number".into())),
            ],
        }]);
        let expected = "&[\n    ColumnSpec {\n        name: \"price\",\n        kind: PropertyKind::Number,\n    },\n]";
        assert_eq!(expr.emit(), expected);
    }

    #[test]
    fn test_emit_const_item() {
        let item = RsItem::Const {
            doc: "Remote identifier.".into(),
            name: "DATABASE_ID".into(),
            ty: RsType::Str,
            value: RsExpr::Str("db1".into()),
        };
        assert_eq!(
            item.emit(),
            "/// Remote identifier.\npub const DATABASE_ID: &str = \"db1\";\n"
        );
    }

    #[test]
    fn test_emit_struct_with_serde_attrs() {
        let item = RsItem::Struct {
            doc: "A row.".into(),
            name: "BooksRow".into(),
            derives: vec!["Debug".into(), "Clone".into()],
            fields: vec![RsField {
                doc: "`Book Rating`".into(),
                name: "book_rating".into(),
                serde_attrs: vec![
                    "rename = \"bookRating\"".into(),
                    "skip_serializing_if = \"Option::is_none\"".into(),
                ],
                ty: RsType::Option(Box::new(RsType::OwnedString)),
            }],
        };
        let rendered = item.emit();
        assert!(rendered.contains("#[derive(Debug, Clone)]"));
        assert!(rendered.contains(
            "    #[serde(rename = \"bookRating\", skip_serializing_if = \"Option::is_none\")]\n"
        ));
        assert!(rendered.contains("    pub book_rating: Option<String>,\n"));
    }

    #[test]
    fn test_emit_fn_with_tail_call() {
        let item = RsItem::Fn {
            doc: "Accessor.".into(),
            name: "books".into(),
            params: vec![("sdk".into(), "Arc<NotionClient>".into())],
            ret: "EntityClient".into(),
            body: RsExpr::Call {
                func: "EntityClient::new".into(),
                args: vec![
                    RsExpr::Path("sdk".into()),
                    RsExpr::Path("DATABASE_ID".into()),
                    RsExpr::Path("COLUMNS".into()),
                ],
            },
        };
        assert_eq!(
            item.emit(),
            "/// Accessor.\npub fn books(sdk: Arc<NotionClient>) -> EntityClient {\n    EntityClient::new(sdk, DATABASE_ID, COLUMNS)\n}\n"
        );
    }

    #[test]
    fn test_emit_module_layout() {
        let module = RsModule {
            docs: vec!["Generated.".into()],
            uses: vec!["std::sync::Arc".into()],
            items: vec![
                RsItem::Const {
                    doc: String::new(),
                    name: "A".into(),
                    ty: RsType::Str,
                    value: RsExpr::Str("a".into()),
                },
                RsItem::Const {
                    doc: String::new(),
                    name: "B".into(),
                    ty: RsType::Str,
                    value: RsExpr::Str("b".into()),
                },
            ],
        };
        assert_eq!(
            module.emit(),
            "//! Generated.\n\nuse std::sync::Arc;\n\npub const A: &str = \"a\";\n\npub const B: &str = \"b\";\n"
        );
    }
}
