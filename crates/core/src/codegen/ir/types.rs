//! Rust AST subset for generated modules.
//!
//! Covers exactly what generated entity modules need: constants, a serde
//! struct, and small factory functions. Not a general-purpose Rust AST.

/// A type position in generated code.
#[derive(Debug, Clone)]
pub enum RsType {
    /// `String`
    OwnedString,
    /// `f64`
    F64,
    /// `bool`
    Bool,
    /// `&str`
    Str,
    /// `&[&str]`
    StrSlice,
    /// `&[T]` for a named element type.
    Slice(String),
    /// `Option<T>`
    Option(Box<RsType>),
    /// `Vec<T>`
    Vec(Box<RsType>),
    /// A named type: `DateValue`, `RowValidator`, ...
    Named(String),
}

/// An expression position in generated code.
#[derive(Debug, Clone)]
pub enum RsExpr {
    /// String literal, escaped on emission.
    Str(String),
    /// A path used verbatim: `COLUMNS`, `PropertyKind::Select`.
    Path(String),
    /// Borrowed slice literal: `&[...]`.
    SliceLit(Vec<RsExpr>),
    /// Struct literal with named fields.
    StructLit {
        /// Struct path.
        path: String,
        /// `(field, value)` pairs in declaration order.
        fields: Vec<(String, RsExpr)>,
    },
    /// Function call with verbatim callee path.
    Call {
        /// Callee path.
        func: String,
        /// Arguments.
        args: Vec<RsExpr>,
    },
}

/// One field of a generated struct.
#[derive(Debug, Clone)]
pub struct RsField {
    /// Doc line, without the `///`.
    pub doc: String,
    /// Field identifier.
    pub name: String,
    /// Serde attribute fragments, joined into one `#[serde(...)]`.
    pub serde_attrs: Vec<String>,
    /// Field type.
    pub ty: RsType,
}

/// One top-level item of a generated module.
#[derive(Debug, Clone)]
pub enum RsItem {
    /// `pub const NAME: TY = VALUE;`
    Const {
        /// Doc line.
        doc: String,
        /// Constant name.
        name: String,
        /// Constant type.
        ty: RsType,
        /// Constant value.
        value: RsExpr,
    },
    /// A derive-annotated `pub struct`.
    Struct {
        /// Doc line.
        doc: String,
        /// Struct name.
        name: String,
        /// Derive paths, in order.
        derives: Vec<String>,
        /// Fields, in order.
        fields: Vec<RsField>,
    },
    /// A `pub fn` whose body is a single tail expression.
    Fn {
        /// Doc line.
        doc: String,
        /// Function name.
        name: String,
        /// `(name, type)` parameter pairs.
        params: Vec<(String, String)>,
        /// Return type, verbatim.
        ret: String,
        /// Tail expression.
        body: RsExpr,
    },
}

/// A complete generated module.
#[derive(Debug, Clone, Default)]
pub struct RsModule {
    /// Module doc lines, without the `//!`.
    pub docs: Vec<String>,
    /// Use declarations, verbatim paths grouped as given.
    pub uses: Vec<String>,
    /// Items in emission order.
    pub items: Vec<RsItem>,
}
