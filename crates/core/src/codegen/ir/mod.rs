//! Intermediate representation for generated Rust source modules.
//!
//! Two layers, kept deliberately separate:
//!
//! - `types`: the Rust AST subset generated modules are built from
//!   (types, expressions, items, modules);
//! - `emit`: AST to source text via the `Emit` trait.
//!
//! All schema corner cases are resolved before this layer — the synthesizer
//! in [`crate::codegen`] builds structured AST, and emission is purely
//! mechanical string building. That split is what makes byte-identical
//! regeneration cheap to guarantee and test.

mod emit;
mod types;

pub use emit::Emit;
pub use types::{RsExpr, RsField, RsItem, RsModule, RsType};
