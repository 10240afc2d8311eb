//! Code synthesis for generated entity modules.
//!
//! `ir` holds the Rust AST subset and its emitter; `build` turns mapped
//! properties into module AST and schema snapshots; `printer` persists the
//! results.

pub mod build;
pub mod ir;
pub mod printer;

pub use build::{EntityIdentity, build_snapshot, render_module, synthesize_module};
pub use printer::{Printer, module_name_of};
