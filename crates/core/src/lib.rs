//! Core engine of ntx: schema mapping, code synthesis, query compilation.
//!
//! The pipeline has two halves that share one data model:
//!
//! - **Generation**: a remote database schema is mapped property-by-property
//!   into semantic columns ([`schema`]), synthesized into a Rust source
//!   module plus a JSON schema snapshot ([`codegen`]), and written to the
//!   configured output directory together with a registry module and a
//!   metadata cache ([`generate`], [`cache`]).
//! - **Query time**: generated accessors hand back an
//!   [`client::EntityClient`] that compiles semantic filters to the wire
//!   format, simplifies raw response rows back to semantic values, and
//!   watches for schema drift.

pub mod cache;
pub mod client;
pub mod codegen;
pub mod config;
pub mod error;
pub mod generate;
pub mod schema;

/// Re-export of the transport crate so generated code and downstream users
/// only need a dependency on `ntx-core`.
pub use ntx_notion_sdk as sdk;
