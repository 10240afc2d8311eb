//! Typed error taxonomy for the core engine.
//!
//! Lower layers return these; the CLI decides what is fatal and what is a
//! warning, per the batch policy in [`crate::generate`].

use std::path::PathBuf;

use thiserror::Error;

use crate::sdk::SdkError;

/// Failure while resolving or loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file does not exist.
    #[error("no config file found at {path}; run `ntx init` to create one")]
    NotFound {
        /// Probed path.
        path: PathBuf,
    },

    /// The config file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// Config path.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid TOML or has the wrong shape.
    #[error("failed to parse {path}: {source}")]
    Parse {
        /// Config path.
        path: PathBuf,
        /// Underlying TOML error.
        #[source]
        source: toml::de::Error,
    },

    /// No auth credential is available.
    #[error("no auth token configured; set `token` in ntx.toml or export NTX_TOKEN")]
    MissingToken,

    /// The identifier list is empty.
    #[error("no databases configured; add one with `ntx add <database-id>`")]
    NoDatabases,
}

/// Failure of one config source patch strategy.
#[derive(Debug, Error)]
pub enum PatchError {
    /// The strategy found no recognized `databases` array to patch. The
    /// caller falls through to the next strategy.
    #[error("no recognized `databases` array in config source")]
    NoMatch,

    /// The source text is not parseable at all.
    #[error("config source is not valid TOML: {0}")]
    Unparseable(String),
}

/// Failure while mapping a schema's properties to semantic columns.
#[derive(Debug, Error)]
pub enum MapError {
    /// Two remote property names normalize to the same semantic name.
    #[error(
        "properties `{first}` and `{second}` both normalize to `{name}`; \
         rename one of them remotely"
    )]
    NameCollision {
        /// First remote property name.
        first: String,
        /// Second remote property name.
        second: String,
        /// The shared semantic name.
        name: String,
    },
}

/// Failure at query/mutation time inside an entity client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// A filter, sort, or mutation referenced a name outside the column
    /// mapping. Programmer error; failing fast beats a malformed wire call.
    #[error("unknown column `{column}`; not part of this entity's column mapping")]
    UnknownColumn {
        /// The unresolvable semantic name.
        column: String,
    },

    /// A mutation value does not fit the column's kind.
    #[error("invalid value for column `{column}`: expected {expected}")]
    InvalidValue {
        /// The semantic column name.
        column: String,
        /// What the kind accepts.
        expected: &'static str,
    },

    /// A schema snapshot could not be decoded.
    #[error("invalid schema snapshot: {0}")]
    Snapshot(#[from] serde_json::Error),

    /// The remote call failed.
    #[error(transparent)]
    Sdk(#[from] SdkError),
}

/// Failure while generating one entity or orchestrating a pass.
#[derive(Debug, Error)]
pub enum GenerateError {
    /// Configuration precondition failed.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The schema fetch failed.
    #[error(transparent)]
    Sdk(#[from] SdkError),

    /// Property mapping failed for this entity.
    #[error("cannot generate `{entity}`: {source}")]
    Mapping {
        /// Database identifier or display name.
        entity: String,
        /// Underlying mapping error.
        #[source]
        source: MapError,
    },

    /// A filesystem write failed.
    #[error("failed to write {path}: {source}")]
    Io {
        /// Target path.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// A full pass completed without a single successful entity.
    #[error("generation produced no modules; every configured database failed")]
    NothingGenerated,
}
