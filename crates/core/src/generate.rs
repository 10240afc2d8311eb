//! Generation orchestration: full and incremental passes.
//!
//! Entities are processed strictly one at a time; the only suspension
//! points are the awaited schema fetches and file writes. Per-entity
//! failures never abort a full pass — the failing entity is excluded and
//! reported, and only a pass that produces nothing at all is an error.

use crate::cache::{self, EntityMeta};
use crate::client::SchemaSnapshot;
use crate::codegen::{EntityIdentity, Printer, build_snapshot, render_module};
use crate::config::Config;
use crate::error::{ConfigError, GenerateError};
use crate::schema::{descriptors_in_order, mapper};
use crate::sdk::NotionClient;

/// Everything synthesized for one entity, before any IO.
#[derive(Debug)]
pub struct GeneratedEntity {
    /// Persisted metadata.
    pub meta: EntityMeta,
    /// Module (and file) name.
    pub module_name: String,
    /// Rendered module source.
    pub source: String,
    /// Directly loadable schema snapshot.
    pub snapshot: SchemaSnapshot,
}

/// One entity that failed during a batch pass.
#[derive(Debug)]
pub struct FailedEntity {
    /// The configured database identifier.
    pub id: String,
    /// What went wrong.
    pub error: GenerateError,
}

/// Result of a full pass: the reduced set of successes plus the failures.
#[derive(Debug)]
pub struct GenerateOutcome {
    /// Entities generated successfully, in config order.
    pub generated: Vec<EntityMeta>,
    /// Entities excluded from the output set.
    pub failed: Vec<FailedEntity>,
}

/// Fetch one schema and synthesize its module and snapshot. Pure apart
/// from the fetch; nothing is written.
pub async fn build_entity(
    sdk: &NotionClient,
    database_id: &str,
) -> Result<GeneratedEntity, GenerateError> {
    let database = sdk.retrieve_database(database_id).await?;
    let display_name = database.display_name();
    let descriptors = descriptors_in_order(&database);
    let properties =
        mapper::map_properties(&descriptors).map_err(|source| GenerateError::Mapping {
            entity: display_name.clone(),
            source,
        })?;
    let identity = EntityIdentity::derive(&database.id, &display_name);
    Ok(GeneratedEntity {
        meta: identity.meta(),
        module_name: identity.module_name.clone(),
        source: render_module(&identity, &properties),
        snapshot: build_snapshot(&identity, &properties),
    })
}

/// Full pass: recreate the output directory and regenerate every
/// configured database.
pub async fn generate_all(
    config: &Config,
    sdk: &NotionClient,
) -> Result<GenerateOutcome, GenerateError> {
    if config.databases.is_empty() {
        return Err(ConfigError::NoDatabases.into());
    }
    let printer = Printer::new(config.output_dir());
    printer.clean()?;

    let mut generated = Vec::new();
    let mut failed = Vec::new();
    for id in &config.databases {
        match generate_into(&printer, sdk, id).await {
            Ok(meta) => {
                tracing::info!(database = %id, class = %meta.class_name, "generated entity");
                generated.push(meta);
            }
            Err(error) => {
                tracing::warn!(database = %id, %error, "skipping database; generation failed");
                failed.push(FailedEntity {
                    id: id.clone(),
                    error,
                });
            }
        }
    }

    if generated.is_empty() {
        return Err(GenerateError::NothingGenerated);
    }
    printer.write_registry(&generated)?;
    // The cache is rebuilt from the fresh set only; stale entries drop out.
    cache::write_cache(&printer.cache_path(), &generated)?;
    Ok(GenerateOutcome { generated, failed })
}

/// Incremental pass: regenerate a single database and merge it into the
/// cache and registry without touching other entities' files.
pub async fn generate_one(
    config: &Config,
    sdk: &NotionClient,
    database_id: &str,
) -> Result<EntityMeta, GenerateError> {
    let entity = build_entity(sdk, database_id).await?;
    install_entity(config, &entity)
}

/// Write an already-synthesized entity and fold it into the cache and
/// registry. The incremental half of [`generate_one`], split out so callers
/// that built the entity themselves can reuse it.
pub fn install_entity(
    config: &Config,
    entity: &GeneratedEntity,
) -> Result<EntityMeta, GenerateError> {
    let printer = Printer::new(config.output_dir());
    printer.ensure_dir()?;
    printer.write_entity(&entity.module_name, &entity.source, &entity.snapshot)?;

    let cached = cache::read_cache(&printer.cache_path());
    let merged = cache::merge_incremental(cached, &config.databases, entity.meta.clone());
    cache::write_cache(&printer.cache_path(), &merged)?;
    printer.write_registry(&merged)?;
    Ok(entity.meta.clone())
}

async fn generate_into(
    printer: &Printer,
    sdk: &NotionClient,
    database_id: &str,
) -> Result<EntityMeta, GenerateError> {
    let entity = build_entity(sdk, database_id).await?;
    printer.write_entity(&entity.module_name, &entity.source, &entity.snapshot)?;
    Ok(entity.meta)
}
