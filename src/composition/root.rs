//! The one place where implementation references become live collaborators.
//!
//! A run goes through three phases: resolve every reference and pick the
//! storage constructor shape, instantiate the collaborators, then execute.
//! Nothing is constructed until all three references resolve, so a bad
//! environment fails without side effects.

use crate::composition::reference::ImplementationReference;
use crate::composition::registry::{
    Registry, SourceFactory, StorageConfig, StorageFactory, StorageKind, TransformerFactory,
};
use crate::config::environment::Environment;
use crate::core::engine::IngestEngine;
use crate::domain::ports::{Source, StorageBackend, Transformer};
use crate::utils::error::{IngestError, Result, Stage};

pub type DynIngestEngine =
    IngestEngine<Box<dyn Source>, Box<dyn Transformer>, Box<dyn StorageBackend>>;

/// Everything needed to build the collaborators, with nothing built yet.
#[derive(Clone)]
pub struct ResolvedImplementations {
    environment: Environment,
    source: SourceFactory,
    transformer: TransformerFactory,
    storage: StorageFactory,
    storage_config: StorageConfig,
}

impl ResolvedImplementations {
    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    pub fn storage_kind(&self) -> StorageKind {
        self.storage_config.kind()
    }

    pub fn storage_config(&self) -> &StorageConfig {
        &self.storage_config
    }

    pub fn instantiate(&self, monitor_enabled: bool) -> Result<DynIngestEngine> {
        let source = (self.source)().map_err(|e| e.at_stage(Stage::Instantiate))?;
        let transformer = (self.transformer)().map_err(|e| e.at_stage(Stage::Instantiate))?;
        let storage = self
            .storage
            .build(self.storage_config.clone())
            .map_err(|e| e.at_stage(Stage::Instantiate))?;

        Ok(IngestEngine::new_with_monitoring(
            self.environment.clone(),
            source,
            transformer,
            storage,
            monitor_enabled,
        ))
    }
}

/// Looks up all three references and selects the storage constructor shape.
pub fn resolve(registry: &Registry, environment: &Environment) -> Result<ResolvedImplementations> {
    resolve_inner(registry, environment).map_err(|e| e.at_stage(Stage::Resolve))
}

fn resolve_inner(
    registry: &Registry,
    environment: &Environment,
) -> Result<ResolvedImplementations> {
    let source = registry.resolve_source(environment.source())?;
    let transformer = registry.resolve_transformer(environment.transformer())?;
    let storage = registry.resolve_storage(environment.storage())?;

    let kind = storage_kind_of(environment.storage(), &storage)?;
    let storage_config = StorageConfig::for_kind(kind, environment);

    tracing::debug!(
        "Resolved source={}, transformer={}, storage={} ({})",
        environment.source(),
        environment.transformer(),
        environment.storage(),
        kind.tag()
    );

    Ok(ResolvedImplementations {
        environment: environment.clone(),
        source,
        transformer,
        storage,
        storage_config,
    })
}

fn storage_kind_of(
    reference: &ImplementationReference,
    factory: &StorageFactory,
) -> Result<StorageKind> {
    StorageKind::from_tag(factory.storage_kind()).ok_or_else(|| {
        IngestError::UnsupportedStorageKind {
            reference: reference.to_string(),
            kind: factory.storage_kind().to_string(),
        }
    })
}

/// Runs `environment` against the bundled implementations.
pub fn run(environment: &Environment) -> Result<()> {
    run_with(&Registry::builtin(), environment)
}

pub fn run_with(registry: &Registry, environment: &Environment) -> Result<()> {
    run_with_monitoring(registry, environment, false)
}

pub fn run_with_monitoring(
    registry: &Registry,
    environment: &Environment,
    monitor_enabled: bool,
) -> Result<()> {
    let resolved = resolve(registry, environment)?;
    let engine = resolved.instantiate(monitor_enabled)?;
    engine.execute()
}
