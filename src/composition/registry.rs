use crate::adapters::parser::{AsIsParser, FrameParser};
use crate::adapters::source::{GraphQlFrameService, RestFrameService};
use crate::adapters::storage::{FilesystemStorage, NamespacedVolumeStorage};
use crate::composition::reference::ImplementationReference;
use crate::config::environment::Environment;
use crate::domain::ports::{Source, StorageBackend, StorageDescriptor, Transformer};
use crate::utils::error::{Capability, IngestError, Result};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

pub type SourceFactory = Arc<dyn Fn() -> Result<Box<dyn Source>> + Send + Sync>;
pub type TransformerFactory = Arc<dyn Fn() -> Result<Box<dyn Transformer>> + Send + Sync>;
pub type StorageConstructor =
    Arc<dyn Fn(StorageConfig) -> Result<Box<dyn StorageBackend>> + Send + Sync>;

/// The constructor shapes a storage implementation can ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKind {
    Filesystem,
    NamespacedVolume,
}

impl StorageKind {
    pub fn from_tag(tag: &str) -> Option<Self> {
        [StorageKind::Filesystem, StorageKind::NamespacedVolume]
            .into_iter()
            .find(|kind| kind.tag() == tag)
    }

    pub fn tag(&self) -> &'static str {
        match self {
            StorageKind::Filesystem => FilesystemStorage::STORAGE_KIND,
            StorageKind::NamespacedVolume => NamespacedVolumeStorage::STORAGE_KIND,
        }
    }
}

/// Constructor arguments, one variant per [`StorageKind`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageConfig {
    Filesystem {
        path: PathBuf,
    },
    NamespacedVolume {
        namespace: String,
        sub_namespace: String,
        volume: String,
        relative_path: PathBuf,
    },
}

impl StorageConfig {
    /// Picks the arguments `kind` needs out of the environment's destination.
    pub fn for_kind(kind: StorageKind, environment: &Environment) -> Self {
        let destination = environment.destination();
        match kind {
            StorageKind::Filesystem => StorageConfig::Filesystem {
                path: destination.file_path.clone(),
            },
            StorageKind::NamespacedVolume => StorageConfig::NamespacedVolume {
                namespace: environment.base_namespace(),
                sub_namespace: destination.sub_namespace.clone(),
                volume: destination.volume.clone(),
                relative_path: destination.relative_path.clone(),
            },
        }
    }

    pub fn kind(&self) -> StorageKind {
        match self {
            StorageConfig::Filesystem { .. } => StorageKind::Filesystem,
            StorageConfig::NamespacedVolume { .. } => StorageKind::NamespacedVolume,
        }
    }
}

impl fmt::Display for StorageConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageConfig::Filesystem { path } => write!(f, "filesystem path {}", path.display()),
            StorageConfig::NamespacedVolume {
                namespace,
                sub_namespace,
                volume,
                relative_path,
            } => write!(
                f,
                "volume {}/{}/{} file {}",
                namespace,
                sub_namespace,
                volume,
                relative_path.display()
            ),
        }
    }
}

/// A storage constructor plus the capability tag it was registered with.
#[derive(Clone)]
pub struct StorageFactory {
    storage_kind: &'static str,
    construct: StorageConstructor,
}

impl StorageFactory {
    pub fn new<F>(storage_kind: &'static str, construct: F) -> Self
    where
        F: Fn(StorageConfig) -> Result<Box<dyn StorageBackend>> + Send + Sync + 'static,
    {
        Self {
            storage_kind,
            construct: Arc::new(construct),
        }
    }

    /// Registers a storage type under its own `STORAGE_KIND`.
    pub fn of<T, F>(construct: F) -> Self
    where
        T: StorageDescriptor,
        F: Fn(StorageConfig) -> Result<Box<dyn StorageBackend>> + Send + Sync + 'static,
    {
        Self::new(T::STORAGE_KIND, construct)
    }

    pub fn storage_kind(&self) -> &'static str {
        self.storage_kind
    }

    pub fn build(&self, config: StorageConfig) -> Result<Box<dyn StorageBackend>> {
        (self.construct)(config)
    }
}

impl fmt::Debug for StorageFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageFactory")
            .field("storage_kind", &self.storage_kind)
            .finish_non_exhaustive()
    }
}

/// Maps implementation references onto constructors, one table per capability.
///
/// Populated once at start-up; resolving a reference never builds anything.
#[derive(Clone, Default)]
pub struct Registry {
    sources: BTreeMap<ImplementationReference, SourceFactory>,
    transformers: BTreeMap<ImplementationReference, TransformerFactory>,
    storages: BTreeMap<ImplementationReference, StorageFactory>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every implementation bundled with this crate.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry
            .register_source(builtin::graphql_frame_service(), || {
                Ok(Box::new(GraphQlFrameService::new()))
            })
            .register_source(builtin::rest_frame_service(), || {
                Ok(Box::new(RestFrameService::new()))
            })
            .register_transformer(builtin::as_is_parser(), || Ok(Box::new(AsIsParser::new())))
            .register_transformer(builtin::frame_parser(), || {
                Ok(Box::new(FrameParser::new()))
            })
            .register_storage(
                builtin::filesystem_storage(),
                StorageFactory::of::<FilesystemStorage, _>(|config| match config {
                    StorageConfig::Filesystem { path } => {
                        Ok(Box::new(FilesystemStorage::new(path)))
                    }
                    other => Err(shape_mismatch(FilesystemStorage::STORAGE_KIND, &other)),
                }),
            )
            .register_storage(
                builtin::namespaced_volume_storage(),
                StorageFactory::of::<NamespacedVolumeStorage, _>(|config| match config {
                    StorageConfig::NamespacedVolume {
                        namespace,
                        sub_namespace,
                        volume,
                        relative_path,
                    } => Ok(Box::new(NamespacedVolumeStorage::new(
                        namespace,
                        sub_namespace,
                        volume,
                        relative_path,
                    )?)),
                    other => Err(shape_mismatch(NamespacedVolumeStorage::STORAGE_KIND, &other)),
                }),
            );
        registry
    }

    pub fn register_source<F>(
        &mut self,
        reference: ImplementationReference,
        factory: F,
    ) -> &mut Self
    where
        F: Fn() -> Result<Box<dyn Source>> + Send + Sync + 'static,
    {
        self.sources.insert(reference, Arc::new(factory));
        self
    }

    pub fn register_transformer<F>(
        &mut self,
        reference: ImplementationReference,
        factory: F,
    ) -> &mut Self
    where
        F: Fn() -> Result<Box<dyn Transformer>> + Send + Sync + 'static,
    {
        self.transformers.insert(reference, Arc::new(factory));
        self
    }

    pub fn register_storage(
        &mut self,
        reference: ImplementationReference,
        factory: StorageFactory,
    ) -> &mut Self {
        self.storages.insert(reference, factory);
        self
    }

    pub fn resolve_source(&self, reference: &ImplementationReference) -> Result<SourceFactory> {
        self.sources
            .get(reference)
            .cloned()
            .ok_or_else(|| not_registered(Capability::Source, reference))
    }

    pub fn resolve_transformer(
        &self,
        reference: &ImplementationReference,
    ) -> Result<TransformerFactory> {
        self.transformers
            .get(reference)
            .cloned()
            .ok_or_else(|| not_registered(Capability::Transformer, reference))
    }

    pub fn resolve_storage(&self, reference: &ImplementationReference) -> Result<StorageFactory> {
        self.storages
            .get(reference)
            .cloned()
            .ok_or_else(|| not_registered(Capability::Storage, reference))
    }

    pub fn sources(&self) -> impl Iterator<Item = &ImplementationReference> {
        self.sources.keys()
    }

    pub fn transformers(&self) -> impl Iterator<Item = &ImplementationReference> {
        self.transformers.keys()
    }

    /// Storage references with their capability tags.
    pub fn storages(&self) -> impl Iterator<Item = (&ImplementationReference, &'static str)> {
        self.storages
            .iter()
            .map(|(reference, factory)| (reference, factory.storage_kind()))
    }
}

fn not_registered(capability: Capability, reference: &ImplementationReference) -> IngestError {
    IngestError::Resolution {
        capability,
        reference: reference.to_string(),
    }
}

fn shape_mismatch(expected: &str, config: &StorageConfig) -> IngestError {
    IngestError::Config {
        message: format!(
            "{} storage cannot be built from {} arguments",
            expected,
            config.kind().tag()
        ),
    }
}

/// Qualified names of the bundled implementations.
pub mod builtin {
    use crate::composition::reference::ImplementationReference;

    pub const SOURCE_NAMESPACE: &str = "frame_ingest.adapters.source";
    pub const PARSER_NAMESPACE: &str = "frame_ingest.adapters.parser";
    pub const STORAGE_NAMESPACE: &str = "frame_ingest.adapters.storage";

    pub fn graphql_frame_service() -> ImplementationReference {
        ImplementationReference::from_parts(SOURCE_NAMESPACE, "GraphQlFrameService")
    }

    pub fn rest_frame_service() -> ImplementationReference {
        ImplementationReference::from_parts(SOURCE_NAMESPACE, "RestFrameService")
    }

    pub fn as_is_parser() -> ImplementationReference {
        ImplementationReference::from_parts(PARSER_NAMESPACE, "AsIsParser")
    }

    pub fn frame_parser() -> ImplementationReference {
        ImplementationReference::from_parts(PARSER_NAMESPACE, "FrameParser")
    }

    pub fn filesystem_storage() -> ImplementationReference {
        ImplementationReference::from_parts(STORAGE_NAMESPACE, "FilesystemStorage")
    }

    pub fn namespaced_volume_storage() -> ImplementationReference {
        ImplementationReference::from_parts(STORAGE_NAMESPACE, "NamespacedVolumeStorage")
    }
}
