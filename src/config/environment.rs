use crate::composition::reference::ImplementationReference;
use crate::composition::registry::builtin;
use crate::utils::error::{IngestError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Constructor arguments for whichever storage shape the environment selects.
///
/// `file_path` feeds a filesystem storage; the remaining fields, together
/// with [`Environment::base_namespace`], feed a namespaced-volume storage.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Destination {
    pub file_path: PathBuf,
    pub sub_namespace: String,
    pub volume: String,
    pub relative_path: PathBuf,
}

impl Default for Destination {
    fn default() -> Self {
        Self {
            file_path: PathBuf::from("output/landing_layer/frames.json"),
            sub_namespace: "default".to_string(),
            volume: "sales-reporting-gen2-temp".to_string(),
            relative_path: PathBuf::from("landing_layer/frames.json"),
        }
    }
}

/// The named bundle of implementation choices for one run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Environment {
    name: String,
    package_namespace: String,
    source: ImplementationReference,
    transformer: ImplementationReference,
    storage: ImplementationReference,
    destination: Destination,
}

impl Environment {
    pub fn new(
        name: impl Into<String>,
        package_namespace: impl Into<String>,
        source: ImplementationReference,
        transformer: ImplementationReference,
        storage: ImplementationReference,
        destination: Destination,
    ) -> Self {
        Self {
            name: name.into(),
            package_namespace: package_namespace.into(),
            source,
            transformer,
            storage,
            destination,
        }
    }

    /// Local development: canned GraphQL source, pass-through parsing, files under `./output`.
    pub fn default_environment() -> Self {
        Self::new(
            "dev",
            "frame_ingest",
            builtin::graphql_frame_service(),
            builtin::as_is_parser(),
            builtin::filesystem_storage(),
            Destination::default(),
        )
    }

    /// Production: frames parsed into domain shape and written to a namespaced volume.
    pub fn production_environment() -> Self {
        Self::new(
            "prod",
            "frame_ingest",
            builtin::graphql_frame_service(),
            builtin::frame_parser(),
            builtin::namespaced_volume_storage(),
            Destination {
                file_path: PathBuf::from(
                    "/Volumes/prod_catalog_base/default/sales-reporting-gen2/landing_layer/frames.json",
                ),
                sub_namespace: "default".to_string(),
                volume: "sales-reporting-gen2".to_string(),
                relative_path: PathBuf::from("landing_layer/frames.json"),
            },
        )
    }

    /// Looks up one of the built-in environments by name or alias.
    pub fn named(name: &str) -> Result<Self> {
        match name {
            "default" | "dev" => Ok(Self::default_environment()),
            "production" | "prod" => Ok(Self::production_environment()),
            other => Err(IngestError::Config {
                message: format!(
                    "Unknown environment '{}'. Known environments: default, production",
                    other
                ),
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn package_namespace(&self) -> &str {
        &self.package_namespace
    }

    pub fn source(&self) -> &ImplementationReference {
        &self.source
    }

    pub fn transformer(&self) -> &ImplementationReference {
        &self.transformer
    }

    pub fn storage(&self) -> &ImplementationReference {
        &self.storage
    }

    pub fn destination(&self) -> &Destination {
        &self.destination
    }

    /// Top-level storage namespace, derived from the environment name.
    pub fn base_namespace(&self) -> String {
        format!("{}_catalog_base", self.name)
    }

    pub fn with_source(self, source: ImplementationReference) -> Self {
        Self { source, ..self }
    }

    pub fn with_transformer(self, transformer: ImplementationReference) -> Self {
        Self {
            transformer,
            ..self
        }
    }

    pub fn with_storage(self, storage: ImplementationReference) -> Self {
        Self { storage, ..self }
    }

    pub fn with_destination(self, destination: Destination) -> Self {
        Self {
            destination,
            ..self
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Environment(name={}, package_namespace={}, source={}, transformer={}, storage={}, base_namespace={})",
            self.name,
            self.package_namespace,
            self.source,
            self.transformer,
            self.storage,
            self.base_namespace()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factories_are_deterministic() {
        assert_eq!(
            Environment::default_environment(),
            Environment::default_environment()
        );
        assert_eq!(
            Environment::production_environment(),
            Environment::production_environment()
        );
        assert_ne!(
            Environment::default_environment(),
            Environment::production_environment()
        );
    }

    #[test]
    fn test_default_environment_uses_local_implementations() {
        let env = Environment::default_environment();

        assert_eq!(env.name(), "dev");
        assert_eq!(
            env.source().to_string(),
            "frame_ingest.adapters.source.GraphQlFrameService"
        );
        assert_eq!(
            env.transformer().to_string(),
            "frame_ingest.adapters.parser.AsIsParser"
        );
        assert_eq!(
            env.storage().to_string(),
            "frame_ingest.adapters.storage.FilesystemStorage"
        );
        assert_eq!(env.base_namespace(), "dev_catalog_base");
    }

    #[test]
    fn test_production_environment_uses_namespaced_volume() {
        let env = Environment::production_environment();

        assert_eq!(env.storage().name(), "NamespacedVolumeStorage");
        assert_eq!(env.base_namespace(), "prod_catalog_base");
    }

    #[test]
    fn test_named_lookup() {
        assert_eq!(
            Environment::named("default").unwrap(),
            Environment::default_environment()
        );
        assert_eq!(
            Environment::named("prod").unwrap(),
            Environment::production_environment()
        );
        assert!(matches!(
            Environment::named("staging"),
            Err(IngestError::Config { .. })
        ));
    }

    #[test]
    fn test_with_destination_leaves_original_untouched() {
        let original = Environment::default_environment();
        let changed = original.clone().with_destination(Destination {
            file_path: PathBuf::from("/tmp/elsewhere.json"),
            ..Destination::default()
        });

        assert_ne!(original, changed);
        assert_eq!(original, Environment::default_environment());
    }
}
