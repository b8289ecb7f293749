use crate::composition::reference::ImplementationReference;
use crate::config::environment::{Destination, Environment};
use crate::utils::error::{IngestError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_path, validate_path_segment, validate_relative_path,
    Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// An environment described in TOML:
///
/// ```toml
/// [environment]
/// name = "prod"
/// package_namespace = "frame_ingest"
///
/// [implementations]
/// source = "frame_ingest.adapters.source.GraphQlFrameService"
/// transformer = "frame_ingest.adapters.parser.FrameParser"
/// storage = "frame_ingest.adapters.storage.NamespacedVolumeStorage"
///
/// [destination]
/// relative_path = "landing_layer/frames.json"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvironmentFile {
    pub environment: EnvironmentSection,
    pub implementations: ImplementationsSection,
    pub destination: Option<DestinationSection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvironmentSection {
    pub name: String,
    pub package_namespace: Option<String>,
}

/// Kept as plain strings so malformed names surface as reference errors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImplementationsSection {
    pub source: String,
    pub transformer: String,
    pub storage: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DestinationSection {
    pub file_path: Option<String>,
    pub sub_namespace: Option<String>,
    pub volume: Option<String>,
    pub relative_path: Option<String>,
}

impl EnvironmentFile {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(|e| IngestError::Config {
            message: format!(
                "Cannot read environment file '{}': {}",
                path.as_ref().display(),
                e
            ),
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;
        Ok(toml::from_str(&processed_content)?)
    }

    /// Replaces `${VAR}` with the value of the environment variable; unknown
    /// variables are left as written.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| IngestError::Config {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validate_path_segment("environment.name", &self.environment.name)?;
        if let Some(package_namespace) = &self.environment.package_namespace {
            validate_non_empty_string("environment.package_namespace", package_namespace)?;
        }

        if let Some(destination) = &self.destination {
            if let Some(file_path) = &destination.file_path {
                validate_path("destination.file_path", file_path)?;
            }
            if let Some(sub_namespace) = &destination.sub_namespace {
                validate_path_segment("destination.sub_namespace", sub_namespace)?;
            }
            if let Some(volume) = &destination.volume {
                validate_path_segment("destination.volume", volume)?;
            }
            if let Some(relative_path) = &destination.relative_path {
                validate_relative_path("destination.relative_path", relative_path)?;
            }
        }

        Ok(())
    }

    /// Validates the file and builds the environment it describes.
    ///
    /// Destination fields that are not given fall back to the defaults of
    /// the local development environment.
    pub fn into_environment(self) -> Result<Environment> {
        self.validate_config()?;

        let defaults = Destination::default();
        let section = self.destination.unwrap_or_default();
        let destination = Destination {
            file_path: section
                .file_path
                .map(Into::into)
                .unwrap_or(defaults.file_path),
            sub_namespace: section.sub_namespace.unwrap_or(defaults.sub_namespace),
            volume: section.volume.unwrap_or(defaults.volume),
            relative_path: section
                .relative_path
                .map(Into::into)
                .unwrap_or(defaults.relative_path),
        };

        Ok(Environment::new(
            self.environment.name,
            self.environment
                .package_namespace
                .unwrap_or_else(|| "frame_ingest".to_string()),
            ImplementationReference::from_string(&self.implementations.source)?,
            ImplementationReference::from_string(&self.implementations.transformer)?,
            ImplementationReference::from_string(&self.implementations.storage)?,
            destination,
        ))
    }
}

impl Validate for EnvironmentFile {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;
    use tempfile::NamedTempFile;

    const PRODUCTION_TOML: &str = r#"
[environment]
name = "prod"
package_namespace = "frame_ingest"

[implementations]
source = "frame_ingest.adapters.source.GraphQlFrameService"
transformer = "frame_ingest.adapters.parser.FrameParser"
storage = "frame_ingest.adapters.storage.NamespacedVolumeStorage"

[destination]
sub_namespace = "default"
volume = "sales-reporting-gen2"
relative_path = "landing_layer/frames.json"
"#;

    #[test]
    fn test_parse_environment_file() {
        let env = EnvironmentFile::from_toml_str(PRODUCTION_TOML)
            .unwrap()
            .into_environment()
            .unwrap();

        assert_eq!(env.name(), "prod");
        assert_eq!(env.storage().name(), "NamespacedVolumeStorage");
        assert_eq!(env.destination().volume, "sales-reporting-gen2");
        // not given in the file
        assert_eq!(env.destination().file_path, Destination::default().file_path);
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("FRAME_INGEST_TEST_OUTPUT", "/tmp/frames/out.json");

        let toml_content = r#"
[environment]
name = "dev"

[implementations]
source = "frame_ingest.adapters.source.RestFrameService"
transformer = "frame_ingest.adapters.parser.AsIsParser"
storage = "frame_ingest.adapters.storage.FilesystemStorage"

[destination]
file_path = "${FRAME_INGEST_TEST_OUTPUT}"
"#;

        let env = EnvironmentFile::from_toml_str(toml_content)
            .unwrap()
            .into_environment()
            .unwrap();
        assert_eq!(
            env.destination().file_path,
            PathBuf::from("/tmp/frames/out.json")
        );
        assert_eq!(env.package_namespace(), "frame_ingest");

        std::env::remove_var("FRAME_INGEST_TEST_OUTPUT");
    }

    #[test]
    fn test_unknown_variable_is_left_in_place() {
        let substituted = EnvironmentFile::substitute_env_vars(
            "path = \"${FRAME_INGEST_SURELY_UNSET}\"",
        )
        .unwrap();
        assert_eq!(substituted, "path = \"${FRAME_INGEST_SURELY_UNSET}\"");
    }

    #[test]
    fn test_malformed_reference_is_reported() {
        let toml_content = PRODUCTION_TOML.replace(
            "frame_ingest.adapters.parser.FrameParser",
            "FrameParser",
        );

        let err = EnvironmentFile::from_toml_str(&toml_content)
            .unwrap()
            .into_environment()
            .unwrap_err();

        assert!(matches!(err, IngestError::MalformedReference { .. }));
    }

    #[test]
    fn test_absolute_relative_path_fails_validation() {
        let toml_content =
            PRODUCTION_TOML.replace("landing_layer/frames.json", "/landing_layer/frames.json");

        let file = EnvironmentFile::from_toml_str(&toml_content).unwrap();

        assert!(matches!(
            file.validate(),
            Err(IngestError::Validation { .. })
        ));
    }

    #[test]
    fn test_environment_name_must_stay_inside_the_mount() {
        for name in ["../x", "../../tmp/escape", "prod/extra"] {
            let toml_content =
                PRODUCTION_TOML.replace("name = \"prod\"", &format!("name = \"{}\"", name));

            let err = EnvironmentFile::from_toml_str(&toml_content)
                .unwrap()
                .into_environment()
                .unwrap_err();

            let rejected_name = matches!(
                &err,
                IngestError::Validation { field, .. } if field == "environment.name"
            );
            assert!(
                rejected_name,
                "{} was accepted: {:?}",
                name,
                err
            );
        }
    }

    #[test]
    fn test_missing_section_is_a_config_error() {
        let err = EnvironmentFile::from_toml_str("[environment]\nname = \"dev\"\n").unwrap_err();
        assert!(matches!(err, IngestError::Config { .. }));
    }

    #[test]
    fn test_environment_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(PRODUCTION_TOML.as_bytes()).unwrap();

        let file = EnvironmentFile::from_file(temp_file.path()).unwrap();

        assert_eq!(file.environment.name, "prod");
    }
}
