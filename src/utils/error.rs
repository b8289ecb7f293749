use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Boxed error raised by a third-party collaborator.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The step of a run that produced an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Resolve,
    Instantiate,
    Fetch,
    Transform,
    Persist,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Resolve => "resolve",
            Stage::Instantiate => "instantiate",
            Stage::Fetch => "fetch",
            Stage::Transform => "transform",
            Stage::Persist => "persist",
        };
        f.write_str(name)
    }
}

/// The collaborator role a reference was resolved for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    Source,
    Transformer,
    Storage,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Capability::Source => "source",
            Capability::Transformer => "transformer",
            Capability::Storage => "storage",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("Malformed implementation reference '{reference}': {reason}")]
    MalformedReference { reference: String, reason: String },

    #[error("No {capability} implementation registered as '{reference}'")]
    Resolution {
        capability: Capability,
        reference: String,
    },

    #[error("Storage implementation '{reference}' declares unsupported storage kind '{kind}'")]
    UnsupportedStorageKind { reference: String, kind: String },

    #[error("Unsupported value type: {kind}")]
    UnsupportedValueType { kind: String },

    #[error("Invalid path '{}': {reason}", .path.display())]
    InvalidPath { path: PathBuf, reason: String },

    #[error("Failed to write '{}': {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    Validation {
        field: String,
        value: String,
        reason: String,
    },

    #[error("{0}")]
    Collaborator(#[source] BoxError),

    #[error("{stage} stage failed: {source}")]
    Stage {
        stage: Stage,
        #[source]
        source: Box<IngestError>,
    },
}

impl IngestError {
    /// Wrap an error raised by an external collaborator without altering it.
    pub fn collaborator<E>(error: E) -> Self
    where
        E: Into<BoxError>,
    {
        IngestError::Collaborator(error.into())
    }

    pub fn at_stage(self, stage: Stage) -> Self {
        IngestError::Stage {
            stage,
            source: Box::new(self),
        }
    }

    /// The stage a run failed in, if this error came out of a run.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            IngestError::Stage { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    /// The innermost error beneath any stage wrappers.
    pub fn root(&self) -> &IngestError {
        let mut current = self;
        while let IngestError::Stage { source, .. } = current {
            current = source;
        }
        current
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.root() {
            IngestError::Write { .. } => ErrorSeverity::Critical,
            IngestError::Collaborator(_) => ErrorSeverity::Medium,
            IngestError::MalformedReference { .. }
            | IngestError::Resolution { .. }
            | IngestError::UnsupportedStorageKind { .. }
            | IngestError::UnsupportedValueType { .. }
            | IngestError::InvalidPath { .. }
            | IngestError::Config { .. }
            | IngestError::Validation { .. } => ErrorSeverity::High,
            IngestError::Stage { .. } => ErrorSeverity::High,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.root() {
            IngestError::MalformedReference { .. } => {
                "Use a dot-separated name such as 'package.module.TypeName'"
            }
            IngestError::Resolution { .. } => {
                "Run with --list to see the registered implementations"
            }
            IngestError::UnsupportedStorageKind { .. } => {
                "Register the storage as 'filesystem' or 'namespaced-volume'"
            }
            IngestError::UnsupportedValueType { .. } => {
                "Make the transformer emit text, bytes, numbers, dates or JSON-like structures"
            }
            IngestError::InvalidPath { .. } => "Check the destination settings of the environment",
            IngestError::Write { .. } => {
                "Check that the destination is writable and the device has free space"
            }
            IngestError::Config { .. } | IngestError::Validation { .. } => {
                "Fix the environment file and try again"
            }
            IngestError::Collaborator(_) => "Inspect the source or transformer and retry",
            IngestError::Stage { .. } => "Inspect the error details",
        }
    }
}

impl From<toml::de::Error> for IngestError {
    fn from(error: toml::de::Error) -> Self {
        IngestError::Config {
            message: format!("TOML parsing error: {}", error),
        }
    }
}

pub type Result<T> = std::result::Result<T, IngestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_unwraps_nested_stages() {
        let error = IngestError::UnsupportedValueType {
            kind: "null".to_string(),
        }
        .at_stage(Stage::Persist);

        assert_eq!(error.stage(), Some(Stage::Persist));
        assert!(matches!(
            error.root(),
            IngestError::UnsupportedValueType { .. }
        ));
        assert_eq!(
            error.to_string(),
            "persist stage failed: Unsupported value type: null"
        );
    }

    #[test]
    fn test_write_errors_are_critical() {
        let error = IngestError::Write {
            path: PathBuf::from("/tmp/out.json"),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        }
        .at_stage(Stage::Persist);

        assert_eq!(error.severity(), ErrorSeverity::Critical);
    }

    #[test]
    fn test_collaborator_error_is_preserved() {
        let error = IngestError::collaborator("upstream timed out");

        assert_eq!(error.to_string(), "upstream timed out");
        assert_eq!(error.severity(), ErrorSeverity::Medium);
    }
}
