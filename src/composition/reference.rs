use crate::utils::error::{IngestError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Dot-separated name of a swappable implementation, e.g.
/// `frame_ingest.adapters.storage.FilesystemStorage`.
///
/// The part after the last dot is the type name; everything before it is the
/// namespace. A reference only names an implementation; [`Registry`] turns it
/// into a constructor.
///
/// [`Registry`]: crate::composition::registry::Registry
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ImplementationReference {
    namespace: String,
    name: String,
}

impl ImplementationReference {
    pub fn from_string(qualified_name: &str) -> Result<Self> {
        let malformed = |reason: &str| IngestError::MalformedReference {
            reference: qualified_name.to_string(),
            reason: reason.to_string(),
        };

        if qualified_name.is_empty() {
            return Err(malformed("reference is empty"));
        }
        if qualified_name.chars().any(char::is_whitespace) {
            return Err(malformed("reference contains whitespace"));
        }

        let (namespace, name) = qualified_name
            .rsplit_once('.')
            .ok_or_else(|| malformed("expected '<namespace>.<TypeName>'"))?;

        if namespace.split('.').any(str::is_empty) || name.is_empty() {
            return Err(malformed("reference contains an empty segment"));
        }

        Ok(Self::from_parts(namespace, name))
    }

    /// Builds a reference from parts already known to be well formed.
    pub(crate) fn from_parts(namespace: &str, name: &str) -> Self {
        Self {
            namespace: namespace.to_string(),
            name: name.to_string(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for ImplementationReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.namespace, self.name)
    }
}

impl FromStr for ImplementationReference {
    type Err = IngestError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_string(s)
    }
}

impl TryFrom<String> for ImplementationReference {
    type Error = IngestError;

    fn try_from(value: String) -> Result<Self> {
        Self::from_string(&value)
    }
}

impl From<ImplementationReference> for String {
    fn from(reference: ImplementationReference) -> Self {
        reference.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        for qualified_name in [
            "frame_ingest.adapters.source.GraphQlFrameService",
            "a.B",
            "deeply.nested.name.space.Type",
        ] {
            let reference = ImplementationReference::from_string(qualified_name).unwrap();
            assert_eq!(reference.to_string(), qualified_name);
        }
    }

    #[test]
    fn test_splits_on_last_separator() {
        let reference: ImplementationReference =
            "frame_ingest.adapters.parser.AsIsParser".parse().unwrap();

        assert_eq!(reference.namespace(), "frame_ingest.adapters.parser");
        assert_eq!(reference.name(), "AsIsParser");
    }

    #[test]
    fn test_rejects_malformed_references() {
        for qualified_name in ["", "NoSeparator", ".Leading", "Trailing.", "a..B", "a. B"] {
            let err = ImplementationReference::from_string(qualified_name).unwrap_err();
            assert!(
                matches!(err, IngestError::MalformedReference { .. }),
                "{qualified_name:?} should be malformed"
            );
        }
    }

    #[test]
    fn test_equal_strings_give_equal_references() {
        let first = ImplementationReference::from_string("x.y.Z").unwrap();
        let second = ImplementationReference::from_string("x.y.Z").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_deserializes_from_plain_string() {
        let reference: ImplementationReference =
            serde_json::from_str("\"frame_ingest.adapters.storage.FilesystemStorage\"").unwrap();
        assert_eq!(reference.name(), "FilesystemStorage");

        let err = serde_json::from_str::<ImplementationReference>("\"NoSeparator\"");
        assert!(err.is_err());
    }
}
