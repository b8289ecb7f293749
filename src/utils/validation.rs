use crate::utils::error::{IngestError, Result};

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(IngestError::Validation {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(IngestError::Validation {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_relative_path(field_name: &str, path: &str) -> Result<()> {
    validate_path(field_name, path)?;

    if std::path::Path::new(path).is_absolute() {
        return Err(IngestError::Validation {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path must be relative to the volume".to_string(),
        });
    }

    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(IngestError::Validation {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

/// Namespace segments end up as directory names, so separators are not allowed.
pub fn validate_path_segment(field_name: &str, value: &str) -> Result<()> {
    validate_non_empty_string(field_name, value)?;

    if value.contains('/') || value.contains('\\') || value == "." || value == ".." {
        return Err(IngestError::Validation {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value must be a single path segment".to_string(),
        });
    }
    Ok(())
}
