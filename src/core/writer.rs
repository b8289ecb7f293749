use crate::utils::error::{IngestError, Result};
use std::fs;
use std::path::Path;

/// Writes a complete file, creating missing parent directories first.
///
/// Existing content is replaced, never appended to. The write is not atomic:
/// a crash between directory creation and the write can leave an empty file.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileWriter;

impl FileWriter {
    pub fn new() -> Self {
        Self
    }

    pub fn write(&self, bytes: &[u8], destination: &Path) -> Result<()> {
        if destination.as_os_str().is_empty() {
            return Err(IngestError::InvalidPath {
                path: destination.to_path_buf(),
                reason: "destination is empty".to_string(),
            });
        }

        if destination.is_dir() {
            return Err(IngestError::InvalidPath {
                path: destination.to_path_buf(),
                reason: "destination is an existing directory".to_string(),
            });
        }

        if let Some(parent) = destination.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|source| IngestError::Write {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        fs::write(destination, bytes).map_err(|source| IngestError::Write {
            path: destination.to_path_buf(),
            source,
        })?;

        tracing::debug!(
            "Wrote {} bytes to {}",
            bytes.len(),
            destination.display()
        );
        Ok(())
    }
}
