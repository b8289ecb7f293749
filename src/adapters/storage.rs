use crate::core::encoder::ByteEncoder;
use crate::core::writer::FileWriter;
use crate::domain::model::Payload;
use crate::domain::ports::{StorageBackend, StorageDescriptor};
use crate::utils::error::{IngestError, Result};
use std::path::{Path, PathBuf};

/// Where namespaced volumes are mounted.
pub const VOLUME_MOUNT_ROOT: &str = "/Volumes";

fn save_to_file(value: &Payload, destination: &Path) -> Result<()> {
    let bytes = ByteEncoder::new().encode(value)?;
    FileWriter::new().write(&bytes, destination)?;
    tracing::info!("Data written into file: {}", destination.display());
    Ok(())
}

/// Storage on a local or network-mounted filesystem path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilesystemStorage {
    file_path: PathBuf,
}

impl FilesystemStorage {
    pub fn new(file_path: impl Into<PathBuf>) -> Self {
        Self {
            file_path: file_path.into(),
        }
    }

    /// The absolute destination; relative paths resolve against the working directory.
    pub fn destination(&self) -> Result<PathBuf> {
        if self.file_path.as_os_str().is_empty() {
            return Err(IngestError::InvalidPath {
                path: self.file_path.clone(),
                reason: "destination is empty".to_string(),
            });
        }
        std::path::absolute(&self.file_path).map_err(|e| IngestError::InvalidPath {
            path: self.file_path.clone(),
            reason: e.to_string(),
        })
    }
}

impl StorageDescriptor for FilesystemStorage {
    const STORAGE_KIND: &'static str = "filesystem";
}

impl StorageBackend for FilesystemStorage {
    fn persist(&self, value: &Payload) -> Result<()> {
        save_to_file(value, &self.destination()?)
    }
}

/// Storage inside a volume addressed as `<namespace>/<sub_namespace>/<volume>`.
///
/// Files land at `/Volumes/<namespace>/<sub_namespace>/<volume>/<relative_path>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespacedVolumeStorage {
    mount_root: PathBuf,
    namespace: String,
    sub_namespace: String,
    volume: String,
    relative_path: PathBuf,
}

impl NamespacedVolumeStorage {
    /// Fails when `relative_path` is absolute or names a directory.
    pub fn new(
        namespace: impl Into<String>,
        sub_namespace: impl Into<String>,
        volume: impl Into<String>,
        relative_path: impl Into<PathBuf>,
    ) -> Result<Self> {
        let relative_path = relative_path.into();

        if relative_path.is_absolute() {
            return Err(IngestError::InvalidPath {
                path: relative_path,
                reason: "relative path must not be absolute".to_string(),
            });
        }
        let as_text = relative_path.to_string_lossy();
        if as_text.is_empty() || as_text.ends_with('/') {
            return Err(IngestError::InvalidPath {
                path: relative_path,
                reason: "relative path should be a file, not a directory".to_string(),
            });
        }

        Ok(Self {
            mount_root: PathBuf::from(VOLUME_MOUNT_ROOT),
            namespace: namespace.into(),
            sub_namespace: sub_namespace.into(),
            volume: volume.into(),
            relative_path,
        })
    }

    /// Mount volumes somewhere other than `/Volumes`.
    pub fn with_mount_root(mut self, mount_root: impl Into<PathBuf>) -> Self {
        self.mount_root = mount_root.into();
        self
    }

    pub fn destination(&self) -> PathBuf {
        self.mount_root
            .join(&self.namespace)
            .join(&self.sub_namespace)
            .join(&self.volume)
            .join(&self.relative_path)
    }
}

impl StorageDescriptor for NamespacedVolumeStorage {
    const STORAGE_KIND: &'static str = "namespaced-volume";
}

impl StorageBackend for NamespacedVolumeStorage {
    fn persist(&self, value: &Payload) -> Result<()> {
        save_to_file(value, &self.destination())
    }
}
