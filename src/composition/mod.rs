// Composition layer: turns an Environment into wired collaborators. The only layer that
// knows about concrete implementations.

pub mod reference;
pub mod registry;
pub mod root;

pub use reference::ImplementationReference;
pub use registry::{Registry, StorageConfig, StorageFactory, StorageKind};
pub use root::{resolve, run, run_with, run_with_monitoring, ResolvedImplementations};
