pub mod adapters;
pub mod composition;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use composition::{resolve, run, run_with, ImplementationReference, Registry};
pub use config::environment::{Destination, Environment};
pub use core::engine::IngestEngine;
pub use domain::model::{Frame, Payload};
pub use domain::ports::{Source, StorageBackend, StorageDescriptor, Transformer};
pub use utils::error::{IngestError, Result, Stage};
