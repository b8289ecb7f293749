pub mod encoder;
pub mod engine;
pub mod writer;

pub use crate::domain::model::{Frame, Payload};
pub use crate::domain::ports::{Source, StorageBackend, StorageDescriptor, Transformer};
pub use crate::utils::error::Result;
