use crate::domain::model::Payload;
use crate::utils::error::Result;

/// Where the data comes from: an API client, a file, a canned response.
pub trait Source {
    fn fetch(&self) -> Result<Payload>;
}

/// Reshapes what a source returned into what storage should keep.
pub trait Transformer {
    fn apply(&self, input: Payload) -> Result<Payload>;
}

/// Persists one payload per call.
///
/// Implementations also expose a `STORAGE_KIND` tag as an associated
/// constant so the composition root can pick a constructor shape before
/// anything is built; see [`StorageDescriptor`].
pub trait StorageBackend {
    fn persist(&self, value: &Payload) -> Result<()>;
}

/// Class-level marker naming the constructor shape a storage needs.
pub trait StorageDescriptor {
    const STORAGE_KIND: &'static str;
}

impl<T: Source + ?Sized> Source for Box<T> {
    fn fetch(&self) -> Result<Payload> {
        (**self).fetch()
    }
}

impl<T: Transformer + ?Sized> Transformer for Box<T> {
    fn apply(&self, input: Payload) -> Result<Payload> {
        (**self).apply(input)
    }
}

impl<T: StorageBackend + ?Sized> StorageBackend for Box<T> {
    fn persist(&self, value: &Payload) -> Result<()> {
        (**self).persist(value)
    }
}
