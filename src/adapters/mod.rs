// Adapters layer: concrete sources, transformers and storages. Nothing here is named by
// the orchestration code; the registry maps qualified names onto these types.

pub mod parser;
pub mod source;
pub mod storage;
