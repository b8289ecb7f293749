// Domain layer: the payload model and the three collaborator ports. No knowledge of
// concrete sources, transformers or storages.

pub mod model;
pub mod ports;
