// Domain layer: record model and ports (storage, sources, pipeline).

pub mod model;
pub mod ports;
