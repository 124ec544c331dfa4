// Domain layer: map models and ports (interfaces). Adapters and pipelines depend on this, not the other way round.

pub mod model;
pub mod ports;
