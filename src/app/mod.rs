// Application layer: concrete pipelines wiring the domain ports together.

pub mod pipelines;
