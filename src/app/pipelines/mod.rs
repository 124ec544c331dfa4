pub mod quake_pipeline;
