pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliArgs;

pub use adapters::http::HttpFeedSource;
pub use app::pipelines::quake_pipeline::QuakeMapPipeline;
pub use config::{cli::LocalStorage, MapConfig};
pub use core::engine::MapEngine;
pub use utils::error::{MapError, Result};
