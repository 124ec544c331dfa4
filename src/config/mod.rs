pub mod cli;
pub mod toml_config;

pub use toml_config::MapConfig;

#[cfg(feature = "cli")]
use crate::domain::model::FailurePolicy;
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use std::path::PathBuf;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Default, Parser)]
#[command(name = "quake-map")]
#[command(about = "Render this week's earthquakes and tectonic plate boundaries as an interactive map")]
pub struct CliArgs {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[arg(long)]
    pub earthquakes_url: Option<String>,

    #[arg(long)]
    pub plates_url: Option<String>,

    #[arg(short, long)]
    pub output_path: Option<String>,

    /// Token substituted into `{access_token}` in tile URL templates
    #[arg(long, env = "MAPBOX_ACCESS_TOKEN", hide_env_values = true)]
    pub access_token: Option<String>,

    #[arg(long)]
    pub timeout_seconds: Option<u64>,

    /// Fail instead of drawing an empty layer when a feed cannot be loaded
    #[arg(long)]
    pub strict: bool,

    /// Skip the CSV export
    #[arg(long)]
    pub no_csv: bool,

    /// Report process memory and CPU per phase
    #[arg(long)]
    pub monitor: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub log_json: bool,

    /// Show the resolved configuration without downloading anything
    #[arg(long)]
    pub dry_run: bool,
}

#[cfg(feature = "cli")]
impl CliArgs {
    /// Loads the config file (or the defaults) and applies command-line overrides.
    pub fn resolve(&self) -> crate::utils::error::Result<MapConfig> {
        let mut config = match &self.config {
            Some(path) => MapConfig::from_file(path)?,
            None => MapConfig::default(),
        };
        self.apply_to(&mut config);
        Ok(config)
    }

    pub fn apply_to(&self, config: &mut MapConfig) {
        if let Some(url) = &self.earthquakes_url {
            config.feeds.earthquakes_url = url.clone();
        }
        if let Some(url) = &self.plates_url {
            config.feeds.plates_url = url.clone();
        }
        if let Some(path) = &self.output_path {
            config.output.output_path = path.clone();
        }
        if let Some(token) = &self.access_token {
            config.tiles.access_token = Some(token.clone());
        }
        if let Some(timeout) = self.timeout_seconds {
            config.feeds.timeout_seconds = timeout;
        }
        if self.strict {
            config.feeds.on_failure = FailurePolicy::Fail;
        }
        if self.no_csv {
            config.output.export_csv = false;
        }
        if self.monitor {
            config.monitoring.enabled = true;
        }
    }
}
