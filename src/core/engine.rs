use crate::core::{FeedKind, Pipeline};
use crate::utils::error::Result;
use crate::utils::monitor::RunMonitor;

pub struct MapEngine<P: Pipeline> {
    pipeline: P,
    sample_process: bool,
}

impl<P: Pipeline> MapEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self {
            pipeline,
            sample_process: false,
        }
    }

    pub fn new_with_monitoring(pipeline: P, sample_process: bool) -> Self {
        Self {
            pipeline,
            sample_process,
        }
    }

    pub async fn run(&self) -> Result<String> {
        let mut monitor = RunMonitor::new(self.sample_process);
        tracing::info!("Building earthquake map");

        let feeds = self.pipeline.extract().await?;
        tracing::info!(
            earthquakes = feeds.earthquakes.feature_count(),
            plates = feeds.plates.feature_count(),
            "Feeds downloaded"
        );
        for (kind, outcome) in [
            (FeedKind::Earthquakes, &feeds.earthquakes),
            (FeedKind::Plates, &feeds.plates),
        ] {
            if !outcome.is_loaded() {
                tracing::debug!(feed = %kind, "feed did not load");
            }
        }
        monitor.finish_phase("extract");

        let rendered = self.pipeline.transform(feeds).await?;
        tracing::info!(
            markers = rendered.stats.quakes_rendered,
            plate_paths = rendered.stats.plate_paths,
            skipped = rendered.stats.skipped_geometries,
            "Layers rendered"
        );
        if !rendered.stats.failed_feeds.is_empty() {
            tracing::warn!(
                "Map written with empty layers for: {:?}",
                rendered.stats.failed_feeds
            );
        }
        monitor.finish_phase("transform");

        let output_path = self.pipeline.load(rendered).await?;
        tracing::info!("Map saved to: {}", output_path);
        monitor.finish_phase("load");

        monitor.log_summary();
        Ok(output_path)
    }
}
