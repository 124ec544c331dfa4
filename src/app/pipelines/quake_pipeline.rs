use crate::core::layers::{render_earthquakes, render_plates, EARTHQUAKE_LAYER, PLATE_LAYER};
use crate::core::page::render_page;
use crate::core::{ConfigProvider, FeedSource, Pipeline, Storage};
use crate::domain::model::{
    FailurePolicy, FeedKind, FeedOutcome, FeedSet, LayerGroup, MapView, QuakeRow, RenderResult,
    RenderStats,
};
use crate::utils::error::{MapError, Result};

/// Column order of the earthquake export; matches the field order of `QuakeRow`.
const CSV_HEADER: [&str; 7] = [
    "time",
    "title",
    "magnitude",
    "radius",
    "color",
    "latitude",
    "longitude",
];

pub struct QuakeMapPipeline<S: Storage, F: FeedSource, C: ConfigProvider> {
    storage: S,
    source: F,
    config: C,
}

impl<S: Storage, F: FeedSource, C: ConfigProvider> QuakeMapPipeline<S, F, C> {
    pub fn new(storage: S, source: F, config: C) -> Self {
        Self {
            storage,
            source,
            config,
        }
    }

    async fn fetch_outcome(&self, kind: FeedKind, url: &str) -> FeedOutcome {
        match self.source.fetch(kind, url).await {
            Ok(collection) => FeedOutcome::Loaded(collection),
            Err(e) => {
                tracing::debug!(feed = %kind, "fetch failed: {}", e);
                FeedOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Applies the failure policy to one outcome; `None` means "draw it empty".
    fn accept<'a>(
        &self,
        kind: FeedKind,
        outcome: &'a FeedOutcome,
        stats: &mut RenderStats,
    ) -> Result<Option<&'a geojson::FeatureCollection>> {
        match outcome {
            FeedOutcome::Loaded(collection) => Ok(Some(collection)),
            FeedOutcome::Failed { reason } => match self.config.failure_policy() {
                FailurePolicy::Skip => {
                    tracing::warn!(feed = %kind, "feed unavailable, layer left empty: {}", reason);
                    stats.failed_feeds.push(kind);
                    Ok(None)
                }
                FailurePolicy::Fail => Err(MapError::FeedUnavailableError {
                    feed: kind.to_string(),
                    reason: reason.clone(),
                }),
            },
        }
    }

    fn quakes_csv(rows: &[QuakeRow]) -> Result<Vec<u8>> {
        // The header is written up front so an empty export still carries it
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(Vec::new());
        writer.write_record(CSV_HEADER)?;
        for row in rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
        writer.into_inner().map_err(|e| MapError::IoError(e.into_error()))
    }
}

#[async_trait::async_trait]
impl<S: Storage, F: FeedSource, C: ConfigProvider> Pipeline for QuakeMapPipeline<S, F, C> {
    async fn extract(&self) -> Result<FeedSet> {
        // Both downloads are in flight at once and neither waits on the other
        let (earthquakes, plates) = tokio::join!(
            self.fetch_outcome(FeedKind::Earthquakes, self.config.earthquakes_url()),
            self.fetch_outcome(FeedKind::Plates, self.config.plates_url()),
        );
        Ok(FeedSet {
            earthquakes,
            plates,
        })
    }

    async fn transform(&self, feeds: FeedSet) -> Result<RenderResult> {
        let mut stats = RenderStats::default();

        let (quake_group, quake_rows) =
            match self.accept(FeedKind::Earthquakes, &feeds.earthquakes, &mut stats)? {
                Some(collection) => {
                    let layer = render_earthquakes(collection, &mut stats);
                    (layer.group, layer.rows)
                }
                None => (LayerGroup::new(EARTHQUAKE_LAYER), Vec::new()),
            };

        let plate_group = match self.accept(FeedKind::Plates, &feeds.plates, &mut stats)? {
            Some(collection) => render_plates(collection, &mut stats),
            None => LayerGroup::new(PLATE_LAYER),
        };

        let view = MapView::assemble(
            &self.config.view_settings(),
            &self.config.base_layer_settings(),
            quake_group,
            plate_group,
        );

        Ok(RenderResult {
            view,
            quake_rows,
            stats,
        })
    }

    async fn load(&self, result: RenderResult) -> Result<String> {
        let html = render_page(&result.view, self.config.page_title())?;
        let html_name = self.config.html_filename();
        tracing::debug!("Writing map page ({} bytes)", html.len());
        self.storage.write_file(html_name, html.as_bytes()).await?;

        if let Some(csv_name) = self.config.csv_filename() {
            let csv_data = Self::quakes_csv(&result.quake_rows)?;
            tracing::debug!(
                "Writing {} earthquake rows ({} bytes)",
                result.quake_rows.len(),
                csv_data.len()
            );
            self.storage.write_file(csv_name, &csv_data).await?;
        }

        Ok(self.storage.describe(html_name))
    }
}
