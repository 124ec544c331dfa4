use geojson::FeatureCollection;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeedKind {
    Earthquakes,
    Plates,
}

impl FeedKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedKind::Earthquakes => "earthquakes",
            FeedKind::Plates => "plates",
        }
    }
}

impl fmt::Display for FeedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one feed download, kept as data so the caller decides what a
/// failure means.
#[derive(Debug, Clone)]
pub enum FeedOutcome {
    Loaded(FeatureCollection),
    Failed { reason: String },
}

impl FeedOutcome {
    pub fn feature_count(&self) -> usize {
        match self {
            FeedOutcome::Loaded(collection) => collection.features.len(),
            FeedOutcome::Failed { .. } => 0,
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, FeedOutcome::Loaded(_))
    }
}

#[derive(Debug, Clone)]
pub struct FeedSet {
    pub earthquakes: FeedOutcome,
    pub plates: FeedOutcome,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Leave the layer empty and keep going.
    #[default]
    Skip,
    Fail,
}

/// Leaflet path options.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PathStyle {
    pub color: String,
    pub weight: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill_opacity: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum RenderedFeature {
    Circle {
        lat: f64,
        lng: f64,
        radius: f64,
        style: PathStyle,
        popup: String,
    },
    Polyline {
        /// One `[lat, lng]` path per line or ring.
        paths: Vec<Vec<[f64; 2]>>,
        style: PathStyle,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayerGroup {
    pub name: String,
    pub features: Vec<RenderedFeature>,
}

impl LayerGroup {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            features: Vec::new(),
        }
    }

    pub fn add(&mut self, feature: RenderedFeature) {
        self.features.push(feature);
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendEntry {
    pub threshold: u8,
    pub color: &'static str,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TileLayer {
    pub name: String,
    #[serde(rename = "url")]
    pub url_template: String,
    pub attribution: String,
    pub max_zoom: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overlay {
    #[serde(flatten)]
    pub layer: LayerGroup,
    pub visible: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapView {
    pub center: [f64; 2],
    pub zoom: u8,
    pub base_layers: Vec<TileLayer>,
    pub default_base_layer: String,
    pub overlays: Vec<Overlay>,
    pub legend: Vec<LegendEntry>,
}

/// One earthquake in the CSV export.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuakeRow {
    pub time: Option<String>,
    pub title: Option<String>,
    pub magnitude: Option<f64>,
    pub radius: f64,
    pub color: &'static str,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub quakes_rendered: usize,
    pub quakes_missing_magnitude: usize,
    pub skipped_geometries: usize,
    pub plate_paths: usize,
    pub failed_feeds: Vec<FeedKind>,
}

#[derive(Debug, Clone)]
pub struct RenderResult {
    pub view: MapView,
    pub quake_rows: Vec<QuakeRow>,
    pub stats: RenderStats,
}
