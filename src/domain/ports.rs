use crate::domain::model::{FailurePolicy, FeedKind, FeedSet, RenderResult};
use crate::utils::error::Result;
use async_trait::async_trait;
use geojson::FeatureCollection;

pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Where `path` ends up, for reporting.
    fn describe(&self, path: &str) -> String;
}

pub trait FeedSource: Send + Sync {
    fn fetch(
        &self,
        kind: FeedKind,
        url: &str,
    ) -> impl std::future::Future<Output = Result<FeatureCollection>> + Send;
}

#[derive(Debug, Clone, PartialEq)]
pub struct ViewSettings {
    pub center: [f64; 2],
    pub zoom: u8,
    pub default_base_layer: String,
    pub plates_visible: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BaseLayerSettings {
    pub name: String,
    pub url_template: String,
    pub attribution: String,
    pub max_zoom: u8,
}

pub trait ConfigProvider: Send + Sync {
    fn earthquakes_url(&self) -> &str;
    fn plates_url(&self) -> &str;
    fn failure_policy(&self) -> FailurePolicy;
    fn view_settings(&self) -> ViewSettings;
    /// Base layers with the tile access token already substituted.
    fn base_layer_settings(&self) -> Vec<BaseLayerSettings>;
    fn page_title(&self) -> &str;
    fn html_filename(&self) -> &str;
    /// `None` disables the CSV export.
    fn csv_filename(&self) -> Option<&str>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<FeedSet>;
    async fn transform(&self, feeds: FeedSet) -> Result<RenderResult>;
    async fn load(&self, result: RenderResult) -> Result<String>;
}
