use crate::domain::model::FeedKind;
use crate::domain::ports::FeedSource;
use crate::utils::error::{MapError, Result};
use geojson::{FeatureCollection, GeoJson};
use reqwest::Client;
use std::time::Duration;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone)]
pub struct HttpFeedSource {
    client: Client,
}

impl HttpFeedSource {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { client })
    }
}

/// Accepts a FeatureCollection or a lone Feature.
pub fn parse_feature_collection(kind: FeedKind, body: &str) -> Result<FeatureCollection> {
    match body.parse::<GeoJson>()? {
        GeoJson::FeatureCollection(collection) => Ok(collection),
        GeoJson::Feature(feature) => Ok(FeatureCollection {
            bbox: None,
            features: vec![feature],
            foreign_members: None,
        }),
        GeoJson::Geometry(_) => Err(MapError::FeedFormatError {
            feed: kind.to_string(),
            message: "got a bare geometry".to_string(),
        }),
    }
}

impl FeedSource for HttpFeedSource {
    async fn fetch(&self, kind: FeedKind, url: &str) -> Result<FeatureCollection> {
        tracing::debug!(feed = %kind, "GET {}", url);
        let response = self.client.get(url).send().await?;

        let status = response.status();
        tracing::debug!(feed = %kind, "response status: {}", status);
        if !status.is_success() {
            return Err(MapError::FeedStatusError {
                feed: kind.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        let collection = parse_feature_collection(kind, &body)?;
        tracing::debug!(
            feed = %kind,
            features = collection.features.len(),
            bytes = body.len(),
            "feed parsed"
        );
        Ok(collection)
    }
}
