pub mod engine;
pub mod layers;
pub mod map;
pub mod page;
pub mod style;

pub use crate::domain::model::{FeedKind, FeedOutcome, FeedSet, LayerGroup, MapView, RenderResult};
pub use crate::domain::ports::{ConfigProvider, FeedSource, Pipeline, Storage};
pub use crate::utils::error::Result;
