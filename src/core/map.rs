use crate::core::style::legend_entries;
use crate::domain::model::{LayerGroup, MapView, Overlay, TileLayer};
use crate::domain::ports::{BaseLayerSettings, ViewSettings};

impl TileLayer {
    pub fn from_settings(settings: &BaseLayerSettings) -> Self {
        Self {
            name: settings.name.clone(),
            url_template: settings.url_template.clone(),
            attribution: settings.attribution.clone(),
            max_zoom: settings.max_zoom,
        }
    }

    /// Expands `{z}`, `{x}`, `{y}` and `{s}` the way Leaflet does.
    pub fn tile_url(&self, z: u8, x: u32, y: u32) -> String {
        self.url_template
            .replace("{z}", &z.to_string())
            .replace("{x}", &x.to_string())
            .replace("{y}", &y.to_string())
            .replace("{s}", "a")
            .replace("{r}", "")
    }
}

impl MapView {
    /// Composes the viewport. Overlay order is fixed so the result does not
    /// depend on which feed finished first.
    pub fn assemble(
        view: &ViewSettings,
        base_layers: &[BaseLayerSettings],
        earthquakes: LayerGroup,
        plates: LayerGroup,
    ) -> Self {
        Self {
            center: view.center,
            zoom: view.zoom,
            base_layers: base_layers.iter().map(TileLayer::from_settings).collect(),
            default_base_layer: view.default_base_layer.clone(),
            overlays: vec![
                Overlay {
                    layer: earthquakes,
                    visible: true,
                },
                Overlay {
                    layer: plates,
                    visible: view.plates_visible,
                },
            ],
            legend: legend_entries(),
        }
    }

    pub fn overlay(&self, name: &str) -> Option<&Overlay> {
        self.overlays.iter().find(|o| o.layer.name == name)
    }

    pub fn default_tile_layer(&self) -> Option<&TileLayer> {
        self.base_layers
            .iter()
            .find(|layer| layer.name == self.default_base_layer)
    }
}
