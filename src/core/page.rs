//! Renders a [`MapView`] into a standalone Leaflet page.

use crate::core::style::legend_html;
use crate::domain::model::MapView;
use crate::utils::error::Result;
use serde::Serialize;
use tera::{Context, Tera};

const TEMPLATE_NAME: &str = "map.html";

const MAP_TEMPLATE: &str = r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>{{ title }}</title>
  <link rel="stylesheet" href="https://unpkg.com/leaflet@1.9.4/dist/leaflet.css" crossorigin="" />
  <script src="https://unpkg.com/leaflet@1.9.4/dist/leaflet.js" crossorigin=""></script>
  <style>
    html, body, #map { height: 100%; margin: 0; }
    .legend { background: white; padding: 6px 8px; line-height: 18px; color: #555; border-radius: 5px; }
    .legend i { width: 18px; height: 18px; float: left; margin-right: 8px; opacity: 0.7; }
  </style>
</head>
<body>
  <div id="map"></div>
  <script>
    const baseDefs = {{ base_layers | safe }};
    const overlayDefs = {{ overlays | safe }};
    const defaultBase = {{ default_base | safe }};

    const baseLayers = {};
    baseDefs.forEach(function (def) {
      baseLayers[def.name] = L.tileLayer(def.url, { attribution: def.attribution, maxZoom: def.maxZoom });
    });

    function renderFeature(feature) {
      if (feature.kind === "circle") {
        return L.circleMarker([feature.lat, feature.lng], Object.assign({ radius: feature.radius }, feature.style))
          .bindPopup(feature.popup);
      }
      return L.polyline(feature.paths, feature.style);
    }

    const initialLayers = [];
    if (baseLayers[defaultBase]) {
      initialLayers.push(baseLayers[defaultBase]);
    }
    const overlays = {};
    overlayDefs.forEach(function (def) {
      const group = L.layerGroup(def.features.map(renderFeature));
      overlays[def.name] = group;
      if (def.visible) {
        initialLayers.push(group);
      }
    });

    const map = L.map("map", {
      center: {{ center | safe }},
      zoom: {{ zoom }},
      layers: initialLayers
    });
    L.control.layers(baseLayers, overlays).addTo(map);

    const legend = L.control({ position: "bottomright" });
    legend.onAdd = function () {
      const div = L.DomUtil.create("div", "info legend");
      div.innerHTML = {{ legend | safe }};
      return div;
    };
    legend.addTo(map);
  </script>
</body>
</html>
"#;

/// JSON that is safe to drop into a `<script>` block.
fn script_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string(value)?.replace("</", "<\\/"))
}

pub struct PageRenderer {
    tera: Tera,
}

impl PageRenderer {
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();
        tera.add_raw_template(TEMPLATE_NAME, MAP_TEMPLATE)?;
        Ok(Self { tera })
    }

    pub fn render(&self, view: &MapView, title: &str) -> Result<String> {
        let mut context = Context::new();
        context.insert("title", title);
        context.insert("zoom", &view.zoom);
        context.insert("center", &script_json(&view.center)?);
        context.insert("base_layers", &script_json(&view.base_layers)?);
        context.insert("default_base", &script_json(&view.default_base_layer)?);
        context.insert("overlays", &script_json(&view.overlays)?);
        context.insert("legend", &script_json(&legend_html(&view.legend))?);

        Ok(self.tera.render(TEMPLATE_NAME, &context)?)
    }
}

/// One-shot render used by the pipeline's load step.
pub fn render_page(view: &MapView, title: &str) -> Result<String> {
    PageRenderer::new()?.render(view, title)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::layers::{EARTHQUAKE_LAYER, PLATE_LAYER};
    use crate::domain::model::{LayerGroup, PathStyle, RenderedFeature};
    use crate::domain::ports::{BaseLayerSettings, ViewSettings};

    fn sample_view(title_in_popup: &str) -> MapView {
        let mut quakes = LayerGroup::new(EARTHQUAKE_LAYER);
        quakes.add(RenderedFeature::Circle {
            lat: 1.0,
            lng: 2.0,
            radius: 6.0,
            style: PathStyle {
                color: "black".to_string(),
                weight: 0.1,
                fill_color: Some("#fed976".to_string()),
                fill_opacity: Some(0.7),
            },
            popup: title_in_popup.to_string(),
        });
        MapView::assemble(
            &ViewSettings {
                center: [30.0, 0.0],
                zoom: 2,
                default_base_layer: "Street".to_string(),
                plates_visible: false,
            },
            &[BaseLayerSettings {
                name: "Street".to_string(),
                url_template: "https://tiles.example.com/{z}/{x}/{y}.png".to_string(),
                attribution: "Example".to_string(),
                max_zoom: 18,
            }],
            quakes,
            LayerGroup::new(PLATE_LAYER),
        )
    }

    #[test]
    fn test_page_embeds_layers_and_legend() {
        let html = render_page(&sample_view("<h5>M 2</h5>"), "Earthquakes & Plates").unwrap();

        assert!(html.contains("<title>Earthquakes &amp; Plates</title>"));
        assert!(html.contains("\"name\":\"Earthquakes\""));
        assert!(html.contains("\"name\":\"Plate Boundaries\""));
        assert!(html.contains("\"fillColor\":\"#fed976\""));
        assert!(html.contains("\"kind\":\"circle\""));
        assert!(html.contains("\"url\":\"https://tiles.example.com/{z}/{x}/{y}.png\""));
        assert!(html.contains("center: [30.0,0.0]"));
        assert!(html.contains("zoom: 2,"));
        assert!(html.contains("8+"));
    }

    #[test]
    fn test_script_breakout_is_neutralised() {
        let html = render_page(&sample_view("</script><b>x</b>"), "t").unwrap();
        assert!(!html.contains("</script><b>"));
        assert!(html.contains("<\\/script><b>x<\\/b>"));
    }

    #[test]
    fn test_rendering_is_deterministic() {
        let renderer = PageRenderer::new().unwrap();
        let view = sample_view("same");
        assert_eq!(
            renderer.render(&view, "t").unwrap(),
            renderer.render(&view, "t").unwrap()
        );
    }
}
