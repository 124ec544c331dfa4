use crate::core::style::{magnitude_color, marker_size};
use crate::domain::model::{LayerGroup, PathStyle, QuakeRow, RenderStats, RenderedFeature};
use chrono::DateTime;
use geojson::{Feature, FeatureCollection, Geometry, Value};

pub const EARTHQUAKE_LAYER: &str = "Earthquakes";
pub const PLATE_LAYER: &str = "Plate Boundaries";

const POPUP_TIME_FORMAT: &str = "%a %b %d %Y %H:%M:%S UTC";

fn quake_style(fill: &str) -> PathStyle {
    PathStyle {
        color: "black".to_string(),
        weight: 0.1,
        fill_color: Some(fill.to_string()),
        fill_opacity: Some(0.7),
    }
}

fn plate_style() -> PathStyle {
    PathStyle {
        color: "brown".to_string(),
        weight: 1.0,
        fill_color: None,
        fill_opacity: None,
    }
}

/// GeoJSON positions are `[lng, lat, ...]`; Leaflet wants `[lat, lng]`.
fn lat_lng(position: &[f64]) -> Option<[f64; 2]> {
    match position {
        [lng, lat, ..] => Some([*lat, *lng]),
        _ => None,
    }
}

fn path(positions: &[Vec<f64>]) -> Vec<[f64; 2]> {
    positions.iter().filter_map(|p| lat_lng(p)).collect()
}

fn property<'a>(feature: &'a Feature, key: &str) -> Option<&'a serde_json::Value> {
    feature.properties.as_ref().and_then(|props| props.get(key))
}

fn popup_html(time: Option<&str>, title: Option<&str>) -> String {
    format!(
        "<h5 style='text-align:center;'>{}</h5><hr><h5 style='text-align:center;'>{}</h5>",
        tera::escape_html(time.unwrap_or("Unknown time")),
        tera::escape_html(title.unwrap_or("Untitled")),
    )
}

pub struct QuakeLayer {
    pub group: LayerGroup,
    pub rows: Vec<QuakeRow>,
}

/// Turns earthquake points into magnitude-styled circle markers.
pub fn render_earthquakes(collection: &FeatureCollection, stats: &mut RenderStats) -> QuakeLayer {
    let mut group = LayerGroup::new(EARTHQUAKE_LAYER);
    let mut rows = Vec::with_capacity(collection.features.len());

    for feature in &collection.features {
        let position = match feature.geometry.as_ref().map(|g| &g.value) {
            Some(Value::Point(position)) => lat_lng(position),
            _ => None,
        };
        let Some([lat, lng]) = position else {
            stats.skipped_geometries += 1;
            continue;
        };

        let magnitude = property(feature, "mag").and_then(|v| v.as_f64());
        if magnitude.is_none() {
            stats.quakes_missing_magnitude += 1;
        }
        // No magnitude draws a zero-size marker in the lowest color
        let (radius, color) = match magnitude {
            Some(m) => (marker_size(m), magnitude_color(m)),
            None => (0.0, magnitude_color(f64::NAN)),
        };

        let timestamp = property(feature, "time")
            .and_then(|v| v.as_i64())
            .and_then(DateTime::from_timestamp_millis);
        let time = timestamp.map(|t| t.format(POPUP_TIME_FORMAT).to_string());
        let title = property(feature, "title")
            .and_then(|v| v.as_str())
            .map(str::to_string);

        group.add(RenderedFeature::Circle {
            lat,
            lng,
            radius,
            style: quake_style(color),
            popup: popup_html(time.as_deref(), title.as_deref()),
        });
        rows.push(QuakeRow {
            time: timestamp.map(|t| t.to_rfc3339()),
            title,
            magnitude,
            radius,
            color,
            latitude: lat,
            longitude: lng,
        });
        stats.quakes_rendered += 1;
    }

    tracing::debug!(
        rendered = group.len(),
        skipped = stats.skipped_geometries,
        "earthquake layer rendered"
    );
    QuakeLayer { group, rows }
}

fn geometry_paths(geometry: &Geometry, out: &mut Vec<Vec<[f64; 2]>>) -> bool {
    match &geometry.value {
        Value::LineString(line) => out.push(path(line)),
        Value::MultiLineString(lines) | Value::Polygon(lines) => {
            out.extend(lines.iter().map(|line| path(line)))
        }
        Value::MultiPolygon(polygons) => {
            for rings in polygons {
                out.extend(rings.iter().map(|ring| path(ring)));
            }
        }
        Value::GeometryCollection(members) => {
            let mut any = false;
            for member in members {
                any |= geometry_paths(member, out);
            }
            return any;
        }
        Value::Point(_) | Value::MultiPoint(_) => return false,
    }
    true
}

/// Turns plate boundaries into plain brown polylines.
pub fn render_plates(collection: &FeatureCollection, stats: &mut RenderStats) -> LayerGroup {
    let mut group = LayerGroup::new(PLATE_LAYER);

    for feature in &collection.features {
        let mut paths = Vec::new();
        let drawable = feature
            .geometry
            .as_ref()
            .is_some_and(|g| geometry_paths(g, &mut paths));
        paths.retain(|p| p.len() >= 2);
        if !drawable || paths.is_empty() {
            stats.skipped_geometries += 1;
            continue;
        }
        stats.plate_paths += paths.len();
        group.add(RenderedFeature::Polyline {
            paths,
            style: plate_style(),
        });
    }

    tracing::debug!(rendered = group.len(), "plate layer rendered");
    group
}
