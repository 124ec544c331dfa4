//! Magnitude styling: marker radius, color buckets and the matching legend.

use crate::domain::model::LegendEntry;

const RADIUS_PER_MAGNITUDE: f64 = 3.0;

/// Color steps, highest threshold first. A magnitude takes the first color
/// whose threshold it strictly exceeds.
const COLOR_STEPS: [(f64, &str); 8] = [
    (8.0, "#800026"),
    (7.0, "#bd0026"),
    (6.0, "#e31a1c"),
    (5.0, "#fc4e2a"),
    (4.0, "#fd8d3c"),
    (3.0, "#feb24c"),
    (2.0, "#fed976"),
    (1.0, "#ffeda0"),
];

pub const DEFAULT_COLOR: &str = "#ffffcc";

const LEGEND_THRESHOLDS: [u8; 9] = [0, 1, 2, 3, 4, 5, 6, 7, 8];

/// Marker radius for a magnitude. Not clamped.
pub fn marker_size(magnitude: f64) -> f64 {
    magnitude * RADIUS_PER_MAGNITUDE
}

pub fn magnitude_color(magnitude: f64) -> &'static str {
    COLOR_STEPS
        .iter()
        .find(|(threshold, _)| magnitude > *threshold)
        .map(|(_, color)| *color)
        .unwrap_or(DEFAULT_COLOR)
}

pub fn legend_entries() -> Vec<LegendEntry> {
    LEGEND_THRESHOLDS
        .iter()
        .enumerate()
        .map(|(i, &threshold)| {
            let label = match LEGEND_THRESHOLDS.get(i + 1) {
                Some(next) => format!("{}&ndash;{}", threshold, next),
                None => format!("{}+", threshold),
            };
            LegendEntry {
                threshold,
                color: magnitude_color(f64::from(threshold)),
                label,
            }
        })
        .collect()
}

pub fn legend_html(entries: &[LegendEntry]) -> String {
    entries
        .iter()
        .map(|entry| format!("<i style=\"background:{}\"></i> {}", entry.color, entry.label))
        .collect::<Vec<_>>()
        .join("<br>")
}
