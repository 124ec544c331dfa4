use httpmock::prelude::*;
use quake_map::{HttpFeedSource, LocalStorage, MapConfig, MapEngine, MapError, QuakeMapPipeline};
use std::time::Duration;
use tempfile::TempDir;

fn earthquake_feed() -> serde_json::Value {
    serde_json::json!({
        "type": "FeatureCollection",
        "metadata": {"title": "USGS All Earthquakes, Past Week", "count": 3},
        "features": [
            {"type": "Feature",
             "properties": {"mag": 6.5, "time": 1_700_000_000_000i64, "title": "M 6.5 - 80 km E of Miyako, Japan"},
             "geometry": {"type": "Point", "coordinates": [142.9, 39.6, 25.0]},
             "id": "us7000abcd"},
            {"type": "Feature",
             "properties": {"mag": 4.0, "time": 1_700_000_500_000i64, "title": "M 4.0 - Central Alaska"},
             "geometry": {"type": "Point", "coordinates": [-149.9, 63.1, 90.0]},
             "id": "ak0238xyz"},
            {"type": "Feature",
             "properties": {"mag": null, "time": 1_700_001_000_000i64, "title": "Unknown magnitude"},
             "geometry": {"type": "Point", "coordinates": [-116.8, 33.5, 12.0]},
             "id": "ci4000001"}
        ]
    })
}

fn plate_feed() -> serde_json::Value {
    serde_json::json!({
        "type": "FeatureCollection",
        "features": [
            {"type": "Feature",
             "properties": {"LAYER": "plate boundary", "Name": "AF-AN", "PlateA": "AF", "PlateB": "AN"},
             "geometry": {"type": "LineString", "coordinates": [[-0.4379, -54.8518], [-0.0388, -54.6772]]}},
            {"type": "Feature",
             "properties": {"LAYER": "plate boundary", "Name": "PA-NA"},
             "geometry": {"type": "LineString", "coordinates": [[-124.7, 40.3], [-125.1, 40.4], [-126.0, 40.5]]}}
        ]
    })
}

fn config_for(server: &MockServer, output_path: &str) -> MapConfig {
    let mut config = MapConfig::default();
    config.feeds.earthquakes_url = server.url("/earthquakes/feed/v1.0/summary/all_week.geojson");
    config.feeds.plates_url = server.url("/GeoJSON/PB2002_boundaries.json");
    config.feeds.timeout_seconds = 5;
    config.output.output_path = output_path.to_string();
    config.tiles.access_token = Some("pk.test".to_string());
    config
}

fn engine_for(
    config: MapConfig,
) -> MapEngine<QuakeMapPipeline<LocalStorage, HttpFeedSource, MapConfig>> {
    let storage = LocalStorage::new(config.output.output_path.clone());
    let source = HttpFeedSource::new(Duration::from_secs(config.feeds.timeout_seconds)).unwrap();
    MapEngine::new(QuakeMapPipeline::new(storage, source, config))
}

#[tokio::test]
async fn test_end_to_end_map_with_real_http() {
    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir.path().to_str().unwrap().to_string();

    let server = MockServer::start();
    let quake_mock = server.mock(|when, then| {
        when.method(GET)
            .path("/earthquakes/feed/v1.0/summary/all_week.geojson");
        then.status(200)
            .header("Content-Type", "application/geo+json")
            .json_body(earthquake_feed());
    });
    let plate_mock = server.mock(|when, then| {
        when.method(GET).path("/GeoJSON/PB2002_boundaries.json");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(plate_feed());
    });

    let engine = engine_for(config_for(&server, &output_path));
    let result = engine.run().await;

    assert!(result.is_ok(), "run failed: {:?}", result.err());
    quake_mock.assert();
    plate_mock.assert();

    let page_path = std::path::Path::new(&output_path).join("index.html");
    assert_eq!(result.unwrap(), page_path.display().to_string());

    let html = std::fs::read_to_string(&page_path).unwrap();
    assert!(html.contains("M 6.5 - 80 km E of Miyako, Japan"));
    assert!(html.contains("\"radius\":19.5"));
    assert!(html.contains("\"fillColor\":\"#e31a1c\""));
    // magnitude 4.0 sits in the ">3" bucket
    assert!(html.contains("\"fillColor\":\"#feb24c\""));
    assert!(html.contains("\"color\":\"brown\""));
    assert!(html.contains("access_token=pk.test"));
    assert!(html.contains("\"name\":\"Satellite\""));

    let csv = std::fs::read_to_string(std::path::Path::new(&output_path).join("earthquakes.csv"))
        .unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 4);
    assert!(lines[2].contains("M 4.0 - Central Alaska,4.0,12.0,#feb24c"));
    // missing magnitude: empty cell, zero radius, lowest color
    assert!(lines[3].contains("Unknown magnitude,,0.0,#ffffcc"));
}

#[tokio::test]
async fn test_end_to_end_with_feed_failure_still_writes_map() {
    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir.path().to_str().unwrap().to_string();

    let server = MockServer::start();
    let quake_mock = server.mock(|when, then| {
        when.method(GET)
            .path("/earthquakes/feed/v1.0/summary/all_week.geojson");
        then.status(500);
    });
    let plate_mock = server.mock(|when, then| {
        when.method(GET).path("/GeoJSON/PB2002_boundaries.json");
        then.status(200).json_body(plate_feed());
    });

    let result = engine_for(config_for(&server, &output_path)).run().await;

    assert!(result.is_ok());
    quake_mock.assert();
    plate_mock.assert();

    let html =
        std::fs::read_to_string(std::path::Path::new(&output_path).join("index.html")).unwrap();
    assert!(html.contains("\"name\":\"Earthquakes\",\"features\":[]"));
    assert!(html.contains("\"kind\":\"polyline\""));

    let csv = std::fs::read_to_string(std::path::Path::new(&output_path).join("earthquakes.csv"))
        .unwrap();
    assert_eq!(
        csv.lines().collect::<Vec<_>>(),
        vec!["time,title,magnitude,radius,color,latitude,longitude"]
    );
}

#[tokio::test]
async fn test_strict_mode_fails_on_unreachable_feed() {
    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir.path().to_str().unwrap().to_string();

    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET)
            .path("/earthquakes/feed/v1.0/summary/all_week.geojson");
        then.status(200).json_body(earthquake_feed());
    });
    server.mock(|when, then| {
        when.method(GET).path("/GeoJSON/PB2002_boundaries.json");
        then.status(503);
    });

    let mut config = config_for(&server, &output_path);
    config.feeds.on_failure = quake_map::domain::model::FailurePolicy::Fail;

    let err = engine_for(config).run().await.unwrap_err();

    match &err {
        MapError::FeedUnavailableError { feed, reason } => {
            assert_eq!(feed, "plates");
            assert!(reason.contains("503"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(!std::path::Path::new(&output_path).join("index.html").exists());
}

#[tokio::test]
async fn test_empty_feeds_produce_a_valid_map() {
    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir.path().to_str().unwrap().to_string();

    let server = MockServer::start();
    let empty = serde_json::json!({"type": "FeatureCollection", "features": []});
    server.mock(|when, then| {
        when.method(GET)
            .path("/earthquakes/feed/v1.0/summary/all_week.geojson");
        then.status(200).json_body(empty.clone());
    });
    server.mock(|when, then| {
        when.method(GET).path("/GeoJSON/PB2002_boundaries.json");
        then.status(200).json_body(empty.clone());
    });

    let result = engine_for(config_for(&server, &output_path)).run().await;

    assert!(result.is_ok());
    let html =
        std::fs::read_to_string(std::path::Path::new(&output_path).join("index.html")).unwrap();
    assert!(html.contains("\"name\":\"Earthquakes\",\"features\":[]"));
    assert!(html.contains("\"name\":\"Plate Boundaries\",\"features\":[]"));
}
