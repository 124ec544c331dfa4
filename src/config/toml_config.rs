use crate::domain::model::{FailurePolicy, TileLayer};
use crate::domain::ports::{BaseLayerSettings, ConfigProvider, ViewSettings};
use crate::utils::error::{MapError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_EARTHQUAKES_URL: &str =
    "https://earthquake.usgs.gov/earthquakes/feed/v1.0/summary/all_week.geojson";
pub const DEFAULT_PLATES_URL: &str =
    "https://raw.githubusercontent.com/fraxen/tectonicplates/master/GeoJSON/PB2002_boundaries.json";

/// Placeholder in tile templates replaced by `tiles.access_token`.
pub const ACCESS_TOKEN_PLACEHOLDER: &str = "{access_token}";

const MAPBOX_ATTRIBUTION: &str = "&copy; <a href=\"https://www.mapbox.com/about/maps/\">Mapbox</a> \
     &copy; <a href=\"https://www.openstreetmap.org/copyright\">OpenStreetMap</a>";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    pub page: PageConfig,
    pub feeds: FeedsConfig,
    pub view: ViewConfig,
    pub tiles: TilesConfig,
    pub base_layers: Vec<BaseLayerConfig>,
    pub output: OutputConfig,
    pub monitoring: MonitoringConfig,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            page: PageConfig::default(),
            feeds: FeedsConfig::default(),
            view: ViewConfig::default(),
            tiles: TilesConfig::default(),
            base_layers: default_base_layers(),
            output: OutputConfig::default(),
            monitoring: MonitoringConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageConfig {
    pub title: String,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            title: "Earthquakes & Tectonic Plates".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedsConfig {
    pub earthquakes_url: String,
    pub plates_url: String,
    pub timeout_seconds: u64,
    pub on_failure: FailurePolicy,
}

impl Default for FeedsConfig {
    fn default() -> Self {
        Self {
            earthquakes_url: DEFAULT_EARTHQUAKES_URL.to_string(),
            plates_url: DEFAULT_PLATES_URL.to_string(),
            timeout_seconds: 30,
            on_failure: FailurePolicy::Skip,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    pub center_lat: f64,
    pub center_lng: f64,
    pub zoom: u8,
    pub default_base_layer: String,
    pub plates_visible: bool,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            center_lat: 30.0,
            center_lng: 0.0,
            zoom: 2,
            default_base_layer: "Street".to_string(),
            plates_visible: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct TilesConfig {
    pub access_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseLayerConfig {
    pub name: String,
    pub url_template: String,
    #[serde(default)]
    pub attribution: String,
    #[serde(default = "default_max_zoom")]
    pub max_zoom: u8,
}

fn default_max_zoom() -> u8 {
    18
}

impl BaseLayerConfig {
    fn mapbox(name: &str, style: &str) -> Self {
        Self {
            name: name.to_string(),
            url_template: format!(
                "https://api.mapbox.com/styles/v1/{}/tiles/256/{{z}}/{{x}}/{{y}}?access_token={}",
                style, ACCESS_TOKEN_PLACEHOLDER
            ),
            attribution: MAPBOX_ATTRIBUTION.to_string(),
            max_zoom: default_max_zoom(),
        }
    }
}

pub fn default_base_layers() -> Vec<BaseLayerConfig> {
    vec![
        BaseLayerConfig::mapbox("Street", "mapbox/streets-v11"),
        BaseLayerConfig::mapbox("Dark", "mapbox/dark-v10"),
        BaseLayerConfig::mapbox("Satellite", "mapbox/satellite-v9"),
    ]
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub output_path: String,
    pub html_filename: String,
    pub csv_filename: String,
    pub export_csv: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            output_path: "./output".to_string(),
            html_filename: "index.html".to_string(),
            csv_filename: "earthquakes.csv".to_string(),
            export_csv: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct MonitoringConfig {
    pub enabled: bool,
}

impl MapConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(MapError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置，未出現的欄位使用預設值
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| MapError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${MAPBOX_ACCESS_TOKEN})，未設定的變數保留原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| MapError::ConfigError {
            message: format!("env substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn timeout_seconds(&self) -> u64 {
        self.feeds.timeout_seconds
    }

    pub fn output_path(&self) -> &str {
        &self.output.output_path
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.enabled
    }

    fn token_missing(&self) -> bool {
        self.tiles.access_token.as_deref().map_or(true, str::is_empty)
    }

    pub fn tile_layers(&self) -> Vec<TileLayer> {
        self.base_layer_settings()
            .iter()
            .map(TileLayer::from_settings)
            .collect()
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_url("feeds.earthquakes_url", &self.feeds.earthquakes_url)?;
        validation::validate_url("feeds.plates_url", &self.feeds.plates_url)?;
        validation::validate_positive_number("feeds.timeout_seconds", self.feeds.timeout_seconds, 1)?;

        validation::validate_range("view.center_lat", self.view.center_lat, -90.0, 90.0)?;
        validation::validate_range("view.center_lng", self.view.center_lng, -180.0, 180.0)?;
        validation::validate_range("view.zoom", self.view.zoom, 0, 22)?;

        validation::validate_path("output.output_path", &self.output.output_path)?;
        validation::validate_file_name("output.html_filename", &self.output.html_filename)?;
        if self.output.export_csv {
            validation::validate_file_name("output.csv_filename", &self.output.csv_filename)?;
        }

        if self.base_layers.is_empty() {
            return Err(MapError::MissingConfigError {
                field: "base_layers".to_string(),
            });
        }
        for layer in &self.base_layers {
            validation::validate_non_empty_string("base_layers.name", &layer.name)?;
        }
        validation::validate_unique_names(
            "base_layers.name",
            self.base_layers.iter().map(|l| l.name.as_str()),
        )?;
        if !self
            .base_layers
            .iter()
            .any(|l| l.name == self.view.default_base_layer)
        {
            return Err(MapError::ConfigValidationError {
                field: "view.default_base_layer".to_string(),
                message: format!(
                    "'{}' is not one of the configured base layers",
                    self.view.default_base_layer
                ),
            });
        }

        for layer in self.tile_layers() {
            validation::validate_url(
                &format!("base_layers[{}].url_template", layer.name),
                &layer.tile_url(0, 0, 0),
            )?;
        }

        let needs_token = self
            .base_layers
            .iter()
            .any(|l| l.url_template.contains(ACCESS_TOKEN_PLACEHOLDER));
        if needs_token && self.token_missing() {
            tracing::warn!(
                "No tile access token configured; base layer imagery will not load (set MAPBOX_ACCESS_TOKEN)"
            );
        }

        Ok(())
    }
}

impl ConfigProvider for MapConfig {
    fn earthquakes_url(&self) -> &str {
        &self.feeds.earthquakes_url
    }

    fn plates_url(&self) -> &str {
        &self.feeds.plates_url
    }

    fn failure_policy(&self) -> FailurePolicy {
        self.feeds.on_failure
    }

    fn view_settings(&self) -> ViewSettings {
        ViewSettings {
            center: [self.view.center_lat, self.view.center_lng],
            zoom: self.view.zoom,
            default_base_layer: self.view.default_base_layer.clone(),
            plates_visible: self.view.plates_visible,
        }
    }

    fn base_layer_settings(&self) -> Vec<BaseLayerSettings> {
        let token = self.tiles.access_token.as_deref().unwrap_or_default();
        self.base_layers
            .iter()
            .map(|layer| BaseLayerSettings {
                name: layer.name.clone(),
                url_template: layer.url_template.replace(ACCESS_TOKEN_PLACEHOLDER, token),
                attribution: layer.attribution.clone(),
                max_zoom: layer.max_zoom,
            })
            .collect()
    }

    fn page_title(&self) -> &str {
        &self.page.title
    }

    fn html_filename(&self) -> &str {
        &self.output.html_filename
    }

    fn csv_filename(&self) -> Option<&str> {
        self.output
            .export_csv
            .then_some(self.output.csv_filename.as_str())
    }
}

impl Validate for MapConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults_match_the_classic_map() {
        let config = MapConfig::default();

        assert_eq!(config.earthquakes_url(), DEFAULT_EARTHQUAKES_URL);
        assert_eq!(config.plates_url(), DEFAULT_PLATES_URL);
        assert_eq!(config.view_settings().center, [30.0, 0.0]);
        assert_eq!(config.view_settings().zoom, 2);
        assert!(!config.view_settings().plates_visible);
        let names: Vec<String> = config.base_layers.iter().map(|l| l.name.clone()).collect();
        assert_eq!(names, vec!["Street", "Dark", "Satellite"]);
        assert_eq!(config.failure_policy(), FailurePolicy::Skip);
        assert_eq!(config.csv_filename(), Some("earthquakes.csv"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_partial_toml_config() {
        let toml_content = r#"
[feeds]
earthquakes_url = "https://example.com/quakes.geojson"
on_failure = "fail"

[view]
zoom = 4
plates_visible = true

[output]
export_csv = false
"#;

        let config = MapConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.earthquakes_url(), "https://example.com/quakes.geojson");
        assert_eq!(config.plates_url(), DEFAULT_PLATES_URL);
        assert_eq!(config.failure_policy(), FailurePolicy::Fail);
        assert_eq!(config.view.zoom, 4);
        assert_eq!(config.view.center_lat, 30.0);
        assert!(config.view.plates_visible);
        assert_eq!(config.csv_filename(), None);
        assert_eq!(config.base_layers.len(), 3);
    }

    #[test]
    fn test_custom_base_layers_replace_defaults() {
        let toml_content = r#"
[view]
default_base_layer = "OSM"

[[base_layers]]
name = "OSM"
url_template = "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png"
"#;

        let config = MapConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.base_layers.len(), 1);
        assert_eq!(config.base_layers[0].max_zoom, 18);
        assert!(config.validate().is_ok());
        assert_eq!(
            config.tile_layers()[0].tile_url(1, 0, 1),
            "https://a.tile.openstreetmap.org/1/0/1.png"
        );
    }

    #[test]
    fn test_env_var_substitution_fills_access_token() {
        std::env::set_var("QUAKE_MAP_TEST_TOKEN", "pk.test-token");

        let toml_content = r#"
[tiles]
access_token = "${QUAKE_MAP_TEST_TOKEN}"
"#;

        let config = MapConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.tiles.access_token.as_deref(), Some("pk.test-token"));
        let street = &config.base_layer_settings()[0];
        assert!(street.url_template.ends_with("access_token=pk.test-token"));
        assert!(street.url_template.contains("{z}/{x}/{y}"));

        std::env::remove_var("QUAKE_MAP_TEST_TOKEN");
    }

    #[test]
    fn test_config_validation_rejects_bad_values() {
        let bad_url = MapConfig::from_toml_str("[feeds]\nplates_url = \"invalid-url\"\n").unwrap();
        assert!(bad_url.validate().is_err());

        let bad_zoom = MapConfig::from_toml_str("[view]\nzoom = 30\n").unwrap();
        assert!(bad_zoom.validate().is_err());

        let bad_lat = MapConfig::from_toml_str("[view]\ncenter_lat = 120.0\n").unwrap();
        assert!(bad_lat.validate().is_err());

        let bad_timeout = MapConfig::from_toml_str("[feeds]\ntimeout_seconds = 0\n").unwrap();
        assert!(bad_timeout.validate().is_err());

        let unknown_base = MapConfig::from_toml_str("[view]\ndefault_base_layer = \"Terrain\"\n").unwrap();
        match unknown_base.validate() {
            Err(MapError::ConfigValidationError { field, .. }) => {
                assert_eq!(field, "view.default_base_layer")
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_invalid_toml_is_reported() {
        let err = MapConfig::from_toml_str("[view\nzoom = 2").unwrap_err();
        assert!(matches!(err, MapError::ConfigValidationError { .. }));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[page]\ntitle = \"Quakes this week\"\n")
            .unwrap();

        let config = MapConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.page_title(), "Quakes this week");
    }
}
