use thiserror::Error;

#[derive(Error, Debug)]
pub enum MapError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("GeoJSON parsing error: {0}")]
    GeoJsonError(#[from] geojson::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Template rendering error: {0}")]
    TemplateError(#[from] tera::Error),

    #[error("{feed} feed returned HTTP {status}")]
    FeedStatusError { feed: String, status: u16 },

    #[error("{feed} feed is not a feature collection: {message}")]
    FeedFormatError { feed: String, message: String },

    #[error("{feed} feed unavailable: {reason}")]
    FeedUnavailableError { feed: String, reason: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for '{field}': '{value}' ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Data,
    Configuration,
    Output,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl MapError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            MapError::HttpError(_)
            | MapError::FeedStatusError { .. }
            | MapError::FeedUnavailableError { .. } => ErrorCategory::Network,
            MapError::GeoJsonError(_)
            | MapError::FeedFormatError { .. }
            | MapError::SerializationError(_) => ErrorCategory::Data,
            MapError::ConfigError { .. }
            | MapError::InvalidConfigValueError { .. }
            | MapError::MissingConfigError { .. }
            | MapError::ConfigValidationError { .. } => ErrorCategory::Configuration,
            MapError::CsvError(_) | MapError::IoError(_) | MapError::TemplateError(_) => {
                ErrorCategory::Output
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            // A rerun usually fixes a flaky upstream
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Data | ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Output => match self {
                MapError::IoError(_) => ErrorSeverity::Critical,
                _ => ErrorSeverity::High,
            },
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            MapError::HttpError(_) | MapError::FeedUnavailableError { .. } => {
                "Check network connectivity and the feed URLs, or raise --timeout-seconds"
            }
            MapError::FeedStatusError { .. } => {
                "The feed server rejected the request; verify the URL is still published"
            }
            MapError::GeoJsonError(_) | MapError::FeedFormatError { .. } => {
                "Make sure the feed URL points at a GeoJSON FeatureCollection"
            }
            MapError::SerializationError(_) | MapError::TemplateError(_) => {
                "This is likely a bug in the page renderer; rerun with --verbose and report it"
            }
            MapError::CsvError(_) => "Disable the CSV export with --no-csv and retry",
            MapError::IoError(_) => "Check that the output path exists and is writable",
            MapError::ConfigError { .. }
            | MapError::InvalidConfigValueError { .. }
            | MapError::MissingConfigError { .. }
            | MapError::ConfigValidationError { .. } => {
                "Review the configuration file and command-line flags"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Network => format!("Could not download map data: {}", self),
            ErrorCategory::Data => format!("Map data could not be read: {}", self),
            ErrorCategory::Configuration => format!("Invalid configuration: {}", self),
            ErrorCategory::Output => format!("Could not write the map: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, MapError>;
