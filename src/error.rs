//! Error types for NetMirror

use thiserror::Error;

/// Result type alias for NetMirror operations
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for the application
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Operation failed: {0}")]
    Other(String),
}

/// Backend retrieval errors
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Invalid API response: {0}")]
    InvalidResponse(String),

    #[error("Offline mode: {0} was not requested from the network")]
    Offline(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Network("Request timed out".to_string())
        } else if err.is_connect() {
            ApiError::Network("Failed to connect to backend".to_string())
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to save configuration: {0}")]
    SaveError(String),

    #[error("Configuration already exists at {0}. Use --force to overwrite.")]
    AlreadyExists(String),
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

/// Local cache errors
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Could not determine cache directory")]
    NoHome,

    #[error("Cache I/O error: {0}")]
    Io(String),

    #[error("Cache database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Cache lock poisoned")]
    Poisoned,

    #[error("Failed to pre-cache {path}: {reason}")]
    Prewarm { path: String, reason: String },

    #[error("No active cache generation")]
    NoGeneration,

    #[error("Invalid cache lifecycle transition: {0}")]
    Lifecycle(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_network() {
        let err = ApiError::Network("Connection refused".to_string());
        assert!(err.to_string().contains("Connection refused"));
    }

    #[test]
    fn test_api_error_not_found() {
        let err = ApiError::NotFound("/api/asn/64500.json".to_string());
        assert!(err.to_string().contains("64500"));
    }

    #[test]
    fn test_api_error_offline_names_path() {
        let err = ApiError::Offline("/index.html".to_string());
        let msg = err.to_string();
        assert!(msg.contains("Offline"));
        assert!(msg.contains("/index.html"));
    }

    #[test]
    fn test_config_error_already_exists() {
        let err = ConfigError::AlreadyExists("/tmp/config.yaml".to_string());
        assert!(err.to_string().contains("--force"));
    }

    #[test]
    fn test_cache_error_prewarm() {
        let err = CacheError::Prewarm {
            path: "/manifest.json".to_string(),
            reason: "status 404".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("/manifest.json"));
        assert!(msg.contains("404"));
    }

    #[test]
    fn test_error_from_api_error() {
        let err: Error = ApiError::ServerError("boom".to_string()).into();

        match err {
            Error::Api(ApiError::ServerError(_)) => (),
            _ => panic!("Expected Error::Api(ApiError::ServerError)"),
        }
    }

    #[test]
    fn test_error_from_cache_error() {
        let err: Error = CacheError::NoGeneration.into();

        match err {
            Error::Cache(CacheError::NoGeneration) => (),
            _ => panic!("Expected Error::Cache(CacheError::NoGeneration)"),
        }
    }

    #[test]
    fn test_config_error_from_yaml_error() {
        let yaml_str = "invalid: [yaml: content";
        let yaml_err = serde_yaml::from_str::<serde_yaml::Value>(yaml_str).unwrap_err();
        let config_err: ConfigError = yaml_err.into();

        match config_err {
            ConfigError::ParseError(_) => (),
            _ => panic!("Expected ConfigError::ParseError"),
        }
    }
}
