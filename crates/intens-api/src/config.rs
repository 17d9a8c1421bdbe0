//! API configuration.
//!
//! All paths, limits and tool locations live here and are injected into
//! the pipeline; nothing reads ambient process globals at request time.

use std::path::PathBuf;
use std::time::Duration;

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// CORS origins
    pub cors_origins: Vec<String>,
    /// Max request body size (the upload size ceiling)
    pub max_body_size: usize,
    /// Directory raw uploads are persisted to
    pub upload_dir: PathBuf,
    /// Directory finished artifacts are served from
    pub output_dir: PathBuf,
    /// Explicit gifsicle binary path; PATH lookup when unset
    pub gifsicle_path: Option<PathBuf>,
    /// Ceiling for a single gifsicle invocation
    pub tool_timeout: Duration,
    /// Environment (development/production)
    pub environment: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            cors_origins: vec!["*".to_string()],
            max_body_size: 16 * 1024 * 1024, // 16MiB
            upload_dir: PathBuf::from("./uploads"),
            output_dir: PathBuf::from("./intensified"),
            gifsicle_path: None,
            tool_timeout: Duration::from_secs(60),
            environment: "development".to_string(),
        }
    }
}

impl ApiConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: std::env::var("API_HOST").unwrap_or(defaults.host),
            port: std::env::var("API_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.port),
            cors_origins: std::env::var("CORS_ORIGINS")
                .map(|s| s.split(',').map(|s| s.trim().to_string()).collect())
                .unwrap_or(defaults.cors_origins),
            max_body_size: std::env::var("MAX_BODY_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_body_size),
            upload_dir: std::env::var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.upload_dir),
            output_dir: std::env::var("OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.output_dir),
            gifsicle_path: std::env::var("GIFSICLE_PATH").ok().map(PathBuf::from),
            tool_timeout: Duration::from_secs(
                std::env::var("TOOL_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(defaults.tool_timeout.as_secs()),
            ),
            environment: std::env::var("ENVIRONMENT").unwrap_or(defaults.environment),
        }
    }

    /// Check if running in production mode.
    pub fn is_production(&self) -> bool {
        self.environment.to_lowercase() == "production"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_the_upload_contract() {
        let config = ApiConfig::default();
        assert_eq!(config.max_body_size, 16 * 1024 * 1024);
        assert_eq!(config.upload_dir, PathBuf::from("./uploads"));
        assert_eq!(config.output_dir, PathBuf::from("./intensified"));
        assert!(!config.is_production());
    }
}
