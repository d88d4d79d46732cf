use anyhow::Error;
use http::Uri;
use serde::Deserialize;
use std::fs::File;
use std::io::prelude::*;
use std::path::Path;
use thiserror::Error as ThisError;

pub const DEFAULT_DURATION_SECONDS: u64 = 30;
pub const DEFAULT_REQUEST_TIMEOUT_SECONDS: u64 = 10;
pub const DEFAULT_SLOW_THRESHOLD_MS: f64 = 500.0;

/// Raw, unvalidated shape of the TOML config file. Every field is optional;
/// resolution against defaults and overrides happens in `Config::resolve`.
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    pub url: Option<String>,
    pub duration_seconds: Option<u64>,
    pub request_timeout_seconds: Option<u64>,
    pub slow_threshold_ms: Option<f64>,
}

impl FileConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<FileConfig, Error> {
        let mut f = File::open(path.as_ref())?;
        let mut contents = String::new();
        f.read_to_string(&mut contents)?;
        let config: FileConfig = toml::from_str(&contents)?;
        Ok(config)
    }
}

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("No target url given; set `url` in the config file or pass --url")]
    MissingUrl,
}

/// Resolved run configuration, passed into each stage of the pipeline.
#[derive(Debug, Clone)]
pub struct Config {
    pub target_url: Uri,
    pub duration_seconds: u64,
    pub request_timeout_seconds: u64,
    pub slow_threshold_ms: f64,
}

impl Config {
    /// Merge the config file with command-line overrides. The url and
    /// duration overrides win over the file; everything else falls back to
    /// the defaults above.
    pub fn resolve(
        file: FileConfig,
        url_override: Option<String>,
        duration_override: Option<u64>,
    ) -> Result<Config, Error> {
        let url = url_override
            .or(file.url)
            .ok_or(ConfigError::MissingUrl)?;
        Ok(Config {
            target_url: url.parse::<Uri>()?,
            duration_seconds: duration_override
                .or(file.duration_seconds)
                .unwrap_or(DEFAULT_DURATION_SECONDS),
            request_timeout_seconds: file
                .request_timeout_seconds
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECONDS),
            slow_threshold_ms: file.slow_threshold_ms.unwrap_or(DEFAULT_SLOW_THRESHOLD_MS),
        })
    }
}
