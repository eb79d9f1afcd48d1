//! JSON output formatting

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::generator::{DisplayConfig, Stats};
use crate::models::AsnResult;

/// Wrapper for JSON output with metadata
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonOutput<T> {
    pub data: T,
    pub meta: Metadata,
}

/// Metadata included in JSON output
#[derive(Debug, Serialize, Deserialize)]
pub struct Metadata {
    /// RFC 3339 time the output was produced
    pub timestamp: String,

    /// CLI version
    pub version: String,
}

impl<T> JsonOutput<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            meta: Metadata {
                timestamp: Utc::now().to_rfc3339(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        }
    }
}

/// Everything one `generate` run produced
#[derive(Debug, Serialize)]
pub struct GenerateReport<'a> {
    pub display: &'a DisplayConfig,
    pub stats: Stats,
    pub results: &'a [AsnResult],
    pub config: String,
}

/// Format data as pretty-printed JSON
pub fn format_json<T: Serialize + ?Sized>(data: &T) -> Result<String, serde_json::Error> {
    let output = JsonOutput::new(data);
    serde_json::to_string_pretty(&output)
}
