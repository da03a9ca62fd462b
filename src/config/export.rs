use super::traits::{invalid, ConfigSection};
use crate::error::MusigenError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Runs are written to `<output_dir>/<timestamp>/<generation>/`.
    pub output_dir: PathBuf,
    /// How many of the best genomes are saved at the end of a session.
    pub keep_best: usize,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("./midi"),
            keep_best: 2,
        }
    }
}

impl ConfigSection for ExportConfig {
    fn section_name() -> &'static str {
        "export"
    }

    fn validate(&self) -> Result<(), MusigenError> {
        if self.output_dir.as_os_str().is_empty() {
            return Err(invalid::<Self>("output_dir must not be empty"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default `env_logger` filter, overridden by `RUST_LOG`.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl ConfigSection for LoggingConfig {
    fn section_name() -> &'static str {
        "logging"
    }

    fn validate(&self) -> Result<(), MusigenError> {
        match self.level.to_ascii_lowercase().as_str() {
            "off" | "error" | "warn" | "info" | "debug" | "trace" => Ok(()),
            other => Err(invalid::<Self>(format!("unknown log level '{}'", other))),
        }
    }
}
