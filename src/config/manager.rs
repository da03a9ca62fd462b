use super::{
    evolution::EvolutionConfig,
    export::{ExportConfig, LoggingConfig},
    traits::ConfigSection,
    tune::TuneMetadata,
};
use crate::error::MusigenError;
use ::config::{builder::DefaultState, Config, ConfigBuilder, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};

/// Prefix of environment overrides, e.g. `MUSIGEN__TUNE__BPM=90`.
pub const ENV_PREFIX: &str = "MUSIGEN";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub tune: TuneMetadata,
    pub evolution: EvolutionConfig,
    pub export: ExportConfig,
    pub logging: LoggingConfig,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), MusigenError> {
        self.tune.validate()?;
        self.evolution.validate()?;
        self.export.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

pub struct ConfigManager {
    config: Arc<RwLock<AppConfig>>,
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigManager {
    pub fn new() -> Self {
        Self {
            config: Arc::new(RwLock::new(AppConfig::default())),
        }
    }

    /// Loads a TOML file and layers `MUSIGEN__*` environment variables on top.
    pub fn load_from_file<P: AsRef<Path>>(&self, path: P) -> Result<(), MusigenError> {
        let path = path.as_ref();
        log::debug!("Loading configuration from {}", path.display());

        let source = File::new(&path.to_string_lossy(), FileFormat::Toml);
        self.load(Config::builder().add_source(source))
    }

    pub fn load_from_str(&self, contents: &str) -> Result<(), MusigenError> {
        self.load(Config::builder().add_source(File::from_str(contents, FileFormat::Toml)))
    }

    /// Defaults plus environment overrides, for runs without a config file.
    pub fn load_from_env(&self) -> Result<(), MusigenError> {
        self.load(Config::builder())
    }

    fn load(
        &self,
        builder: ConfigBuilder<DefaultState>,
    ) -> Result<(), MusigenError> {
        let config: AppConfig = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;

        *self.config.write().unwrap_or_else(PoisonError::into_inner) = config;
        Ok(())
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), MusigenError> {
        let toml_str = toml::to_string_pretty(&self.get())?;
        std::fs::write(path, toml_str)?;
        Ok(())
    }

    pub fn get(&self) -> AppConfig {
        self.config
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Applies `f` and keeps the result only if it still validates.
    pub fn update<F>(&self, f: F) -> Result<(), MusigenError>
    where
        F: FnOnce(&mut AppConfig),
    {
        let mut config = self.config.write().unwrap_or_else(PoisonError::into_inner);
        let mut candidate = config.clone();
        f(&mut candidate);
        candidate.validate()?;
        *config = candidate;
        Ok(())
    }
}
