pub mod traits;
pub mod evolution;
pub mod tune;
pub mod export;
pub mod manager;

pub use manager::{ConfigManager, AppConfig};
pub use evolution::EvolutionConfig;
pub use tune::TuneMetadata;
pub use export::{ExportConfig, LoggingConfig};
pub use traits::ConfigSection;
