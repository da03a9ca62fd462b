use thiserror::Error;

#[derive(Error, Debug)]
pub enum MusigenError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Length mismatch: expected {expected}, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("Weighted pool has {0} entries, at least 2 are needed to select a pair")]
    EmptyPool(usize),

    #[error("Index {index} out of range for population of {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Invariant violated: {0}")]
    InvariantViolation(String),

    #[error("Genome not found in population")]
    GenomeNotFound,

    #[error("Malformed hash: {0}")]
    MalformedHash(String),

    #[error("Unknown key: {0}")]
    UnknownKey(String),

    #[error("Unknown scale: {0}")]
    UnknownScale(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serde error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(#[from] ::config::ConfigError),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::ser::Error),
}

pub type Result<T> = std::result::Result<T, MusigenError>;
