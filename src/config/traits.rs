use crate::error::MusigenError;
use serde::{Deserialize, Serialize};

/// Trait for configuration sections
pub trait ConfigSection: Serialize + for<'de> Deserialize<'de> + Default + Clone {
    fn section_name() -> &'static str;
    fn validate(&self) -> Result<(), MusigenError>;
}

/// Builds the error every section reports on a failed check.
pub(crate) fn invalid<S: ConfigSection>(message: impl Into<String>) -> MusigenError {
    MusigenError::InvalidConfiguration(format!("[{}] {}", S::section_name(), message.into()))
}
