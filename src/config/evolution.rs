use super::traits::{invalid, ConfigSection};
use crate::error::MusigenError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EvolutionConfig {
    pub population_size: usize,
    pub mutation_probability: f64,
    /// Signed so that a negative value in a config file is reported instead of
    /// failing to parse.
    pub mutation_rounds: i64,
    pub fitness_limit: i64,
    pub generation_limit: usize,
    pub seed: Option<u64>,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            population_size: 5,
            mutation_probability: 0.1,
            mutation_rounds: 2,
            fitness_limit: 5,
            generation_limit: 3,
            seed: None,
        }
    }
}

impl ConfigSection for EvolutionConfig {
    fn section_name() -> &'static str {
        "evolution"
    }

    fn validate(&self) -> Result<(), MusigenError> {
        if self.population_size == 0 {
            return Err(invalid::<Self>("population_size must be positive"));
        }
        if !(0.0..=1.0).contains(&self.mutation_probability) {
            return Err(invalid::<Self>("mutation_probability must be between 0 and 1"));
        }
        if self.mutation_rounds < 0 {
            return Err(invalid::<Self>("mutation_rounds can only be positive"));
        }
        Ok(())
    }
}
