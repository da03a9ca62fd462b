pub mod genome;
pub mod operators;
pub mod population;
pub mod evolution_engine;
pub mod progress;

pub use genome::{generate_genome, genome_from_string, genome_to_string, Genome};
pub use population::{Individual, Population, PopulationStats};
pub use evolution_engine::{EvolutionEngine, GenerationOutcome, ProgressCallback, RunSummary};
pub use progress::{
    ChannelProgressCallback, ConsoleProgressCallback, LogProgressCallback, NoopProgressCallback,
    ProgressMessage,
};
