pub mod oracle;

pub use oracle::{describe_melody, ConsoleRatingOracle, FitnessOracle, ReplayOracle};
