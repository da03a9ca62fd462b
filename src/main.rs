use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use musigen::codec::hash;
use musigen::config::{AppConfig, ConfigManager};
use musigen::engines::evaluation::{describe_melody, ConsoleRatingOracle, FitnessOracle, ReplayOracle};
use musigen::engines::generation::{
    genome_from_string, ConsoleProgressCallback, EvolutionEngine, Genome, LogProgressCallback,
};
use musigen::engines::melody::decode;
use musigen::export::save_genome_to_midi;
use musigen::services::{mint, run_session};
use std::path::{Path, PathBuf};

/// musigen - evolve short melodies by rating them
#[derive(Parser, Debug)]
#[command(name = "musigen")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// TOML configuration file; `MUSIGEN__SECTION__FIELD` variables override it
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Rate generations of melodies and save the best ones as MIDI
    Evolve {
        /// Random seed (default: random)
        #[arg(short, long)]
        seed: Option<u64>,

        /// Replay scores from a file instead of asking
        #[arg(long)]
        replay: Option<PathBuf>,

        /// Log progress instead of printing a stats block per generation
        #[arg(short, long)]
        quiet: bool,
    },

    /// Print the melody encoded by a genome
    Decode {
        /// Genome as a 0/1 string, or a hash token with --hex
        genome: String,

        #[arg(long)]
        hex: bool,

        /// Print the melody as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write the melody encoded by a genome to a MIDI file
    Export {
        /// Genome as a 0/1 string, or a hash token with --hex
        genome: String,

        #[arg(long)]
        hex: bool,

        /// Output file
        #[arg(short, long)]
        out: PathBuf,
    },

    /// Evolve a share code (<hash>-<scale>-<bpm>) by one generation
    Mint {
        code: String,

        /// Random seed (default: random)
        #[arg(short, long)]
        seed: Option<u64>,
    },
}

fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    let manager = ConfigManager::new();
    match path {
        Some(path) => manager
            .load_from_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => manager.load_from_env().context("loading configuration")?,
    }
    Ok(manager.get())
}

fn parse_genome(input: &str, hex: bool) -> Result<Genome> {
    if hex {
        return hash::decode_genome(input).with_context(|| format!("decoding '{}'", input));
    }
    genome_from_string(input).with_context(|| format!("'{}' is not a 0/1 string", input))
}

fn main() -> Result<()> {
    let args = Args::parse();
    let mut config = load_config(args.config.as_deref())?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.logging.level)).init();

    match args.command {
        Commands::Evolve { seed, replay, quiet } => {
            if seed.is_some() {
                config.evolution.seed = seed;
            }

            let mut oracle: Box<dyn FitnessOracle> = match replay {
                Some(path) => Box::new(
                    ReplayOracle::from_file(&path).with_context(|| format!("reading {}", path.display()))?,
                ),
                None => Box::new(ConsoleRatingOracle::stdio()),
            };

            let started = chrono::Local::now();
            let report = if quiet {
                run_session(&config, oracle.as_mut(), LogProgressCallback, &started)?
            } else {
                run_session(&config, oracle.as_mut(), ConsoleProgressCallback, &started)?
            };

            println!(
                "Done after {} generations (best fitness {}).",
                report.summary.generations, report.summary.best_fitness
            );
            for path in &report.saved {
                println!("Saved {}", path.display());
            }
            println!("Population: {}", report.population_hash);
        }

        Commands::Decode { genome, hex, json } => {
            let genome = parse_genome(&genome, hex)?;
            let melody = decode(&genome, &config.tune)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&melody)?);
            } else {
                println!("{}", describe_melody(&melody, &config.tune));
            }
        }

        Commands::Export { genome, hex, out } => {
            let genome = parse_genome(&genome, hex)?;
            save_genome_to_midi(&out, &genome, &config.tune)?;
            println!("Saved {}", out.display());
        }

        Commands::Mint { code, seed } => {
            if seed.is_some() {
                config.evolution.seed = seed;
            }
            let mut engine = EvolutionEngine::new(config.evolution)?;
            println!("{}", mint(&code, &mut engine)?);
        }
    }

    Ok(())
}
