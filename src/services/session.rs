use crate::config::AppConfig;
use crate::engines::evaluation::FitnessOracle;
use crate::engines::generation::{EvolutionEngine, ProgressCallback, RunSummary};
use crate::error::Result;
use crate::export::save_genome_to_midi;
use chrono::{DateTime, TimeZone};
use std::fmt::Display;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct SessionReport {
    pub summary: RunSummary,
    pub saved: Vec<PathBuf>,
    /// Hash of the final population, see `codec::hash`.
    pub population_hash: String,
}

/// Directory that receives the tunes of one session.
pub fn session_dir<Tz>(config: &AppConfig, started: &DateTime<Tz>, generation: usize) -> PathBuf
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    config
        .export
        .output_dir
        .join(started.format("%d-%m-%Y-%H-%M").to_string())
        .join(generation.to_string())
}

/// Run a full evolution session and save the best genomes as MIDI files.
///
/// The first `keep_best` genomes of the final population are saved: either
/// the sorted population of a terminated run or the elites at the front of
/// the last generation.
pub fn run_session<O, C, Tz>(
    config: &AppConfig,
    oracle: &mut O,
    callback: C,
    started: &DateTime<Tz>,
) -> Result<SessionReport>
where
    O: FitnessOracle + ?Sized,
    C: ProgressCallback,
    Tz: TimeZone,
    Tz::Offset: Display,
{
    config.validate()?;

    let tune = &config.tune;
    let mut engine = EvolutionEngine::new(config.evolution.clone())?;
    let mut population = engine.initialize_population(tune)?;

    log::info!(
        "Session: {} genomes of {} bits, {} {} at {} bpm",
        population.len(),
        population.genome_length(),
        tune.key,
        tune.scale,
        tune.bpm
    );

    let summary = engine.run(&mut population, tune, oracle, callback)?;
    log::info!(
        "Session finished after {} generations, best fitness {}",
        summary.generations,
        summary.best_fitness
    );

    let dir = session_dir(config, started, summary.generations);
    let mut saved = Vec::new();
    for (i, genome) in population.genomes().iter().take(config.export.keep_best).enumerate() {
        let path = dir.join(format!("{}-{}-{}.mid", tune.scale, tune.key, i));
        save_genome_to_midi(&path, genome, tune)?;
        saved.push(path);
    }

    Ok(SessionReport {
        summary,
        saved,
        population_hash: population.to_hash(),
    })
}
