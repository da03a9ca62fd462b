use crate::config::{ConfigSection, EvolutionConfig, TuneMetadata};
use crate::engines::evaluation::FitnessOracle;
use crate::engines::generation::{
    genome::Genome,
    operators::{crossover, mutate},
    population::{Population, PopulationStats},
};
use crate::error::{MusigenError, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Result of one generational step.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationOutcome {
    /// The genomes of the next generation, elites first.
    Next(Vec<Genome>),
    /// The best genome reached the fitness limit. The population is left
    /// sorted best first and must not be advanced further.
    Terminated { best_fitness: i64 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub generations: usize,
    pub terminated: bool,
    pub best_fitness: i64,
}

pub struct EvolutionEngine {
    config: EvolutionConfig,
    mutation_rounds: usize,
    rng: StdRng,
}

pub trait ProgressCallback: Send {
    fn on_generation_start(&mut self, generation: usize);
    fn on_genome_evaluated(&mut self, evaluated: usize, total: usize, score: i64);
    fn on_generation_complete(&mut self, stats: &PopulationStats);
}

impl EvolutionEngine {
    pub fn new(config: EvolutionConfig) -> Result<Self> {
        config.validate()?;

        let mutation_rounds = usize::try_from(config.mutation_rounds).map_err(|_| {
            MusigenError::InvalidConfiguration("mutation_rounds can only be positive".to_string())
        })?;

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(Self {
            config,
            mutation_rounds,
            rng,
        })
    }

    pub fn config(&self) -> &EvolutionConfig {
        &self.config
    }

    /// Random population sized for `tune`.
    pub fn initialize_population(&mut self, tune: &TuneMetadata) -> Result<Population> {
        Population::generate(self.config.population_size, tune.genome_length(), &mut self.rng)
    }

    pub fn crossover(&mut self, parent1: Genome, parent2: Genome) -> Result<(Genome, Genome)> {
        crossover(parent1, parent2, &mut self.rng)
    }

    pub fn mutate(&mut self, genome: Genome) -> Genome {
        mutate(
            genome,
            self.config.mutation_probability,
            self.mutation_rounds,
            &mut self.rng,
        )
    }

    /// Shuffle the population and score every genome exactly once.
    pub fn evaluate<O, C>(
        &mut self,
        population: &mut Population,
        tune: &TuneMetadata,
        oracle: &mut O,
        callback: &mut C,
    ) -> Result<()>
    where
        O: FitnessOracle + ?Sized,
        C: ProgressCallback + ?Sized,
    {
        population.shuffle(&mut self.rng);

        let total = population.len();
        for index in 0..total {
            let score = oracle.score(population.genome(index)?, tune);
            population.set_fitness(index, score)?;
            callback.on_genome_evaluated(index + 1, total, score);
        }
        Ok(())
    }

    /// Produce the next generation from an evaluated population.
    ///
    /// The population is sorted best first in place. The two best genomes
    /// are carried over unchanged, then `len / 2 - 1` pairs are drawn from the
    /// fitness-weighted pool, crossed over and mutated. An odd population
    /// therefore shrinks by one.
    pub fn advance_generation(&mut self, population: &mut Population) -> Result<GenerationOutcome> {
        population.sort_in_place();

        let best_fitness = population.fitness_of(0)?;
        if best_fitness >= self.config.fitness_limit {
            log::info!(
                "Fitness limit {} reached with {}",
                self.config.fitness_limit,
                best_fitness
            );
            return Ok(GenerationOutcome::Terminated { best_fitness });
        }

        let mut next_generation: Vec<Genome> = population.genomes().iter().take(2).cloned().collect();

        for _ in 0..(population.len() / 2).saturating_sub(1) {
            let (parent1, parent2) = population.select_pair(&mut self.rng)?;
            let (child1, child2) = self.crossover(parent1, parent2)?;

            next_generation.push(self.mutate(child1));
            next_generation.push(self.mutate(child2));
        }

        log::debug!(
            "Next generation of {} from population of {}",
            next_generation.len(),
            population.len()
        );
        Ok(GenerationOutcome::Next(next_generation))
    }

    /// Run evaluate/advance until the fitness limit is reached or
    /// `generation_limit` generations have been evaluated.
    ///
    /// After a run that did not terminate, the population holds the unscored
    /// next generation with the previous elites at the front.
    pub fn run<O, C>(
        &mut self,
        population: &mut Population,
        tune: &TuneMetadata,
        oracle: &mut O,
        mut callback: C,
    ) -> Result<RunSummary>
    where
        O: FitnessOracle + ?Sized,
        C: ProgressCallback,
    {
        let mut best_fitness = population.best_fitness();

        for generation in 0..self.config.generation_limit {
            callback.on_generation_start(generation);

            self.evaluate(population, tune, oracle, &mut callback)?;

            let stats = population.stats(generation);
            best_fitness = stats.best_fitness;
            callback.on_generation_complete(&stats);

            match self.advance_generation(population)? {
                GenerationOutcome::Terminated { best_fitness } => {
                    return Ok(RunSummary {
                        generations: generation + 1,
                        terminated: true,
                        best_fitness,
                    });
                }
                GenerationOutcome::Next(genomes) => population.replace_genomes(genomes)?,
            }
        }

        Ok(RunSummary {
            generations: self.config.generation_limit,
            terminated: false,
            best_fitness,
        })
    }
}
