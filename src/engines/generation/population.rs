use crate::codec::hash;
use crate::engines::generation::genome::{generate_genome, genome_to_string, Genome};
use crate::error::{MusigenError, Result};
use rand::seq::{index, SliceRandom};
use rand::Rng;
use serde::Serialize;
use std::cmp::Reverse;

/// A genome together with its slot in the population.
///
/// Prefer this over `Population::fitness_of_genome`: two genomes with the same
/// bits are still two individuals.
#[derive(Debug, Clone, Copy)]
pub struct Individual<'a> {
    pub index: usize,
    pub genome: &'a Genome,
    pub fitness: i64,
}

/// Summary of one evaluated generation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PopulationStats {
    pub generation: usize,
    pub size: usize,
    pub average_fitness: f64,
    pub best_fitness: i64,
    pub worst_fitness: i64,
    pub best_genome: String,
}

/// Genomes with index-aligned fitness scores.
///
/// The weighted selection pool is derived from the fitness array and dropped
/// whenever that array or the genome order changes, so selection never sees
/// a stale pool.
#[derive(Debug, Clone)]
pub struct Population {
    genomes: Vec<Genome>,
    fitness: Vec<i64>,
    weighted_pool: Option<Vec<usize>>,
}

impl Population {
    /// Generate `size` random genomes of `genome_length` bits with zero fitness.
    pub fn generate<R: Rng>(size: usize, genome_length: usize, rng: &mut R) -> Result<Self> {
        if size == 0 {
            return Err(MusigenError::InvalidConfiguration(
                "population size must be positive".to_string(),
            ));
        }
        if genome_length == 0 {
            return Err(MusigenError::InvalidConfiguration(
                "genome length must be positive".to_string(),
            ));
        }

        let genomes = (0..size)
            .map(|_| generate_genome(genome_length, rng))
            .collect();

        log::debug!("Generated population of {} genomes x {} bits", size, genome_length);
        Self::from_genomes(genomes)
    }

    /// Wrap existing genomes; every genome starts with zero fitness.
    pub fn from_genomes(genomes: Vec<Genome>) -> Result<Self> {
        let Some(first) = genomes.first() else {
            return Err(MusigenError::InvalidConfiguration(
                "population must contain at least one genome".to_string(),
            ));
        };

        let length = first.len();
        if let Some(other) = genomes.iter().find(|g| g.len() != length) {
            return Err(MusigenError::LengthMismatch {
                expected: length,
                actual: other.len(),
            });
        }

        let fitness = vec![0; genomes.len()];
        Ok(Self {
            genomes,
            fitness,
            weighted_pool: None,
        })
    }

    pub fn from_hash(hash: &str) -> Result<Self> {
        Self::from_genomes(hash::decode_genomes(hash)?)
    }

    pub fn to_hash(&self) -> String {
        hash::encode_genomes(&self.genomes)
    }

    pub fn len(&self) -> usize {
        self.genomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.genomes.is_empty()
    }

    pub fn genome_length(&self) -> usize {
        self.genomes.first().map_or(0, Vec::len)
    }

    pub fn genomes(&self) -> &[Genome] {
        &self.genomes
    }

    pub fn fitness(&self) -> &[i64] {
        &self.fitness
    }

    pub fn individuals(&self) -> impl Iterator<Item = Individual<'_>> {
        self.genomes
            .iter()
            .zip(&self.fitness)
            .enumerate()
            .map(|(index, (genome, fitness))| Individual {
                index,
                genome,
                fitness: *fitness,
            })
    }

    pub fn genome(&self, index: usize) -> Result<&Genome> {
        self.genomes.get(index).ok_or(MusigenError::IndexOutOfRange {
            index,
            len: self.len(),
        })
    }

    pub fn fitness_of(&self, index: usize) -> Result<i64> {
        self.fitness.get(index).copied().ok_or(MusigenError::IndexOutOfRange {
            index,
            len: self.len(),
        })
    }

    /// Fitness of the first genome whose bits equal `genome`.
    pub fn fitness_of_genome(&self, genome: &[u8]) -> Result<i64> {
        self.genomes
            .iter()
            .position(|g| g.as_slice() == genome)
            .map(|index| self.fitness[index])
            .ok_or(MusigenError::GenomeNotFound)
    }

    pub fn set_fitness(&mut self, index: usize, score: i64) -> Result<()> {
        let len = self.len();
        let slot = self
            .fitness
            .get_mut(index)
            .ok_or(MusigenError::IndexOutOfRange { index, len })?;

        *slot = score;
        self.weighted_pool = None;
        Ok(())
    }

    /// Install the next generation. Fitness restarts at zero for every genome.
    pub fn replace_genomes(&mut self, genomes: Vec<Genome>) -> Result<()> {
        *self = Self::from_genomes(genomes)?;
        Ok(())
    }

    /// Rebuild the selection pool: `fitness + 1` copies of every index, so a
    /// zero-fitness genome can still be picked. Negative scores contribute
    /// no copies once `fitness + 1` drops below zero.
    pub fn build_weighted_pool(&mut self) -> &[usize] {
        let pool: Vec<usize> = self
            .fitness
            .iter()
            .enumerate()
            .flat_map(|(index, fitness)| {
                let copies = usize::try_from(fitness.saturating_add(1)).unwrap_or(0);
                std::iter::repeat(index).take(copies)
            })
            .collect();

        log::trace!("Weighted pool rebuilt with {} entries", pool.len());
        self.weighted_pool.insert(pool)
    }

    pub fn weighted_pool(&mut self) -> &[usize] {
        if self.weighted_pool.is_none() {
            self.build_weighted_pool();
        }
        self.weighted_pool.as_deref().unwrap_or_default()
    }

    /// Draw two distinct pool positions without replacement. Both may still
    /// refer to the same genome when it occupies several positions.
    pub fn select_pair<R: Rng>(&mut self, rng: &mut R) -> Result<(Genome, Genome)> {
        let (first, second) = {
            let pool = self.weighted_pool();
            if pool.len() < 2 {
                return Err(MusigenError::EmptyPool(pool.len()));
            }

            let picks = index::sample(rng, pool.len(), 2);
            (pool[picks.index(0)], pool[picks.index(1)])
        };

        Ok((self.genomes[first].clone(), self.genomes[second].clone()))
    }

    /// Indices ordered by descending fitness; ties keep their current order.
    fn ranking(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.len()).collect();
        order.sort_by_key(|&index| Reverse(self.fitness[index]));
        order
    }

    /// Genomes by descending fitness without touching the population.
    pub fn sorted(&self) -> Vec<Genome> {
        self.ranking()
            .into_iter()
            .map(|index| self.genomes[index].clone())
            .collect()
    }

    /// Sort genomes and their fitness together, best first.
    pub fn sort_in_place(&mut self) {
        let order = self.ranking();
        self.permute(&order);
    }

    /// Shuffle genomes together with their fitness, e.g. before asking a
    /// listener to rate them again.
    pub fn shuffle<R: Rng>(&mut self, rng: &mut R) {
        let mut order: Vec<usize> = (0..self.len()).collect();
        order.shuffle(rng);
        self.permute(&order);
    }

    fn permute(&mut self, order: &[usize]) {
        let genomes = order.iter().map(|&i| std::mem::take(&mut self.genomes[i])).collect();
        let fitness = order.iter().map(|&i| self.fitness[i]).collect();

        self.genomes = genomes;
        self.fitness = fitness;
        self.weighted_pool = None;
    }

    /// Sum of all scores, saturating at the `i64` bounds.
    pub fn total_fitness(&self) -> i64 {
        self.fitness.iter().fold(0i64, |total, f| total.saturating_add(*f))
    }

    pub fn average_fitness(&self) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        self.total_fitness() as f64 / self.len() as f64
    }

    pub fn best_fitness(&self) -> i64 {
        self.fitness.iter().copied().max().unwrap_or(0)
    }

    pub fn worst_fitness(&self) -> i64 {
        self.fitness.iter().copied().min().unwrap_or(0)
    }

    pub fn best(&self) -> Option<Individual<'_>> {
        self.ranking().first().map(|&index| Individual {
            index,
            genome: &self.genomes[index],
            fitness: self.fitness[index],
        })
    }

    pub fn stats(&self, generation: usize) -> PopulationStats {
        PopulationStats {
            generation,
            size: self.len(),
            average_fitness: self.average_fitness(),
            best_fitness: self.best_fitness(),
            worst_fitness: self.worst_fitness(),
            best_genome: self
                .best()
                .map(|best| genome_to_string(best.genome))
                .unwrap_or_default(),
        }
    }
}
