use crate::engines::generation::genome::Genome;
use crate::error::{MusigenError, Result};
use rand::Rng;

/// Single-point crossover: swap genome tails at a random cut
pub fn crossover<R: Rng>(parent1: Genome, parent2: Genome, rng: &mut R) -> Result<(Genome, Genome)> {
    if parent1.len() != parent2.len() {
        return Err(MusigenError::LengthMismatch {
            expected: parent1.len(),
            actual: parent2.len(),
        });
    }

    let len = parent1.len();
    if len < 2 {
        return Ok((parent1, parent2));
    }

    let point = rng.gen_range(1..len);
    log::trace!("Crossover at {}/{}", point, len);

    crossover_at(parent1, parent2, point)
}

/// Deterministic half of `crossover`: `A[..point] + B[point..]` and
/// `B[..point] + A[point..]`.
pub fn crossover_at(mut parent1: Genome, mut parent2: Genome, point: usize) -> Result<(Genome, Genome)> {
    if parent1.len() != parent2.len() {
        return Err(MusigenError::LengthMismatch {
            expected: parent1.len(),
            actual: parent2.len(),
        });
    }
    if point > parent1.len() {
        return Err(MusigenError::IndexOutOfRange {
            index: point,
            len: parent1.len(),
        });
    }

    parent1[point..].swap_with_slice(&mut parent2[point..]);
    Ok((parent1, parent2))
}

/// Mutation: `rounds` independent draws of a bit index, each flipped with
/// probability `probability`. Rounds may land on the same index twice.
pub fn mutate<R: Rng>(mut genome: Genome, probability: f64, rounds: usize, rng: &mut R) -> Genome {
    if genome.is_empty() {
        return genome;
    }

    for _ in 0..rounds {
        let index = rng.gen_range(0..genome.len());
        if rng.gen::<f64>() < probability {
            genome[index] ^= 1;
        }
    }

    genome
}
