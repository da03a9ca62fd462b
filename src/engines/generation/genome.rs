use rand::Rng;

/// Genome representation for the melody search
///
/// A genome is a fixed-length sequence of bits (each element is `0` or `1`).
/// It is read in consecutive chunks of `bits_per_note` bits, one chunk per
/// note slot of the tune, by the melody decoder:
/// - the low bits select a scale degree
/// - the top bit, when pauses are allowed, turns the slot into a rest
/// - equal neighbouring degrees merge into one longer note
///
/// Bit strings keep the genetic operators trivial: crossover is slice
/// concatenation and mutation is a single XOR.
///
/// # Conversion
///
/// Use `engines::melody::decode()` to convert Genome -> Melody
///
/// # Example
///
/// ```
/// let genome: musigen::engines::generation::Genome = vec![1, 0, 0, 0, 1, 1, 0, 0];
/// // With 4 bits per note this is two slots: degree 1 then degree 3.
/// assert_eq!(genome.len(), 8);
/// ```
pub type Genome = Vec<u8>;

/// Generate a genome of `length` independent, uniformly random bits.
pub fn generate_genome<R: Rng>(length: usize, rng: &mut R) -> Genome {
    (0..length).map(|_| rng.gen_range(0..=1)).collect()
}

pub fn genome_to_string(genome: &[u8]) -> String {
    genome
        .iter()
        .map(|bit| if *bit == 0 { '0' } else { '1' })
        .collect()
}

/// Parse a `0`/`1` string; `None` if any other character is present.
pub fn genome_from_string(bits: &str) -> Option<Genome> {
    bits.chars()
        .map(|c| match c {
            '0' => Some(0),
            '1' => Some(1),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_generate_genome_is_binary() {
        let mut rng = StdRng::seed_from_u64(7);
        let genome = generate_genome(256, &mut rng);

        assert_eq!(genome.len(), 256);
        assert!(genome.iter().all(|bit| *bit <= 1));
        assert!(genome.contains(&0) && genome.contains(&1));
    }

    #[test]
    fn test_string_conversion() {
        let genome = vec![0, 1, 1, 0, 0];
        assert_eq!(genome_to_string(&genome), "01100");
        assert_eq!(genome_from_string("01100"), Some(genome));
        assert_eq!(genome_from_string("0120"), None);
    }
}
