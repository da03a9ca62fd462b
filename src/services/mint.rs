use crate::codec::ShareCode;
use crate::engines::generation::{EvolutionEngine, GenerationOutcome, Population};
use crate::error::Result;

/// Evolve the population carried by a share code by one generation.
///
/// A share code carries no ratings, so every genome enters with zero fitness
/// and selection is uniform over the pool. The scale and tempo pass through
/// unchanged.
pub fn mint(code: &str, engine: &mut EvolutionEngine) -> Result<String> {
    let share: ShareCode = code.parse()?;
    log::debug!(
        "Minting {} genomes in {} at {} bpm",
        share.genomes.len(),
        share.scale,
        share.bpm
    );

    let mut population = Population::from_genomes(share.genomes)?;
    let genomes = match engine.advance_generation(&mut population)? {
        GenerationOutcome::Next(genomes) => genomes,
        GenerationOutcome::Terminated { .. } => population.genomes().to_vec(),
    };

    Ok(ShareCode::new(genomes, share.scale, share.bpm).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::hash;
    use crate::config::EvolutionConfig;
    use crate::engines::melody::ScaleKind;

    fn engine() -> EvolutionEngine {
        EvolutionEngine::new(EvolutionConfig {
            mutation_probability: 0.5,
            mutation_rounds: 5,
            seed: Some(3),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_mint_keeps_scale_bpm_and_elites() {
        let genomes = vec![
            vec![0, 0, 0, 0, 1, 1, 1, 1],
            vec![1, 0, 1, 0, 1, 0, 1, 0],
            vec![0, 1, 1, 0, 0, 1, 1, 0],
            vec![1, 1, 1, 1, 0, 0, 0, 0],
        ];
        let code = ShareCode::new(genomes.clone(), ScaleKind::Phrygian, 100).to_string();

        let minted: ShareCode = mint(&code, &mut engine()).unwrap().parse().unwrap();

        assert_eq!(minted.scale, ScaleKind::Phrygian);
        assert_eq!(minted.bpm, 100);
        assert_eq!(minted.genomes.len(), 4);
        assert_eq!(&minted.genomes[..2], &genomes[..2]);
        assert!(minted.genomes.iter().all(|g| g.len() == 8));
    }

    #[test]
    fn test_mint_rejects_bad_hash() {
        let code = format!("{}-zz-major-120", hash::encode_genome(&[0, 1]));
        assert!(mint(&code, &mut engine()).is_err());
    }
}
