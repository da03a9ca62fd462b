use crate::codec::hash::{self, SEPARATOR};
use crate::engines::generation::genome::Genome;
use crate::engines::melody::scale::ScaleKind;
use crate::error::{MusigenError, Result};
use std::fmt;
use std::str::FromStr;

/// Shareable identifier of a population: `<hex>-<hex>-...-<scale>-<bpm>`.
///
/// Parsing works from the right, so the genome tokens may contain any number
/// of separators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareCode {
    pub genomes: Vec<Genome>,
    pub scale: ScaleKind,
    pub bpm: u32,
}

impl ShareCode {
    pub fn new(genomes: Vec<Genome>, scale: ScaleKind, bpm: u32) -> Self {
        Self { genomes, scale, bpm }
    }
}

impl fmt::Display for ShareCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{sep}{}{sep}{}",
            hash::encode_genomes(&self.genomes),
            self.scale,
            self.bpm,
            sep = SEPARATOR
        )
    }
}

impl FromStr for ShareCode {
    type Err = MusigenError;

    fn from_str(s: &str) -> Result<Self> {
        let mut parts = s.rsplitn(3, SEPARATOR);
        let (Some(bpm), Some(scale), Some(grid)) = (parts.next(), parts.next(), parts.next()) else {
            return Err(MusigenError::MalformedHash(format!(
                "'{}' is not of the form <hash>-<scale>-<bpm>",
                s
            )));
        };

        let bpm = bpm
            .parse::<u32>()
            .map_err(|e| MusigenError::MalformedHash(format!("bad bpm '{}': {}", bpm, e)))?;

        Ok(Self {
            genomes: hash::decode_genomes(grid)?,
            scale: scale.parse()?,
            bpm,
        })
    }
}
