//! Compact hex transport for genomes.
//!
//! A genome is prefixed with a sentinel `1` bit, read most-significant bit
//! first as a binary number and written as lowercase hex. The sentinel keeps
//! leading zero bits alive through the conversion. Genomes are joined by `-`.
//!
//! `[0, 0, 1, 1]` becomes `10011` in binary, which is `"13"`.

use crate::engines::generation::genome::Genome;
use crate::error::{MusigenError, Result};

pub const SEPARATOR: char = '-';

pub fn encode_genome(genome: &[u8]) -> String {
    let mut bits = Vec::with_capacity(genome.len() + 4);
    bits.push(1u8);
    bits.extend(genome.iter().map(|bit| bit & 1));

    // Left-pad to whole nibbles; the pad lands above the sentinel.
    let pad = (4 - bits.len() % 4) % 4;
    let padded = std::iter::repeat(0u8).take(pad).chain(bits);

    let mut hex = String::with_capacity(genome.len() / 4 + 1);
    let mut nibble = 0u8;
    for (i, bit) in padded.enumerate() {
        nibble = (nibble << 1) | bit;
        if i % 4 == 3 {
            if !(hex.is_empty() && nibble == 0) {
                hex.push(char::from_digit(u32::from(nibble), 16).unwrap_or('0'));
            }
            nibble = 0;
        }
    }
    hex
}

pub fn decode_genome(token: &str) -> Result<Genome> {
    if token.is_empty() {
        return Err(MusigenError::MalformedHash("empty genome token".to_string()));
    }

    let mut bits = Vec::with_capacity(token.len() * 4);
    for c in token.chars() {
        let digit = c
            .to_digit(16)
            .ok_or_else(|| MusigenError::MalformedHash(format!("'{}' is not a hex digit in '{}'", c, token)))?;
        bits.extend((0..4).rev().map(|shift| ((digit >> shift) & 1) as u8));
    }

    let sentinel = bits
        .iter()
        .position(|bit| *bit == 1)
        .ok_or_else(|| MusigenError::MalformedHash(format!("'{}' has no sentinel bit", token)))?;

    Ok(bits.split_off(sentinel + 1))
}

pub fn encode_genomes(genomes: &[Genome]) -> String {
    genomes
        .iter()
        .map(|genome| encode_genome(genome))
        .collect::<Vec<_>>()
        .join(&SEPARATOR.to_string())
}

pub fn decode_genomes(hash: &str) -> Result<Vec<Genome>> {
    hash.split(SEPARATOR).map(decode_genome).collect()
}
